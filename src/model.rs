//! Clinical note generation through a hosted language model.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{ScribeError, ScribeResult};
use crate::records::Template;

pub const MAX_TOKENS: u32 = 2000;
pub const TEMPERATURE: f32 = 0.1;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[async_trait]
pub trait NoteModel: Send + Sync {
    /// Sends one user turn and returns the model's text.
    async fn complete(&self, prompt: &str) -> ScribeResult<String>;
}

/// Instructions asking for a note shaped exactly like the template example.
pub fn build_instructions(template: &Template, patient_name: &str) -> String {
    format!(
        r#"You are an expert Dental Scribe AI.

Your task is to generate a clinical note from a conversation transcript.

IMPORTANT: Format your output EXACTLY like the example below. Match the section headers, style, and level of detail shown in the example.

===== EXAMPLE FORMAT =====
{example}
===== END EXAMPLE =====

The transcript may identify speakers (e.g., "Speaker 0", "Speaker 1"). Contextually determine who is the Provider and who is the Patient.

Generate a note for patient "{patient_name}" following the exact format shown above.

Key guidelines:
- Use the same section headers as the example
- Match the formatting style (bullets, numbering, etc.)
- Include relevant clinical details from the transcript
- Be concise but thorough
- Use proper dental terminology
- Include specific tooth numbers when mentioned
- Note any procedures performed or recommended
"#,
        example = template.example_output,
    )
}

pub fn build_prompt(template: &Template, patient_name: &str, transcript: &str) -> String {
    format!(
        "{}\n\nTRANSCRIPT:\n{transcript}",
        build_instructions(template, patient_name)
    )
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    completion: Option<String>,
}

/// Reads `content[0].text`, or the older `completion` field.
fn completion_text(body: &str) -> ScribeResult<String> {
    let response: InvokeResponse = serde_json::from_str(body)?;
    if let Some(block) = response.content.into_iter().next() {
        return Ok(block.text);
    }
    Ok(response.completion.unwrap_or_default())
}

/// Posts Messages-format requests to `{endpoint}/model/{model_id}/invoke`.
pub struct HttpNoteModel {
    client: reqwest::Client,
    endpoint: String,
    model_id: String,
    api_key: Option<String>,
}

impl HttpNoteModel {
    pub fn new(endpoint: &str, model_id: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model_id: model_id.to_string(),
            api_key,
        }
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }
}

#[async_trait]
impl NoteModel for HttpNoteModel {
    async fn complete(&self, prompt: &str) -> ScribeResult<String> {
        let body = json!({
            "anthropic_version": "bedrock-2023-05-31",
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut request = self
            .client
            .post(self.invoke_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .timeout(REQUEST_TIMEOUT);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(%status, model = %self.model_id, "model invocation failed");
            return Err(ScribeError::Model(format!("{status}: {text}")));
        }

        debug!(bytes = text.len(), "model response received");
        completion_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::default_template;

    #[test]
    fn prompt_embeds_example_patient_and_transcript() {
        let template = default_template("default_hygiene").unwrap();
        let prompt = build_prompt(template, "Jane Doe", "Speaker 0: any sensitivity?");

        assert!(prompt.contains("===== EXAMPLE FORMAT =====\nSUBJECTIVE:\nPatient presents for routine prophylaxis."));
        assert!(prompt.contains(r#"Generate a note for patient "Jane Doe""#));
        assert!(prompt.ends_with("\n\nTRANSCRIPT:\nSpeaker 0: any sensitivity?"));
    }

    #[test]
    fn completion_prefers_content_blocks() {
        let body = r#"{"content":[{"type":"text","text":"SUBJECTIVE: ok"}],"completion":"old"}"#;
        assert_eq!(completion_text(body).unwrap(), "SUBJECTIVE: ok");
    }

    #[test]
    fn completion_falls_back_to_legacy_field() {
        assert_eq!(completion_text(r#"{"completion":"legacy"}"#).unwrap(), "legacy");
        assert_eq!(completion_text("{}").unwrap(), "");
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(completion_text("not json"), Err(ScribeError::Json(_))));
    }

    #[test]
    fn invoke_url_joins_cleanly() {
        let model = HttpNoteModel::new("https://bedrock.test/", "m-1", None);
        assert_eq!(model.invoke_url(), "https://bedrock.test/model/m-1/invoke");
    }
}
