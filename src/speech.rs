//! Speech-to-text through the Deepgram listen API.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ScribeError, ScribeResult};

pub const DEFAULT_DEEPGRAM_URL: &str = "https://api.deepgram.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const LISTEN_PARAMS: [(&str, &str); 5] = [
    ("model", "nova-2"),
    ("smart_format", "true"),
    ("punctuate", "true"),
    ("diarize", "true"),
    ("language", "en-US"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub transcript: String,
    pub confidence: f64,
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>) -> ScribeResult<Transcript>;
}

/// Audio arrives base64 encoded inside JSON bodies.
pub fn decode_audio(encoded: &str) -> ScribeResult<Vec<u8>> {
    let audio = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ScribeError::validation(format!("audio is not valid base64: {e}")))?;
    if audio.is_empty() {
        return Err(ScribeError::validation("No audio provided"));
    }
    Ok(audio)
}

#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: ListenResults,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    channels: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    alternatives: Vec<Transcript>,
}

fn first_alternative(body: &str) -> ScribeResult<Transcript> {
    let response: ListenResponse = serde_json::from_str(body)?;
    response
        .results
        .channels
        .into_iter()
        .next()
        .and_then(|channel| channel.alternatives.into_iter().next())
        .ok_or_else(|| ScribeError::Speech("response had no transcript".into()))
}

pub struct DeepgramClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl DeepgramClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl SpeechToText for DeepgramClient {
    async fn transcribe(&self, audio: Vec<u8>) -> ScribeResult<Transcript> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScribeError::Config("speech API key is not configured".into()))?;

        debug!(bytes = audio.len(), "sending audio for transcription");
        let response = self
            .client
            .post(format!("{}/v1/listen", self.base_url))
            .query(&LISTEN_PARAMS)
            .header(reqwest::header::AUTHORIZATION, format!("Token {api_key}"))
            .header(reqwest::header::CONTENT_TYPE, "audio/webm")
            .body(audio)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(%status, "transcription failed");
            return Err(ScribeError::Speech(format!("{status} - {text}")));
        }

        first_alternative(&text)
    }
}
