// src/bin/app/test_support.rs

use std::sync::{Arc, Mutex};

use axum::async_trait;
use scribe::config::Config;
use scribe::identity::{Claims, MemoryDirectory};
use scribe::model::NoteModel;
use scribe::speech::{SpeechToText, Transcript};
use scribe::store::MemoryStore;
use scribe::{ScribeError, ScribeResult};

use crate::auth::Caller;
use crate::types::AppState;

/// Replies with a fixed note and remembers the prompts it saw.
#[derive(Default)]
pub struct CannedModel {
    pub reply: String,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl NoteModel for CannedModel {
    async fn complete(&self, prompt: &str) -> ScribeResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

pub struct CannedSpeech;

#[async_trait]
impl SpeechToText for CannedSpeech {
    async fn transcribe(&self, audio: Vec<u8>) -> ScribeResult<Transcript> {
        if audio == b"fail" {
            return Err(ScribeError::Speech("503 - busy".into()));
        }
        Ok(Transcript {
            transcript: format!("{} bytes heard", audio.len()),
            confidence: 0.9,
        })
    }
}

pub struct Harness {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub directory: Arc<MemoryDirectory>,
    pub model: Arc<CannedModel>,
}

pub fn harness_with_reply(reply: &str) -> Harness {
    let store = Arc::new(MemoryStore::with_page_size(2));
    let directory = Arc::new(MemoryDirectory::with_page_size(2));
    let model = Arc::new(CannedModel {
        reply: reply.to_string(),
        ..Default::default()
    });
    let state = AppState {
        store: store.clone(),
        directory: directory.clone(),
        model: model.clone(),
        speech: Arc::new(CannedSpeech),
        config: Arc::new(Config::default()),
    };
    Harness {
        state,
        store,
        directory,
        model,
    }
}

pub fn harness() -> Harness {
    harness_with_reply("SUBJECTIVE:\nok")
}

pub fn user(sub: &str) -> Caller {
    Caller(Claims {
        sub: Some(sub.to_string()),
        email: Some(format!("{sub}@example.com")),
        ..Default::default()
    })
}

pub fn admin(sub: &str) -> Caller {
    let Caller(mut claims) = user(sub);
    claims.groups = vec!["Admin".to_string()];
    Caller(claims)
}

pub fn anonymous() -> Caller {
    Caller::default()
}

/// A store whose every call fails, as when the backing table is unreachable.
pub struct UnreachableStore;

fn unreachable() -> ScribeError {
    ScribeError::Retrieval("connection timed out".into())
}

#[async_trait]
impl scribe::store::RecordStore for UnreachableStore {
    async fn put_patient(&self, _: scribe::records::Patient) -> ScribeResult<()> {
        Err(unreachable())
    }
    async fn get_patient(&self, _: &str) -> ScribeResult<Option<scribe::records::Patient>> {
        Err(unreachable())
    }
    async fn scan_patients(
        &self,
        _: Option<String>,
    ) -> ScribeResult<scribe::store::Page<scribe::records::Patient>> {
        Err(unreachable())
    }
    async fn put_note(&self, _: scribe::records::Note) -> ScribeResult<()> {
        Err(unreachable())
    }
    async fn notes_by_user(&self, _: &str, _: usize) -> ScribeResult<Vec<scribe::records::Note>> {
        Err(unreachable())
    }
    async fn notes_by_patient(&self, _: &str, _: usize) -> ScribeResult<Vec<scribe::records::Note>> {
        Err(unreachable())
    }
    async fn scan_notes(&self, _: usize) -> ScribeResult<Vec<scribe::records::Note>> {
        Err(unreachable())
    }
    async fn put_template(&self, _: scribe::records::Template) -> ScribeResult<()> {
        Err(unreachable())
    }
    async fn get_template(&self, _: &str) -> ScribeResult<Option<scribe::records::Template>> {
        Err(unreachable())
    }
    async fn scan_templates(&self) -> ScribeResult<Vec<scribe::records::Template>> {
        Err(unreachable())
    }
    async fn update_template(
        &self,
        _: &str,
        _: &scribe::records::TemplateDraft,
        _: &str,
    ) -> ScribeResult<scribe::records::Template> {
        Err(unreachable())
    }
    async fn delete_template(&self, _: &str) -> ScribeResult<()> {
        Err(unreachable())
    }
    async fn put_user(&self, _: scribe::records::UserRecord) -> ScribeResult<()> {
        Err(unreachable())
    }
}

pub fn unreachable_state() -> AppState {
    let mut state = harness().state;
    state.store = Arc::new(UnreachableStore);
    state
}
