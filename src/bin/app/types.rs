// src/bin/app/types.rs

use std::sync::Arc;

use scribe::config::Config;
use scribe::identity::IdentityDirectory;
use scribe::model::NoteModel;
use scribe::records::{DirectoryUser, Note, PatientSummary, Role, Template, UserStatus};
use scribe::speech::SpeechToText;
use scribe::store::RecordStore;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

// --- App state shared across handlers ---
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub directory: Arc<dyn IdentityDirectory>,
    pub model: Arc<dyn NoteModel>,
    pub speech: Arc<dyn SpeechToText>,
    pub config: Arc<Config>,
}

// --- Request types ---
#[derive(Debug, Default, Deserialize)]
pub struct PatientSearchQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub patient_id: Option<String>,
    pub all: Option<String>,
}

impl HistoryQuery {
    pub fn wants_all(&self) -> bool {
        self.all
            .as_deref()
            .is_some_and(|all| all.eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub transcript: Option<String>,
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    pub template_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    #[serde(default)]
    pub audio: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InviteRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

// --- Response types ---
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientResponse {
    pub patient: PatientSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedPatientResponse {
    pub message: String,
    pub patient: PatientSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PatientSearchResponse {
    pub patients: Vec<PatientSummary>,
    pub count: usize,
    pub query: String,
}

/// A stored note as the history view shows it.
#[derive(Debug, Serialize, Deserialize)]
pub struct NoteView {
    pub user_id: String,
    pub timestamp: String,
    pub patient_name: String,
    pub patient_id: Option<String>,
    pub soap_note: String,
    pub transcript: String,
    pub template_name: String,
    pub provider_email: String,
    pub created_at: String,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        Self {
            user_id: note.user_id,
            timestamp: note.timestamp,
            patient_name: note.patient_name,
            patient_id: note.patient_id,
            soap_note: note.soap_note,
            transcript: note.transcript,
            template_name: note.template_name,
            provider_email: note.provider_email,
            created_at: note.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub notes: Vec<NoteView>,
    pub count: usize,
    pub is_admin_view: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub note: String,
    pub timestamp: String,
    pub note_id: String,
    pub template_used: String,
    pub saved: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateListResponse {
    pub templates: Vec<Template>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub template: Template,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateChangeResponse {
    pub message: String,
    pub template: Template,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvitedUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InviteResponse {
    pub message: String,
    pub user: InvitedUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<DirectoryUser>,
    pub count: usize,
}
