//! Records persisted in the store and the shapes returned to clients.

use chrono::{Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every patient lives in one practice until multi-tenancy lands.
pub const DEFAULT_PRACTICE_ID: &str = "default";

/// How long a generated note is retained before the store may expire it.
pub const NOTE_RETENTION_DAYS: i64 = 365;

/// RFC 3339 UTC timestamp with microseconds. Sorts lexicographically.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn short_hex(len: usize) -> String {
    Uuid::new_v4().simple().to_string()[..len].to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: String,
    pub practice_id: String,
    pub name: String,
    pub name_lowercase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for a new patient. Blank optional fields are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPatient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Patient {
    /// Returns `None` when the name is blank.
    pub fn create(input: &NewPatient, created_by: &str) -> Option<Self> {
        let name = non_blank(&input.name)?;
        let timestamp = now_timestamp();
        Some(Self {
            patient_id: format!("pat_{}", short_hex(12)),
            practice_id: DEFAULT_PRACTICE_ID.to_string(),
            name_lowercase: name.to_lowercase(),
            name,
            email: non_blank(&input.email),
            phone: non_blank(&input.phone),
            date_of_birth: non_blank(&input.date_of_birth),
            created_by: created_by.to_string(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    pub fn summary(&self) -> PatientSummary {
        PatientSummary {
            patient_id: self.patient_id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            date_of_birth: self.date_of_birth.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// Client-facing projection of a patient. Absent fields serialize as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub created_at: String,
}

/// A generated visit note, keyed by (`user_id`, `timestamp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub user_id: String,
    pub timestamp: String,
    pub patient_name: String,
    #[serde(default)]
    pub patient_id: Option<String>,
    pub transcript: String,
    pub soap_note: String,
    pub template_id: String,
    pub template_name: String,
    pub provider_email: String,
    pub ttl: i64,
    pub created_at: String,
}

impl Note {
    pub fn expiry_from_now() -> i64 {
        (Utc::now() + Duration::days(NOTE_RETENTION_DAYS)).timestamp()
    }

    pub fn note_id(&self) -> String {
        format!("{}#{}", self.user_id, self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub template_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example_output: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// Body of a template create or update request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example_output: String,
}

impl TemplateDraft {
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            example_output: self.example_output.trim().to_string(),
        }
    }
}

impl Template {
    pub fn custom(draft: &TemplateDraft, created_by: &str) -> Self {
        let timestamp = now_timestamp();
        Self {
            template_id: format!("custom_{}", short_hex(8)),
            name: draft.name.clone(),
            description: draft.description.clone(),
            example_output: draft.example_output.clone(),
            is_default: false,
            created_by: Some(created_by.to_string()),
            created_at: Some(timestamp.clone()),
            updated_at: Some(timestamp),
            updated_by: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Unknown roles fall back to `User`.
    pub fn parse_or_user(raw: &str) -> Self {
        match raw.trim() {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Pending,
}

/// A user as the identity directory reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub enabled: bool,
    pub created_at: String,
}

impl DirectoryUser {
    pub fn sort_key(&self) -> String {
        self.name.as_deref().unwrap_or(&self.email).to_lowercase()
    }
}

/// Row written to the users table when someone is invited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
    pub invited_by: String,
    pub invited_at: String,
    pub created_at: String,
}
