//! Record store interface and an in-memory implementation.
//!
//! Handlers only see `dyn RecordStore`, so a hosted key-value store can be
//! dropped in without touching them. Scans are paginated; a page carries an
//! opaque cursor for the next one.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ScribeError, ScribeResult};
use crate::records::{Note, Patient, Template, TemplateDraft, UserRecord, now_timestamp};

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_patient(&self, patient: Patient) -> ScribeResult<()>;
    async fn get_patient(&self, patient_id: &str) -> ScribeResult<Option<Patient>>;
    async fn scan_patients(&self, cursor: Option<String>) -> ScribeResult<Page<Patient>>;

    async fn put_note(&self, note: Note) -> ScribeResult<()>;
    /// Newest first.
    async fn notes_by_user(&self, user_id: &str, limit: usize) -> ScribeResult<Vec<Note>>;
    /// Secondary index lookup, newest first.
    async fn notes_by_patient(&self, patient_id: &str, limit: usize) -> ScribeResult<Vec<Note>>;
    /// Up to `limit` notes in storage order.
    async fn scan_notes(&self, limit: usize) -> ScribeResult<Vec<Note>>;

    async fn put_template(&self, template: Template) -> ScribeResult<()>;
    async fn get_template(&self, template_id: &str) -> ScribeResult<Option<Template>>;
    async fn scan_templates(&self) -> ScribeResult<Vec<Template>>;
    async fn update_template(
        &self,
        template_id: &str,
        draft: &TemplateDraft,
        updated_by: &str,
    ) -> ScribeResult<Template>;
    async fn delete_template(&self, template_id: &str) -> ScribeResult<()>;

    async fn put_user(&self, user: UserRecord) -> ScribeResult<()>;
}

/// Follows scan cursors until the patient table is exhausted.
pub async fn scan_all_patients(store: &dyn RecordStore) -> ScribeResult<Vec<Patient>> {
    let mut patients = Vec::new();
    let mut cursor = None;
    loop {
        let page = store.scan_patients(cursor).await?;
        patients.extend(page.items);
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    debug!(total = patients.len(), "scanned patient table");
    Ok(patients)
}

fn newest_first(mut notes: Vec<Note>, limit: usize) -> Vec<Note> {
    notes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    notes.truncate(limit);
    notes
}

/// Keeps everything in memory, in insertion order.
pub struct MemoryStore {
    patients: RwLock<Vec<Patient>>,
    notes: RwLock<Vec<Note>>,
    templates: RwLock<Vec<Template>>,
    users: RwLock<Vec<UserRecord>>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl MemoryStore {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            patients: RwLock::new(Vec::new()),
            notes: RwLock::new(Vec::new()),
            templates: RwLock::new(Vec::new()),
            users: RwLock::new(Vec::new()),
            page_size: page_size.max(1),
        }
    }

    pub async fn users(&self) -> Vec<UserRecord> {
        self.users.read().await.clone()
    }
}

fn parse_cursor(cursor: Option<String>) -> ScribeResult<usize> {
    match cursor {
        None => Ok(0),
        Some(raw) => raw
            .parse()
            .map_err(|_| ScribeError::Retrieval(format!("invalid scan cursor: {raw}"))),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put_patient(&self, patient: Patient) -> ScribeResult<()> {
        let mut patients = self.patients.write().await;
        match patients.iter_mut().find(|p| p.patient_id == patient.patient_id) {
            Some(existing) => *existing = patient,
            None => patients.push(patient),
        }
        Ok(())
    }

    async fn get_patient(&self, patient_id: &str) -> ScribeResult<Option<Patient>> {
        let patients = self.patients.read().await;
        Ok(patients.iter().find(|p| p.patient_id == patient_id).cloned())
    }

    async fn scan_patients(&self, cursor: Option<String>) -> ScribeResult<Page<Patient>> {
        let start = parse_cursor(cursor)?;
        let patients = self.patients.read().await;
        let end = (start + self.page_size).min(patients.len());
        let items = patients.get(start..end).map(<[Patient]>::to_vec).unwrap_or_default();
        let next = (end < patients.len()).then(|| end.to_string());
        Ok(Page { items, next })
    }

    async fn put_note(&self, note: Note) -> ScribeResult<()> {
        self.notes.write().await.push(note);
        Ok(())
    }

    async fn notes_by_user(&self, user_id: &str, limit: usize) -> ScribeResult<Vec<Note>> {
        let notes = self.notes.read().await;
        let matching = notes.iter().filter(|n| n.user_id == user_id).cloned().collect();
        Ok(newest_first(matching, limit))
    }

    async fn notes_by_patient(&self, patient_id: &str, limit: usize) -> ScribeResult<Vec<Note>> {
        let notes = self.notes.read().await;
        let matching = notes
            .iter()
            .filter(|n| n.patient_id.as_deref() == Some(patient_id))
            .cloned()
            .collect();
        Ok(newest_first(matching, limit))
    }

    async fn scan_notes(&self, limit: usize) -> ScribeResult<Vec<Note>> {
        let notes = self.notes.read().await;
        Ok(notes.iter().take(limit).cloned().collect())
    }

    async fn put_template(&self, template: Template) -> ScribeResult<()> {
        let mut templates = self.templates.write().await;
        match templates.iter_mut().find(|t| t.template_id == template.template_id) {
            Some(existing) => *existing = template,
            None => templates.push(template),
        }
        Ok(())
    }

    async fn get_template(&self, template_id: &str) -> ScribeResult<Option<Template>> {
        let templates = self.templates.read().await;
        Ok(templates.iter().find(|t| t.template_id == template_id).cloned())
    }

    async fn scan_templates(&self) -> ScribeResult<Vec<Template>> {
        Ok(self.templates.read().await.clone())
    }

    async fn update_template(
        &self,
        template_id: &str,
        draft: &TemplateDraft,
        updated_by: &str,
    ) -> ScribeResult<Template> {
        let mut templates = self.templates.write().await;
        let template = templates
            .iter_mut()
            .find(|t| t.template_id == template_id)
            .ok_or_else(|| ScribeError::not_found("Template not found"))?;
        template.name = draft.name.clone();
        template.description = draft.description.clone();
        template.example_output = draft.example_output.clone();
        template.updated_at = Some(now_timestamp());
        template.updated_by = Some(updated_by.to_string());
        Ok(template.clone())
    }

    async fn delete_template(&self, template_id: &str) -> ScribeResult<()> {
        self.templates.write().await.retain(|t| t.template_id != template_id);
        Ok(())
    }

    async fn put_user(&self, user: UserRecord) -> ScribeResult<()> {
        let mut users = self.users.write().await;
        users.retain(|u| u.user_id != user.user_id);
        users.push(user);
        Ok(())
    }
}
