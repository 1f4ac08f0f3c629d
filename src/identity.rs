//! Caller identity and the user directory.
//!
//! Tokens are verified upstream; the service only receives the resulting
//! claims. The directory is where users are created and listed.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{ScribeError, ScribeResult};
use crate::records::{DirectoryUser, Role, UserStatus, now_timestamp};
use crate::store::Page;

/// Claims forwarded by the authorizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub groups: Vec<String>,
    pub role: Option<String>,
}

impl Claims {
    /// Accepts a JSON array (`["Admin","Staff"]`) or a comma separated list.
    pub fn parse_groups(raw: &str) -> Vec<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return vec![];
        }
        if let Ok(groups) = serde_json::from_str::<Vec<String>>(raw) {
            return groups;
        }
        raw.split(',')
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect()
    }

    pub fn is_admin(&self) -> bool {
        self.groups.iter().any(|g| g.trim().eq_ignore_ascii_case("admin"))
            || self.role.as_deref() == Some("admin")
    }

    pub fn subject(&self) -> ScribeResult<&str> {
        self.sub
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ScribeError::Unauthorized)
    }

    pub fn require_admin(&self, message: &str) -> ScribeResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ScribeError::forbidden(message))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn find_user(&self, username: &str) -> ScribeResult<Option<DirectoryUser>>;
    /// Fails with `Conflict` if the username is taken.
    async fn create_user(&self, user: NewUser) -> ScribeResult<DirectoryUser>;
    async fn resend_invite(&self, username: &str) -> ScribeResult<()>;
    async fn list_users_page(&self, token: Option<String>) -> ScribeResult<Page<DirectoryUser>>;
}

/// Every directory user, ordered by name (or email when unnamed).
pub async fn list_all_users(directory: &dyn IdentityDirectory) -> ScribeResult<Vec<DirectoryUser>> {
    let mut users = Vec::new();
    let mut token = None;
    loop {
        let page = directory.list_users_page(token).await?;
        users.extend(page.items);
        match page.next {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    users.sort_by_key(DirectoryUser::sort_key);
    Ok(users)
}

pub struct MemoryDirectory {
    users: RwLock<Vec<DirectoryUser>>,
    page_size: usize,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::with_page_size(60)
    }
}

impl MemoryDirectory {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl IdentityDirectory for MemoryDirectory {
    async fn find_user(&self, username: &str) -> ScribeResult<Option<DirectoryUser>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> ScribeResult<DirectoryUser> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.email) {
            return Err(ScribeError::Conflict(
                "User with this email already exists".into(),
            ));
        }
        let created = DirectoryUser {
            user_id: Uuid::new_v4().to_string(),
            username: user.email.clone(),
            email: user.email,
            name: Some(user.name),
            role: user.role,
            status: UserStatus::Pending,
            enabled: true,
            created_at: now_timestamp(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn resend_invite(&self, username: &str) -> ScribeResult<()> {
        match self.find_user(username).await? {
            Some(_) => {
                info!(username, "invitation queued");
                Ok(())
            }
            None => Err(ScribeError::not_found("User not found")),
        }
    }

    async fn list_users_page(&self, token: Option<String>) -> ScribeResult<Page<DirectoryUser>> {
        let start: usize = match token {
            None => 0,
            Some(raw) => raw
                .parse()
                .map_err(|_| ScribeError::Retrieval(format!("invalid pagination token: {raw}")))?,
        };
        let users = self.users.read().await;
        let end = (start + self.page_size).min(users.len());
        let items = users.get(start..end).map(<[DirectoryUser]>::to_vec).unwrap_or_default();
        let next = (end < users.len()).then(|| end.to_string());
        Ok(Page { items, next })
    }
}
