// src/bin/app/auth.rs

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::HeaderMap, http::request::Parts};
use scribe::identity::Claims;

pub const SUB_HEADER: &str = "x-auth-sub";
pub const EMAIL_HEADER: &str = "x-auth-email";
pub const GROUPS_HEADER: &str = "x-auth-groups";
pub const ROLE_HEADER: &str = "x-auth-role";

/// Claims of the caller, as set by the gateway authorizer. Missing headers
/// give empty claims; handlers decide what they require.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Claims);

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn claims_from_headers(headers: &HeaderMap) -> Claims {
    Claims {
        sub: header(headers, SUB_HEADER),
        email: header(headers, EMAIL_HEADER),
        groups: header(headers, GROUPS_HEADER)
            .map(|raw| Claims::parse_groups(&raw))
            .unwrap_or_default(),
        role: header(headers, ROLE_HEADER),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(claims_from_headers(&parts.headers)))
    }
}
