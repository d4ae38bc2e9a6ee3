//! Clients for the services the HTTP functions proxy to.
//!
//! Each handler talks to its upstream through one of the traits below so it
//! can be exercised against an in-process fake. The reqwest-backed
//! implementations live in the submodules.

pub mod notion;
pub mod perplexity;
pub mod resend;
pub mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Role;

pub use notion::NotionClient;
pub use perplexity::PerplexityClient;
pub use resend::ResendClient;
pub use supabase::SupabaseAdmin;

/// Errors from upstream calls.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("{service} request failed: {message}")]
    Http {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl IntegrationError {
    /// Upstream refused the credentials we sent.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, IntegrationError::Status { status: 401 | 403, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            IntegrationError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Turn a non-2xx response into `IntegrationError::Status`.
pub(crate) async fn check_status(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, IntegrationError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(IntegrationError::Status {
        service,
        status,
        body,
    })
}

pub(crate) fn http_error(service: &'static str, e: reqwest::Error) -> IntegrationError {
    IntegrationError::Http {
        service,
        message: e.to_string(),
    }
}

pub(crate) fn decode_error(service: &'static str, e: impl std::fmt::Display) -> IntegrationError {
    IntegrationError::Decode {
        service,
        message: e.to_string(),
    }
}

// =============================================================================
// Upstream traits
// =============================================================================

/// User resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Privileged operations on the hosted backend (service-role key).
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn upsert_role(&self, user_id: &str, role: Role) -> Result<(), IntegrationError>;
    async fn delete_user(&self, user_id: &str) -> Result<(), IntegrationError>;
    async fn update_password(&self, user_id: &str, password: &str)
        -> Result<(), IntegrationError>;
    /// Resolve the user owning a session access token.
    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser, IntegrationError>;
    /// The Notion key saved on a user's profile, if any.
    async fn notion_key_for(&self, user_id: &str) -> Result<Option<String>, IntegrationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailApi: Send + Sync {
    /// Send one message; returns the provider's message id.
    async fn send(&self, email: &OutgoingEmail) -> Result<String, IntegrationError>;
}

/// The bot/user a Notion integration token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[async_trait]
pub trait NotionApi: Send + Sync {
    async fn me(&self, api_key: &str) -> Result<NotionUser, IntegrationError>;
}

#[async_trait]
pub trait LlmApi: Send + Sync {
    /// One system + user turn; returns the assistant's text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, IntegrationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_rejection_statuses() {
        let err = |status| IntegrationError::Status {
            service: "Notion",
            status,
            body: String::new(),
        };
        assert!(err(401).is_auth_rejection());
        assert!(err(403).is_auth_rejection());
        assert!(!err(500).is_auth_rejection());
        assert_eq!(err(429).status(), Some(429));
    }

    #[test]
    fn test_error_messages_name_the_service() {
        let err = IntegrationError::Decode {
            service: "Perplexity",
            message: "missing choices".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse Perplexity response: missing choices");
    }
}
