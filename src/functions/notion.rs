//! `POST /test-notion`: check a user-supplied Notion key before saving it.
//!
//! A key Notion refuses is a normal outcome here, not a failure of the
//! function, so it answers 200 with `success: false`.

use serde::{Deserialize, Serialize};

use super::{required, FunctionsState};
use crate::error::FunctionError;
use crate::integrations::{notion::error_message, IntegrationError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestNotionRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NotionIdentity {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TestNotionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<NotionIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn describe(err: &IntegrationError) -> String {
    match err {
        IntegrationError::Status { body, .. } => error_message(body),
        other => other.to_string(),
    }
}

#[tracing::instrument(skip_all, fields(function = "test-notion"))]
pub async fn test_notion(
    state: &FunctionsState,
    req: TestNotionRequest,
) -> Result<TestNotionResponse, FunctionError> {
    let api_key = required(&req.api_key, "apiKey")?;

    match state.notion.me(api_key).await {
        Ok(user) => {
            tracing::info!(kind = ?user.kind, "notion key verified");
            Ok(TestNotionResponse {
                success: true,
                user: Some(NotionIdentity {
                    name: user.name,
                    kind: user.kind,
                }),
                error: None,
            })
        }
        Err(e) => {
            if e.is_auth_rejection() {
                tracing::info!(status = ?e.status(), "notion key rejected");
            } else {
                tracing::warn!(error = %e, "notion check failed");
            }
            Ok(TestNotionResponse {
                success: false,
                user: None,
                error: Some(describe(&e)),
            })
        }
    }
}
