//! `POST /chat-status`: which research sources the chat panel can offer.
//!
//! Never fails. Anything that goes wrong resolving the caller just means
//! Notion is reported unavailable.

use axum::http::HeaderMap;
use serde::Serialize;

use super::{bearer_token, FunctionsState};
use crate::error::FunctionError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatStatus {
    pub has_notion: bool,
    pub has_web: bool,
}

async fn caller_has_notion(state: &FunctionsState, headers: &HeaderMap) -> Result<bool, FunctionError> {
    let token = bearer_token(headers)?;
    let admin = state.admin()?;
    let user = admin.user_for_token(token).await?;
    Ok(admin.notion_key_for(&user.id).await?.is_some())
}

#[tracing::instrument(skip_all, fields(function = "chat-status"))]
pub async fn chat_status(state: &FunctionsState, headers: &HeaderMap) -> ChatStatus {
    let has_notion = match caller_has_notion(state, headers).await {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!(error = %e, "notion status unavailable");
            false
        }
    };
    ChatStatus {
        has_notion,
        has_web: state.llm.is_some(),
    }
}
