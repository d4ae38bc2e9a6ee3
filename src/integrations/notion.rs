//! Notion connectivity check.
//!
//! `GET /v1/users/me` returns the bot user an integration token belongs to,
//! which is enough to tell a working key from a bad one.

use async_trait::async_trait;
use serde::Deserialize;

use super::{check_status, decode_error, http_error, IntegrationError, NotionApi, NotionUser};

const SERVICE: &str = "Notion";
const NOTION_ME_URL: &str = "https://api.notion.com/v1/users/me";
pub const NOTION_VERSION: &str = "2022-06-28";

#[derive(Default)]
pub struct NotionClient {
    client: reqwest::Client,
}

impl NotionClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Deserialize)]
struct NotionErrorBody {
    message: String,
}

/// Human-readable message from a Notion error body. Falls back to the raw
/// body when it is not Notion's `{object:"error", message}` shape.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<NotionErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn me(&self, api_key: &str) -> Result<NotionUser, IntegrationError> {
        let resp = self
            .client
            .get(NOTION_ME_URL)
            .bearer_auth(api_key)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| http_error(SERVICE, e))?;
        let resp = check_status(SERVICE, resp).await?;
        resp.json::<NotionUser>()
            .await
            .map_err(|e| decode_error(SERVICE, e))
    }
}
