//! Transactional email through Resend.

use async_trait::async_trait;
use serde::Deserialize;

use super::{check_status, decode_error, http_error, EmailApi, IntegrationError, OutgoingEmail};

const SERVICE: &str = "Resend";
const RESEND_API_URL: &str = "https://api.resend.com/emails";

pub struct ResendClient {
    client: reqwest::Client,
    api_key: String,
}

impl ResendClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[async_trait]
impl EmailApi for ResendClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, IntegrationError> {
        let resp = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| http_error(SERVICE, e))?;
        let resp = check_status(SERVICE, resp).await?;
        let body: SendResponse = resp.json().await.map_err(|e| decode_error(SERVICE, e))?;
        Ok(body.id)
    }
}
