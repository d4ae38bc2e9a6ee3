//! Service-role client for the hosted backend's admin and auth endpoints.
//!
//! Only the functions server holds this key. It bypasses row-level security,
//! so every call here is one a handler has already validated.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{check_status, decode_error, http_error, AdminApi, AuthUser, IntegrationError};
use crate::types::Role;

const SERVICE: &str = "Supabase";

pub struct SupabaseAdmin {
    client: reqwest::Client,
    base_url: Url,
    service_key: String,
}

impl SupabaseAdmin {
    pub fn new(project_url: &str, service_key: &str) -> Result<Self, String> {
        let mut base_url =
            Url::parse(project_url).map_err(|e| format!("Invalid SUPABASE_URL {}: {}", project_url, e))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            service_key: service_key.to_string(),
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, IntegrationError> {
        self.base_url.join(path).map_err(|e| decode_error(SERVICE, e))
    }

    /// `auth/v1/admin/users/<id>`, with the id pushed as one encoded segment
    /// so it can never step out of the users collection.
    pub(crate) fn admin_user_endpoint(&self, user_id: &str) -> Result<Url, IntegrationError> {
        let mut url = self.endpoint("auth/v1/admin/users")?;
        url.path_segments_mut()
            .map_err(|_| decode_error(SERVICE, "project URL cannot be a base"))?
            .push(user_id);
        Ok(url)
    }

    fn admin_request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, IntegrationError> {
        let resp = req.send().await.map_err(|e| http_error(SERVICE, e))?;
        check_status(SERVICE, resp).await
    }
}

#[derive(Deserialize)]
struct NotionKeyRow {
    #[serde(default)]
    notion_api_key: Option<String>,
}

#[async_trait]
impl AdminApi for SupabaseAdmin {
    async fn upsert_role(&self, user_id: &str, role: Role) -> Result<(), IntegrationError> {
        let mut url = self.endpoint("rest/v1/user_roles")?;
        url.query_pairs_mut().append_pair("on_conflict", "user_id");
        let body = serde_json::json!({ "user_id": user_id, "role": role });
        self.send(
            self.admin_request(reqwest::Method::POST, url)
                .header("Prefer", "resolution=merge-duplicates")
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), IntegrationError> {
        let url = self.admin_user_endpoint(user_id)?;
        self.send(self.admin_request(reqwest::Method::DELETE, url))
            .await?;
        Ok(())
    }

    async fn update_password(&self, user_id: &str, password: &str) -> Result<(), IntegrationError> {
        let url = self.admin_user_endpoint(user_id)?;
        let body = serde_json::json!({ "password": password });
        self.send(self.admin_request(reqwest::Method::PUT, url).json(&body))
            .await?;
        Ok(())
    }

    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser, IntegrationError> {
        let url = self.endpoint("auth/v1/user")?;
        let resp = self
            .send(
                self.client
                    .get(url)
                    .header("apikey", &self.service_key)
                    .bearer_auth(access_token),
            )
            .await?;
        resp.json::<AuthUser>()
            .await
            .map_err(|e| decode_error(SERVICE, e))
    }

    async fn notion_key_for(&self, user_id: &str) -> Result<Option<String>, IntegrationError> {
        let mut url = self.endpoint("rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("select", "notion_api_key")
            .append_pair("id", &format!("eq.{}", user_id))
            .append_pair("limit", "1");
        let resp = self
            .send(self.admin_request(reqwest::Method::GET, url))
            .await?;
        let rows: Vec<NotionKeyRow> = resp.json().await.map_err(|e| decode_error(SERVICE, e))?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|r| r.notion_api_key)
            .filter(|k| !k.trim().is_empty()))
    }
}
