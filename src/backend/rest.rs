//! REST client for the hosted database (PostgREST dialect).
//!
//! Every request carries the project's anon key as `apikey` and the signed-in
//! user's access token as a Bearer token, so row-level security on the
//! backend decides what comes back.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{Backend, BackendError, Select, Table};

pub struct RestBackend {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl RestBackend {
    pub fn new(backend_url: &str, anon_key: &str) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(backend_url)
            .map_err(|e| BackendError::Config(format!("Invalid backend URL {}: {}", backend_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            anon_key: anon_key.to_string(),
            access_token: None,
        })
    }

    /// Use a signed-in user's session token instead of the anon key.
    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    fn table_url(&self, table: Table) -> Result<Url, BackendError> {
        self.base_url
            .join(&format!("rest/v1/{}", table.as_str()))
            .map_err(|e| BackendError::Config(e.to_string()))
    }

    /// Build the request URL for a select.
    pub(crate) fn select_url(&self, query: &Select) -> Result<Url, BackendError> {
        query.validate()?;
        let mut url = self.table_url(query.table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for (column, value) in &query.filters {
                pairs.append_pair(column, &format!("eq.{}", value));
            }
            if let Some(order) = &query.order {
                let dir = if order.ascending { "asc" } else { "desc" };
                pairs.append_pair("order", &format!("{}.{}.nullslast", order.column, dir));
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn rows(resp: reqwest::Response, table: Table) -> Result<Vec<Value>, BackendError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }
        resp.json::<Vec<Value>>()
            .await
            .map_err(|e| BackendError::Decode {
                table: table.as_str(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, BackendError> {
        let url = self.select_url(query)?;
        let resp = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        Self::rows(resp, query.table).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError> {
        let url = self.table_url(table)?;
        let resp = self
            .request(reqwest::Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        let mut rows = Self::rows(resp, table).await?;
        if rows.is_empty() {
            return Err(BackendError::Decode {
                table: table.as_str(),
                message: "insert returned no row".to_string(),
            });
        }
        Ok(rows.swap_remove(0))
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), BackendError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair(table.key_column(), &format!("eq.{}", id));
        let resp = self
            .request(reqwest::Method::DELETE, url)
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        // The endpoint answers 200 with an empty array when no row matched.
        let removed = Self::rows(resp, table).await?;
        if removed.is_empty() {
            return Err(BackendError::NotFound {
                table: table.as_str(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
