//! HTTP functions: small stateless handlers proxying privileged or
//! third-party calls the browser cannot make itself.
//!
//! Every handler validates its JSON body, calls at most one upstream, and
//! answers with either its success shape or `{ "error": "..." }`. All
//! responses, errors and preflights included, carry permissive CORS headers.

pub mod chat_status;
pub mod invite;
pub mod notion;
pub mod roles;
pub mod stock;
pub mod users;

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ErrorEnvelope, FunctionError};
use crate::integrations::{
    AdminApi, EmailApi, LlmApi, NotionApi, NotionClient, PerplexityClient, ResendClient,
    SupabaseAdmin,
};

// =============================================================================
// Configuration
// =============================================================================

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";
const DEFAULT_INVITE_FROM: &str = "AI/Tech Daily <onboarding@resend.dev>";
const DEFAULT_APP_URL: &str = "http://localhost:5173";

/// Server configuration read from the environment. Missing keys disable the
/// functions that need them instead of failing startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionsConfig {
    pub supabase_url: Option<String>,
    pub service_role_key: Option<String>,
    pub resend_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub invite_from: String,
    pub app_url: String,
    pub bind_addr: String,
}

impl FunctionsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            supabase_url: get("SUPABASE_URL"),
            service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            resend_api_key: get("RESEND_API_KEY"),
            perplexity_api_key: get("PERPLEXITY_API_KEY"),
            invite_from: get("INVITE_FROM_EMAIL").unwrap_or_else(|| DEFAULT_INVITE_FROM.to_string()),
            app_url: get("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}

// =============================================================================
// Shared state
// =============================================================================

/// Upstream clients shared by every handler. `None` means the server has no
/// key for that service.
pub struct FunctionsState {
    pub config: FunctionsConfig,
    pub admin: Option<Arc<dyn AdminApi>>,
    pub email: Option<Arc<dyn EmailApi>>,
    pub notion: Arc<dyn NotionApi>,
    pub llm: Option<Arc<dyn LlmApi>>,
}

impl FunctionsState {
    pub fn from_config(config: FunctionsConfig) -> Result<Self, String> {
        let admin: Option<Arc<dyn AdminApi>> =
            match (&config.supabase_url, &config.service_role_key) {
                (Some(url), Some(key)) => Some(Arc::new(SupabaseAdmin::new(url, key)?)),
                _ => {
                    tracing::warn!("SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY not set; admin functions disabled");
                    None
                }
            };
        let email: Option<Arc<dyn EmailApi>> = config
            .resend_api_key
            .as_deref()
            .map(|key| Arc::new(ResendClient::new(key)) as Arc<dyn EmailApi>);
        let llm: Option<Arc<dyn LlmApi>> = config
            .perplexity_api_key
            .as_deref()
            .map(|key| Arc::new(PerplexityClient::new(key)) as Arc<dyn LlmApi>);

        Ok(Self {
            config,
            admin,
            email,
            notion: Arc::new(NotionClient::new()),
            llm,
        })
    }

    pub(crate) fn admin(&self) -> Result<&dyn AdminApi, FunctionError> {
        self.admin
            .as_deref()
            .ok_or_else(|| FunctionError::not_configured("SUPABASE_SERVICE_ROLE_KEY"))
    }
}

// =============================================================================
// Request / response plumbing
// =============================================================================

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorEnvelope::from(&self))).into_response()
    }
}

/// Decode a JSON body. An empty body reads as `{}` so missing-field checks
/// produce the error, not the parser.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, FunctionError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body)
        .map_err(|e| FunctionError::Validation(format!("Invalid JSON body: {}", e)))
}

/// Trimmed, non-empty string field or a missing-field error.
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, FunctionError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FunctionError::missing_field(field))
}

/// A `userId` field. Must be a UUID since it ends up in upstream URL paths;
/// returned in canonical hyphenated form.
pub(crate) fn required_user_id(value: &Option<String>) -> Result<String, FunctionError> {
    let raw = required(value, "userId")?;
    Uuid::parse_str(raw)
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| FunctionError::Validation(format!("Invalid userId: {}", raw)))
}

/// The caller's session token from `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, FunctionError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FunctionError::Unauthorized("Missing bearer token".to_string()))
}

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";

pub(crate) async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(CORS_ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    response
}

async fn preflight() -> &'static str {
    "ok"
}

async fn not_found() -> FunctionError {
    FunctionError::NotFound("No such function".to_string())
}

// =============================================================================
// Router
// =============================================================================

type Shared = axum::extract::State<Arc<FunctionsState>>;

async fn assign_role_route(state: Shared, body: Bytes) -> Result<Json<roles::AssignRoleResponse>, FunctionError> {
    let req = parse_body(&body)?;
    roles::assign_role(&state, req).await.map(Json)
}

async fn manage_user_route(state: Shared, body: Bytes) -> Result<Json<users::ManageUserResponse>, FunctionError> {
    let req = parse_body(&body)?;
    users::manage_user(&state, req).await.map(Json)
}

async fn send_invite_route(state: Shared, body: Bytes) -> Result<Json<invite::SendInviteResponse>, FunctionError> {
    let req = parse_body(&body)?;
    invite::send_invite(&state, req).await.map(Json)
}

async fn test_notion_route(state: Shared, body: Bytes) -> Result<Json<notion::TestNotionResponse>, FunctionError> {
    let req = parse_body(&body)?;
    notion::test_notion(&state, req).await.map(Json)
}

async fn explain_stock_route(state: Shared, body: Bytes) -> Result<Json<stock::ExplainStockResponse>, FunctionError> {
    let req = parse_body(&body)?;
    stock::explain_stock(&state, req).await.map(Json)
}

async fn chat_status_route(state: Shared, headers: HeaderMap) -> Json<chat_status::ChatStatus> {
    Json(chat_status::chat_status(&state, &headers).await)
}

/// All functions, each at `/<name>` accepting POST and OPTIONS.
pub fn router(state: Arc<FunctionsState>) -> Router {
    Router::new()
        .route("/assign-role", post(assign_role_route).options(preflight))
        .route("/manage-user", post(manage_user_route).options(preflight))
        .route("/send-invite", post(send_invite_route).options(preflight))
        .route("/test-notion", post(test_notion_route).options(preflight))
        .route("/explain-stock", post(explain_stock_route).options(preflight))
        .route("/chat-status", post(chat_status_route).options(preflight))
        .fallback(not_found)
        .layer(axum::middleware::map_response(add_cors_headers))
        .with_state(state)
}

// =============================================================================
// Test fakes
// =============================================================================

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::{FunctionsConfig, FunctionsState};
    use crate::integrations::{
        AdminApi, AuthUser, EmailApi, IntegrationError, LlmApi, NotionApi, NotionUser,
        OutgoingEmail,
    };
    use crate::types::Role;

    pub fn rejected(service: &'static str, status: u16, body: &str) -> IntegrationError {
        IntegrationError::Status {
            service,
            status,
            body: body.to_string(),
        }
    }

    #[derive(Default)]
    pub struct FakeAdmin {
        pub calls: Mutex<Vec<String>>,
        pub fail_with: Mutex<Option<u16>>,
        pub token_user: Option<String>,
        pub notion_key: Option<String>,
    }

    impl FakeAdmin {
        fn record(&self, call: String) -> Result<(), IntegrationError> {
            self.calls.lock().push(call);
            match *self.fail_with.lock() {
                Some(status) => Err(rejected("Supabase", status, "admin call failed")),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl AdminApi for FakeAdmin {
        async fn upsert_role(&self, user_id: &str, role: Role) -> Result<(), IntegrationError> {
            self.record(format!("upsert_role {} {}", user_id, role))
        }
        async fn delete_user(&self, user_id: &str) -> Result<(), IntegrationError> {
            self.record(format!("delete_user {}", user_id))
        }
        async fn update_password(&self, user_id: &str, password: &str) -> Result<(), IntegrationError> {
            self.record(format!("update_password {} {}", user_id, password))
        }
        async fn user_for_token(&self, access_token: &str) -> Result<AuthUser, IntegrationError> {
            self.record(format!("user_for_token {}", access_token))?;
            self.token_user
                .clone()
                .map(|id| AuthUser { id, email: None })
                .ok_or_else(|| rejected("Supabase", 401, "invalid JWT"))
        }
        async fn notion_key_for(&self, user_id: &str) -> Result<Option<String>, IntegrationError> {
            self.record(format!("notion_key_for {}", user_id))?;
            Ok(self.notion_key.clone())
        }
    }

    #[derive(Default)]
    pub struct FakeEmail {
        pub sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl EmailApi for FakeEmail {
        async fn send(&self, email: &OutgoingEmail) -> Result<String, IntegrationError> {
            self.sent.lock().push(email.clone());
            Ok("email-1".to_string())
        }
    }

    pub struct FakeNotion {
        pub result: Result<NotionUser, u16>,
    }

    #[async_trait]
    impl NotionApi for FakeNotion {
        async fn me(&self, _api_key: &str) -> Result<NotionUser, IntegrationError> {
            self.result.clone().map_err(|status| {
                rejected(
                    "Notion",
                    status,
                    r#"{"object":"error","status":401,"code":"unauthorized","message":"API token is invalid."}"#,
                )
            })
        }
    }

    #[derive(Default)]
    pub struct FakeLlm {
        pub prompts: Mutex<Vec<(String, String)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl LlmApi for FakeLlm {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, IntegrationError> {
            self.prompts.lock().push((system.to_string(), prompt.to_string()));
            if self.fail {
                return Err(rejected("Perplexity", 500, "overloaded"));
            }
            Ok("Shares rose after earnings beat estimates.".to_string())
        }
    }

    /// State with every upstream faked and the given admin.
    pub fn state_with(admin: Option<Arc<FakeAdmin>>) -> FunctionsState {
        FunctionsState {
            config: FunctionsConfig::from_lookup(|_| None),
            admin: admin.map(|a| a as Arc<dyn AdminApi>),
            email: Some(Arc::new(FakeEmail::default())),
            notion: Arc::new(FakeNotion {
                result: Ok(NotionUser {
                    name: Some("Deal Bot".to_string()),
                    kind: Some("bot".to_string()),
                }),
            }),
            llm: Some(Arc::new(FakeLlm::default())),
        }
    }
}
