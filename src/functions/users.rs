//! `POST /manage-user`: delete a user or reset their password.

use serde::{Deserialize, Serialize};

use super::{required, required_user_id, FunctionsState};
use crate::error::FunctionError;

pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageUserRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ManageUserResponse {
    pub success: bool,
    pub message: String,
}

enum Action<'a> {
    Delete,
    ResetPassword(&'a str),
}

fn parse_action(req: &ManageUserRequest) -> Result<Action<'_>, FunctionError> {
    match required(&req.action, "action")? {
        "delete" => Ok(Action::Delete),
        "reset-password" => {
            // Taken verbatim; whitespace counts toward the length.
            let password = req
                .new_password
                .as_deref()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| FunctionError::missing_field("newPassword"))?;
            if password.chars().count() < MIN_PASSWORD_CHARS {
                return Err(FunctionError::Validation(format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_CHARS
                )));
            }
            Ok(Action::ResetPassword(password))
        }
        other => Err(FunctionError::Validation(format!(
            "Unknown action: {}. Expected delete or reset-password",
            other
        ))),
    }
}

#[tracing::instrument(skip_all, fields(function = "manage-user"))]
pub async fn manage_user(
    state: &FunctionsState,
    req: ManageUserRequest,
) -> Result<ManageUserResponse, FunctionError> {
    let user_id = required_user_id(&req.user_id)?;
    let user_id = user_id.as_str();
    let action = parse_action(&req)?;
    let admin = state.admin()?;

    let (result, message) = match action {
        Action::Delete => (admin.delete_user(user_id).await, "User deleted successfully"),
        Action::ResetPassword(password) => (
            admin.update_password(user_id, password).await,
            "Password updated successfully",
        ),
    };
    result.map_err(|e| {
        tracing::warn!(user_id, error = %e, "user management call failed");
        FunctionError::from(e)
    })?;

    tracing::info!(user_id, outcome = message, "user managed");
    Ok(ManageUserResponse {
        success: true,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::fakes::{state_with, FakeAdmin};
    use std::sync::Arc;

    const USER: &str = "3f2b1c9a-52d4-4e8b-9a61-0c7d5e2f8b14";

    fn req(action: &str, user_id: &str, password: Option<&str>) -> ManageUserRequest {
        ManageUserRequest {
            action: Some(action.to_string()),
            user_id: Some(user_id.to_string()),
            new_password: password.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_delete_user() {
        let admin = Arc::new(FakeAdmin::default());
        let state = state_with(Some(admin.clone()));
        let resp = manage_user(&state, req("delete", USER, None))
            .await
            .expect("delete");
        assert!(resp.success);
        assert_eq!(resp.message, "User deleted successfully");
        assert_eq!(*admin.calls.lock(), vec![format!("delete_user {}", USER)]);
    }

    #[tokio::test]
    async fn test_reset_password_length_checked_before_call() {
        let admin = Arc::new(FakeAdmin::default());
        let state = state_with(Some(admin.clone()));

        let err = manage_user(&state, req("reset-password", USER, Some("12345")))
            .await
            .expect_err("too short");
        assert_eq!(err.status_code(), 400);
        let err = manage_user(&state, req("reset-password", USER, None))
            .await
            .expect_err("missing");
        assert_eq!(err.to_string(), "Missing required field: newPassword");
        assert!(admin.calls.lock().is_empty());

        let resp = manage_user(&state, req("reset-password", USER, Some("123456")))
            .await
            .expect("reset");
        assert_eq!(resp.message, "Password updated successfully");
        assert_eq!(*admin.calls.lock(), vec![format!("update_password {} 123456", USER)]);
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let state = state_with(Some(Arc::new(FakeAdmin::default())));
        let err = manage_user(&state, req("suspend", USER, None))
            .await
            .expect_err("unknown");
        assert!(err.to_string().starts_with("Unknown action: suspend"));
    }

    #[tokio::test]
    async fn test_path_like_user_id_is_400_without_admin_call() {
        let admin = Arc::new(FakeAdmin::default());
        let state = state_with(Some(admin.clone()));
        for action in ["delete", "reset-password"] {
            let err = manage_user(&state, req(action, "../x", Some("123456")))
                .await
                .expect_err("not a uuid");
            assert_eq!(err.status_code(), 400);
            assert_eq!(err.to_string(), "Invalid userId: ../x");
        }
        assert!(admin.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_is_404() {
        let admin = Arc::new(FakeAdmin::default());
        *admin.fail_with.lock() = Some(404);
        let state = state_with(Some(admin));
        let err = manage_user(&state, req("delete", USER, None))
            .await
            .expect_err("not found");
        assert_eq!(err.status_code(), 404);
    }
}
