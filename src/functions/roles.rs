//! `POST /assign-role`: grant a workspace role to a user.

use serde::{Deserialize, Serialize};

use super::{required, required_user_id, FunctionsState};
use crate::error::FunctionError;
use crate::types::Role;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AssignRoleResponse {
    pub success: bool,
}

/// Parse a role name from a request, rejecting anything outside the fixed set.
pub(crate) fn parse_role(value: &Option<String>) -> Result<Role, FunctionError> {
    let raw = required(value, "role")?;
    Role::parse(raw).ok_or_else(|| {
        FunctionError::Validation(format!(
            "Invalid role: {}. Expected one of admin, member, viewer",
            raw
        ))
    })
}

#[tracing::instrument(skip_all, fields(function = "assign-role"))]
pub async fn assign_role(
    state: &FunctionsState,
    req: AssignRoleRequest,
) -> Result<AssignRoleResponse, FunctionError> {
    let user_id = required_user_id(&req.user_id)?;
    let user_id = user_id.as_str();
    let role = parse_role(&req.role)?;
    let admin = state.admin()?;

    admin.upsert_role(user_id, role).await.map_err(|e| {
        tracing::warn!(user_id, %role, error = %e, "role upsert failed");
        FunctionError::from(e)
    })?;

    tracing::info!(user_id, %role, "role assigned");
    Ok(AssignRoleResponse { success: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::fakes::{state_with, FakeAdmin};
    use std::sync::Arc;

    const USER: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    fn req(user_id: Option<&str>, role: Option<&str>) -> AssignRoleRequest {
        AssignRoleRequest {
            user_id: user_id.map(String::from),
            role: role.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_assign_role_upserts() {
        let admin = Arc::new(FakeAdmin::default());
        let state = state_with(Some(admin.clone()));
        let resp = assign_role(&state, req(Some(USER), Some("member")))
            .await
            .expect("assign");
        assert!(resp.success);
        assert_eq!(*admin.calls.lock(), vec![format!("upsert_role {} member", USER)]);
    }

    #[tokio::test]
    async fn test_invalid_role_makes_no_call() {
        let admin = Arc::new(FakeAdmin::default());
        let state = state_with(Some(admin.clone()));
        let err = assign_role(&state, req(Some(USER), Some("owner")))
            .await
            .expect_err("invalid role");
        assert_eq!(err.status_code(), 400);
        assert!(admin.calls.lock().is_empty());

        let err = assign_role(&state, req(None, Some("admin")))
            .await
            .expect_err("missing user");
        assert_eq!(err.to_string(), "Missing required field: userId");
    }

    #[tokio::test]
    async fn test_non_uuid_user_id_is_rejected_before_any_call() {
        let admin = Arc::new(FakeAdmin::default());
        let state = state_with(Some(admin.clone()));
        for bad in ["u1", "../x", "../../rest/v1/deals?id=not.is.null"] {
            let err = assign_role(&state, req(Some(bad), Some("admin")))
                .await
                .expect_err("not a uuid");
            assert_eq!(err.status_code(), 400);
            assert!(err.to_string().starts_with("Invalid userId"));
        }
        assert!(admin.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_uppercase_uuid_is_normalized() {
        let admin = Arc::new(FakeAdmin::default());
        let state = state_with(Some(admin.clone()));
        assign_role(&state, req(Some(&USER.to_uppercase()), Some("viewer")))
            .await
            .expect("assign");
        assert_eq!(*admin.calls.lock(), vec![format!("upsert_role {} viewer", USER)]);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_502() {
        let admin = Arc::new(FakeAdmin::default());
        *admin.fail_with.lock() = Some(500);
        let state = state_with(Some(admin));
        let err = assign_role(&state, req(Some(USER), Some("viewer")))
            .await
            .expect_err("upstream");
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_without_service_key_is_configuration_error() {
        let state = state_with(None);
        let err = assign_role(&state, req(Some(USER), Some("viewer")))
            .await
            .expect_err("unconfigured");
        assert_eq!(err.status_code(), 500);
    }
}
