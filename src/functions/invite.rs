//! `POST /send-invite`: email an invitation to join the workspace.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::roles::parse_role;
use super::{required, FunctionsState};
use crate::error::FunctionError;
use crate::integrations::OutgoingEmail;
use crate::types::Role;

pub const INVITE_SUBJECT: &str = "You're invited to AI/Tech Daily";

#[derive(Debug, Default, Deserialize)]
pub struct SendInviteRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SendInviteResponse {
    pub success: bool,
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
    });
    re.is_match(email)
}

/// Invitation body. The role is a closed enum and the URL comes from server
/// config, so nothing user-supplied is interpolated into the markup.
pub fn invite_html(app_url: &str, role: Role) -> String {
    let signup = format!("{}/auth", app_url.trim_end_matches('/'));
    format!(
        concat!(
            "<div style=\"font-family: sans-serif; max-width: 480px; margin: 0 auto;\">",
            "<h2>You've been invited to AI/Tech Daily</h2>",
            "<p>You have been invited to join as a <strong>{role}</strong>.</p>",
            "<p>AI/Tech Daily tracks market movers across AI and tech sectors ",
            "alongside the team's deal pipeline.</p>",
            "<p><a href=\"{url}\" style=\"display: inline-block; padding: 10px 20px; ",
            "background: #111827; color: #ffffff; border-radius: 6px; text-decoration: none;\">",
            "Accept invitation</a></p>",
            "<p style=\"color: #6b7280; font-size: 12px;\">If you weren't expecting this, ",
            "you can ignore this email.</p>",
            "</div>"
        ),
        role = role,
        url = signup,
    )
}

#[tracing::instrument(skip_all, fields(function = "send-invite"))]
pub async fn send_invite(
    state: &FunctionsState,
    req: SendInviteRequest,
) -> Result<SendInviteResponse, FunctionError> {
    let email = required(&req.email, "email")?;
    if !is_valid_email(email) {
        return Err(FunctionError::Validation(format!(
            "Invalid email address: {}",
            email
        )));
    }
    let role = parse_role(&req.role)?;
    let mailer = state
        .email
        .as_deref()
        .ok_or_else(|| FunctionError::not_configured("RESEND_API_KEY"))?;

    let message = OutgoingEmail {
        from: state.config.invite_from.clone(),
        to: vec![email.to_string()],
        subject: INVITE_SUBJECT.to_string(),
        html: invite_html(&state.config.app_url, role),
    };
    let id = mailer.send(&message).await.map_err(|e| {
        tracing::warn!(%role, error = %e, "invite email failed");
        FunctionError::from(e)
    })?;

    tracing::info!(%role, email_id = %id, "invite sent");
    Ok(SendInviteResponse { success: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::fakes::{state_with, FakeEmail};
    use std::sync::Arc;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("sam@fund.vc"));
        assert!(!is_valid_email("sam@fund"));
        assert!(!is_valid_email("sam fund@x.io"));
        assert!(!is_valid_email("@x.io"));
    }

    #[test]
    fn test_invite_html_links_to_auth() {
        let html = invite_html("https://daily.example.com/", Role::Viewer);
        assert!(html.contains("href=\"https://daily.example.com/auth\""));
        assert!(html.contains("<strong>viewer</strong>"));
    }

    #[tokio::test]
    async fn test_send_invite_uses_config_sender() {
        let mailer = Arc::new(FakeEmail::default());
        let mut state = state_with(None);
        state.email = Some(mailer.clone());
        state.config.invite_from = "Team <team@daily.example.com>".to_string();

        let resp = send_invite(
            &state,
            SendInviteRequest {
                email: Some(" sam@fund.vc ".to_string()),
                role: Some("admin".to_string()),
            },
        )
        .await
        .expect("sent");
        assert!(resp.success);

        let sent = mailer.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["sam@fund.vc".to_string()]);
        assert_eq!(sent[0].from, "Team <team@daily.example.com>");
        assert_eq!(sent[0].subject, INVITE_SUBJECT);
    }

    #[tokio::test]
    async fn test_invalid_email_sends_nothing() {
        let mailer = Arc::new(FakeEmail::default());
        let mut state = state_with(None);
        state.email = Some(mailer.clone());

        let err = send_invite(
            &state,
            SendInviteRequest {
                email: Some("not-an-email".to_string()),
                role: Some("member".to_string()),
            },
        )
        .await
        .expect_err("invalid");
        assert_eq!(err.status_code(), 400);
        assert!(mailer.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_without_resend_key() {
        let mut state = state_with(None);
        state.email = None;
        let err = send_invite(
            &state,
            SendInviteRequest {
                email: Some("sam@fund.vc".to_string()),
                role: Some("member".to_string()),
            },
        )
        .await
        .expect_err("unconfigured");
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("RESEND_API_KEY"));
    }
}
