// Feedback service
// Writes a row to user_feedback from the in-app feedback dialog.

use chrono::Utc;

use crate::backend::Table;
use crate::state::AppContext;
use crate::types::{FeedbackCategory, NewFeedback};

/// Submit feedback. Empty (or whitespace-only) messages are rejected before
/// any request. Returns whether the row was stored.
pub async fn submit_feedback(ctx: &AppContext, message: &str, category: FeedbackCategory) -> bool {
    let message = message.trim();
    if message.is_empty() {
        ctx.toaster
            .error(&ctx.t("toast.error"), &ctx.t("Feedback cannot be empty"));
        return false;
    }

    let row = NewFeedback {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: ctx.user_id().map(str::to_string),
        category,
        message: message.to_string(),
        created_at: Utc::now(),
    };
    let value = match serde_json::to_value(&row) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Failed to encode feedback: {}", e);
            ctx.toaster
                .error(&ctx.t("Failed to send feedback"), &e.to_string());
            return false;
        }
    };

    match ctx.backend.insert(Table::UserFeedback, value).await {
        Ok(_) => {
            log::info!("Stored feedback {} ({:?})", row.id, category);
            ctx.toaster.success(&ctx.t("Thanks for your feedback!"), "");
            true
        }
        Err(e) => {
            log::warn!("Failed to store feedback: {}", e);
            ctx.toaster
                .error(&ctx.t("Failed to send feedback"), &e.to_string());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{select_as, Select};
    use crate::notification::ToastKind;
    use crate::state::test_support::memory_context;

    #[tokio::test]
    async fn test_submit_feedback_inserts_row() {
        let ctx = memory_context().with_user("u1");
        assert!(submit_feedback(&ctx, "  Love the movers panel ", FeedbackCategory::Feature).await);

        let rows: Vec<NewFeedback> = select_as(ctx.backend.as_ref(), &Select::from(Table::UserFeedback))
            .await
            .expect("select");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message, "Love the movers panel");
        assert_eq!(rows[0].user_id.as_deref(), Some("u1"));
        assert_eq!(ctx.toaster.drain()[0].kind, ToastKind::Success);
    }

    #[tokio::test]
    async fn test_empty_feedback_is_rejected_without_insert() {
        let ctx = memory_context();
        assert!(!submit_feedback(&ctx, "   ", FeedbackCategory::Bug).await);

        let rows: Vec<NewFeedback> = select_as(ctx.backend.as_ref(), &Select::from(Table::UserFeedback))
            .await
            .expect("select");
        assert!(rows.is_empty());
        let toasts = ctx.toaster.drain();
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(toasts[0].description, "Feedback cannot be empty");
    }
}
