// Profile service
// The signed-in user's profile row, used for the dashboard greeting and the
// onboarding redirect.

use crate::backend::{select_as, Backend, BackendError, Select, Table};
use crate::query_cache::{QueryKey, QueryState};
use crate::state::AppContext;
use crate::types::Profile;

pub const PROFILE_KEY: &str = "profile";

async fn load_profile(backend: &dyn Backend, user_id: &str) -> Result<Option<Profile>, BackendError> {
    let query = Select::from(Table::Profiles).eq("id", user_id).limit(1);
    let rows: Vec<Profile> = select_as(backend, &query).await?;
    Ok(rows.into_iter().next())
}

/// Profile for the context's user. Without a signed-in user this is
/// `None` and no request is made.
pub async fn fetch_profile(ctx: &AppContext) -> QueryState<Option<Profile>> {
    let Some(user_id) = ctx.user_id() else {
        return QueryState::ready(None);
    };
    let key = QueryKey::new(&[PROFILE_KEY, user_id]);
    let result = ctx
        .queries
        .fetch(&key, || load_profile(ctx.backend.as_ref(), user_id))
        .await;
    super::settle(ctx, &key, result, "Failed to load profile")
}

/// "Welcome Back, {name}" in the active locale.
pub fn greeting(ctx: &AppContext, profile: Option<&Profile>) -> String {
    let fallback = ctx.t("Investor");
    let name = profile
        .and_then(|p| p.display_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&fallback);
    ctx.t_with("Welcome Back, {name}", &[("name", name)])
}

/// Users who have not finished onboarding are sent there first.
pub fn needs_onboarding(profile: Option<&Profile>) -> bool {
    profile.map_or(false, |p| !p.onboarding_completed)
}
