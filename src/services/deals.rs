// Deals service
// Fetch, filter, and delete deals; deletion fans out invalidation to the
// dashboard and contacts views that embed deal data.

use crate::backend::{select_as, Backend, BackendError, Select, Table};
use crate::filters::{deal_stats, filter_deals, DealFilter};
use crate::query_cache::{QueryKey, QueryState};
use crate::state::AppContext;
use crate::types::{Deal, DealStats};

pub const DEALS_KEY: &[&str] = &["deals"];

/// Query prefixes that hold deal data and go stale when a deal changes.
const DEPENDENT_KEYS: &[&[&str]] = &[DEALS_KEY, &["dashboard"], &["contacts"]];

pub(crate) async fn load_deals(backend: &dyn Backend) -> Result<Vec<Deal>, BackendError> {
    let query = Select::from(Table::Deals).order_by("deal_date", false);
    select_as(backend, &query).await
}

/// All deals, newest deal date first.
pub async fn fetch_deals(ctx: &AppContext) -> QueryState<Vec<Deal>> {
    let key = QueryKey::new(DEALS_KEY);
    let result = ctx
        .queries
        .fetch(&key, || load_deals(ctx.backend.as_ref()))
        .await;
    super::settle(ctx, &key, result, "Failed to load deals")
}

/// Deals passing `filter`, sorted as it asks.
pub async fn fetch_filtered_deals(ctx: &AppContext, filter: &DealFilter) -> QueryState<Vec<Deal>> {
    let state = fetch_deals(ctx).await;
    QueryState {
        data: filter_deals(&state.data, filter),
        ..state
    }
}

pub async fn fetch_deal_stats(ctx: &AppContext) -> QueryState<DealStats> {
    let state = fetch_deals(ctx).await;
    QueryState {
        data: deal_stats(&state.data),
        is_loading: state.is_loading,
        error: state.error,
    }
}

/// Mark every deal-bearing query stale. Returns how many entries were hit.
pub fn invalidate_deals(ctx: &AppContext) -> usize {
    DEPENDENT_KEYS
        .iter()
        .map(|prefix| ctx.queries.invalidate(prefix))
        .sum()
}

/// Delete a deal by id. Shows a toast either way; returns whether the row
/// was removed. A failed delete leaves every cached query untouched.
pub async fn delete_deal(ctx: &AppContext, deal_id: &str) -> bool {
    let project = ctx
        .queries
        .get::<Vec<Deal>>(&QueryKey::new(DEALS_KEY))
        .and_then(|deals| {
            deals
                .iter()
                .find(|d| d.id == deal_id)
                .map(|d| d.project_name.clone())
        })
        .unwrap_or_else(|| deal_id.to_string());

    match ctx.backend.delete(Table::Deals, deal_id).await {
        Ok(()) => {
            log::info!("Deleted deal {} ({})", deal_id, project);
            ctx.toaster.success(
                &ctx.t("Deal deleted"),
                &ctx.t_with("{project} has been removed.", &[("project", &project)]),
            );
            invalidate_deals(ctx);
            true
        }
        Err(e) => {
            log::warn!("Failed to delete deal {}: {}", deal_id, e);
            ctx.toaster
                .error(&ctx.t("Failed to delete deal"), &e.to_string());
            false
        }
    }
}
