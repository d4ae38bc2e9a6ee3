// Dashboard service
// Header stats and the stock movers panel. Both live under the
// ["dashboard"] prefix so deal and contact mutations can invalidate them.

use chrono::{Duration, NaiveDate, Utc};

use crate::backend::{select_as, Backend, BackendError, Select, Table};
use crate::filters::deal_stats;
use crate::query_cache::{QueryKey, QueryState};
use crate::state::AppContext;
use crate::types::{Contact, DashboardStats, Deal, Interaction, StockQuote};

pub const STATS_KEY: &[&str] = &["dashboard", "stats"];
pub const MOVERS_KEY: &[&str] = &["dashboard", "movers"];

/// Interactions dated within the last `WEEK_DAYS` days (inclusive of today)
/// count as "this week".
const WEEK_DAYS: i64 = 7;

pub fn compute_dashboard_stats(
    deals: &[Deal],
    contact_count: usize,
    interactions: &[Interaction],
    today: NaiveDate,
) -> DashboardStats {
    let since = today - Duration::days(WEEK_DAYS - 1);
    let interactions_this_week = interactions
        .iter()
        .filter(|i| i.interaction_date >= since && i.interaction_date <= today)
        .count();
    DashboardStats {
        deals: deal_stats(deals),
        contacts: contact_count,
        interactions_this_week,
    }
}

/// Largest absolute moves first, optionally limited to one sector.
///
/// Equal moves keep their input order.
pub fn top_movers(quotes: &[StockQuote], sector: Option<&str>, limit: usize) -> Vec<StockQuote> {
    let mut movers: Vec<StockQuote> = quotes
        .iter()
        .filter(|q| sector.map_or(true, |s| q.sector.as_deref() == Some(s)))
        .cloned()
        .collect();
    movers.sort_by(|a, b| b.change_percent.abs().total_cmp(&a.change_percent.abs()));
    movers.truncate(limit);
    movers
}

async fn load_stats(backend: &dyn Backend) -> Result<DashboardStats, BackendError> {
    let contacts_q = Select::from(Table::Contacts);
    let interactions_q = Select::from(Table::Interactions);
    let (deals, contacts, interactions) = tokio::join!(
        super::deals::load_deals(backend),
        select_as::<Contact>(backend, &contacts_q),
        select_as::<Interaction>(backend, &interactions_q),
    );
    Ok(compute_dashboard_stats(
        &deals?,
        contacts?.len(),
        &interactions?,
        Utc::now().date_naive(),
    ))
}

pub async fn fetch_dashboard_stats(ctx: &AppContext) -> QueryState<DashboardStats> {
    let key = QueryKey::new(STATS_KEY);
    let result = ctx
        .queries
        .fetch(&key, || load_stats(ctx.backend.as_ref()))
        .await;
    super::settle(ctx, &key, result, "Failed to load dashboard")
}

async fn load_quotes(backend: &dyn Backend) -> Result<Vec<StockQuote>, BackendError> {
    let query = Select::from(Table::StockPriceCache).order_by("symbol", true);
    select_as(backend, &query).await
}

/// The cached quote list is shared; sector and limit are applied per call.
pub async fn fetch_stock_movers(
    ctx: &AppContext,
    sector: Option<&str>,
    limit: usize,
) -> QueryState<Vec<StockQuote>> {
    let key = QueryKey::new(MOVERS_KEY);
    let result = ctx
        .queries
        .fetch(&key, || load_quotes(ctx.backend.as_ref()))
        .await;
    let state = super::settle(ctx, &key, result, "Failed to load dashboard");
    QueryState {
        data: top_movers(&state.data, sector, limit),
        ..state
    }
}
