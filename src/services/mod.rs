//! Data hooks: fetch, cache, derive, and mutate backend collections.
//!
//! Every hook takes the `AppContext`, goes through its query cache, and
//! reports failures as toasts. Callers get a `QueryState` or a `bool` back,
//! never an `Err`.

pub mod contacts;
pub mod dashboard;
pub mod deals;
pub mod feedback;
pub mod profile;

use std::sync::Arc;

use crate::backend::BackendError;
use crate::query_cache::{QueryKey, QueryState};
use crate::state::AppContext;

/// Unwrap a cache fetch into a `QueryState`, toasting on failure.
///
/// On error the previously cached value (if any) is returned unchanged.
pub(crate) fn settle<T>(
    ctx: &AppContext,
    key: &QueryKey,
    result: Result<Arc<T>, BackendError>,
    failure_title: &str,
) -> QueryState<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    match result {
        Ok(data) => QueryState::ready((*data).clone()),
        Err(e) => {
            let message = e.to_string();
            log::warn!("Query {} failed: {}", key, message);
            ctx.toaster.error(&ctx.t(failure_title), &message);
            let previous = ctx
                .queries
                .get::<T>(key)
                .map(|d| (*d).clone())
                .unwrap_or_default();
            QueryState::failed(previous, message)
        }
    }
}
