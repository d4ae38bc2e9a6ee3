//! Client-side query cache shared by the data hooks.
//!
//! Entries are keyed by a segment list (`["deals"]`, `["dashboard", "stats"]`).
//! Invalidation works on key prefixes: invalidating `["dashboard"]` marks every
//! dashboard query stale, and the next fetch of a stale key goes back to the
//! backend. Concurrent fetches of the same key are not deduplicated; the last
//! one to finish wins.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }

    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        prefix.len() <= self.0.len() && self.0.iter().zip(prefix).all(|(a, b)| a == b)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// What a hook exposes to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState<T> {
    pub data: T,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> QueryState<T> {
    pub fn ready(data: T) -> Self {
        Self {
            data,
            is_loading: false,
            error: None,
        }
    }

    pub fn failed(data: T, error: impl Into<String>) -> Self {
        Self {
            data,
            is_loading: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Default)]
struct Entry {
    data: Option<Arc<dyn Any + Send + Sync>>,
    stale: bool,
    fetching: usize,
    error: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct QueryClient {
    entries: RwLock<HashMap<QueryKey, Entry>>,
}

/// Clears the in-flight marker even if the fetch future is dropped mid-await.
struct FetchGuard<'a> {
    client: &'a QueryClient,
    key: QueryKey,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if let Some(entry) = self.client.entries.write().get_mut(&self.key) {
            entry.fetching = entry.fetching.saturating_sub(1);
        }
    }
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return fresh cached data for `key`, or run `fetcher` and cache its result.
    ///
    /// A failed fetch records the error against the key and leaves any
    /// previously cached data in place.
    pub async fn fetch<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        E: std::fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(data) = self.fresh::<T>(key) {
            return Ok(data);
        }

        let _guard = {
            let mut entries = self.entries.write();
            entries.entry(key.clone()).or_default().fetching += 1;
            FetchGuard {
                client: self,
                key: key.clone(),
            }
        };

        match fetcher().await {
            Ok(value) => {
                let data = Arc::new(value);
                let mut entries = self.entries.write();
                let entry = entries.entry(key.clone()).or_default();
                entry.data = Some(data.clone() as Arc<dyn Any + Send + Sync>);
                entry.stale = false;
                entry.error = None;
                entry.updated_at = Some(Utc::now());
                Ok(data)
            }
            Err(e) => {
                let mut entries = self.entries.write();
                entries.entry(key.clone()).or_default().error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn fresh<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.stale {
            return None;
        }
        entry.data.clone()?.downcast::<T>().ok()
    }

    /// Cached data for `key`, stale or not.
    pub fn get<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.entries
            .read()
            .get(key)
            .and_then(|e| e.data.clone())
            .and_then(|d| d.downcast::<T>().ok())
    }

    /// Replace the cached data for `key` and mark it fresh.
    pub fn set<T: Send + Sync + 'static>(&self, key: &QueryKey, value: T) {
        let mut entries = self.entries.write();
        let entry = entries.entry(key.clone()).or_default();
        entry.data = Some(Arc::new(value));
        entry.stale = false;
        entry.error = None;
        entry.updated_at = Some(Utc::now());
    }

    /// Current `{data, isLoading, error}` view of `key` without fetching.
    pub fn state<T>(&self, key: &QueryKey) -> QueryState<T>
    where
        T: Clone + Default + Send + Sync + 'static,
    {
        let entries = self.entries.read();
        let Some(entry) = entries.get(key) else {
            return QueryState::ready(T::default());
        };
        let data = entry
            .data
            .clone()
            .and_then(|d| d.downcast::<T>().ok())
            .map(|d| (*d).clone());
        QueryState {
            is_loading: entry.fetching > 0 && data.is_none(),
            data: data.unwrap_or_default(),
            error: entry.error.clone(),
        }
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.entries
            .read()
            .get(key)
            .map(|e| e.fetching > 0)
            .unwrap_or(false)
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries
            .read()
            .get(key)
            .map(|e| e.stale || e.data.is_none())
            .unwrap_or(true)
    }

    pub fn updated_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.entries.read().get(key).and_then(|e| e.updated_at)
    }

    /// Mark every query whose key starts with `prefix` stale. Returns how many
    /// entries were affected.
    pub fn invalidate(&self, prefix: &[&str]) -> usize {
        let mut entries = self.entries.write();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                count += 1;
            }
        }
        if count > 0 {
            log::debug!("Invalidated {} queries under [{}]", count, prefix.join(", "));
        }
        count
    }

    /// Drop every cached entry (sign-out).
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_key_prefix_matching() {
        let key = QueryKey::new(&["dashboard", "stats"]);
        assert!(key.starts_with(&["dashboard"]));
        assert!(key.starts_with(&["dashboard", "stats"]));
        assert!(key.starts_with(&[]));
        assert!(!key.starts_with(&["dashboard", "movers"]));
        assert!(!key.starts_with(&["dashboard", "stats", "extra"]));
    }

    #[tokio::test]
    async fn test_fetch_caches_until_invalidated() {
        let client = QueryClient::new();
        let key = QueryKey::new(&["deals"]);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..2 {
            let v = client
                .fetch(&key, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(vec![1, 2, 3])
                })
                .await
                .expect("fetch");
            assert_eq!(*v, vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(client.invalidate(&["deals"]), 1);
        assert!(client.is_stale(&key));
        client
            .fetch(&key, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(vec![4])
            })
            .await
            .expect("refetch");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!client.is_fetching(&key));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_data_and_records_error() {
        let client = QueryClient::new();
        let key = QueryKey::new(&["contacts"]);
        client.set(&key, vec!["ada".to_string()]);
        client.invalidate(&["contacts"]);

        let result = client
            .fetch(&key, || async { Err::<Vec<String>, _>("offline".to_string()) })
            .await;
        assert!(result.is_err());

        let state: QueryState<Vec<String>> = client.state(&key);
        assert_eq!(state.data, vec!["ada".to_string()]);
        assert_eq!(state.error.as_deref(), Some("offline"));
        assert!(!state.is_loading);
    }

    #[test]
    fn test_invalidate_prefix_only_touches_matching_keys() {
        let client = QueryClient::new();
        client.set(&QueryKey::new(&["dashboard", "stats"]), 1_u32);
        client.set(&QueryKey::new(&["dashboard", "movers"]), 2_u32);
        client.set(&QueryKey::new(&["deals"]), 3_u32);

        assert_eq!(client.invalidate(&["dashboard"]), 2);
        assert!(!client.is_stale(&QueryKey::new(&["deals"])));
        // Stale data is still readable.
        assert_eq!(client.get::<u32>(&QueryKey::new(&["dashboard", "stats"])).as_deref(), Some(&1));
    }

    #[test]
    fn test_state_for_unknown_key_is_empty() {
        let client = QueryClient::new();
        let state: QueryState<Vec<u8>> = client.state(&QueryKey::new(&["nothing"]));
        assert!(state.data.is_empty());
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }
}
