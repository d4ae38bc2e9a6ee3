//! Hosted-database access for the data hooks.
//!
//! The hooks only ever issue three kinds of calls against a collection:
//! ordered select (with optional equality filters), insert, and delete by id.
//! `Backend` captures exactly that surface so the same hooks run against the
//! hosted REST endpoint (`rest`) or a local SQLite store (`local`) used for
//! offline work and tests.

pub mod local;
pub mod rest;

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use local::LocalStore;
pub use rest::RestBackend;

/// Errors from backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("No {table} row with id {id}")]
    NotFound { table: &'static str, id: String },

    #[error("Failed to decode {table} rows: {message}")]
    Decode { table: &'static str, message: String },

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Backend misconfigured: {0}")]
    Config(String),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// Collections the app reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Deals,
    Contacts,
    Interactions,
    Profiles,
    UserFeedback,
    UserRoles,
    StockPriceCache,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Deals,
        Table::Contacts,
        Table::Interactions,
        Table::Profiles,
        Table::UserFeedback,
        Table::UserRoles,
        Table::StockPriceCache,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Deals => "deals",
            Table::Contacts => "contacts",
            Table::Interactions => "interactions",
            Table::Profiles => "profiles",
            Table::UserFeedback => "user_feedback",
            Table::UserRoles => "user_roles",
            Table::StockPriceCache => "stock_price_cache",
        }
    }

    /// Primary key column. `stock_price_cache` is keyed by ticker.
    pub fn key_column(&self) -> &'static str {
        match self {
            Table::StockPriceCache => "symbol",
            Table::UserRoles => "user_id",
            _ => "id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A select against one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub table: Table,
    pub order: Option<Order>,
    /// `column = value` equality filters, all of which must hold.
    pub filters: Vec<(String, String)>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            order: None,
            filters: Vec::new(),
            limit: None,
        }
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Reject column names that are not plain identifiers. Both backends
    /// splice column names into the request, so this runs before either.
    pub fn validate(&self) -> Result<(), BackendError> {
        let columns = self
            .order
            .iter()
            .map(|o| o.column.as_str())
            .chain(self.filters.iter().map(|(c, _)| c.as_str()));
        for column in columns {
            check_column(column)?;
        }
        Ok(())
    }
}

pub(crate) fn check_column(column: &str) -> Result<(), BackendError> {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let re = IDENT.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid regex"));
    if re.is_match(column) {
        Ok(())
    } else {
        Err(BackendError::InvalidColumn(column.to_string()))
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Run a select and return the raw rows.
    async fn select(&self, query: &Select) -> Result<Vec<Value>, BackendError>;

    /// Insert one row and return it as stored.
    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError>;

    /// Delete the row whose key column equals `id`.
    ///
    /// Returns `BackendError::NotFound` when nothing was removed, so callers
    /// can tell a stale id apart from a successful delete.
    async fn delete(&self, table: Table, id: &str) -> Result<(), BackendError>;
}

/// Run a select and decode every row into `T`.
pub async fn select_as<T: DeserializeOwned>(
    backend: &dyn Backend,
    query: &Select,
) -> Result<Vec<T>, BackendError> {
    let rows = backend.select(query).await?;
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| BackendError::Decode {
                table: query.table.as_str(),
                message: e.to_string(),
            })
        })
        .collect()
}
