//! SQLite-backed stand-in for the hosted database.
//!
//! Each collection is a table of JSON documents keyed by the collection's
//! primary key. Ordering and filters go through `json_extract`, so rows keep
//! exactly the shape the hosted REST endpoint returns and the hooks decode
//! both the same way.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;

use super::{Backend, BackendError, Select, Table};

pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Default location: `~/.aitech-daily/local.db` (or `local-dev.db`).
    pub fn default_path(dev_mode: bool) -> Result<PathBuf, BackendError> {
        let home = dirs::home_dir()
            .ok_or_else(|| BackendError::Config("Home directory not found".to_string()))?;
        let file = if dev_mode { "local-dev.db" } else { "local.db" };
        Ok(home.join(".aitech-daily").join(file))
    }

    /// Open (or create) a store at `path` and apply the schema.
    pub fn open_at(path: &Path) -> Result<Self, BackendError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BackendError::Config(format!("Failed to create store directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, BackendError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, BackendError> {
        crate::migrations::run_migrations(&conn).map_err(BackendError::Migration)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn select_sync(&self, query: &Select) -> Result<Vec<Value>, BackendError> {
        query.validate()?;

        let mut sql = format!("SELECT doc FROM {}", query.table.as_str());
        let mut args: Vec<String> = Vec::with_capacity(query.filters.len());

        for (i, (column, value)) in query.filters.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!(
                "CAST(json_extract(doc, '$.{}') AS TEXT) = ?{}",
                column,
                i + 1
            ));
            args.push(value.clone());
        }

        match &query.order {
            Some(order) => sql.push_str(&format!(
                " ORDER BY json_extract(doc, '$.{}') {} NULLS LAST, rowid",
                order.column,
                if order.ascending { "ASC" } else { "DESC" }
            )),
            None => sql.push_str(" ORDER BY rowid"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let docs = stmt
            .query_map(params_from_iter(args.iter()), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        docs.into_iter()
            .map(|doc| {
                serde_json::from_str(&doc).map_err(|e| BackendError::Decode {
                    table: query.table.as_str(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    fn insert_sync(&self, table: Table, mut row: Value) -> Result<Value, BackendError> {
        let obj = row.as_object_mut().ok_or_else(|| BackendError::Decode {
            table: table.as_str(),
            message: "insert payload must be a JSON object".to_string(),
        })?;

        let key_column = table.key_column();
        let key = match obj.get(key_column) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(BackendError::Decode {
                    table: table.as_str(),
                    message: format!("{} must be a string, got {}", key_column, other),
                })
            }
            None if key_column == "id" => {
                let id = uuid::Uuid::new_v4().to_string();
                obj.insert("id".to_string(), Value::String(id.clone()));
                id
            }
            None => {
                return Err(BackendError::Decode {
                    table: table.as_str(),
                    message: format!("missing key column {}", key_column),
                })
            }
        };

        let doc = serde_json::to_string(&row).map_err(|e| BackendError::Decode {
            table: table.as_str(),
            message: e.to_string(),
        })?;

        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO {} (key, doc) VALUES (?1, ?2)", table.as_str()),
            [&key, &doc],
        )?;
        Ok(row)
    }

    fn delete_sync(&self, table: Table, id: &str) -> Result<(), BackendError> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            &format!("DELETE FROM {} WHERE key = ?1", table.as_str()),
            [id],
        )?;
        if removed == 0 {
            return Err(BackendError::NotFound {
                table: table.as_str(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for LocalStore {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, BackendError> {
        self.select_sync(query)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError> {
        self.insert_sync(table, row)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), BackendError> {
        self.delete_sync(table, id)
    }
}
