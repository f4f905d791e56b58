use async_trait::async_trait;
use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Primary key attribute of every stored item.
pub const TIME_ID: &str = "TimeId";

/// A stored record: flat attribute map, every value a string.
pub type Item = BTreeMap<String, String>;

pub fn current_time_id(unix_ts: i64) -> String {
    format!("{}_current", unix_ts)
}

pub fn average_time_id(window_end: i64) -> String {
    format!("{}_avg", window_end)
}

/// Store failure with the diagnostics operators need to find it in the backend.
#[derive(Error, Debug, Clone)]
#[error("{code}: {message} (status {status}, request {request_id})")]
pub struct StoreError {
    pub code: String,
    pub message: String,
    pub status: u16,
    pub request_id: String,
}

impl StoreError {
    fn new(code: &str, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            status,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => Self::new(
                db.code().as_deref().unwrap_or("DatabaseError"),
                db.message(),
                500,
            ),
            sqlx::Error::RowNotFound => Self::new("ResourceNotFoundException", err.to_string(), 404),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::new("ServiceUnavailable", err.to_string(), 503)
            }
            _ => Self::new("InternalServerError", err.to_string(), 500),
        }
    }

    fn report(self, operation: &str, time_id: &str) -> Self {
        tracing::error!(
            operation,
            time_id,
            error_code = %self.code,
            error_message = %self.message,
            http_status = self.status,
            request_id = %self.request_id,
            "Key-value store request failed"
        );
        self
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Look up an item by exact `TimeId`. The returned item includes the `TimeId` attribute.
    async fn get(&self, time_id: &str) -> Result<Option<Item>, StoreError>;

    /// Write an item, replacing any existing item with the same `TimeId`.
    async fn put(&self, item: Item) -> Result<(), StoreError>;
}

/// Flatten a serializable struct into string attributes. `null` fields are dropped.
pub fn to_attributes<T: Serialize>(value: &T) -> Result<Item, serde_json::Error> {
    let Value::Object(map) = serde_json::to_value(value)? else {
        return Err(<serde_json::Error as serde::ser::Error>::custom(
            "only objects can be stored as items",
        ));
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

fn split_time_id(mut item: Item) -> Result<(String, Item), StoreError> {
    match item.remove(TIME_ID) {
        Some(time_id) if !time_id.is_empty() => Ok((time_id, item)),
        _ => Err(StoreError::new(
            "ValidationException",
            format!("Item is missing the {} key attribute", TIME_ID),
            400,
        )),
    }
}

pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, table: &str) -> Result<Self, StoreError> {
        let valid = !table.is_empty()
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(StoreError::new(
                "ValidationException",
                format!("Invalid table name: {}", table),
                400,
            ));
        }

        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    pub async fn init_tables(&self) -> Result<(), StoreError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                time_id TEXT PRIMARY KEY,
                attributes TEXT NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e).report("init_tables", ""))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, time_id: &str) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT attributes FROM {} WHERE time_id = $1",
            self.table
        ))
        .bind(time_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e).report("get", time_id))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row
            .try_get("attributes")
            .map_err(|e| StoreError::from_sqlx(e).report("get", time_id))?;
        let mut item: Item = serde_json::from_str(&raw).map_err(|e| {
            StoreError::new("SerializationException", e.to_string(), 500).report("get", time_id)
        })?;
        item.insert(TIME_ID.to_string(), time_id.to_string());

        tracing::info!("Entry found in store for TimeId: {}", time_id);
        Ok(Some(item))
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let (time_id, attributes) = split_time_id(item).map_err(|e| e.report("put", ""))?;
        let raw = serde_json::to_string(&attributes).map_err(|e| {
            StoreError::new("SerializationException", e.to_string(), 500).report("put", &time_id)
        })?;

        sqlx::query(&format!(
            "INSERT OR REPLACE INTO {} (time_id, attributes, created_at) VALUES ($1, $2, $3)",
            self.table
        ))
        .bind(&time_id)
        .bind(raw)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e).report("put", &time_id))?;

        Ok(())
    }
}

/// In-process store. Nothing is evicted.
pub struct MemoryStore {
    items: Cache<String, Item>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: Cache::builder().build(),
        }
    }

    #[cfg(test)]
    pub fn time_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.items.iter().map(|(k, _)| (*k).clone()).collect();
        ids.sort();
        ids
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, time_id: &str) -> Result<Option<Item>, StoreError> {
        Ok(self.items.get(time_id).await.map(|mut item| {
            tracing::info!("Entry found in store for TimeId: {}", time_id);
            item.insert(TIME_ID.to_string(), time_id.to_string());
            item
        }))
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let (time_id, attributes) = split_time_id(item).map_err(|e| e.report("put", ""))?;
        self.items.insert(time_id, attributes).await;
        Ok(())
    }
}
