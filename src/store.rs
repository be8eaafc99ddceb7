//! Namespaced, indexed key-value persistence.
//!
//! Each collection is one sqlite table of `(key, body)` rows where `body` is
//! the JSON encoding of the record. Secondary indexes are expression indexes
//! over `json_extract(body, '$.field')`.
//!
//! Every call below is its own atomic unit. There is no transaction spanning
//! calls or collections, and no compare-and-swap: concurrent `put`s on the
//! same key are last-writer-wins.

use crate::db::{init_db, init_memory_db};
use crate::error::{AppError, AppResult};
use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::{debug, info};

/// Bumped whenever a collection or index is added. Upgrades only create
/// what is missing.
pub const SCHEMA_VERSION: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Users,
    Attendance,
    Leaves,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexDef {
    pub name: &'static str,
    /// JSON field the index is built over
    pub field: &'static str,
    pub unique: bool,
}

const USER_INDEXES: &[IndexDef] = &[IndexDef {
    name: "username",
    field: "username",
    unique: true,
}];

const ATTENDANCE_INDEXES: &[IndexDef] = &[
    IndexDef {
        name: "user_id",
        field: "userId",
        unique: false,
    },
    IndexDef {
        name: "date",
        field: "date",
        unique: false,
    },
    IndexDef {
        name: "synced",
        field: "synced",
        unique: false,
    },
];

const LEAVE_INDEXES: &[IndexDef] = &[
    IndexDef {
        name: "user_id",
        field: "userId",
        unique: false,
    },
    IndexDef {
        name: "status",
        field: "status",
        unique: false,
    },
];

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Attendance => "attendance",
            Collection::Leaves => "leaves",
        }
    }

    pub fn indexes(&self) -> &'static [IndexDef] {
        match self {
            Collection::Users => USER_INDEXES,
            Collection::Attendance => ATTENDANCE_INDEXES,
            Collection::Leaves => LEAVE_INDEXES,
        }
    }

    fn index(&self, name: &str) -> AppResult<&'static IndexDef> {
        self.indexes()
            .iter()
            .find(|idx| idx.name == name)
            .ok_or_else(|| AppError::NotFound(format!("Index {}.{}", self.table(), name)))
    }
}

/// A value that lives in exactly one collection under one key.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn key(&self) -> String;
}

/// Value bound against an index. Booleans are stored by sqlite's json
/// functions as 0/1 integers.
#[derive(Debug, Clone)]
pub enum IndexValue {
    Text(String),
    Bool(bool),
}

impl From<&str> for IndexValue {
    fn from(v: &str) -> Self {
        IndexValue::Text(v.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(v: String) -> Self {
        IndexValue::Text(v)
    }
}

impl From<bool> for IndexValue {
    fn from(v: bool) -> Self {
        IndexValue::Bool(v)
    }
}

impl From<NaiveDate> for IndexValue {
    fn from(v: NaiveDate) -> Self {
        IndexValue::Text(v.format("%Y-%m-%d").to_string())
    }
}

/// Store service. Construct once and hand clones to the services that need
/// it; clones share the same pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> AppResult<Self> {
        Ok(Self::new(init_db(database_url).await?))
    }

    pub async fn in_memory() -> AppResult<Self> {
        Ok(Self::new(init_memory_db().await?))
    }

    /// Creates every collection and index that does not exist yet.
    /// Never drops or rewrites existing data, so it is safe to call on
    /// every start.
    pub async fn initialize(&self) -> AppResult<()> {
        let current = self.schema_version().await?;
        if current < SCHEMA_VERSION {
            info!(from = current, to = SCHEMA_VERSION, "Upgrading store schema");
        }

        let mut tx = self.pool.begin().await?;

        for collection in Collection::iter() {
            let table = collection.table();
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (key TEXT PRIMARY KEY, body TEXT NOT NULL)"
            ))
            .execute(&mut *tx)
            .await?;

            for idx in collection.indexes() {
                let unique = if idx.unique { "UNIQUE " } else { "" };
                sqlx::query(&format!(
                    "CREATE {unique}INDEX IF NOT EXISTS idx_{table}_{name} \
                     ON {table} (json_extract(body, '$.{field}'))",
                    name = idx.name,
                    field = idx.field,
                ))
                .execute(&mut *tx)
                .await?;
            }
        }

        if current < SCHEMA_VERSION {
            sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!("Store initialized");
        Ok(())
    }

    pub async fn schema_version(&self) -> AppResult<i64> {
        let version = sqlx::query_scalar::<_, i64>("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    pub async fn get<R: Record>(&self, key: &str) -> AppResult<Option<R>> {
        let table = R::COLLECTION.table();
        debug!(collection = table, key, "get");

        let body = sqlx::query_scalar::<_, String>(&format!(
            "SELECT body FROM {table} WHERE key = ?"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        body.map(|b| decode(&b)).transpose()
    }

    /// Every record in the collection, in key order.
    pub async fn get_all<R: Record>(&self) -> AppResult<Vec<R>> {
        let table = R::COLLECTION.table();
        debug!(collection = table, "get_all");

        let bodies = sqlx::query_scalar::<_, String>(&format!(
            "SELECT body FROM {table} ORDER BY key"
        ))
        .fetch_all(&self.pool)
        .await?;

        bodies.iter().map(|b| decode(b)).collect()
    }

    /// Every record whose indexed field equals `value`.
    pub async fn get_all_by_index<R: Record>(
        &self,
        index: &str,
        value: impl Into<IndexValue>,
    ) -> AppResult<Vec<R>> {
        let table = R::COLLECTION.table();
        let idx = R::COLLECTION.index(index)?;
        let value = value.into();
        debug!(collection = table, index, value = ?value, "get_all_by_index");

        let sql = format!(
            "SELECT body FROM {table} WHERE json_extract(body, '$.{field}') = ? ORDER BY key",
            field = idx.field
        );
        let query = sqlx::query_scalar::<_, String>(&sql);
        let query = match value {
            IndexValue::Text(s) => query.bind(s),
            IndexValue::Bool(b) => query.bind(b as i64),
        };

        let bodies = query.fetch_all(&self.pool).await?;
        bodies.iter().map(|b| decode(b)).collect()
    }

    /// Inserts a new record. Fails with `ConstraintViolation` if the key (or
    /// a unique index value) is already taken; the existing record is left
    /// untouched.
    pub async fn add<R: Record>(&self, record: &R) -> AppResult<()> {
        let table = R::COLLECTION.table();
        let key = record.key();
        let body = serde_json::to_string(record)?;
        debug!(collection = table, key = %key, "add");

        sqlx::query(&format!("INSERT INTO {table} (key, body) VALUES (?, ?)"))
            .bind(&key)
            .bind(body)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts or replaces unconditionally.
    pub async fn put<R: Record>(&self, record: &R) -> AppResult<()> {
        let table = R::COLLECTION.table();
        let key = record.key();
        let body = serde_json::to_string(record)?;
        debug!(collection = table, key = %key, "put");

        sqlx::query(&format!(
            "INSERT INTO {table} (key, body) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET body = excluded.body"
        ))
        .bind(&key)
        .bind(body)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, collection: Collection, key: &str) -> AppResult<()> {
        let table = collection.table();
        debug!(collection = table, key, "delete");

        sqlx::query(&format!("DELETE FROM {table} WHERE key = ?"))
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear(&self, collection: Collection) -> AppResult<()> {
        let table = collection.table();
        info!(collection = table, "Clearing collection");

        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count(&self, collection: Collection) -> AppResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {}",
            collection.table()
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

fn decode<R: DeserializeOwned>(body: &str) -> AppResult<R> {
    Ok(serde_json::from_str(body)?)
}
