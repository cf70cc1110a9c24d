// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous};
use tracing::instrument;

use super::KeyValueStore;
use crate::error::{FlagsServerError, Result};

/// Create a SqlitePool with WAL mode and common settings.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./backlog-flags.db")
#[instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| FlagsServerError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// Durable store backed by a single SQLite table.
#[derive(Clone)]
pub struct SqliteStore {
	pool: SqlitePool,
}

impl SqliteStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Opens the database at `database_url` and creates the table if needed.
	pub async fn connect(database_url: &str) -> Result<Self> {
		let store = Self::new(create_pool(database_url).await?);
		store.migrate().await?;
		Ok(store)
	}

	pub async fn migrate(&self) -> Result<()> {
		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS kv_entries (
				key TEXT PRIMARY KEY NOT NULL,
				value BLOB NOT NULL,
				updated_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await?;

		Ok(())
	}
}

#[async_trait]
impl KeyValueStore for SqliteStore {
	#[instrument(skip(self))]
	async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
		let value = sqlx::query_scalar::<_, Vec<u8>>(
			r#"
			SELECT value FROM kv_entries WHERE key = ?
			"#,
		)
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		Ok(value)
	}

	#[instrument(skip(self, value), fields(len = value.len()))]
	async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO kv_entries (key, value, updated_at)
			VALUES (?, ?, ?)
			ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
			"#,
		)
		.bind(key)
		.bind(value)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[instrument(skip(self))]
	async fn delete(&self, key: &str) -> Result<()> {
		sqlx::query(
			r#"
			DELETE FROM kv_entries WHERE key = ?
			"#,
		)
		.bind(key)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[instrument(skip(self))]
	async fn list(&self, prefix: &str) -> Result<Vec<String>> {
		let prefix_len = prefix.chars().count() as i64;
		let keys = sqlx::query_scalar::<_, String>(
			r#"
			SELECT key FROM kv_entries
			WHERE substr(key, 1, ?) = ?
			ORDER BY key
			"#,
		)
		.bind(prefix_len)
		.bind(prefix)
		.fetch_all(&self.pool)
		.await?;

		Ok(keys)
	}

	#[instrument(skip(self, value))]
	async fn put_if_absent(&self, key: &str, value: &[u8]) -> Result<bool> {
		let result = sqlx::query(
			r#"
			INSERT INTO kv_entries (key, value, updated_at)
			VALUES (?, ?, ?)
			ON CONFLICT(key) DO NOTHING
			"#,
		)
		.bind(key)
		.bind(value)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() == 1)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use sqlx::sqlite::SqlitePoolOptions;

	async fn create_test_store() -> SqliteStore {
		// One connection, since every in-memory connection is its own database
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect("sqlite::memory:")
			.await
			.unwrap();
		let store = SqliteStore::new(pool);
		store.migrate().await.unwrap();
		store
	}

	#[tokio::test]
	async fn test_get_put_delete() {
		let store = create_test_store().await;
		assert_eq!(store.get("feature:dev:a").await.unwrap(), None);

		store.put("feature:dev:a", br#"{"enabled":true}"#).await.unwrap();
		assert_eq!(
			store.get("feature:dev:a").await.unwrap(),
			Some(br#"{"enabled":true}"#.to_vec())
		);

		store.put("feature:dev:a", b"{}").await.unwrap();
		assert_eq!(store.get("feature:dev:a").await.unwrap(), Some(b"{}".to_vec()));

		store.delete("feature:dev:a").await.unwrap();
		assert_eq!(store.get("feature:dev:a").await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_list_by_prefix() {
		let store = create_test_store().await;
		for key in [
			"feature:dev:b",
			"feature:dev:a",
			"feature:dev:a:users:u1",
			"feature:dev2:a",
			"feature:prod:a",
		] {
			store.put(key, b"x").await.unwrap();
		}

		let keys = store.list("feature:dev:").await.unwrap();
		assert_eq!(
			keys,
			vec!["feature:dev:a", "feature:dev:a:users:u1", "feature:dev:b"]
		);
	}

	#[tokio::test]
	async fn test_list_treats_like_wildcards_literally() {
		let store = create_test_store().await;
		store.put("feature:d_v:a", b"x").await.unwrap();
		store.put("feature:dev:a", b"x").await.unwrap();

		assert_eq!(store.list("feature:d_v:").await.unwrap(), vec!["feature:d_v:a"]);
	}

	#[tokio::test]
	async fn test_put_if_absent() {
		let store = create_test_store().await;
		assert!(store.put_if_absent("salt", b"one").await.unwrap());
		assert!(!store.put_if_absent("salt", b"two").await.unwrap());
		assert_eq!(store.get("salt").await.unwrap(), Some(b"one".to_vec()));
	}

	#[tokio::test]
	async fn test_connect_creates_database_file() {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}", dir.path().join("flags.db").display());

		let store = SqliteStore::connect(&url).await.unwrap();
		store.put("k", b"v").await.unwrap();
		drop(store);

		let reopened = SqliteStore::connect(&url).await.unwrap();
		assert_eq!(reopened.get("k").await.unwrap(), Some(b"v".to_vec()));
	}
}
