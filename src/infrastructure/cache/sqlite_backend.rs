// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::infrastructure::cache::cache_strategy::{CacheBackend, CacheEntry};
use crate::utils::errors::CacheError;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS content_cache (
    key TEXT PRIMARY KEY NOT NULL,
    body TEXT NOT NULL,
    fetched_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
)";

/// 单文件 SQLite 缓存后端
///
/// 时间戳以毫秒存储，进程重启后条目仍在有效期内可用
#[derive(Clone)]
pub struct SqliteCacheBackend {
    pool: SqlitePool,
}

impl SqliteCacheBackend {
    /// 打开（必要时创建）缓存文件
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!("Opened persistent cache at {}", path.display());

        Ok(Self { pool })
    }
}

fn from_millis(key: &str, millis: i64) -> Result<DateTime<Utc>, CacheError> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        CacheError::Backend(format!("invalid timestamp {} stored for {}", millis, key))
    })
}

#[async_trait]
impl CacheBackend for SqliteCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let row: Option<(String, i64, i64)> = sqlx::query_as(
            "SELECT body, fetched_at, expires_at FROM content_cache WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(body, fetched_at, expires_at)| {
            Ok(CacheEntry {
                key: key.to_string(),
                body,
                fetched_at: from_millis(key, fetched_at)?,
                expires_at: from_millis(key, expires_at)?,
            })
        })
        .transpose()
    }

    async fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        sqlx::query(
            "INSERT INTO content_cache (key, body, fetched_at, expires_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                fetched_at = excluded.fetched_at,
                expires_at = excluded.expires_at",
        )
        .bind(&entry.key)
        .bind(&entry.body)
        .bind(entry.fetched_at.timestamp_millis())
        .bind(entry.expires_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        debug!(
            "Stored {} bytes in persistent cache for key: {}",
            entry.body.len(),
            entry.key
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM content_cache WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_expired(
        &self,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM content_cache WHERE key = ? AND expires_at = ?")
            .bind(key)
            .bind(expires_at.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM content_cache")
            .execute(&self.pool)
            .await?;
        info!("Cleared all persistent cache entries");
        Ok(())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content_cache")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as usize)
    }

    fn name(&self) -> &'static str {
        "persistent"
    }
}
