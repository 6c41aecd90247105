// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Duration as ChronoDuration, Utc};
use hrefcount::config::settings::{CacheBackendKind, CacheSettings};
use hrefcount::infrastructure::cache::cache_strategy::{CacheBackend, CacheEntry};
use hrefcount::infrastructure::cache::create_cache_backend;
use hrefcount::infrastructure::cache::sqlite_backend::SqliteCacheBackend;
use std::time::Duration;
use tempfile::tempdir;

#[tokio::test]
async fn test_entries_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.sqlite");
    let entry = CacheEntry::new(
        "https://a.test",
        "<a href='https://b.test'>persisted body</a>",
        Duration::from_secs(300),
        Utc::now(),
    );

    {
        let backend = SqliteCacheBackend::open(&path).await.unwrap();
        backend.set(entry.clone()).await.unwrap();
        assert_eq!(backend.len().await.unwrap(), 1);
    }

    let reopened = SqliteCacheBackend::open(&path).await.unwrap();
    let stored = reopened.get("https://a.test").await.unwrap().unwrap();

    assert_eq!(stored.body, entry.body);
    assert_eq!(
        stored.expires_at.timestamp_millis(),
        entry.expires_at.timestamp_millis()
    );
    assert!(!stored.is_expired(Utc::now()));
}

#[tokio::test]
async fn test_upsert_delete_and_clear() {
    let dir = tempdir().unwrap();
    let backend = SqliteCacheBackend::open(dir.path().join("nested/dir/cache.sqlite"))
        .await
        .unwrap();
    let now = Utc::now();

    backend
        .set(CacheEntry::new("k", "first", Duration::from_secs(5), now))
        .await
        .unwrap();
    backend
        .set(CacheEntry::new("k", "second", Duration::from_secs(5), now))
        .await
        .unwrap();
    backend
        .set(CacheEntry::new("other", "x", Duration::from_secs(5), now))
        .await
        .unwrap();

    assert_eq!(backend.get("k").await.unwrap().unwrap().body, "second");
    assert_eq!(backend.len().await.unwrap(), 2);

    backend.delete("k").await.unwrap();
    assert!(backend.get("k").await.unwrap().is_none());

    backend.clear().await.unwrap();
    assert_eq!(backend.len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_expired_entry_is_returned_as_stored() {
    // 过期判断由上层完成，后端原样返回
    let dir = tempdir().unwrap();
    let backend = SqliteCacheBackend::open(dir.path().join("cache.sqlite"))
        .await
        .unwrap();
    let fetched_at = Utc::now() - ChronoDuration::seconds(120);

    backend
        .set(CacheEntry::new("old", "stale", Duration::from_secs(60), fetched_at))
        .await
        .unwrap();

    let entry = backend.get("old").await.unwrap().unwrap();
    assert!(entry.is_expired(Utc::now()));
}

#[tokio::test]
async fn test_factory_selects_backend() {
    let dir = tempdir().unwrap();
    let mut settings = CacheSettings {
        backend: CacheBackendKind::Memory,
        ttl_secs: 60,
        path: dir.path().join("cache.sqlite").display().to_string(),
        single_flight: false,
    };

    let memory = create_cache_backend(&settings).await.unwrap();
    assert_eq!(memory.name(), "memory");

    settings.backend = CacheBackendKind::Persistent;
    let persistent = create_cache_backend(&settings).await.unwrap();
    assert_eq!(persistent.name(), "persistent");
    assert!(dir.path().join("cache.sqlite").exists());
}

#[tokio::test]
async fn test_remove_expired_only_matches_same_expiry() {
    let dir = tempdir().unwrap();
    let backend = SqliteCacheBackend::open(dir.path().join("cache.sqlite"))
        .await
        .unwrap();
    let stale = CacheEntry::new(
        "k",
        "stale",
        Duration::from_secs(1),
        Utc::now() - ChronoDuration::seconds(10),
    );
    let fresh = CacheEntry::new("k", "fresh", Duration::from_secs(60), Utc::now());

    backend.set(fresh.clone()).await.unwrap();
    backend.remove_expired("k", stale.expires_at).await.unwrap();
    assert_eq!(backend.get("k").await.unwrap().unwrap().body, "fresh");

    backend.remove_expired("k", fresh.expires_at).await.unwrap();
    assert_eq!(backend.get("k").await.unwrap(), None);
}
