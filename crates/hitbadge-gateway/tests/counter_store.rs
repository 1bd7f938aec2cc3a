#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use hitbadge_core::badge::{Counts, PageId};
use hitbadge_core::error::{HitBadgeError, Result};
use hitbadge_core::keys::{daily_key, total_key, DAILY_TTL_SECS};
use hitbadge_gateway::store::{ConnectionState, CounterBackend, CounterStore, MemoryBackend};

fn page(s: &str) -> PageId {
    PageId::parse(Some(s)).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn memory_store() -> (CounterStore, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let store = CounterStore::new(backend.clone(), Arc::new(ConnectionState::new(true)));
    (store, backend)
}

/// Counts calls and always fails.
#[derive(Default)]
struct FailingBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl CounterBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn incr_pair(&self, _d: &str, _t: &str, _ttl: u64) -> Result<Counts> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(HitBadgeError::Internal("boom".into()))
    }

    async fn get_pair(&self, _d: &str, _t: &str) -> Result<Counts> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(HitBadgeError::Internal("boom".into()))
    }
}

#[tokio::test]
async fn sequential_increments_raise_total_by_n() {
    let (store, _) = memory_store();
    let p = page("https://x.test/a");
    for n in 1..=25u64 {
        let c = store.bump_and_read(&p, day(1)).await.unwrap();
        assert_eq!(c, Counts::new(n, n));
    }
}

#[tokio::test]
async fn read_never_mutates() {
    let (store, _) = memory_store();
    let p = page("https://x.test/a");
    store.bump_and_read(&p, day(1)).await.unwrap();
    store.bump_and_read(&p, day(1)).await.unwrap();
    for _ in 0..5 {
        assert_eq!(store.read(&p, day(1)).await.unwrap(), Counts::new(2, 2));
    }
}

#[tokio::test]
async fn read_of_unknown_page_is_zero_and_creates_nothing() {
    let (store, backend) = memory_store();
    let p = page("https://x.test/never");
    assert_eq!(store.read(&p, day(1)).await.unwrap(), Counts::new(0, 0));
    assert!(!backend.contains(&daily_key(&p, day(1))));
    assert!(!backend.contains(&total_key(&p)));
}

#[tokio::test]
async fn days_are_independent() {
    let (store, _) = memory_store();
    let p = page("https://x.test/a");
    store.bump_and_read(&p, day(1)).await.unwrap();
    store.bump_and_read(&p, day(1)).await.unwrap();
    let next = store.bump_and_read(&p, day(2)).await.unwrap();
    assert_eq!(next, Counts::new(1, 3));
    assert_eq!(store.read(&p, day(1)).await.unwrap(), Counts::new(2, 3));
}

#[tokio::test]
async fn pages_are_independent() {
    let (store, _) = memory_store();
    store.bump_and_read(&page("https://x.test/a"), day(1)).await.unwrap();
    let b = store.bump_and_read(&page("https://x.test/b"), day(1)).await.unwrap();
    assert_eq!(b, Counts::new(1, 1));
}

#[tokio::test]
async fn daily_key_gets_two_day_expiry_total_does_not() {
    let (store, backend) = memory_store();
    let p = page("https://x.test/a");
    store.bump_and_read(&p, day(1)).await.unwrap();

    let ttl = backend.ttl(&daily_key(&p, day(1))).expect("daily key has ttl");
    assert!(ttl.as_secs() <= DAILY_TTL_SECS && ttl.as_secs() >= DAILY_TTL_SECS - 5);
    assert!(backend.contains(&total_key(&p)));
    assert!(backend.ttl(&total_key(&p)).is_none());
}

#[tokio::test]
async fn concurrent_increments_are_not_lost() {
    let (store, _) = memory_store();
    let p = page("https://x.test/hot");

    let mut tasks = Vec::new();
    for _ in 0..50 {
        let store = store.clone();
        let p = p.clone();
        tasks.push(tokio::spawn(async move { store.bump_and_read(&p, day(1)).await.unwrap() }));
    }
    for t in tasks {
        t.await.unwrap();
    }
    assert_eq!(store.read(&p, day(1)).await.unwrap(), Counts::new(50, 50));
}

#[tokio::test]
async fn unavailable_store_does_not_touch_backend() {
    let backend = Arc::new(FailingBackend::default());
    let state = Arc::new(ConnectionState::new(false));
    let store = CounterStore::new(backend.clone(), state);

    assert!(!store.is_available());
    let err = store.bump_and_read(&page("https://x.test/a"), day(1)).await.unwrap_err();
    assert!(matches!(err, HitBadgeError::StoreUnavailable(_)));
    let err = store.read(&page("https://x.test/a"), day(1)).await.unwrap_err();
    assert!(matches!(err, HitBadgeError::StoreUnavailable(_)));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn backend_errors_surface_as_store_unavailable() {
    let backend = Arc::new(FailingBackend::default());
    let store = CounterStore::new(backend.clone(), Arc::new(ConnectionState::new(true)));

    let err = store.bump_and_read(&page("https://x.test/a"), day(1)).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "STORE_UNAVAILABLE");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn connection_state_transitions() {
    let s = ConnectionState::new(false);
    assert!(!s.mark_up());
    assert!(s.is_up());
    assert!(s.mark_down());
    assert!(!s.is_up());
}
