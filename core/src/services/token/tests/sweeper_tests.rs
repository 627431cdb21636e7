//! Tests for the background expiry sweeper, driven by paused tokio time

use chrono::Duration as ChronoDuration;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::Span;

use crate::clock::ManualClock;
use crate::domain::entities::token::RefreshTokenRecord;
use crate::repositories::TokenRepository;
use crate::services::token::{ExpirySweeper, ExpirySweeperConfig};

use super::support::{start_time, FlakyRepository};

const HOUR: Duration = Duration::from_secs(3600);

async fn repository_with_expired_record() -> Arc<FlakyRepository> {
    let repository = Arc::new(FlakyRepository::new());
    let created = start_time() - ChronoDuration::days(8);
    repository
        .save_refresh_token(RefreshTokenRecord::new(
            "user-42",
            "stale-token",
            created,
            created + ChronoDuration::days(7),
        ))
        .await
        .unwrap();
    repository
}

fn sweeper(
    repository: Arc<FlakyRepository>,
    enabled: bool,
) -> Arc<ExpirySweeper<FlakyRepository>> {
    Arc::new(ExpirySweeper::new(
        repository,
        Arc::new(ManualClock::new(start_time())),
        ExpirySweeperConfig {
            interval: HOUR,
            enabled,
        },
    ))
}

#[tokio::test]
async fn test_run_once_reports_deleted_count() {
    let repository = repository_with_expired_record().await;
    let sweeper = sweeper(repository.clone(), true);

    assert_eq!(sweeper.run_once().await.unwrap(), 1);
    assert_eq!(sweeper.run_once().await.unwrap(), 0);
    assert!(repository.inner.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_first_sweep_runs_after_one_interval() {
    let repository = repository_with_expired_record().await;
    let handle = sweeper(repository.clone(), true)
        .spawn(Span::none())
        .unwrap();

    tokio::time::sleep(HOUR / 2).await;
    assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 0);
    assert_eq!(repository.inner.len().await, 1);

    tokio::time::sleep(HOUR).await;
    assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 1);
    assert!(repository.inner.is_empty().await);

    tokio::time::sleep(HOUR).await;
    assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 2);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_sweep_is_retried_next_interval() {
    let repository = repository_with_expired_record().await;
    repository.fail_delete.store(true, Ordering::SeqCst);
    let handle = sweeper(repository.clone(), true)
        .spawn(Span::none())
        .unwrap();

    tokio::time::sleep(HOUR + HOUR / 2).await;
    assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 1);
    assert_eq!(repository.inner.len().await, 1);
    assert!(!handle.is_finished());

    repository.fail_delete.store(false, Ordering::SeqCst);
    tokio::time::sleep(HOUR).await;
    assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 2);
    assert!(repository.inner.is_empty().await);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_task_and_no_further_sweeps_run() {
    let repository = repository_with_expired_record().await;
    let handle = sweeper(repository.clone(), true)
        .spawn(Span::none())
        .unwrap();

    handle.stop().await;

    tokio::time::sleep(HOUR * 3).await;
    assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_aborts_in_flight_sweep() {
    let repository = repository_with_expired_record().await;
    repository.stall.store(true, Ordering::SeqCst);
    let handle = sweeper(repository.clone(), true)
        .spawn(Span::none())
        .unwrap();

    // The first sweep starts and hangs inside the store
    tokio::time::sleep(HOUR + Duration::from_secs(1)).await;
    assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 1);

    handle.stop().await;
    assert_eq!(repository.inner.len().await, 1);
}

#[tokio::test]
async fn test_disabled_sweeper_does_not_spawn() {
    let repository = Arc::new(FlakyRepository::new());

    assert!(sweeper(repository, false).spawn(Span::none()).is_none());
}

#[tokio::test]
async fn test_zero_interval_does_not_spawn() {
    let sweeper = Arc::new(ExpirySweeper::new(
        Arc::new(FlakyRepository::new()),
        Arc::new(ManualClock::new(start_time())),
        ExpirySweeperConfig {
            interval: Duration::ZERO,
            enabled: true,
        },
    ));

    assert!(sweeper.spawn(Span::none()).is_none());
}
