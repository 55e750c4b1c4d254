//! Tests for the background refresh schedule

use std::sync::Arc;
use std::time::Duration;

use crate::services::keys::{next_refresh_delay, KeyManager, KeyManagerConfig, KeyRefreshTask};
use crate::testutil::{InMemorySecretSource, ROTATED_KID};

fn config() -> KeyManagerConfig {
    KeyManagerConfig::default()
        .with_refresh_interval(Duration::from_secs(100))
        .with_retry_backoff(Duration::from_secs(10))
}

async fn manager(source: Arc<InMemorySecretSource>) -> Arc<KeyManager> {
    Arc::new(KeyManager::initialize(source, config()).await.unwrap())
}

#[test]
fn test_next_delay_after_success() {
    assert_eq!(
        next_refresh_delay(&config(), true, false),
        (Duration::from_secs(100), false)
    );
}

#[test]
fn test_next_delay_after_first_failure_is_backoff() {
    assert_eq!(
        next_refresh_delay(&config(), false, false),
        (Duration::from_secs(10), true)
    );
}

#[test]
fn test_next_delay_after_failed_retry_resumes_interval() {
    assert_eq!(
        next_refresh_delay(&config(), false, true),
        (Duration::from_secs(100), false)
    );
}

#[test]
fn test_backoff_never_exceeds_interval() {
    let config = KeyManagerConfig::default()
        .with_refresh_interval(Duration::from_secs(5))
        .with_retry_backoff(Duration::from_secs(60));
    assert_eq!(
        next_refresh_delay(&config, false, false),
        (Duration::from_secs(5), true)
    );
}

#[tokio::test(start_paused = true)]
async fn test_schedule_retries_once_then_resumes_interval() {
    let source = Arc::new(InMemorySecretSource::primary());
    let manager = manager(Arc::clone(&source)).await;
    assert_eq!(source.fetch_count(), 1);

    let task = KeyRefreshTask::spawn(Arc::clone(&manager));

    // t=100: scheduled refresh succeeds
    tokio::time::sleep(Duration::from_secs(101)).await;
    assert_eq!(source.fetch_count(), 2);

    // t=200: scheduled refresh fails
    source.set_unavailable(true);
    tokio::time::sleep(Duration::from_secs(100)).await;
    assert_eq!(source.fetch_count(), 3);
    assert_eq!(manager.consecutive_failures(), 1);

    // t=210: the single retry fails too
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(source.fetch_count(), 4);
    assert_eq!(manager.consecutive_failures(), 2);

    // No further attempts until the normal cadence
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(source.fetch_count(), 4);

    // t=310: back on schedule, source recovered
    source.set_unavailable(false);
    tokio::time::sleep(Duration::from_secs(80)).await;
    assert_eq!(source.fetch_count(), 5);
    assert_eq!(manager.consecutive_failures(), 0);

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_successful_retry_picks_up_rotation() {
    let source = Arc::new(InMemorySecretSource::primary());
    let manager = manager(Arc::clone(&source)).await;
    let task = KeyRefreshTask::spawn(Arc::clone(&manager));

    source.rotate_to_secondary();
    source.set_unavailable(true);
    tokio::time::sleep(Duration::from_secs(101)).await;
    assert_ne!(manager.active_kid(), ROTATED_KID);

    source.set_unavailable(false);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(manager.active_kid(), ROTATED_KID);
    assert_eq!(source.fetch_count(), 3);

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_refreshing() {
    let source = Arc::new(InMemorySecretSource::primary());
    let manager = manager(Arc::clone(&source)).await;
    let task = KeyRefreshTask::spawn(manager);

    task.shutdown().await;
    tokio::time::sleep(Duration::from_secs(1000)).await;
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_task() {
    let source = Arc::new(InMemorySecretSource::primary());
    let manager = manager(Arc::clone(&source)).await;
    let task = KeyRefreshTask::spawn(manager);
    let token = task.cancel_token().clone();

    drop(task);
    assert!(token.is_cancelled());

    tokio::time::sleep(Duration::from_secs(1000)).await;
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_slow_refresh() {
    let source = Arc::new(InMemorySecretSource::primary());
    let manager = manager(Arc::clone(&source)).await;
    source.set_delay(Some(Duration::from_secs(2)));
    let task = KeyRefreshTask::spawn(manager);

    // Refresh starts at t=100 and would finish at t=102
    tokio::time::sleep(Duration::from_secs(101)).await;
    assert_eq!(source.fetch_count(), 2);

    task.shutdown().await;
}
