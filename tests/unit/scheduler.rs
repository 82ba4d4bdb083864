//! Unit tests for the cron scheduler

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stockwatch::scheduler::{JobFuture, JobHandler, Scheduler};
use tokio::time::Duration;

fn counting_handler(counter: Arc<AtomicUsize>) -> JobHandler {
    Arc::new(move || -> JobFuture {
        let counter = counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    })
}

fn noop_handler() -> JobHandler {
    Arc::new(|| -> JobFuture { Box::pin(async { Ok(()) }) })
}

#[tokio::test]
async fn test_register_rejects_invalid_cron() {
    let scheduler = Scheduler::new();
    let result = scheduler
        .register_job("bad", "not a cron", noop_handler(), true)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_register_rejects_duplicate_name() {
    let scheduler = Scheduler::new();
    scheduler
        .register_job("sync", "0 */15 * * * *", noop_handler(), true)
        .await
        .unwrap();
    let result = scheduler
        .register_job("sync", "0 0 * * * *", noop_handler(), true)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_status_reflects_registration() {
    let scheduler = Scheduler::new();
    scheduler
        .register_job("sync", "0 */15 * * * *", noop_handler(), true)
        .await
        .unwrap();

    let status = scheduler.status().await;
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].name, "sync");
    assert_eq!(status[0].expression, "0 */15 * * * *");
    assert!(!status[0].running);
    assert!(status[0].last_run.is_none());
}

#[tokio::test]
async fn test_running_true_between_start_and_stop() {
    let scheduler = Scheduler::new();
    // Fires once a year; the job stays idle for the whole test.
    scheduler
        .register_job("yearly", "0 0 0 1 1 *", noop_handler(), true)
        .await
        .unwrap();

    scheduler.start().await;
    let status = scheduler.status().await;
    assert!(status[0].running, "idle job must report running while started");

    scheduler.stop().await;
    let status = scheduler.status().await;
    assert!(!status[0].running);
}

#[tokio::test]
async fn test_last_run_unset_when_handler_fails() {
    let handler: JobHandler =
        Arc::new(|| -> JobFuture { Box::pin(async { Err("handler failed".into()) }) });

    let scheduler = Scheduler::new();
    scheduler
        .register_job("broken", "* * * * * *", handler, true)
        .await
        .unwrap();

    scheduler.start().await;
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.stop().await;

    // The handler ran and failed every tick, so no completion is recorded.
    let status = scheduler.status().await;
    assert!(status[0].last_run.is_none());
}

#[tokio::test]
async fn test_start_and_stop_are_idempotent() {
    let scheduler = Scheduler::new();
    scheduler
        .register_job("sync", "0 */15 * * * *", noop_handler(), true)
        .await
        .unwrap();

    assert!(!scheduler.is_running().await);
    scheduler.start().await;
    assert!(scheduler.is_running().await);
    scheduler.start().await;
    assert!(scheduler.is_running().await);

    scheduler.stop().await;
    assert!(!scheduler.is_running().await);
    scheduler.stop().await;
    assert!(!scheduler.is_running().await);
}

#[tokio::test]
async fn test_job_runs_on_schedule() {
    let counter = Arc::new(AtomicUsize::new(0));
    let scheduler = Scheduler::new();
    scheduler
        .register_job("tick", "* * * * * *", counting_handler(counter.clone()), true)
        .await
        .unwrap();

    scheduler.start().await;
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.stop().await;

    let runs = counter.load(Ordering::SeqCst);
    assert!(runs >= 1, "job never ran");

    let status = scheduler.status().await;
    assert!(status[0].last_run.is_some());
}

#[tokio::test]
async fn test_overlap_guard_skips_concurrent_run() {
    // Handler outlives the one-second cron interval, so the second tick
    // must be skipped rather than stacked.
    let counter = Arc::new(AtomicUsize::new(0));
    let slow_counter = counter.clone();
    let handler: JobHandler = Arc::new(move || -> JobFuture {
        let counter = slow_counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        })
    });

    let scheduler = Scheduler::new();
    scheduler
        .register_job("slow", "* * * * * *", handler, true)
        .await
        .unwrap();

    scheduler.start().await;
    tokio::time::sleep(Duration::from_millis(3500)).await;

    let status = scheduler.status().await;
    assert!(status[0].running);

    scheduler.stop().await;

    assert_eq!(counter.load(Ordering::SeqCst), 1);

    let status = scheduler.status().await;
    assert!(!status[0].running);
    // The run never completed, so it never counts as a last run.
    assert!(status[0].last_run.is_none());
}
