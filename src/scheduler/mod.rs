//! Cron-driven job scheduler with per-job overlap guards.

use crate::store::BoxError;
use chrono::{DateTime, Utc};
use cron::Schedule;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub type JobFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>>;
pub type JobHandler = Arc<dyn Fn() -> JobFuture + Send + Sync>;

struct Job {
    name: String,
    expression: String,
    schedule: Schedule,
    handler: JobHandler,
    prevent_overlap: bool,
    executing: AtomicBool,
    last_run: RwLock<Option<DateTime<Utc>>>,
}

/// Snapshot of one registered job's state.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub name: String,
    pub expression: String,
    /// True between `start()` and `stop()`.
    pub running: bool,
    /// When the handler last returned `Ok`, if it ever has.
    pub last_run: Option<DateTime<Utc>>,
}

/// Runs registered jobs on their cron schedules. A job whose previous run
/// is still executing is skipped at the next tick when its overlap guard
/// is on.
pub struct Scheduler {
    jobs: RwLock<Vec<Arc<Job>>>,
    handles: RwLock<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(Vec::new()),
            handles: RwLock::new(Vec::new()),
        }
    }

    /// Register a job under a unique name. Fails on a duplicate name or an
    /// unparseable cron expression.
    pub async fn register_job(
        &self,
        name: &str,
        cron_expr: &str,
        handler: JobHandler,
        prevent_overlap: bool,
    ) -> Result<(), BoxError> {
        let schedule = Schedule::from_str(cron_expr).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid cron expression '{}': {}", cron_expr, e),
            )) as BoxError
        })?;

        let mut jobs = self.jobs.write().await;
        if jobs.iter().any(|j| j.name == name) {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("Job '{}' is already registered", name),
            )));
        }

        info!(
            job = name,
            cron = cron_expr,
            "Scheduler: registered job '{}' (cron: {})",
            name,
            cron_expr
        );

        jobs.push(Arc::new(Job {
            name: name.to_string(),
            expression: cron_expr.to_string(),
            schedule,
            handler,
            prevent_overlap,
            executing: AtomicBool::new(false),
            last_run: RwLock::new(None),
        }));
        Ok(())
    }

    /// Spawn one tick loop per registered job. Calling start on a running
    /// scheduler is a no-op.
    pub async fn start(&self) {
        let mut handles = self.handles.write().await;
        if !handles.is_empty() {
            warn!("Scheduler: start called while already running");
            return;
        }

        let jobs = self.jobs.read().await;
        for job in jobs.iter() {
            let job = job.clone();
            handles.push(tokio::spawn(async move {
                info!(job = %job.name, "Scheduler: job '{}' waiting for cron schedule", job.name);
                loop {
                    let next_tick = match job.schedule.upcoming(Utc).next() {
                        Some(tick) => tick,
                        None => {
                            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                            continue;
                        }
                    };

                    let now = Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }

                    if job.prevent_overlap && job.executing.swap(true, Ordering::SeqCst) {
                        warn!(
                            job = %job.name,
                            "Scheduler: skipping tick, job '{}' is still running",
                            job.name
                        );
                        continue;
                    }
                    if !job.prevent_overlap {
                        job.executing.store(true, Ordering::SeqCst);
                    }

                    // Run detached so the tick loop keeps its schedule and
                    // the overlap guard can observe an in-flight run.
                    // last_run only records successful completions.
                    let run = job.clone();
                    tokio::spawn(async move {
                        match (run.handler)().await {
                            Ok(()) => {
                                let mut last_run = run.last_run.write().await;
                                *last_run = Some(Utc::now());
                            }
                            Err(e) => {
                                error!(job = %run.name, error = %e, "Scheduler: job '{}' failed", run.name);
                            }
                        }
                        run.executing.store(false, Ordering::SeqCst);
                    });
                }
            }));
        }

        info!(jobs = jobs.len(), "Scheduler: started {} jobs", jobs.len());
    }

    /// Abort every tick loop. Calling stop on a stopped scheduler is a
    /// no-op.
    pub async fn stop(&self) {
        let mut handles = self.handles.write().await;
        if handles.is_empty() {
            return;
        }
        for handle in handles.drain(..) {
            handle.abort();
        }
        info!("Scheduler: stopped");
    }

    pub async fn is_running(&self) -> bool {
        !self.handles.read().await.is_empty()
    }

    pub async fn status(&self) -> Vec<JobStatus> {
        let started = !self.handles.read().await.is_empty();
        let jobs = self.jobs.read().await;
        let mut statuses = Vec::with_capacity(jobs.len());
        for job in jobs.iter() {
            statuses.push(JobStatus {
                name: job.name.clone(),
                expression: job.expression.clone(),
                running: started,
                last_run: *job.last_run.read().await,
            });
        }
        statuses
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
