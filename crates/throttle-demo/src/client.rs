//! Worker-pool client that paces itself against the demo server.
//!
//! Jobs are queued on a bounded channel and drained by a fixed number of
//! workers. Each worker owns its own throttle, so one worker backing off does
//! not slow down the others.

use crate::error::DemoError;
use futures::future::BoxFuture;
use reqwest::StatusCode;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use throttle_core::{Outcome, ThrottleConfig, Throttler};
use throttle_tower::{ThrottleLayer, ThrottleService};
use tokio::sync::{mpsc, Mutex};
use tower::{Layer, Service, ServiceExt};

/// Endpoint the client targets when none is given.
pub const DEFAULT_URL: &str = "http://localhost:23456/default";
pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_JOBS: usize = 1000;
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(50);

/// Upper bound on jobs buffered ahead of the workers.
const MAX_QUEUE_CAPACITY: usize = 1024;

/// One unit of work: a single request to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub id: usize,
}

/// Client run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub url: String,
    /// Number of concurrent workers. Zero is treated as one.
    pub workers: usize,
    pub jobs: usize,
    /// Delay before each worker is started.
    pub stagger: Duration,
    /// Settings every worker's throttle starts from.
    pub throttle: ThrottleConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            workers: DEFAULT_WORKERS,
            jobs: DEFAULT_JOBS,
            stagger: DEFAULT_STAGGER,
            throttle: ThrottleConfig::default(),
        }
    }
}

/// Totals over every job of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Jobs answered with `200`.
    pub succeeded: usize,
    /// Jobs answered with any other status.
    pub throttled: usize,
    /// Jobs whose request failed before a status was received.
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.throttled + self.failed
    }

    fn merge(&mut self, other: RunSummary) {
        self.succeeded += other.succeeded;
        self.throttled += other.throttled;
        self.failed += other.failed;
    }
}

/// Tower service issuing a `GET` to a fixed URL and yielding the status.
#[derive(Debug, Clone)]
pub struct StatusFetcher {
    client: reqwest::Client,
    url: Arc<str>,
}

impl StatusFetcher {
    pub fn new(client: reqwest::Client, url: impl Into<Arc<str>>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl Service<()> for StatusFetcher {
    type Response = StatusCode;
    type Error = reqwest::Error;
    type Future = BoxFuture<'static, Result<StatusCode, reqwest::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _request: ()) -> Self::Future {
        let request = self.client.get(&*self.url);
        Box::pin(async move {
            let response = request.send().await?;
            let status = response.status();
            // Drain the body so the connection can be reused.
            response.bytes().await?;
            Ok(status)
        })
    }
}

/// `200` speeds the worker up, any other status slows it down, and a
/// transport error leaves its throttle untouched.
pub fn classify_status(result: &Result<StatusCode, reqwest::Error>) -> Option<Outcome> {
    match result {
        Ok(status) if *status == StatusCode::OK => Some(Outcome::Success),
        Ok(_) => Some(Outcome::Failure),
        Err(_) => None,
    }
}

type ThrottledFetcher = ThrottleService<StatusFetcher, StatusCode, reqwest::Error>;

/// Two queued jobs per worker, capped so large pools cannot overflow the
/// channel size.
fn queue_capacity(workers: usize) -> usize {
    workers.saturating_mul(2).clamp(1, MAX_QUEUE_CAPACITY)
}

/// Runs every job to completion and returns the totals.
///
/// Fails up front if the throttle settings are contradictory or the HTTP
/// client cannot be built. Individual request failures are logged and
/// counted in [`RunSummary::failed`].
pub async fn run(config: ClientConfig) -> Result<RunSummary, DemoError> {
    Throttler::try_new(config.throttle)?;
    let client = reqwest::Client::builder().no_proxy().build()?;
    let url: Arc<str> = Arc::from(config.url.as_str());

    let workers = config.workers.max(1);
    let (tx, rx) = mpsc::channel(queue_capacity(workers));
    let rx = Arc::new(Mutex::new(rx));

    let jobs = config.jobs;
    let producer = tokio::spawn(async move {
        for id in 1..=jobs {
            if tx.send(Job { id }).await.is_err() {
                break;
            }
        }
    });

    let mut handles = Vec::new();
    for worker_id in 1..=workers {
        tokio::time::sleep(config.stagger).await;

        let service = ThrottleLayer::builder()
            .name(format!("worker-{}", worker_id))
            .throttle_config(config.throttle)
            .classify(classify_status)
            .build()
            .layer(StatusFetcher::new(client.clone(), Arc::clone(&url)));

        tracing::debug!(worker = worker_id, "starting worker");
        handles.push(tokio::spawn(worker(worker_id, service, Arc::clone(&rx))));
    }

    let mut summary = RunSummary::default();
    for handle in handles {
        summary.merge(handle.await?);
    }
    producer.await?;

    tracing::info!(
        succeeded = summary.succeeded,
        throttled = summary.throttled,
        failed = summary.failed,
        "run complete"
    );
    Ok(summary)
}

async fn worker(
    worker_id: usize,
    mut service: ThrottledFetcher,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
) -> RunSummary {
    let mut summary = RunSummary::default();

    loop {
        let Some(job) = jobs.lock().await.recv().await else {
            break;
        };

        tracing::info!(
            worker = worker_id,
            job = job.id,
            sleep = ?service.duration(),
            "processing job"
        );

        let result = match service.ready().await {
            Ok(ready) => ready.call(()).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(status) if status == StatusCode::OK => {
                summary.succeeded += 1;
                tracing::debug!(
                    worker = worker_id,
                    job = job.id,
                    status = status.as_u16(),
                    "decreasing throttle"
                );
            }
            Ok(status) => {
                summary.throttled += 1;
                tracing::info!(
                    worker = worker_id,
                    job = job.id,
                    status = status.as_u16(),
                    "increasing throttle"
                );
            }
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(worker = worker_id, job = job.id, error = %e, "request failed");
            }
        }
    }

    tracing::debug!(worker = worker_id, "no jobs left, worker stopping");
    summary
}
