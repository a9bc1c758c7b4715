//! Middleware composition and pacing.

use futures::future::{ready, Ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use throttle_tower::{Outcome, ThrottleConfig, ThrottleLayer};
use tokio::time::Instant;
use tower::{Layer, Service, ServiceBuilder, ServiceExt};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// A backend that answers 503 for the first `overloaded` calls, then 200.
#[derive(Clone)]
struct RecoveringBackend {
    calls: Arc<AtomicUsize>,
    overloaded: usize,
}

impl Service<()> for RecoveringBackend {
    type Response = u16;
    type Error = &'static str;
    type Future = Ready<Result<u16, &'static str>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: ()) -> Self::Future {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        ready(Ok(if n < self.overloaded { 503 } else { 200 }))
    }
}

fn recovering_backend(overloaded: usize) -> RecoveringBackend {
    RecoveringBackend {
        calls: Arc::new(AtomicUsize::new(0)),
        overloaded,
    }
}

fn status_layer() -> ThrottleLayer<u16, &'static str> {
    ThrottleLayer::builder()
        .name("backend")
        .classify(|result| match result {
            Ok(200) => Some(Outcome::Success),
            Ok(_) => Some(Outcome::Failure),
            Err(_) => None,
        })
        .build()
}

#[tokio::test(start_paused = true)]
async fn backs_off_then_recovers() {
    let mut service = ServiceBuilder::new()
        .layer(status_layer())
        .service(recovering_backend(3));

    let mut observed = Vec::new();
    for _ in 0..5 {
        let before = service.duration();
        let start = Instant::now();
        service.ready().await.unwrap().call(()).await.unwrap();
        assert!(start.elapsed() >= before);
        observed.push(service.duration());
    }

    assert_eq!(
        observed,
        vec![
            ms(120),
            ms(144),
            Duration::from_nanos(172_800_000),
            Duration::from_nanos(138_240_000),
            Duration::from_nanos(110_592_000),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn total_wait_is_sum_of_durations() {
    let layer = ThrottleLayer::<u16, &'static str>::builder()
        .throttle_config(
            ThrottleConfig::new()
                .with_initial_sleep(ms(50))
                .with_min_sleep(ms(50)),
        )
        .build();
    let mut service = layer.layer(recovering_backend(0));

    let start = Instant::now();
    for _ in 0..4 {
        service.ready().await.unwrap().call(()).await.unwrap();
    }
    // Already at the floor, so every call waits exactly 50ms.
    assert_eq!(service.duration(), ms(50));
    assert!(start.elapsed() >= ms(200));
}

#[tokio::test(start_paused = true)]
async fn ceiling_stops_growth() {
    let layer = ThrottleLayer::<u16, &'static str>::builder()
        .max_sleep(ms(150))
        .classify(|_| Some(Outcome::Failure))
        .build();
    let mut service = layer.layer(recovering_backend(usize::MAX));

    for _ in 0..5 {
        service.ready().await.unwrap().call(()).await.unwrap();
    }
    assert_eq!(service.duration(), ms(150));
}

#[tokio::test(start_paused = true)]
async fn events_report_each_adjustment() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let inc = Arc::clone(&log);
    let dec = Arc::clone(&log);

    let layer = ThrottleLayer::<u16, &'static str>::builder()
        .classify(|result| match result {
            Ok(200) => Some(Outcome::Success),
            _ => Some(Outcome::Failure),
        })
        .on_increase(move |from, to| inc.lock().unwrap().push(("up", from, to)))
        .on_decrease(move |from, to| dec.lock().unwrap().push(("down", from, to)))
        .build();
    let mut service = layer.layer(recovering_backend(1));

    service.ready().await.unwrap().call(()).await.unwrap();
    service.ready().await.unwrap().call(()).await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![("up", ms(100), ms(120)), ("down", ms(120), ms(96))]
    );
}

#[tokio::test(start_paused = true)]
async fn handle_reset_is_seen_by_next_call() {
    let mut service = status_layer().layer(recovering_backend(2));
    let handle = service.handle();

    service.ready().await.unwrap().call(()).await.unwrap();
    service.ready().await.unwrap().call(()).await.unwrap();
    assert_eq!(handle.duration(), ms(144));

    handle.reset();

    let start = Instant::now();
    service.ready().await.unwrap().call(()).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= ms(10) && elapsed < ms(100));
    // The reset floor is also the minimum, so a success keeps it there.
    assert_eq!(service.duration(), ms(10));
}
