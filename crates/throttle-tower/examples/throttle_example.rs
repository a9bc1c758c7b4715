use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use throttle_tower::{Outcome, ThrottleLayer};
use tower::{Service, ServiceBuilder, ServiceExt};

#[tokio::main]
async fn main() {
    let increases = Arc::new(AtomicUsize::new(0));
    let decreases = Arc::new(AtomicUsize::new(0));

    let i = Arc::clone(&increases);
    let d = Arc::clone(&decreases);

    // Start at 20ms, never go below 5ms or above 200ms.
    let layer = ThrottleLayer::<u16, std::convert::Infallible>::builder()
        .name("flaky-upstream")
        .initial_sleep(Duration::from_millis(20))
        .min_sleep(Duration::from_millis(5))
        .max_sleep(Duration::from_millis(200))
        .classify(|result| match result {
            Ok(200) => Some(Outcome::Success),
            Ok(_) => Some(Outcome::Failure),
            Err(_) => None,
        })
        .on_increase(move |from, to| {
            i.fetch_add(1, Ordering::SeqCst);
            println!("  slowing down: {:?} -> {:?}", from, to);
        })
        .on_decrease(move |from, to| {
            d.fetch_add(1, Ordering::SeqCst);
            println!("  speeding up:  {:?} -> {:?}", from, to);
        })
        .build();

    // The upstream is overloaded for the first few calls, then recovers.
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let upstream = tower::service_fn(move |_req: ()| {
        let n = c.fetch_add(1, Ordering::SeqCst);
        async move {
            let status = if n < 4 { 503u16 } else { 200u16 };
            Ok::<_, std::convert::Infallible>(status)
        }
    });

    let mut service = ServiceBuilder::new().layer(layer).service(upstream);

    println!("Sending 10 requests to a recovering upstream...\n");

    for n in 1..=10 {
        let before = service.duration();
        match service.ready().await {
            Ok(svc) => match svc.call(()).await {
                Ok(status) => println!("Request {}: slept {:?}, got {}", n, before, status),
                Err(never) => match never {},
            },
            Err(never) => match never {},
        }
    }

    println!(
        "\nSummary: {} increases, {} decreases, now sleeping {:?}",
        increases.load(Ordering::SeqCst),
        decreases.load(Ordering::SeqCst),
        service.duration()
    );
}
