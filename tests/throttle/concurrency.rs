//! Shared and independent throttles under parallel load.

use futures::future::join_all;
use std::time::Duration;
use throttle_tower::{ThrottleConfig, ThrottleLayer, Throttler};
use tower::{Layer, Service, ServiceExt};

fn fast_config() -> ThrottleConfig {
    ThrottleConfig::new()
        .with_initial_sleep(Duration::from_millis(1))
        .with_min_sleep(Duration::from_millis(1))
        .with_max_sleep(Duration::from_millis(50))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn clones_apply_every_outcome_once() {
    let layer = ThrottleLayer::<(), &'static str>::builder()
        .throttle_config(fast_config())
        .build();
    let service = layer.layer(tower::service_fn(|_req: ()| async {
        Err::<(), &'static str>("overloaded")
    }));

    let calls = (0..8).map(|_| {
        let mut clone = service.clone();
        tokio::spawn(async move {
            let _ = clone.ready().await.unwrap().call(()).await;
        })
    });
    for result in join_all(calls).await {
        result.unwrap();
    }

    let mut expected = Throttler::new(fast_config());
    for _ in 0..8 {
        expected.increase();
    }
    assert_eq!(service.duration(), expected.duration());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn workers_do_not_influence_each_other() {
    let layer = ThrottleLayer::<(), &'static str>::builder()
        .throttle_config(fast_config())
        .build();

    // Worker `n` sees `n` failures.
    let workers = (0..4usize).map(|failures| {
        let mut service = layer.layer(tower::service_fn(|fail: bool| async move {
            if fail {
                Err("overloaded")
            } else {
                Ok(())
            }
        }));
        tokio::spawn(async move {
            for _ in 0..failures {
                let _ = service.ready().await.unwrap().call(true).await;
            }
            (failures, service.duration())
        })
    });

    for result in join_all(workers).await {
        let (failures, duration) = result.unwrap();
        let mut expected = Throttler::new(fast_config());
        for _ in 0..failures {
            expected.increase();
        }
        assert_eq!(duration, expected.duration(), "worker with {} failures", failures);
    }
}
