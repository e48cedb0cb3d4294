use crate::support::{wait_until, wired};
use futures::future::join_all;
use permit_core::testing::MockOracle;
use permit_core::{PermissionCoordinator, PermitError};
use std::sync::Arc;
use tokio_test::{assert_pending, assert_ready_eq, task};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_prompt() {
    let fx = wired();
    let callers = 8;

    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let coordinator = fx.coordinator.clone();
            tokio::spawn(async move { coordinator.request("camera").await })
        })
        .collect();

    wait_until(|| fx.coordinator.waiter_count("camera") == callers).await;
    assert_eq!(fx.launcher.single_launches().len(), 1);

    fx.launcher.take_single("camera").unwrap().resolve(true);

    let results = join_all(handles).await;
    for result in results {
        assert_eq!(result.unwrap(), Ok(true));
    }
    assert_eq!(fx.launcher.single_launches().len(), 1);
    assert!(fx.coordinator.snapshot().is_idle());
}

#[tokio::test]
async fn already_granted_never_prompts() {
    let fx = wired();
    fx.oracle.grant("camera");

    assert_eq!(fx.coordinator.request("camera").await, Ok(true));
    assert!(fx.launcher.single_launches().is_empty());
    assert!(fx.coordinator.is_granted("camera"));
}

#[test]
fn distinct_keys_resolve_independently() {
    let fx = wired();

    let mut camera = task::spawn(fx.coordinator.request("camera"));
    let mut microphone = task::spawn(fx.coordinator.request("microphone"));
    assert_pending!(camera.poll());
    assert_pending!(microphone.poll());

    let launched: Vec<String> = fx
        .launcher
        .single_launches()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(launched, vec!["camera", "microphone"]);

    fx.launcher.take_single("microphone").unwrap().resolve(false);
    assert_ready_eq!(microphone.poll(), Ok(false));
    assert_pending!(camera.poll());

    fx.launcher.take_single("camera").unwrap().resolve(true);
    assert_ready_eq!(camera.poll(), Ok(true));
}

#[test]
fn each_round_rechecks_and_prompts_again() {
    let fx = wired();

    let mut first = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(first.poll());
    fx.launcher.take_single("camera").unwrap().resolve(false);
    assert_ready_eq!(first.poll(), Ok(false));

    let mut second = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(second.poll());
    assert_eq!(fx.launcher.single_launches().len(), 2);

    fx.launcher.take_single("camera").unwrap().resolve(true);
    assert_ready_eq!(second.poll(), Ok(true));
}

#[test]
fn orphaned_result_is_discarded() {
    let fx = wired();
    assert_eq!(fx.coordinator.resolve_single("camera", true), 0);
    assert!(fx.coordinator.snapshot().is_idle());
}

#[test]
fn resolve_single_by_key_reaches_every_waiter() {
    let fx = wired();

    let mut first = task::spawn(fx.coordinator.request("camera"));
    let mut second = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(first.poll());
    assert_pending!(second.poll());

    assert_eq!(fx.coordinator.resolve_single("camera", true), 2);
    assert_ready_eq!(first.poll(), Ok(true));
    assert_ready_eq!(second.poll(), Ok(true));

    // The parked reply now has nothing to resolve.
    fx.launcher.take_single("camera").unwrap().resolve(false);
}

#[test]
fn not_ready_leaves_no_waiter() {
    let oracle = Arc::new(MockOracle::new());
    let coordinator = PermissionCoordinator::new(oracle);

    let mut single = task::spawn(coordinator.request("camera"));
    assert_ready_eq!(single.poll(), Err(PermitError::NotReady));

    let mut batch = task::spawn(coordinator.request_batch(["camera", "microphone"]));
    assert_ready_eq!(batch.poll(), Err(PermitError::NotReady));

    assert!(coordinator.snapshot().is_idle());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn result_may_arrive_from_another_thread() {
    let fx = wired();

    let coordinator = fx.coordinator.clone();
    let waiting = tokio::spawn(async move { coordinator.request("location").await });
    wait_until(|| fx.coordinator.waiter_count("location") == 1).await;

    let reply = fx.launcher.take_single("location").unwrap();
    std::thread::spawn(move || reply.resolve(true))
        .join()
        .unwrap();

    assert_eq!(waiting.await.unwrap(), Ok(true));
}
