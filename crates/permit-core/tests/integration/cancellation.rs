use crate::support::{wait_until, wired};
use std::time::Duration;
use tokio_test::{assert_pending, assert_ready_eq, task};

#[test]
fn cancelling_one_waiter_spares_its_sibling() {
    let fx = wired();

    let mut kept = task::spawn(fx.coordinator.request("camera"));
    let mut cancelled = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(kept.poll());
    assert_pending!(cancelled.poll());
    assert_eq!(fx.coordinator.waiter_count("camera"), 2);

    drop(cancelled);
    assert_eq!(fx.coordinator.waiter_count("camera"), 1);

    fx.launcher.take_single("camera").unwrap().resolve(true);
    assert_ready_eq!(kept.poll(), Ok(true));
    assert_eq!(fx.launcher.single_launches().len(), 1);
}

#[test]
fn cancelling_last_waiter_closes_entry() {
    let fx = wired();

    let mut abandoned = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(abandoned.poll());
    drop(abandoned);

    assert!(fx.coordinator.pending_permissions().is_empty());

    // A later caller launches a fresh prompt rather than waiting on the old one.
    let mut fresh = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(fresh.poll());
    assert_eq!(fx.launcher.single_launches().len(), 2);

    // The abandoned prompt's answer belongs to its own round and is discarded.
    fx.launcher.take_single("camera").unwrap().resolve(false);
    assert_pending!(fresh.poll());
    assert_eq!(fx.coordinator.waiter_count("camera"), 1);

    fx.launcher.take_single("camera").unwrap().resolve(true);
    assert_ready_eq!(fresh.poll(), Ok(true));
    assert!(fx.coordinator.snapshot().is_idle());
}

#[test]
fn dropped_reply_from_abandoned_round_leaves_newer_round_pending() {
    let fx = wired();

    let mut abandoned = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(abandoned.poll());
    drop(abandoned);

    let mut fresh = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(fresh.poll());

    drop(fx.launcher.take_single("camera"));
    assert!(!fresh.is_woken());
    assert_pending!(fresh.poll());
    assert_eq!(fx.coordinator.pending_permissions().len(), 1);

    fx.launcher.take_single("camera").unwrap().resolve(false);
    assert_ready_eq!(fresh.poll(), Ok(false));
}

#[test]
fn result_after_all_waiters_cancelled_is_harmless() {
    let fx = wired();

    let mut first = task::spawn(fx.coordinator.request("camera"));
    let mut second = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(first.poll());
    assert_pending!(second.poll());
    drop(first);
    drop(second);

    fx.launcher.take_single("camera").unwrap().resolve(true);
    assert!(fx.coordinator.snapshot().is_idle());
}

#[test]
fn cancelling_batch_clears_slot() {
    let fx = wired();

    let mut batch = task::spawn(fx.coordinator.request_batch(["camera", "microphone"]));
    assert_pending!(batch.poll());
    assert!(fx.coordinator.has_pending_batch());

    drop(batch);
    assert!(!fx.coordinator.has_pending_batch());

    // The eventual answer has nowhere to go.
    fx.launcher
        .take_batch()
        .unwrap()
        .resolve([("camera", true), ("microphone", true)]);
    assert!(fx.coordinator.snapshot().is_idle());
}

#[tokio::test(start_paused = true)]
async fn timeout_withdraws_the_waiter() {
    let fx = wired();

    let coordinator = fx.coordinator.clone();
    let sibling = tokio::spawn(async move { coordinator.request("camera").await });
    wait_until(|| fx.coordinator.waiter_count("camera") == 1).await;

    let timed_out =
        tokio::time::timeout(Duration::from_secs(30), fx.coordinator.request("camera")).await;
    assert!(timed_out.is_err());
    assert_eq!(fx.coordinator.waiter_count("camera"), 1);

    fx.launcher.take_single("camera").unwrap().resolve(true);
    assert_eq!(sibling.await.unwrap(), Ok(true));
}
