use crate::support::wired;
use permit_core::{Permission, PermissionResults, PermitError};
use tokio_test::{assert_pending, assert_ready, assert_ready_eq, task};

fn results(pairs: &[(&str, bool)]) -> PermissionResults {
    pairs.iter().map(|(p, g)| (Permission::from(*p), *g)).collect()
}

#[tokio::test]
async fn empty_batch_returns_immediately() {
    let fx = wired();

    let outcome = fx.coordinator.request_batch(Vec::<String>::new()).await;
    assert_eq!(outcome, Ok(PermissionResults::new()));
    assert!(fx.launcher.batch_launches().is_empty());
}

#[tokio::test]
async fn fully_granted_batch_skips_prompt() {
    let fx = wired();
    fx.oracle.grant("camera");
    fx.oracle.grant("microphone");

    let outcome = fx.coordinator.request_batch(["camera", "microphone"]).await;
    assert_eq!(
        outcome,
        Ok(results(&[("camera", true), ("microphone", true)]))
    );
    assert!(fx.launcher.batch_launches().is_empty());
}

#[test]
fn batch_launches_one_combined_prompt() {
    let fx = wired();
    fx.oracle.grant("camera");

    let mut batch = task::spawn(
        fx.coordinator
            .request_batch(["camera", "microphone", "camera", "location"]),
    );
    assert_pending!(batch.poll());

    let launches = fx.launcher.batch_launches();
    assert_eq!(launches.len(), 1);
    let keys: Vec<&str> = launches[0].iter().map(Permission::as_str).collect();
    assert_eq!(keys, vec!["camera", "microphone", "location"]);
    assert!(fx.launcher.single_launches().is_empty());

    fx.launcher.take_batch().unwrap().resolve([
        ("camera", true),
        ("microphone", true),
        ("location", false),
    ]);

    assert_ready_eq!(
        batch.poll(),
        Ok(results(&[
            ("camera", true),
            ("microphone", true),
            ("location", false)
        ]))
    );
    assert!(!fx.coordinator.has_pending_batch());
}

#[test]
fn batch_and_single_do_not_share_prompts() {
    let fx = wired();

    let mut batch = task::spawn(fx.coordinator.request_batch(["camera", "microphone"]));
    assert_pending!(batch.poll());

    let mut single = task::spawn(fx.coordinator.request("camera"));
    assert_pending!(single.poll());

    assert_eq!(fx.launcher.batch_launches().len(), 1);
    assert_eq!(fx.launcher.single_launches().len(), 1);
    assert_eq!(fx.coordinator.waiter_count("camera"), 1);

    fx.launcher.take_single("camera").unwrap().resolve(true);
    assert_ready_eq!(single.poll(), Ok(true));
    assert_pending!(batch.poll());
    assert!(fx.coordinator.has_pending_batch());

    fx.launcher
        .take_batch()
        .unwrap()
        .resolve([("camera", true), ("microphone", false)]);
    assert_ready_eq!(
        batch.poll(),
        Ok(results(&[("camera", true), ("microphone", false)]))
    );
}

#[test]
fn overlapping_batches_each_prompt_and_newer_supersedes() {
    let fx = wired();

    let mut first = task::spawn(fx.coordinator.request_batch(["camera", "microphone"]));
    assert_pending!(first.poll());
    let mut second = task::spawn(fx.coordinator.request_batch(["camera", "microphone"]));
    assert_pending!(second.poll());

    assert_eq!(fx.launcher.batch_launches().len(), 2);
    assert_ready_eq!(first.poll(), Err(PermitError::Superseded));

    // The first prompt's answer belongs to a displaced batch and is dropped.
    let stale = fx.launcher.take_batch().unwrap();
    stale.resolve([("camera", true), ("microphone", true)]);
    assert_pending!(second.poll());
    assert!(fx.coordinator.has_pending_batch());

    fx.launcher
        .take_batch()
        .unwrap()
        .resolve([("camera", false), ("microphone", true)]);
    let outcome = assert_ready!(second.poll()).unwrap();
    assert_eq!(outcome.get("camera"), Some(&false));
}

#[test]
fn resolve_batch_targets_active_batch() {
    let fx = wired();
    assert!(!fx.coordinator.resolve_batch([("camera", true)]));

    let mut batch = task::spawn(fx.coordinator.request_batch(["camera"]));
    assert_pending!(batch.poll());

    assert!(fx.coordinator.resolve_batch([("camera", true)]));
    assert_ready_eq!(batch.poll(), Ok(results(&[("camera", true)])));

    // The launcher's handle now finds nothing to resolve.
    fx.launcher.take_batch().unwrap().resolve([("camera", false)]);
    assert!(fx.coordinator.snapshot().is_idle());
}

#[test]
fn snapshot_reports_active_batch() {
    let fx = wired();

    let mut batch = task::spawn(fx.coordinator.request_batch(["location", "camera"]));
    assert_pending!(batch.poll());

    let snapshot = fx.coordinator.snapshot();
    let keys: Vec<&str> = snapshot
        .batch
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(Permission::as_str)
        .collect();
    assert_eq!(keys, vec!["location", "camera"]);
    assert!(snapshot.singles.is_empty());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["batch"][0], "location");
    assert_eq!(json["torn_down"], false);

    drop(batch);
    assert!(!fx.coordinator.has_pending_batch());
}
