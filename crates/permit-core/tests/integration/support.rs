use permit_core::testing::{MockOracle, RecordingLauncher};
use permit_core::PermissionCoordinator;
use std::sync::Arc;
use std::time::Duration;

pub struct Fixture {
    pub coordinator: PermissionCoordinator,
    pub oracle: Arc<MockOracle>,
    pub launcher: Arc<RecordingLauncher>,
}

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn wired() -> Fixture {
    init_test_logging();
    let oracle = Arc::new(MockOracle::new());
    let launcher = Arc::new(RecordingLauncher::new());
    let coordinator = PermissionCoordinator::builder(oracle.clone())
        .launcher(launcher.clone())
        .build();
    Fixture {
        coordinator,
        oracle,
        launcher,
    }
}

/// Spin until `condition` holds, yielding to other tasks in between.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached within 5s");
}
