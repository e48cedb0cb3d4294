pub mod batch;
pub mod check;
pub mod request;

use permit_config::PermitConfig;
use permit_core::PermissionCoordinator;

use crate::host::SimulatedHost;

/// A coordinator bound to a fresh simulated host.
pub(crate) fn simulated(config: &PermitConfig) -> (SimulatedHost, PermissionCoordinator) {
    let host = SimulatedHost::new(&config.simulator);
    let coordinator =
        PermissionCoordinator::for_host(host.oracle.clone(), &host, config.coordinator.clone());
    (host, coordinator)
}
