//! Configuration sections
//!
//! One module per concern, re-exported flat.

pub mod coordinator;
pub mod logging;
pub mod simulator;

pub use coordinator::*;
pub use logging::*;
pub use simulator::*;
