//! Integration tests for the permission coordinator.

mod support;

mod batch;
mod cancellation;
mod single_flight;
