//! Attune Session - initialization sequencing and per-device session setup.
//!
//! The device layer starts emitting attach events as soon as it is up, which
//! can be before the property subsystem has finished constructing its
//! factory. [`ReadinessLatch`] gates device handling behind a one-shot
//! readiness signal so early events park instead of racing construction.
//! [`SessionController`] then runs the fixed best-effort setup sequence for
//! each attached device: identity reads, telemetry watches, settings fields,
//! and button takeover, each failure isolated from the rest.

pub mod controller;
pub mod readiness;

pub use controller::SessionController;
pub use readiness::{InitPhase, Readiness, ReadinessLatch};
