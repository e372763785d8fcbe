//! Attune Sim - a simulated headset behind the real transport seams.
//!
//! Implements the property and button transports plus the device event
//! stream, standing in for a vendor transport so the demo runs without
//! hardware. Tests drive it deterministically through value injection and
//! failure switches; the demo runs its scripted telemetry scenario instead.

pub mod headset;

pub use headset::{SimConfig, SimHeadset};
