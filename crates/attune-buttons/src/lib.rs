//! Attune Buttons - application takeover of customizable headset buttons.
//!
//! Some headsets carry a button with no default firmware behavior, available
//! for application-defined customization: an LED that can be set to a color
//! and illumination mode, plus an interaction event stream. This crate
//! exposes that boundary as a controller/button handle pair over a transport
//! seam; not every device supports takeover, and controller creation fails
//! cleanly for those that do not.

pub mod controller;
pub mod error;

pub use controller::{
    Button, ButtonId, ButtonInteraction, ButtonSignal, ButtonTransport, DeviceController,
    create_device_controller,
};
pub use error::{ButtonError, ButtonResult};
