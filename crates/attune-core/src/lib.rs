//! Attune Core - shared domain types for headset telemetry and UI state.
//!
//! This crate contains the device identity and attachment events, the
//! telemetry aggregator with its derived speech/mute states, audio level
//! banding, the LED vocabulary for button customization, and the UI sink
//! trait implemented by the surrounding shell.

pub mod device;
pub mod led;
pub mod levels;
pub mod telemetry;
pub mod ui;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use device::{DeviceEvent, DeviceInfo, TransportContext};
pub use led::{Color, LedMode, NamedColor};
pub use levels::{Indication, audio_level_indication};
pub use telemetry::{MuteState, SpeechAnalytics, SpeechSignal, TelemetryAggregator};
pub use ui::{OutputLevel, OutputMeta, UiSink};
