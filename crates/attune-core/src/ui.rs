//! UI sink boundary.
//!
//! The surrounding shell (console, web page, desktop UI) implements this
//! trait; every call is a synchronous fire-and-forget render instruction with
//! no return contract. Controls that accept user input take a handler that
//! the shell invokes on change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::led::{Color, LedMode};
use crate::telemetry::{MuteState, SpeechAnalytics};

/// Severity of an output log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// Metadata attached to an output log line.
#[derive(Debug, Clone, Default)]
pub struct OutputMeta {
    pub level: OutputLevel,
    /// Device the line relates to, if any
    pub device_name: Option<String>,
}

impl OutputMeta {
    /// Line tagged with a device name.
    #[must_use]
    pub fn device(name: &str) -> Self {
        Self { level: OutputLevel::Info, device_name: Some(name.to_string()) }
    }

    #[must_use]
    pub fn level(mut self, level: OutputLevel) -> Self {
        self.level = level;
        self
    }
}

/// Handler invoked when the user changes the sidetone control.
pub type SidetoneHandler = Arc<dyn Fn(bool) + Send + Sync>;

/// Handler invoked when the user triggers the pairing flow.
pub type PairingHandler = Arc<dyn Fn() + Send + Sync>;

/// Handler invoked when the user changes the button color or mode controls.
pub type ButtonControlHandler = Arc<dyn Fn(Color, LedMode) + Send + Sync>;

/// Render surface exposed by the surrounding shell.
pub trait UiSink: Send + Sync {
    /// Append a timestamped line to the output log.
    fn write_output(&self, message: &str, meta: OutputMeta);

    /// Show the name of the active headset; `None` clears the field.
    fn set_active_headset_name(&self, name: Option<&str>);

    /// Update the ambient noise field; `None` renders as not available.
    fn set_ambient_noise(&self, value: Option<f64>);

    /// Update the audio exposure field; `None` renders as not available.
    fn set_audio_exposure(&self, value: Option<f64>);

    fn set_speech_analytics(&self, state: SpeechAnalytics);

    fn set_mute_state(&self, state: MuteState);

    /// Populate the sidetone control. `None` disables it; a handler wires
    /// user changes back to the property writer.
    fn set_sidetone(&self, value: Option<bool>, on_change: Option<SidetoneHandler>);

    /// Surface the pairing control for permission-gated transports.
    fn enable_pairing_control(&self, on_request: PairingHandler);

    /// Enable the three-dot button color/mode controls.
    fn enable_three_dot_controls(&self, on_change: ButtonControlHandler);

    /// Reflect the current three-dot LED color and mode.
    fn set_three_dot_color_and_mode(&self, color: Color, mode: LedMode);

    /// Clear all device-bound fields back to their neutral state.
    fn reset(&self);
}
