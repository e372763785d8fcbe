//! Recording fakes for tests in this crate and downstream crates.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::led::{Color, LedMode};
use crate::telemetry::{MuteState, SpeechAnalytics};
use crate::ui::{ButtonControlHandler, OutputLevel, OutputMeta, PairingHandler, SidetoneHandler, UiSink};

/// One captured output log line.
#[derive(Debug, Clone)]
pub struct RecordedLine {
    pub message: String,
    pub level: OutputLevel,
    pub device_name: Option<String>,
}

#[derive(Default)]
struct Recorded {
    lines: Vec<RecordedLine>,
    active_name: Option<String>,
    ambient_noise: Option<f64>,
    audio_exposure: Option<f64>,
    speech_analytics: Option<SpeechAnalytics>,
    mute_state: Option<MuteState>,
    sidetone: Option<Option<bool>>,
    sidetone_handler: Option<SidetoneHandler>,
    pairing_handler: Option<PairingHandler>,
    button_handler: Option<ButtonControlHandler>,
    three_dot: Option<(Color, LedMode)>,
    resets: usize,
}

/// A `UiSink` that records every call for assertions.
#[derive(Default)]
pub struct RecordingSink {
    state: Mutex<Recorded>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<RecordedLine> {
        self.state.lock().lines.clone()
    }

    /// Captured lines at the given level.
    #[must_use]
    pub fn lines_at(&self, level: OutputLevel) -> Vec<RecordedLine> {
        self.state.lock().lines.iter().filter(|l| l.level == level).cloned().collect()
    }

    /// Whether any captured line contains the given fragment.
    #[must_use]
    pub fn has_line_containing(&self, fragment: &str) -> bool {
        self.state.lock().lines.iter().any(|l| l.message.contains(fragment))
    }

    #[must_use]
    pub fn active_name(&self) -> Option<String> {
        self.state.lock().active_name.clone()
    }

    #[must_use]
    pub fn ambient_noise(&self) -> Option<f64> {
        self.state.lock().ambient_noise
    }

    #[must_use]
    pub fn audio_exposure(&self) -> Option<f64> {
        self.state.lock().audio_exposure
    }

    #[must_use]
    pub fn speech_analytics(&self) -> Option<SpeechAnalytics> {
        self.state.lock().speech_analytics
    }

    #[must_use]
    pub fn mute_state(&self) -> Option<MuteState> {
        self.state.lock().mute_state
    }

    /// Last value pushed to the sidetone control, if any.
    #[must_use]
    pub fn sidetone(&self) -> Option<Option<bool>> {
        self.state.lock().sidetone
    }

    #[must_use]
    pub fn sidetone_handler(&self) -> Option<SidetoneHandler> {
        self.state.lock().sidetone_handler.clone()
    }

    #[must_use]
    pub fn pairing_handler(&self) -> Option<PairingHandler> {
        self.state.lock().pairing_handler.clone()
    }

    #[must_use]
    pub fn button_handler(&self) -> Option<ButtonControlHandler> {
        self.state.lock().button_handler.clone()
    }

    #[must_use]
    pub fn three_dot(&self) -> Option<(Color, LedMode)> {
        self.state.lock().three_dot
    }

    #[must_use]
    pub fn reset_count(&self) -> usize {
        self.state.lock().resets
    }
}

impl UiSink for RecordingSink {
    fn write_output(&self, message: &str, meta: OutputMeta) {
        self.state.lock().lines.push(RecordedLine {
            message: message.to_string(),
            level: meta.level,
            device_name: meta.device_name,
        });
    }

    fn set_active_headset_name(&self, name: Option<&str>) {
        self.state.lock().active_name = name.map(str::to_string);
    }

    fn set_ambient_noise(&self, value: Option<f64>) {
        self.state.lock().ambient_noise = value;
    }

    fn set_audio_exposure(&self, value: Option<f64>) {
        self.state.lock().audio_exposure = value;
    }

    fn set_speech_analytics(&self, state: SpeechAnalytics) {
        self.state.lock().speech_analytics = Some(state);
    }

    fn set_mute_state(&self, state: MuteState) {
        self.state.lock().mute_state = Some(state);
    }

    fn set_sidetone(&self, value: Option<bool>, on_change: Option<SidetoneHandler>) {
        let mut state = self.state.lock();
        state.sidetone = Some(value);
        if let Some(handler) = on_change {
            state.sidetone_handler = Some(handler);
        }
    }

    fn enable_pairing_control(&self, on_request: PairingHandler) {
        self.state.lock().pairing_handler = Some(on_request);
    }

    fn enable_three_dot_controls(&self, on_change: ButtonControlHandler) {
        self.state.lock().button_handler = Some(on_change);
    }

    fn set_three_dot_color_and_mode(&self, color: Color, mode: LedMode) {
        self.state.lock().three_dot = Some((color, mode));
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.resets += 1;
        state.active_name = None;
        state.ambient_noise = None;
        state.audio_exposure = None;
        state.speech_analytics = None;
        state.mute_state = None;
        state.sidetone = None;
        state.three_dot = None;
    }
}

/// Convenience for passing a recording sink where an `Arc<dyn UiSink>` is
/// expected while keeping a handle for assertions.
#[must_use]
pub fn recording_sink() -> (Arc<RecordingSink>, Arc<dyn UiSink>) {
    let sink = Arc::new(RecordingSink::new());
    let dyn_sink: Arc<dyn UiSink> = sink.clone();
    (sink, dyn_sink)
}
