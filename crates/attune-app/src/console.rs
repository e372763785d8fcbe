//! Console rendering of the UI sink.
//!
//! Stands in for the demo's form fields: every render call becomes a stamped
//! stdout line, and interactive controls are stored as handlers that the
//! stdin command loop dispatches to.

use std::time::Instant;

use parking_lot::Mutex;

use attune_core::led::{Color, LedMode};
use attune_core::{
    Indication, MuteState, OutputLevel, OutputMeta, SpeechAnalytics, UiSink,
    audio_level_indication,
};
use attune_core::ui::{ButtonControlHandler, PairingHandler, SidetoneHandler};

#[derive(Default)]
struct Fields {
    active_name: Option<String>,
    ambient_noise: Option<f64>,
    audio_exposure: Option<f64>,
    speech_analytics: Option<SpeechAnalytics>,
    mute_state: Option<MuteState>,
    sidetone: Option<bool>,
    three_dot: Option<(Color, LedMode)>,
}

#[derive(Default)]
struct Controls {
    sidetone: Option<SidetoneHandler>,
    pairing: Option<PairingHandler>,
    button: Option<ButtonControlHandler>,
}

/// Console implementation of the UI sink.
pub struct ConsoleSink {
    started: Instant,
    fields: Mutex<Fields>,
    controls: Mutex<Controls>,
}

impl ConsoleSink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            fields: Mutex::new(Fields::default()),
            controls: Mutex::new(Controls::default()),
        }
    }

    #[must_use]
    pub fn sidetone_handler(&self) -> Option<SidetoneHandler> {
        self.controls.lock().sidetone.clone()
    }

    #[must_use]
    pub fn pairing_handler(&self) -> Option<PairingHandler> {
        self.controls.lock().pairing.clone()
    }

    #[must_use]
    pub fn button_handler(&self) -> Option<ButtonControlHandler> {
        self.controls.lock().button.clone()
    }

    /// Print the current field values, as a status panel would show them.
    pub fn print_status(&self) {
        let fields = self.fields.lock();
        println!("  active headset : {}", fields.active_name.as_deref().unwrap_or("(none)"));
        println!("  ambient noise  : {}", render_level(fields.ambient_noise));
        println!("  audio exposure : {}", render_level(fields.audio_exposure));
        println!(
            "  speech         : {}",
            fields
                .speech_analytics
                .and_then(SpeechAnalytics::label)
                .unwrap_or("n/a")
        );
        println!(
            "  mute           : {}",
            fields.mute_state.and_then(MuteState::label).unwrap_or("n/a")
        );
        println!(
            "  sidetone       : {}",
            fields.sidetone.map_or("n/a".to_string(), |v| v.to_string())
        );
        match fields.three_dot {
            Some((color, mode)) => println!("  three-dot LED  : {color} ({mode})"),
            None => println!("  three-dot LED  : n/a"),
        }
    }

    fn stamp(&self) -> String {
        format!("{:>9.3}s", self.started.elapsed().as_secs_f64())
    }

    fn line(&self, text: &str) {
        println!("[{}] {text}", self.stamp());
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

fn level_tag(level: OutputLevel) -> &'static str {
    match level {
        OutputLevel::Info => "info ",
        OutputLevel::Warning => "warn ",
        OutputLevel::Error => "error",
    }
}

fn indication_tag(indication: Indication) -> &'static str {
    match indication {
        Indication::Unknown => "unknown",
        Indication::Normal => "normal",
        Indication::Good => "good",
        Indication::Warning => "warning",
        Indication::Critical => "critical",
    }
}

fn render_level(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v} ({})", indication_tag(audio_level_indication(v))),
        None => "n/a".to_string(),
    }
}

impl UiSink for ConsoleSink {
    fn write_output(&self, message: &str, meta: OutputMeta) {
        let tag = level_tag(meta.level);
        match meta.device_name {
            Some(device) => self.line(&format!("[{tag}] [{device}] {message}")),
            None => self.line(&format!("[{tag}] {message}")),
        }
    }

    fn set_active_headset_name(&self, name: Option<&str>) {
        self.fields.lock().active_name = name.map(str::to_string);
        self.line(&format!("active headset : {}", name.unwrap_or("(none)")));
    }

    fn set_ambient_noise(&self, value: Option<f64>) {
        self.fields.lock().ambient_noise = value;
        self.line(&format!("ambient noise  : {}", render_level(value)));
    }

    fn set_audio_exposure(&self, value: Option<f64>) {
        self.fields.lock().audio_exposure = value;
        self.line(&format!("audio exposure : {}", render_level(value)));
    }

    fn set_speech_analytics(&self, state: SpeechAnalytics) {
        self.fields.lock().speech_analytics = Some(state);
        self.line(&format!(
            "speech         : {} ({})",
            state.label().unwrap_or("n/a"),
            indication_tag(state.indication())
        ));
    }

    fn set_mute_state(&self, state: MuteState) {
        self.fields.lock().mute_state = Some(state);
        self.line(&format!(
            "mute           : {} ({})",
            state.label().unwrap_or("n/a"),
            indication_tag(state.indication())
        ));
    }

    fn set_sidetone(&self, value: Option<bool>, on_change: Option<SidetoneHandler>) {
        self.fields.lock().sidetone = value;
        if let Some(handler) = on_change {
            self.controls.lock().sidetone = Some(handler);
        }
        match value {
            Some(enabled) => self.line(&format!(
                "sidetone       : {enabled} (change with 'sidetone on|off')"
            )),
            None => self.line("sidetone       : n/a"),
        }
    }

    fn enable_pairing_control(&self, on_request: PairingHandler) {
        self.controls.lock().pairing = Some(on_request);
        self.line("pairing control enabled; run 'pair' to add a headset");
    }

    fn enable_three_dot_controls(&self, on_change: ButtonControlHandler) {
        self.controls.lock().button = Some(on_change);
        self.line("three-dot controls enabled; run 'color <name|R,G,B> [mode]'");
    }

    fn set_three_dot_color_and_mode(&self, color: Color, mode: LedMode) {
        self.fields.lock().three_dot = Some((color, mode));
        self.line(&format!("three-dot LED  : {color} ({mode})"));
    }

    fn reset(&self) {
        let mut fields = self.fields.lock();
        *fields = Fields::default();
        drop(fields);
        self.line("fields reset");
    }
}
