//! Speech telemetry aggregation and derived call states.
//!
//! Three boolean signals arrive independently from the device, in no
//! guaranteed order, and any of them may never arrive at all. The aggregator
//! keeps one optional slot per signal and recomputes both derived states from
//! the full current slot contents on every update, so the outcome does not
//! depend on arrival interleaving.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::levels::Indication;
use crate::ui::UiSink;

/// The independently arriving boolean telemetry signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechSignal {
    CustomerSpeaking,
    AgentSpeaking,
    MicrophoneMuted,
}

/// Derived speech analytics state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechAnalytics {
    /// Neither speaking signal has been observed yet
    Unknown,
    Silence,
    CustomerSpeaking,
    AgentSpeaking,
    /// Customer and agent speaking at the same time
    Crosstalk,
}

impl SpeechAnalytics {
    /// Rendered label; `None` for the unknown state.
    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Silence => Some("Silence"),
            Self::CustomerSpeaking => Some("Customer speaking"),
            Self::AgentSpeaking => Some("Agent speaking"),
            Self::Crosstalk => Some("Crosstalk"),
        }
    }

    #[must_use]
    pub fn indication(self) -> Indication {
        match self {
            Self::Unknown => Indication::Unknown,
            Self::Silence => Indication::Warning,
            Self::CustomerSpeaking | Self::AgentSpeaking => Indication::Normal,
            Self::Crosstalk => Indication::Critical,
        }
    }
}

/// Derived microphone mute state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuteState {
    /// The mute signal has not been observed yet
    Unknown,
    Unmuted,
    Muted,
    /// Muted while the agent speaking signal is active
    SpeakingWhileMuted,
}

impl MuteState {
    /// Rendered label; `None` for the unknown state.
    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Unmuted => Some("Unmuted"),
            Self::Muted => Some("Muted"),
            Self::SpeakingWhileMuted => Some("Speaking while muted"),
        }
    }

    #[must_use]
    pub fn indication(self) -> Indication {
        match self {
            Self::Unknown => Indication::Unknown,
            Self::Unmuted => Indication::Good,
            Self::Muted => Indication::Warning,
            Self::SpeakingWhileMuted => Indication::Critical,
        }
    }
}

/// Aggregates the speech telemetry slots for the currently active device and
/// pushes the derived states to the UI sink on every change.
///
/// Owned by the session controller; switching the active device requires an
/// explicit [`reset`](Self::reset) before reuse.
pub struct TelemetryAggregator {
    customer_speaking: Option<bool>,
    agent_speaking: Option<bool>,
    microphone_muted: Option<bool>,
    sink: Arc<dyn UiSink>,
}

impl TelemetryAggregator {
    #[must_use]
    pub fn new(sink: Arc<dyn UiSink>) -> Self {
        Self { customer_speaking: None, agent_speaking: None, microphone_muted: None, sink }
    }

    /// Set one signal slot and recompute both derived states.
    pub fn update(&mut self, signal: SpeechSignal, value: bool) {
        match signal {
            SpeechSignal::CustomerSpeaking => self.customer_speaking = Some(value),
            SpeechSignal::AgentSpeaking => self.agent_speaking = Some(value),
            SpeechSignal::MicrophoneMuted => self.microphone_muted = Some(value),
        }
        self.render();
    }

    /// Clear all slots to unknown and recompute. Used on device change.
    pub fn reset(&mut self) {
        self.customer_speaking = None;
        self.agent_speaking = None;
        self.microphone_muted = None;
        self.render();
    }

    /// Derived analytics state. Pure function of the current slots: unknown
    /// slots derive as false, but the state is `Unknown` only while neither
    /// speaking signal has ever been observed.
    #[must_use]
    pub fn speech_analytics(&self) -> SpeechAnalytics {
        if self.customer_speaking.is_none() && self.agent_speaking.is_none() {
            return SpeechAnalytics::Unknown;
        }
        let customer = self.customer_speaking.unwrap_or(false);
        let agent = self.agent_speaking.unwrap_or(false);
        match (customer, agent) {
            (true, true) => SpeechAnalytics::Crosstalk,
            (true, false) => SpeechAnalytics::CustomerSpeaking,
            (false, true) => SpeechAnalytics::AgentSpeaking,
            (false, false) => SpeechAnalytics::Silence,
        }
    }

    /// Derived mute state. `Unknown` while the mute signal has never been
    /// observed; an unknown agent signal derives as not speaking.
    #[must_use]
    pub fn mute_state(&self) -> MuteState {
        match self.microphone_muted {
            None => MuteState::Unknown,
            Some(true) if self.agent_speaking.unwrap_or(false) => MuteState::SpeakingWhileMuted,
            Some(true) => MuteState::Muted,
            Some(false) => MuteState::Unmuted,
        }
    }

    fn render(&self) {
        self.sink.set_speech_analytics(self.speech_analytics());
        self.sink.set_mute_state(self.mute_state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSink;

    fn aggregator() -> (TelemetryAggregator, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (TelemetryAggregator::new(sink.clone()), sink)
    }

    fn set_all(agg: &mut TelemetryAggregator, customer: bool, agent: bool, muted: bool) {
        agg.update(SpeechSignal::CustomerSpeaking, customer);
        agg.update(SpeechSignal::AgentSpeaking, agent);
        agg.update(SpeechSignal::MicrophoneMuted, muted);
    }

    #[test]
    fn test_derived_state_totality() {
        // Every combination of the three known booleans maps per the tables.
        let cases = [
            (false, false, false, SpeechAnalytics::Silence, MuteState::Unmuted),
            (false, false, true, SpeechAnalytics::Silence, MuteState::Muted),
            (false, true, false, SpeechAnalytics::AgentSpeaking, MuteState::Unmuted),
            (false, true, true, SpeechAnalytics::AgentSpeaking, MuteState::SpeakingWhileMuted),
            (true, false, false, SpeechAnalytics::CustomerSpeaking, MuteState::Unmuted),
            (true, false, true, SpeechAnalytics::CustomerSpeaking, MuteState::Muted),
            (true, true, false, SpeechAnalytics::Crosstalk, MuteState::Unmuted),
            (true, true, true, SpeechAnalytics::Crosstalk, MuteState::SpeakingWhileMuted),
        ];
        for (customer, agent, muted, analytics, mute) in cases {
            let (mut agg, _sink) = aggregator();
            set_all(&mut agg, customer, agent, muted);
            assert_eq!(agg.speech_analytics(), analytics, "case ({customer}, {agent}, {muted})");
            assert_eq!(agg.mute_state(), mute, "case ({customer}, {agent}, {muted})");
        }
    }

    #[test]
    fn test_update_order_does_not_matter() {
        let (mut forward, _) = aggregator();
        forward.update(SpeechSignal::CustomerSpeaking, true);
        forward.update(SpeechSignal::AgentSpeaking, true);

        let (mut reverse, _) = aggregator();
        reverse.update(SpeechSignal::AgentSpeaking, true);
        reverse.update(SpeechSignal::CustomerSpeaking, true);

        assert_eq!(forward.speech_analytics(), SpeechAnalytics::Crosstalk);
        assert_eq!(reverse.speech_analytics(), SpeechAnalytics::Crosstalk);
        assert_eq!(forward.mute_state(), reverse.mute_state());
    }

    #[test]
    fn test_unknown_is_distinct_from_known_false() {
        let (agg, _) = aggregator();
        assert_eq!(agg.speech_analytics(), SpeechAnalytics::Unknown);
        assert_eq!(agg.mute_state(), MuteState::Unknown);

        let (mut agg, _) = aggregator();
        agg.update(SpeechSignal::CustomerSpeaking, false);
        assert_eq!(agg.speech_analytics(), SpeechAnalytics::Silence);
        // Mute has still never been observed.
        assert_eq!(agg.mute_state(), MuteState::Unknown);

        agg.update(SpeechSignal::MicrophoneMuted, false);
        assert_eq!(agg.mute_state(), MuteState::Unmuted);
    }

    #[test]
    fn test_partial_observation_derives_unknown_as_false() {
        let (mut agg, _) = aggregator();
        agg.update(SpeechSignal::AgentSpeaking, true);
        assert_eq!(agg.speech_analytics(), SpeechAnalytics::AgentSpeaking);

        agg.update(SpeechSignal::MicrophoneMuted, true);
        assert_eq!(agg.mute_state(), MuteState::SpeakingWhileMuted);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let (mut agg, sink) = aggregator();
        set_all(&mut agg, true, true, true);

        agg.reset();
        let after_first = (agg.speech_analytics(), agg.mute_state());
        agg.reset();
        let after_second = (agg.speech_analytics(), agg.mute_state());

        assert_eq!(after_first, (SpeechAnalytics::Unknown, MuteState::Unknown));
        assert_eq!(after_first, after_second);
        assert_eq!(sink.speech_analytics(), Some(SpeechAnalytics::Unknown));
        assert_eq!(sink.mute_state(), Some(MuteState::Unknown));
    }

    #[test]
    fn test_every_update_renders_to_sink() {
        let (mut agg, sink) = aggregator();
        agg.update(SpeechSignal::CustomerSpeaking, true);
        assert_eq!(sink.speech_analytics(), Some(SpeechAnalytics::CustomerSpeaking));
        agg.update(SpeechSignal::AgentSpeaking, true);
        assert_eq!(sink.speech_analytics(), Some(SpeechAnalytics::Crosstalk));
        agg.update(SpeechSignal::AgentSpeaking, false);
        assert_eq!(sink.speech_analytics(), Some(SpeechAnalytics::CustomerSpeaking));
    }
}
