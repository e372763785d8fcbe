//! Per-device session setup.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tracing::{debug, info};

use attune_buttons::{
    ButtonId, ButtonInteraction, ButtonSignal, ButtonTransport, create_device_controller,
};
use attune_core::led::{Color, LedMode, NamedColor};
use attune_core::ui::SidetoneHandler;
use attune_core::{
    DeviceInfo, OutputLevel, OutputMeta, SpeechSignal, TelemetryAggregator, UiSink,
};
use attune_properties::{
    PropertyError, PropertyFactory, PropertyValue, WatchHandler, update_property, watch_property,
};

use crate::readiness::Readiness;

/// Telemetry properties subscribed for supported models.
const TELEMETRY_PROPERTIES: &[&str] = &[
    "backgroundNoiseLevel",
    "audioExposure",
    "customerSpeaking",
    "agentSpeaking",
    "microphoneMuteState",
];

/// Orchestrates best-effort setup for each attached device.
///
/// Every step of the per-device sequence can fail independently; a failed
/// step is reported and the remaining steps still run. Partial setup is an
/// accepted terminal state, and nothing is rolled back.
pub struct SessionController {
    sink: Arc<dyn UiSink>,
    factory: Arc<PropertyFactory>,
    buttons: Arc<dyn ButtonTransport>,
    readiness: Readiness,
    supported_models: Vec<String>,
    aggregator: Arc<Mutex<TelemetryAggregator>>,
    active: Arc<ArcSwapOption<DeviceInfo>>,
}

impl SessionController {
    #[must_use]
    pub fn new(
        sink: Arc<dyn UiSink>,
        factory: Arc<PropertyFactory>,
        buttons: Arc<dyn ButtonTransport>,
        readiness: Readiness,
        supported_models: Vec<String>,
    ) -> Self {
        let aggregator = Arc::new(Mutex::new(TelemetryAggregator::new(Arc::clone(&sink))));
        Self {
            sink,
            factory,
            buttons,
            readiness,
            supported_models,
            aggregator,
            active: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// The device currently owning the telemetry state, if any.
    #[must_use]
    pub fn active_device(&self) -> Option<DeviceInfo> {
        self.active.load().as_deref().cloned()
    }

    /// Handle a newly attached device.
    ///
    /// Announces the device, then gates all property-dependent work on the
    /// readiness latch: attach events arriving before the property factory
    /// exists park here and resume once readiness is signaled.
    pub async fn on_device_added(&self, device: DeviceInfo) {
        info!(device = %device.name, serial = %device.serial_number, "device attached");
        self.sink.write_output(
            &format!(
                "Device attached/detected: Product ID: {:#06x}, Serial #: {}",
                device.product_id, device.serial_number
            ),
            OutputMeta::device(&device.name),
        );
        self.sink.set_active_headset_name(Some(&device.name));

        self.readiness.wait().await;

        self.read_identity_properties(&device).await;

        if !self.supported_models.iter().any(|model| model == &device.name) {
            debug!(device = %device.name, "model not in the telemetry allow-list");
            return;
        }

        // New active device: clear any previous device's derived state before
        // fresh subscriptions start delivering.
        self.sink.reset();
        self.active.store(Some(Arc::new(device.clone())));
        self.aggregator.lock().reset();
        self.sink.set_active_headset_name(Some(&device.name));

        self.observe_audio_telemetry(&device).await;
        self.setup_settings_fields(&device).await;
        self.customize_button(&device).await;
    }

    /// Handle a detached device.
    pub async fn on_device_removed(&self, serial_number: &str) {
        info!(serial = %serial_number, "device detached");
        let was_active = self
            .active
            .load()
            .as_deref()
            .is_some_and(|device| device.serial_number == serial_number);
        self.sink.write_output(
            &format!("Device detached: Serial #: {serial_number}"),
            OutputMeta::default(),
        );
        if was_active {
            self.active.store(None);
            self.sink.reset();
            self.aggregator.lock().reset();
            self.sink.set_active_headset_name(None);
        }
    }

    /// Read-only fetch of basic identity properties.
    async fn read_identity_properties(&self, device: &DeviceInfo) {
        let map = self.factory.create_properties(device, &["firmwareVersion"]);
        self.sink.write_output("Property map created", OutputMeta::device(&device.name));

        let Some(firmware) = map.get("firmwareVersion") else {
            self.sink.write_output(
                "Property firmwareVersion is not available on this device",
                OutputMeta::device(&device.name).level(OutputLevel::Warning),
            );
            return;
        };
        match firmware.get().await {
            Ok(value) => {
                self.sink.write_output(
                    &format!("Firmware version: {value}"),
                    OutputMeta::device(&device.name),
                );
            }
            Err(error) => {
                self.sink.write_output(
                    &format!(
                        "Error reading properties: {error}. Reading may not be supported by this device or transport"
                    ),
                    OutputMeta::device(&device.name).level(OutputLevel::Error),
                );
            }
        }
    }

    /// Subscribe the fixed telemetry property set.
    async fn observe_audio_telemetry(&self, device: &DeviceInfo) {
        let map = self.factory.create_properties(device, TELEMETRY_PROPERTIES);
        self.sink.write_output(
            "Property map for audio telemetry properties created",
            OutputMeta::device(&device.name),
        );

        let ambient_sink = Arc::clone(&self.sink);
        watch_property(
            device,
            &map,
            "backgroundNoiseLevel",
            Arc::clone(&self.sink),
            self.numeric_handler(device, move |value| ambient_sink.set_ambient_noise(Some(value))),
        )
        .await;

        let exposure_sink = Arc::clone(&self.sink);
        watch_property(
            device,
            &map,
            "audioExposure",
            Arc::clone(&self.sink),
            self.numeric_handler(device, move |value| exposure_sink.set_audio_exposure(Some(value))),
        )
        .await;

        for (name, signal) in [
            ("customerSpeaking", SpeechSignal::CustomerSpeaking),
            ("agentSpeaking", SpeechSignal::AgentSpeaking),
            ("microphoneMuteState", SpeechSignal::MicrophoneMuted),
        ] {
            watch_property(
                device,
                &map,
                name,
                Arc::clone(&self.sink),
                self.speech_handler(device, signal),
            )
            .await;
        }
    }

    /// Handler routing a numeric telemetry value to a UI field, ignoring
    /// deliveries from a device that is no longer active.
    fn numeric_handler(
        &self,
        device: &DeviceInfo,
        apply: impl Fn(f64) + Send + 'static,
    ) -> WatchHandler {
        let guard = active_guard(&self.active, &device.serial_number);
        Box::new(move |value| {
            if !guard() {
                return Ok(());
            }
            let Some(number) = value.as_number() else {
                return Err(PropertyError::Handler {
                    message: format!("expected a number, got {value}"),
                });
            };
            apply(number);
            Ok(())
        })
    }

    /// Handler routing a speaking/mute flag into the telemetry aggregator,
    /// ignoring deliveries from a device that is no longer active.
    fn speech_handler(&self, device: &DeviceInfo, signal: SpeechSignal) -> WatchHandler {
        let guard = active_guard(&self.active, &device.serial_number);
        let aggregator = Arc::clone(&self.aggregator);
        Box::new(move |value| {
            if !guard() {
                return Ok(());
            }
            let Some(flag) = value.as_bool() else {
                return Err(PropertyError::Handler {
                    message: format!("expected a boolean, got {value}"),
                });
            };
            aggregator.lock().update(signal, flag);
            Ok(())
        })
    }

    /// Read the writable settings and wire their UI controls to the writer.
    async fn setup_settings_fields(&self, device: &DeviceInfo) {
        let map = self.factory.create_properties(device, &["sidetoneEnabled"]);
        let Some(sidetone) = map.get("sidetoneEnabled") else {
            self.sink.write_output(
                "Property sidetoneEnabled is not available on this device",
                OutputMeta::device(&device.name).level(OutputLevel::Warning),
            );
            return;
        };

        match sidetone.get().await {
            Ok(value) => {
                let factory = Arc::clone(&self.factory);
                let sink = Arc::clone(&self.sink);
                let device = device.clone();
                let current = value.as_bool();
                let on_change: SidetoneHandler = Arc::new(move |enabled| {
                    let factory = Arc::clone(&factory);
                    let sink = Arc::clone(&sink);
                    let device = device.clone();
                    tokio::spawn(async move {
                        update_property(
                            &factory,
                            &sink,
                            &device,
                            "sidetoneEnabled",
                            PropertyValue::Bool(enabled),
                        )
                        .await;
                    });
                });
                self.sink.set_sidetone(current, Some(on_change));
            }
            Err(error) => {
                self.sink.write_output(
                    &format!(
                        "Error reading properties: {error}. This commonly happens when the device does not support settings over this transport"
                    ),
                    OutputMeta::device(&device.name).level(OutputLevel::Error),
                );
            }
        }
    }

    /// Attempt three-dot button takeover and wire the LED controls.
    async fn customize_button(&self, device: &DeviceInfo) {
        let controller = match create_device_controller(device, Arc::clone(&self.buttons)).await {
            Ok(controller) => controller,
            Err(error) => {
                self.sink.write_output(
                    &format!(
                        "Device controller could not be created: {error}. Device may not support button customization"
                    ),
                    OutputMeta::device(&device.name).level(OutputLevel::Error),
                );
                return;
            }
        };

        let button = match controller.button(ButtonId::ThreeDot).await {
            Ok(button) => button,
            Err(error) => {
                self.sink.write_output(
                    &format!("Could not take over the three-dot button: {error}"),
                    OutputMeta::device(&device.name).level(OutputLevel::Error),
                );
                return;
            }
        };

        match button.listen_for(ButtonInteraction::Down).await {
            Ok(mut signals) => {
                let sink = Arc::clone(&self.sink);
                let device_name = device.name.clone();
                tokio::spawn(async move {
                    while let Some(signal) = signals.recv().await {
                        match signal {
                            ButtonSignal::Interaction(_) => {
                                sink.write_output(
                                    "Three-dot button down event detected",
                                    OutputMeta::device(&device_name),
                                );
                            }
                            ButtonSignal::Error(error) => {
                                sink.write_output(
                                    &format!("Error listening for button down event: {error}"),
                                    OutputMeta::device(&device_name).level(OutputLevel::Error),
                                );
                            }
                        }
                    }
                    sink.write_output(
                        "Stopped listening for button down event",
                        OutputMeta::device(&device_name),
                    );
                });
            }
            Err(error) => {
                self.sink.write_output(
                    &format!("Could not listen for button events: {error}"),
                    OutputMeta::device(&device.name).level(OutputLevel::Warning),
                );
            }
        }

        // Initial LED state for the taken-over button.
        let color = Color::Named(NamedColor::Blue);
        let mode = LedMode::On;
        if let Err(error) = button.set_color(color, mode).await {
            self.sink.write_output(
                &format!("Error setting button color: {error}"),
                OutputMeta::device(&device.name).level(OutputLevel::Error),
            );
            return;
        }
        self.sink.set_three_dot_color_and_mode(color, mode);

        let sink = Arc::clone(&self.sink);
        let device_name = device.name.clone();
        self.sink.enable_three_dot_controls(Arc::new(move |color, mode| {
            let button = button.clone();
            let sink = Arc::clone(&sink);
            let device_name = device_name.clone();
            tokio::spawn(async move {
                match button.set_color(color, mode).await {
                    Ok(()) => sink.set_three_dot_color_and_mode(color, mode),
                    Err(error) => sink.write_output(
                        &format!("Error setting button color: {error}"),
                        OutputMeta::device(&device_name).level(OutputLevel::Error),
                    ),
                }
            });
        }));
    }
}

/// Guard closure that is true while the given serial is the active device.
fn active_guard(
    active: &Arc<ArcSwapOption<DeviceInfo>>,
    serial: &str,
) -> impl Fn() -> bool + Send + 'static {
    let active = Arc::clone(active);
    let serial = serial.to_string();
    move || active.load().as_deref().is_some_and(|device| device.serial_number == serial)
}
