//! Simulated headset device.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use attune_buttons::{ButtonError, ButtonId, ButtonInteraction, ButtonResult, ButtonSignal, ButtonTransport};
use attune_core::led::{Color, LedMode};
use attune_core::{DeviceEvent, DeviceInfo, TransportContext};
use attune_properties::{PropertyError, PropertyResult, PropertyTransport, PropertyValue, WatchEvent};

/// Property names the simulated device accepts writes for.
const SETTABLE: &[&str] = &["sidetoneEnabled"];

/// Simulated device settings.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Device model name
    pub name: String,
    pub product_id: u16,
    pub serial_number: String,
    pub transport_context: TransportContext,
    /// Delay before the device attaches on [`SimHeadset::start`]
    pub attach_delay: Duration,
    /// Whether the device supports button customization
    pub buttons_supported: bool,
    /// Run the scripted telemetry scenario after attach
    pub scenario: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "Aria 50".to_string(),
            product_id: 0x24c8,
            serial_number: "SIM-0001".to_string(),
            transport_context: TransportContext::Direct,
            attach_delay: Duration::from_millis(500),
            buttons_supported: true,
            scenario: false,
        }
    }
}

type WatcherKey = (String, String);

/// A simulated headset implementing the property and button transports.
pub struct SimHeadset {
    config: SimConfig,
    device_tx: broadcast::Sender<DeviceEvent>,
    attached: AtomicBool,
    values: Mutex<HashMap<String, PropertyValue>>,
    watchers: Mutex<HashMap<WatcherKey, Vec<mpsc::Sender<WatchEvent>>>>,
    unsupported_watch: Mutex<Vec<String>>,
    button_listeners: Mutex<Vec<mpsc::Sender<ButtonSignal>>>,
    last_color: Mutex<Option<(Color, LedMode)>>,
    fail_commits: AtomicBool,
    reads: AtomicUsize,
    watch_setups: AtomicUsize,
    watch_successes: AtomicUsize,
    commits: AtomicUsize,
}

impl SimHeadset {
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let (device_tx, _) = broadcast::channel(16);
        let values = HashMap::from([
            ("firmwareVersion".to_string(), PropertyValue::Text("2.10.0".into())),
            ("sidetoneEnabled".to_string(), PropertyValue::Bool(true)),
        ]);
        Self {
            config,
            device_tx,
            attached: AtomicBool::new(false),
            values: Mutex::new(values),
            watchers: Mutex::new(HashMap::new()),
            unsupported_watch: Mutex::new(Vec::new()),
            button_listeners: Mutex::new(Vec::new()),
            last_color: Mutex::new(None),
            fail_commits: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            watch_setups: AtomicUsize::new(0),
            watch_successes: AtomicUsize::new(0),
            commits: AtomicUsize::new(0),
        }
    }

    /// Subscribe to attach/detach events.
    #[must_use]
    pub fn subscribe_devices(&self) -> broadcast::Receiver<DeviceEvent> {
        self.device_tx.subscribe()
    }

    #[must_use]
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: self.config.name.clone(),
            product_id: self.config.product_id,
            serial_number: self.config.serial_number.clone(),
        }
    }

    #[must_use]
    pub fn transport_context(&self) -> TransportContext {
        self.config.transport_context
    }

    /// Begin the simulation: attach after the configured delay (gated
    /// transports wait for [`request_pairing`](Self::request_pairing)
    /// instead), then run the telemetry scenario when enabled.
    pub fn start(self: Arc<Self>) {
        if self.config.transport_context == TransportContext::PermissionGated {
            debug!("permission-gated transport: waiting for pairing before attach");
            return;
        }
        tokio::spawn(async move {
            tokio::time::sleep(self.config.attach_delay).await;
            self.attach();
            if self.config.scenario {
                self.spawn_scenario();
            }
        });
    }

    /// Run the user pairing flow; on gated transports this is what makes the
    /// device appear.
    pub fn request_pairing(self: Arc<Self>) {
        info!("pairing flow completed");
        if self.attached.load(Ordering::SeqCst) {
            return;
        }
        tokio::spawn(async move {
            self.attach();
            if self.config.scenario {
                self.spawn_scenario();
            }
        });
    }

    /// Mark the device attached and emit the attach event.
    pub fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
        let _ = self.device_tx.send(DeviceEvent::Attached(self.device_info()));
    }

    /// Mark the device detached: every open watch stream completes and every
    /// button listener stream ends.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
        {
            let mut watchers = self.watchers.lock();
            for senders in watchers.values() {
                for sender in senders {
                    let _ = sender.try_send(WatchEvent::Complete);
                }
            }
            watchers.clear();
        }
        self.button_listeners.lock().clear();
        let _ = self
            .device_tx
            .send(DeviceEvent::Detached { serial_number: self.config.serial_number.clone() });
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Inject a telemetry value, fanning it out to every watcher of the
    /// property regardless of serial.
    pub fn push_telemetry(&self, name: &str, value: PropertyValue) {
        self.values.lock().insert(name.to_string(), value.clone());
        let watchers = self.watchers.lock();
        for ((_, watched), senders) in watchers.iter() {
            if watched == name {
                for sender in senders {
                    let _ = sender.try_send(WatchEvent::Value(value.clone()));
                }
            }
        }
    }

    /// Inject a telemetry value for one device serial only.
    pub fn push_telemetry_for(&self, serial: &str, name: &str, value: PropertyValue) {
        let watchers = self.watchers.lock();
        if let Some(senders) = watchers.get(&(serial.to_string(), name.to_string())) {
            for sender in senders {
                let _ = sender.try_send(WatchEvent::Value(value.clone()));
            }
        }
    }

    /// Simulate a physical press of the three-dot button.
    pub fn press_three_dot(&self) {
        for listener in self.button_listeners.lock().iter() {
            let _ = listener.try_send(ButtonSignal::Interaction(ButtonInteraction::Down));
        }
    }

    /// Mark a property's watch capability as missing on this device.
    pub fn disable_watch(&self, name: &str) {
        self.unsupported_watch.lock().push(name.to_string());
    }

    /// Make every subsequent commit fail without applying writes.
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Current stored value of a property.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<PropertyValue> {
        self.values.lock().get(name).cloned()
    }

    /// Last LED color and mode set on the three-dot button.
    #[must_use]
    pub fn last_color(&self) -> Option<(Color, LedMode)> {
        *self.last_color.lock()
    }

    /// Total property transport calls (reads, watch setups, commits).
    #[must_use]
    pub fn property_ops(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
            + self.watch_setups.load(Ordering::SeqCst)
            + self.commits.load(Ordering::SeqCst)
    }

    /// Number of successfully established watch subscriptions.
    #[must_use]
    pub fn watch_count(&self) -> usize {
        self.watch_successes.load(Ordering::SeqCst)
    }

    /// Scripted telemetry: a random walk over the noise and exposure levels
    /// with occasional speaking/mute flips, until the device detaches.
    pub fn spawn_scenario(self: Arc<Self>) {
        let sim = self;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            let mut noise: f64 = 52.0;
            let mut exposure: f64 = 60.0;
            let mut customer = false;
            let mut agent = false;
            let mut muted = false;
            loop {
                interval.tick().await;
                if !sim.is_attached() {
                    break;
                }
                let press = {
                    let mut rng = rand::rng();
                    noise = (noise + rng.random_range(-6.0..8.0)).clamp(35.0, 95.0);
                    exposure = (exposure + rng.random_range(-5.0..6.0)).clamp(40.0, 92.0);
                    if rng.random_bool(0.35) {
                        customer = !customer;
                    }
                    if rng.random_bool(0.35) {
                        agent = !agent;
                    }
                    if rng.random_bool(0.1) {
                        muted = !muted;
                    }
                    rng.random_bool(0.05)
                };
                sim.push_telemetry("backgroundNoiseLevel", PropertyValue::Number(noise.round()));
                sim.push_telemetry("audioExposure", PropertyValue::Number(exposure.round()));
                sim.push_telemetry("customerSpeaking", PropertyValue::Bool(customer));
                sim.push_telemetry("agentSpeaking", PropertyValue::Bool(agent));
                sim.push_telemetry("microphoneMuteState", PropertyValue::Bool(muted));
                if press {
                    sim.press_three_dot();
                }
            }
        });
    }

    fn ensure_attached(&self) -> PropertyResult<()> {
        if self.is_attached() {
            Ok(())
        } else {
            Err(PropertyError::Transport { message: "device not attached".into() })
        }
    }
}

#[async_trait]
impl PropertyTransport for SimHeadset {
    async fn read(&self, _serial: &str, name: &str) -> PropertyResult<PropertyValue> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.ensure_attached()?;
        self.values
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| PropertyError::Unsupported { property: name.to_string() })
    }

    async fn watch(&self, serial: &str, name: &str) -> PropertyResult<mpsc::Receiver<WatchEvent>> {
        self.watch_setups.fetch_add(1, Ordering::SeqCst);
        self.ensure_attached()?;
        if self.unsupported_watch.lock().iter().any(|n| n == name) {
            return Err(PropertyError::Unsupported { property: name.to_string() });
        }
        let (tx, rx) = mpsc::channel(32);
        self.watchers
            .lock()
            .entry((serial.to_string(), name.to_string()))
            .or_default()
            .push(tx);
        self.watch_successes.fetch_add(1, Ordering::SeqCst);
        Ok(rx)
    }

    async fn commit(&self, _serial: &str, writes: &[(String, PropertyValue)]) -> PropertyResult<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.ensure_attached()?;
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(PropertyError::Rejected { message: "device refused the write batch".into() });
        }
        // Validate the whole batch before applying any of it.
        for (name, _) in writes {
            if !SETTABLE.contains(&name.as_str()) {
                return Err(PropertyError::Unsupported { property: name.clone() });
            }
        }
        let mut values = self.values.lock();
        for (name, value) in writes {
            values.insert(name.clone(), value.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl ButtonTransport for SimHeadset {
    async fn open(&self, _serial: &str) -> ButtonResult<()> {
        if !self.is_attached() {
            return Err(ButtonError::Transport("device not attached".into()));
        }
        if !self.config.buttons_supported {
            return Err(ButtonError::NotSupported);
        }
        Ok(())
    }

    async fn take_button(&self, _serial: &str, button: ButtonId) -> ButtonResult<()> {
        match button {
            ButtonId::ThreeDot => Ok(()),
        }
    }

    async fn listen(
        &self,
        _serial: &str,
        _button: ButtonId,
        _interaction: ButtonInteraction,
    ) -> ButtonResult<mpsc::Receiver<ButtonSignal>> {
        let (tx, rx) = mpsc::channel(8);
        self.button_listeners.lock().push(tx);
        Ok(rx)
    }

    async fn set_color(
        &self,
        _serial: &str,
        _button: ButtonId,
        color: Color,
        mode: LedMode,
    ) -> ButtonResult<()> {
        debug!(%color, %mode, "three-dot LED updated");
        *self.last_color.lock() = Some((color, mode));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_properties::{PropertyDefinition, PropertyFactory};

    fn attached_sim() -> Arc<SimHeadset> {
        let sim = Arc::new(SimHeadset::new(SimConfig::default()));
        sim.attach();
        sim
    }

    #[tokio::test]
    async fn test_watch_fans_out_in_order() {
        let sim = attached_sim();
        let mut stream = sim.watch("SIM-0001", "customerSpeaking").await.unwrap();

        sim.push_telemetry("customerSpeaking", PropertyValue::Bool(true));
        sim.push_telemetry("customerSpeaking", PropertyValue::Bool(false));

        assert!(matches!(stream.recv().await, Some(WatchEvent::Value(PropertyValue::Bool(true)))));
        assert!(matches!(stream.recv().await, Some(WatchEvent::Value(PropertyValue::Bool(false)))));
    }

    #[tokio::test]
    async fn test_detach_completes_watch_streams() {
        let sim = attached_sim();
        let mut stream = sim.watch("SIM-0001", "agentSpeaking").await.unwrap();

        sim.detach();
        assert!(matches!(stream.recv().await, Some(WatchEvent::Complete)));
        // Closed after the terminal event.
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let sim = attached_sim();
        let writes = vec![
            ("sidetoneEnabled".to_string(), PropertyValue::Bool(false)),
            ("firmwareVersion".to_string(), PropertyValue::Text("9.9.9".into())),
        ];

        // The read-only write poisons the whole batch.
        let error = sim.commit("SIM-0001", &writes).await.unwrap_err();
        assert!(matches!(error, PropertyError::Unsupported { .. }));
        assert_eq!(sim.value("sidetoneEnabled"), Some(PropertyValue::Bool(true)));
        assert_eq!(sim.value("firmwareVersion"), Some(PropertyValue::Text("2.10.0".into())));
    }

    #[tokio::test]
    async fn test_works_behind_the_property_factory() {
        let sim = attached_sim();
        let factory = PropertyFactory::new(
            PropertyDefinition::builtin(),
            Arc::clone(&sim) as Arc<dyn PropertyTransport>,
        );
        let map = factory.create_properties(&sim.device_info(), &["firmwareVersion"]);
        let value = map.get("firmwareVersion").unwrap().get().await.unwrap();
        assert_eq!(value.as_text(), Some("2.10.0"));
    }
}
