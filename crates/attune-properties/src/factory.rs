//! Property factory, per-device property maps, and watch streams.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use attune_core::DeviceInfo;

use crate::definition::{PropertyDefinition, PropertyDescriptor};
use crate::error::{PropertyError, PropertyResult};
use crate::transaction::Transaction;
use crate::value::PropertyValue;

/// Events delivered on a property watch stream.
///
/// A stream terminates with exactly one `Error` or one `Complete`; values
/// before the terminal event arrive in emission order and are never dropped
/// or reordered.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Value(PropertyValue),
    Error(PropertyError),
    Complete,
}

/// Transport seam to the device-side property implementation.
///
/// Implementations resolve property names against a single device addressed
/// by serial number. `commit` is all-or-nothing: when it fails, none of the
/// writes may have taken effect on the device.
#[async_trait]
pub trait PropertyTransport: Send + Sync {
    /// One-shot read of the current value.
    async fn read(&self, serial: &str, name: &str) -> PropertyResult<PropertyValue>;

    /// Open a live watch stream for the property.
    async fn watch(&self, serial: &str, name: &str) -> PropertyResult<mpsc::Receiver<WatchEvent>>;

    /// Apply a batch of writes atomically.
    async fn commit(&self, serial: &str, writes: &[(String, PropertyValue)]) -> PropertyResult<()>;
}

/// Creates per-device property maps from a capability definition.
pub struct PropertyFactory {
    definition: PropertyDefinition,
    transport: Arc<dyn PropertyTransport>,
}

impl PropertyFactory {
    #[must_use]
    pub fn new(definition: PropertyDefinition, transport: Arc<dyn PropertyTransport>) -> Self {
        Self { definition, transport }
    }

    /// Build a property map for the requested names on one device.
    ///
    /// Names missing from the definition are left out of the map; looking
    /// them up later yields `None` rather than an error.
    #[must_use]
    pub fn create_properties(&self, device: &DeviceInfo, names: &[&str]) -> PropertyMap {
        let mut entries = HashMap::new();
        for name in names {
            if let Some(descriptor) = self.definition.descriptor(name) {
                entries.insert(
                    (*name).to_string(),
                    PropertyHandle {
                        descriptor: descriptor.clone(),
                        serial: device.serial_number.clone(),
                        transport: Arc::clone(&self.transport),
                    },
                );
            } else {
                debug!(property = *name, "requested property not in definition");
            }
        }
        PropertyMap {
            entries,
            serial: device.serial_number.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

/// Per-device lookup of property handles for a fixed set of requested names.
pub struct PropertyMap {
    entries: HashMap<String, PropertyHandle>,
    serial: String,
    transport: Arc<dyn PropertyTransport>,
}

impl PropertyMap {
    /// Look up a handle; absent for names the definition does not cover.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyHandle> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Open a write transaction against this map's device.
    #[must_use]
    pub fn start_transaction(&self) -> Transaction {
        Transaction::new(self.serial.clone(), Arc::clone(&self.transport))
    }
}

/// Handle to one named property on one device.
#[derive(Clone)]
pub struct PropertyHandle {
    descriptor: PropertyDescriptor,
    serial: String,
    transport: Arc<dyn PropertyTransport>,
}

impl PropertyHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    #[must_use]
    pub fn descriptor(&self) -> &PropertyDescriptor {
        &self.descriptor
    }

    /// One-shot read of the current value.
    ///
    /// # Errors
    /// `Unsupported` when the property does not declare read support;
    /// otherwise whatever the transport reports.
    pub async fn get(&self) -> PropertyResult<PropertyValue> {
        if !self.descriptor.get {
            return Err(PropertyError::Unsupported { property: self.name().to_string() });
        }
        self.transport.read(&self.serial, self.name()).await
    }

    /// Open a live watch stream for this property.
    ///
    /// # Errors
    /// `Unsupported` when the property does not declare watch support;
    /// otherwise whatever the transport reports.
    pub async fn watch(&self) -> PropertyResult<mpsc::Receiver<WatchEvent>> {
        if !self.descriptor.watch {
            return Err(PropertyError::Unsupported { property: self.name().to_string() });
        }
        self.transport.watch(&self.serial, self.name()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeTransport, device};
    use assert_matches::assert_matches;

    fn factory(transport: &Arc<FakeTransport>) -> PropertyFactory {
        PropertyFactory::new(
            PropertyDefinition::builtin(),
            Arc::clone(transport) as Arc<dyn PropertyTransport>,
        )
    }

    #[test]
    fn test_unknown_names_resolve_to_absent() {
        let transport = FakeTransport::with_defaults();
        let factory = factory(&transport);
        let map = factory.create_properties(&device(), &["firmwareVersion", "noSuchProperty"]);

        assert!(map.contains("firmwareVersion"));
        assert!(map.get("noSuchProperty").is_none());
    }

    #[tokio::test]
    async fn test_get_honors_capability_flags() {
        let transport = FakeTransport::with_defaults();
        let factory = factory(&transport);
        let map = factory
            .create_properties(&device(), &["firmwareVersion", "customerSpeaking"]);

        let firmware = map.get("firmwareVersion").unwrap().get().await.unwrap();
        assert_eq!(firmware.as_text(), Some("2.10.0"));

        // customerSpeaking is watch-only.
        let error = map.get("customerSpeaking").unwrap().get().await.unwrap_err();
        assert_matches!(error, PropertyError::Unsupported { .. });
    }

    #[tokio::test]
    async fn test_watch_requires_watch_capability() {
        let transport = FakeTransport::with_defaults();
        let factory = factory(&transport);
        let map = factory.create_properties(&device(), &["firmwareVersion"]);

        let error = map.get("firmwareVersion").unwrap().watch().await.unwrap_err();
        assert_matches!(error, PropertyError::Unsupported { .. });
        // The capability check failed locally; the transport was never asked.
        assert_eq!(transport.watch_calls(), 0);
    }

    #[tokio::test]
    async fn test_watch_delivers_values_in_emission_order() {
        let transport = FakeTransport::with_defaults();
        let factory = factory(&transport);
        let map = factory.create_properties(&device(), &["backgroundNoiseLevel"]);

        let mut stream = map.get("backgroundNoiseLevel").unwrap().watch().await.unwrap();
        transport.push("backgroundNoiseLevel", PropertyValue::Number(55.0));
        transport.push("backgroundNoiseLevel", PropertyValue::Number(70.0));
        transport.push("backgroundNoiseLevel", PropertyValue::Number(85.0));

        let mut seen = Vec::new();
        for _ in 0..3 {
            match stream.recv().await.unwrap() {
                WatchEvent::Value(value) => seen.push(value.as_number().unwrap()),
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(seen, vec![55.0, 70.0, 85.0]);
    }
}
