//! Property write transactions and the transaction writer.

use std::sync::Arc;

use attune_core::{DeviceInfo, OutputLevel, OutputMeta, UiSink};

use crate::factory::{PropertyFactory, PropertyTransport};
use crate::error::PropertyResult;
use crate::value::PropertyValue;

/// An atomic batch of property writes.
///
/// Writes accumulate locally until [`commit`](Self::commit); the device
/// either applies the whole batch or none of it.
pub struct Transaction {
    serial: String,
    transport: Arc<dyn PropertyTransport>,
    writes: Vec<(String, PropertyValue)>,
}

impl Transaction {
    pub(crate) fn new(serial: String, transport: Arc<dyn PropertyTransport>) -> Self {
        Self { serial, transport, writes: Vec::new() }
    }

    /// Queue a write. Chainable.
    #[must_use]
    pub fn set(mut self, name: &str, value: PropertyValue) -> Self {
        self.writes.push((name.to_string(), value));
        self
    }

    /// Commit all queued writes as one unit.
    ///
    /// # Errors
    /// Whatever the transport reports; on error no write has taken effect.
    pub async fn commit(self) -> PropertyResult<()> {
        self.transport.commit(&self.serial, &self.writes).await
    }
}

/// Update one named property through a fresh, narrowly scoped map.
///
/// Atomic per call: the commit either takes effect on the device or the
/// prior value is unchanged. Success and failure each produce exactly one
/// device-tagged line on the UI sink; nothing propagates to the caller and
/// nothing is retried.
pub async fn update_property(
    factory: &PropertyFactory,
    sink: &Arc<dyn UiSink>,
    device: &DeviceInfo,
    name: &str,
    value: PropertyValue,
) {
    let map = factory.create_properties(device, &[name]);
    match map.start_transaction().set(name, value.clone()).commit().await {
        Ok(()) => {
            sink.write_output(
                &format!("Updated {name} to {value}"),
                OutputMeta::device(&device.name),
            );
        }
        Err(error) => {
            sink.write_output(
                &format!("Error writing {name}: {error}"),
                OutputMeta::device(&device.name).level(OutputLevel::Error),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::PropertyDefinition;
    use crate::testutil::{FakeTransport, device};
    use attune_core::test_support::recording_sink;

    fn factory(transport: &Arc<FakeTransport>) -> PropertyFactory {
        PropertyFactory::new(
            PropertyDefinition::builtin(),
            Arc::clone(transport) as Arc<dyn PropertyTransport>,
        )
    }

    #[tokio::test]
    async fn test_commit_applies_all_writes() {
        let transport = FakeTransport::with_defaults();
        let factory = factory(&transport);
        let (recorder, sink) = recording_sink();

        update_property(&factory, &sink, &device(), "sidetoneEnabled", PropertyValue::Bool(false))
            .await;

        assert_eq!(transport.value("sidetoneEnabled"), Some(PropertyValue::Bool(false)));
        let lines = recorder.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, OutputLevel::Info);
        assert!(lines[0].message.contains("Updated sidetoneEnabled to false"));
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_prior_value_unchanged() {
        let transport = FakeTransport::with_defaults();
        let factory = factory(&transport);
        let (recorder, sink) = recording_sink();
        transport.set_fail_commits(true);

        update_property(&factory, &sink, &device(), "sidetoneEnabled", PropertyValue::Bool(false))
            .await;

        // A subsequent read still observes the pre-attempt value.
        assert_eq!(transport.value("sidetoneEnabled"), Some(PropertyValue::Bool(true)));
        let errors = recorder.lines_at(OutputLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].device_name.as_deref(), Some("Aria 50"));
    }

    #[tokio::test]
    async fn test_unsupported_write_is_reported_not_thrown() {
        let transport = FakeTransport::with_defaults();
        let factory = factory(&transport);
        let (recorder, sink) = recording_sink();

        // firmwareVersion is read-only; the transport rejects the batch.
        update_property(
            &factory,
            &sink,
            &device(),
            "firmwareVersion",
            PropertyValue::Text("3.0.0".into()),
        )
        .await;

        assert_eq!(transport.value("firmwareVersion"), Some(PropertyValue::Text("2.10.0".into())));
        assert_eq!(recorder.lines_at(OutputLevel::Error).len(), 1);
    }
}
