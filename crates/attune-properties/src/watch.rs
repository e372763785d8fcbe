//! Live property watch adapter.

use std::sync::Arc;

use tokio::task::JoinHandle;

use attune_core::{DeviceInfo, OutputLevel, OutputMeta, UiSink};

use crate::error::PropertyError;
use crate::factory::{PropertyMap, WatchEvent};
use crate::value::PropertyValue;

/// Handler invoked with each live value.
///
/// A failing handler is logged as a warning and never ends the stream.
pub type WatchHandler = Box<dyn FnMut(PropertyValue) -> Result<(), PropertyError> + Send>;

/// Subscribe to live changes of one property, when supported.
///
/// Establishes the subscription if and only if the property exists in the
/// map and declares watch support, then consumes the stream on its own task:
/// each value is logged tagged with the device and handed to `handler`; an
/// unsupported-capability error degrades to a warning and leaves the field
/// unknown; any other error is logged without touching sibling properties.
/// No retries, no resubscription.
///
/// Returns the consumer task handle, or `None` when no subscription was
/// established.
pub async fn watch_property(
    device: &DeviceInfo,
    map: &PropertyMap,
    name: &str,
    sink: Arc<dyn UiSink>,
    mut handler: WatchHandler,
) -> Option<JoinHandle<()>> {
    let Some(property) = map.get(name) else {
        sink.write_output(
            &format!("Property {name} is not available on this device"),
            OutputMeta::device(&device.name).level(OutputLevel::Warning),
        );
        return None;
    };

    sink.write_output(
        &format!("Subscribing to watch changes of {name}"),
        OutputMeta::device(&device.name),
    );

    let mut stream = match property.watch().await {
        Ok(stream) => stream,
        Err(error) => {
            report_watch_error(&sink, &device.name, name, &error);
            return None;
        }
    };

    let name = name.to_string();
    let device_name = device.name.clone();
    Some(tokio::spawn(async move {
        while let Some(event) = stream.recv().await {
            match event {
                WatchEvent::Value(value) => {
                    sink.write_output(&format!("{name}: {value}"), OutputMeta::device(&device_name));
                    if let Err(error) = handler(value) {
                        sink.write_output(
                            &format!("Handler for {name} failed: {error}"),
                            OutputMeta::device(&device_name).level(OutputLevel::Warning),
                        );
                    }
                }
                WatchEvent::Error(error) => {
                    report_watch_error(&sink, &device_name, &name, &error);
                    break;
                }
                WatchEvent::Complete => {
                    sink.write_output(
                        &format!("Completed observing {name}"),
                        OutputMeta::device(&device_name),
                    );
                    break;
                }
            }
        }
    }))
}

fn report_watch_error(sink: &Arc<dyn UiSink>, device_name: &str, name: &str, error: &PropertyError) {
    if error.is_unsupported() {
        sink.write_output(
            &format!("Could not subscribe to {name}. It may not be supported by this device"),
            OutputMeta::device(device_name).level(OutputLevel::Warning),
        );
    } else {
        sink.write_output(
            &format!("Failed monitoring {name}: {error}"),
            OutputMeta::device(device_name).level(OutputLevel::Error),
        );
    }
}
