//! In-memory fake transport for this crate's tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use attune_core::DeviceInfo;

use crate::error::{PropertyError, PropertyResult};
use crate::factory::{PropertyTransport, WatchEvent};
use crate::value::PropertyValue;

pub fn device() -> DeviceInfo {
    DeviceInfo {
        name: "Aria 50".to_string(),
        product_id: 0x24c8,
        serial_number: "TEST-0001".to_string(),
    }
}

/// Fake transport backed by an in-memory value store.
pub struct FakeTransport {
    values: Mutex<HashMap<String, PropertyValue>>,
    watchers: Mutex<HashMap<String, Vec<mpsc::Sender<WatchEvent>>>>,
    unsupported_watch: Mutex<HashSet<String>>,
    settable: Mutex<HashSet<String>>,
    fail_commits: AtomicBool,
    watch_calls: AtomicUsize,
}

impl FakeTransport {
    pub fn with_defaults() -> Arc<Self> {
        let transport = Arc::new(Self {
            values: Mutex::new(HashMap::new()),
            watchers: Mutex::new(HashMap::new()),
            unsupported_watch: Mutex::new(HashSet::new()),
            settable: Mutex::new(HashSet::from(["sidetoneEnabled".to_string()])),
            fail_commits: AtomicBool::new(false),
            watch_calls: AtomicUsize::new(0),
        });
        transport.set_value("firmwareVersion", PropertyValue::Text("2.10.0".into()));
        transport.set_value("sidetoneEnabled", PropertyValue::Bool(true));
        transport
    }

    pub fn set_value(&self, name: &str, value: PropertyValue) {
        self.values.lock().insert(name.to_string(), value);
    }

    pub fn value(&self, name: &str) -> Option<PropertyValue> {
        self.values.lock().get(name).cloned()
    }

    /// Mark a property's watch capability as missing on the device.
    pub fn disable_watch(&self, name: &str) {
        self.unsupported_watch.lock().insert(name.to_string());
    }

    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }

    /// Fan a value out to every watcher of the property.
    pub fn push(&self, name: &str, value: PropertyValue) {
        self.set_value(name, value.clone());
        if let Some(senders) = self.watchers.lock().get(name) {
            for sender in senders {
                let _ = sender.try_send(WatchEvent::Value(value.clone()));
            }
        }
    }

    /// End every open watch stream, as on device detach.
    pub fn complete_watches(&self) {
        let mut watchers = self.watchers.lock();
        for senders in watchers.values() {
            for sender in senders {
                let _ = sender.try_send(WatchEvent::Complete);
            }
        }
        watchers.clear();
    }
}

#[async_trait]
impl PropertyTransport for FakeTransport {
    async fn read(&self, _serial: &str, name: &str) -> PropertyResult<PropertyValue> {
        self.values
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| PropertyError::Unsupported { property: name.to_string() })
    }

    async fn watch(&self, _serial: &str, name: &str) -> PropertyResult<mpsc::Receiver<WatchEvent>> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        if self.unsupported_watch.lock().contains(name) {
            return Err(PropertyError::Unsupported { property: name.to_string() });
        }
        let (tx, rx) = mpsc::channel(32);
        self.watchers.lock().entry(name.to_string()).or_default().push(tx);
        Ok(rx)
    }

    async fn commit(&self, _serial: &str, writes: &[(String, PropertyValue)]) -> PropertyResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(PropertyError::Rejected { message: "device refused the write batch".into() });
        }
        // Validate the whole batch before applying anything.
        {
            let settable = self.settable.lock();
            for (name, _) in writes {
                if !settable.contains(name) {
                    return Err(PropertyError::Unsupported { property: name.clone() });
                }
            }
        }
        for (name, value) in writes {
            self.set_value(name, value.clone());
        }
        Ok(())
    }
}
