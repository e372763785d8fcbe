//! Headset device identity and attachment events.

use serde::{Deserialize, Serialize};

/// Identity of an attached headset, as reported by the device layer.
///
/// Instances are snapshots taken at attach time. A device may detach at any
/// moment, so holders must not assume the underlying hardware is still
/// reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Display name, also checked against the supported-model list
    pub name: String,
    /// USB product identifier
    pub product_id: u16,
    /// Stable serial number
    pub serial_number: String,
}

/// Events emitted by the device layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "data")]
pub enum DeviceEvent {
    /// A headset was attached or detected
    Attached(DeviceInfo),
    /// A headset was detached
    Detached { serial_number: String },
}

/// Transport negotiated by the device layer at startup.
///
/// A `PermissionGated` transport cannot see devices until the user approves
/// access through an explicit pairing flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportContext {
    /// Devices are visible without a pairing step
    Direct,
    /// A user-gesture pairing flow must run before devices appear
    PermissionGated,
}
