//! Property capability definitions.
//!
//! A definition document lists the property names a factory can serve, each
//! with its value kind and capability flags. Vendors ship these as JSON next
//! to their property module; the built-in definition covers the headset
//! vocabulary this demo uses.

use serde::{Deserialize, Serialize};

use crate::error::{PropertyError, PropertyResult};
use crate::value::ValueKind;

/// Capability record for one named property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: ValueKind,
    /// Supports one-shot reads
    #[serde(default)]
    pub get: bool,
    /// Supports live watch subscriptions
    #[serde(default)]
    pub watch: bool,
    /// Supports transactional writes
    #[serde(default)]
    pub set: bool,
}

/// The capability vocabulary served by a property factory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub properties: Vec<PropertyDescriptor>,
}

impl PropertyDefinition {
    /// Parse a definition document from JSON.
    ///
    /// # Errors
    /// Returns [`PropertyError::Definition`] when the document is malformed.
    pub fn from_json(raw: &str) -> PropertyResult<Self> {
        serde_json::from_str(raw).map_err(|e| PropertyError::Definition { message: e.to_string() })
    }

    /// The built-in headset property vocabulary.
    #[must_use]
    pub fn builtin() -> Self {
        fn desc(name: &str, kind: ValueKind, get: bool, watch: bool, set: bool) -> PropertyDescriptor {
            PropertyDescriptor { name: name.to_string(), kind, get, watch, set }
        }

        Self {
            properties: vec![
                desc("firmwareVersion", ValueKind::Text, true, false, false),
                desc("backgroundNoiseLevel", ValueKind::Number, false, true, false),
                desc("audioExposure", ValueKind::Number, false, true, false),
                desc("customerSpeaking", ValueKind::Bool, false, true, false),
                desc("agentSpeaking", ValueKind::Bool, false, true, false),
                desc("microphoneMuteState", ValueKind::Bool, false, true, false),
                desc("sidetoneEnabled", ValueKind::Bool, true, false, true),
            ],
        }
    }

    /// Look up a descriptor by property name.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_builtin_covers_telemetry_vocabulary() {
        let definition = PropertyDefinition::builtin();
        for name in [
            "firmwareVersion",
            "backgroundNoiseLevel",
            "audioExposure",
            "customerSpeaking",
            "agentSpeaking",
            "microphoneMuteState",
            "sidetoneEnabled",
        ] {
            assert!(definition.descriptor(name).is_some(), "missing {name}");
        }
        assert!(definition.descriptor("noSuchProperty").is_none());
    }

    #[test]
    fn test_builtin_capabilities() {
        let definition = PropertyDefinition::builtin();
        let firmware = definition.descriptor("firmwareVersion").unwrap();
        assert!(firmware.get && !firmware.watch && !firmware.set);

        let sidetone = definition.descriptor("sidetoneEnabled").unwrap();
        assert!(sidetone.get && sidetone.set && !sidetone.watch);

        let speaking = definition.descriptor("agentSpeaking").unwrap();
        assert!(speaking.watch && !speaking.get && !speaking.set);
    }

    #[test]
    fn test_from_json_parses_documents() {
        let raw = r#"{
            "properties": [
                {"name": "batteryLevel", "kind": "number", "get": true, "watch": true}
            ]
        }"#;
        let definition = PropertyDefinition::from_json(raw).unwrap();
        let battery = definition.descriptor("batteryLevel").unwrap();
        assert_eq!(battery.kind, ValueKind::Number);
        assert!(battery.get && battery.watch && !battery.set);
    }

    #[test]
    fn test_from_json_rejects_malformed_documents() {
        let error = PropertyDefinition::from_json("not json").unwrap_err();
        assert_matches!(error, PropertyError::Definition { .. });
    }
}
