//! Audio level severity banding.

use serde::{Deserialize, Serialize};

/// Rendering severity for a UI field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indication {
    /// No signal observed yet
    Unknown,
    /// Informational, no particular weight
    Normal,
    /// Within the comfortable range
    Good,
    /// Elevated
    Warning,
    /// Above the safe range
    Critical,
}

/// Band an audio level value into a rendering severity.
///
/// Thresholds are a fixed contract: up to 65 is good, above 65 is a warning,
/// above 80 is critical.
#[must_use]
pub fn audio_level_indication(value: f64) -> Indication {
    if value > 80.0 {
        Indication::Critical
    } else if value > 65.0 {
        Indication::Warning
    } else {
        Indication::Good
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banding_thresholds() {
        assert_eq!(audio_level_indication(0.0), Indication::Good);
        assert_eq!(audio_level_indication(65.0), Indication::Good);
        assert_eq!(audio_level_indication(65.1), Indication::Warning);
        assert_eq!(audio_level_indication(80.0), Indication::Warning);
        assert_eq!(audio_level_indication(80.1), Indication::Critical);
        assert_eq!(audio_level_indication(120.0), Indication::Critical);
    }
}
