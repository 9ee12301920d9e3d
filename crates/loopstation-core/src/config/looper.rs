//! Looper startup settings

use serde::{Deserialize, Serialize};

use crate::types::{
    clamp_to, DEFAULT_FEEDBACK, DEFAULT_OVERDUB_GAIN, DEFAULT_VOLUME, FEEDBACK_RANGE,
    OVERDUB_GAIN_RANGE, VOLUME_RANGE,
};

/// Looper settings loaded at startup
///
/// Missing fields take their defaults, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LooperConfig {
    /// Initial feedback level (0.0 - 1.0)
    /// Fraction of the existing loop kept on every overdub pass.
    /// Default: 0.8
    pub feedback: f32,

    /// Initial output volume (0.0 - 2.0)
    /// Default: 1.0 (unity)
    pub volume: f32,

    /// Gain for new material layered during overdub (0.0 - 2.0)
    /// Default: 1.0
    pub overdub_gain: f32,

    /// Pass live input to the output while recording
    /// When false, recording is silent.
    /// Default: true
    pub monitor_while_recording: bool,

    /// Pass live input to the output while idle
    /// Default: true
    pub monitor_while_idle: bool,
}

impl Default for LooperConfig {
    fn default() -> Self {
        Self {
            feedback: DEFAULT_FEEDBACK,
            volume: DEFAULT_VOLUME,
            overdub_gain: DEFAULT_OVERDUB_GAIN,
            monitor_while_recording: true,
            monitor_while_idle: true,
        }
    }
}

impl LooperConfig {
    /// Copy with every level clamped into its valid range
    pub fn sanitized(&self) -> Self {
        Self {
            feedback: clamp_to(self.feedback, FEEDBACK_RANGE),
            volume: clamp_to(self.volume, VOLUME_RANGE),
            overdub_gain: clamp_to(self.overdub_gain, OVERDUB_GAIN_RANGE),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: LooperConfig = serde_yaml::from_str("feedback: 0.5\n").unwrap();
        assert_eq!(config.feedback, 0.5);
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.overdub_gain, 1.0);
        assert!(config.monitor_while_recording);
        assert!(config.monitor_while_idle);
    }

    #[test]
    fn test_sanitized_clamps_levels() {
        let config = LooperConfig {
            feedback: 1.4,
            volume: 9.0,
            overdub_gain: -1.0,
            monitor_while_recording: false,
            ..LooperConfig::default()
        }
        .sanitized();

        assert_eq!(config.feedback, 1.0);
        assert_eq!(config.volume, 2.0);
        assert_eq!(config.overdub_gain, 0.0);
        assert!(!config.monitor_while_recording);
    }
}
