//! Configuration types for the uiconfig system
//!
//! All knobs of the binding layer live in [`UiConfigSettings`]. It can be
//! built in code, deserialized from JSON, or filled from the environment by a
//! host binary.

use crate::scheduler::DispatchMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by the value pipeline, the undo coalescer and the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfigSettings {
    /// Window (in milliseconds) within which consecutive non-final writes to
    /// the same node are merged into one undo step
    #[serde(default = "default_undo_coalesce_window_ms")]
    pub undo_coalesce_window_ms: u64,

    /// Maximum number of entries kept by the bundled undo history
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Whether undo recording starts enabled
    #[serde(default = "default_undo_enabled")]
    pub undo_enabled: bool,

    /// Dispatch mode used by nodes that don't set one
    #[serde(default)]
    pub default_dispatch_mode: DispatchMode,

    /// Label of the renderer's root panel
    #[serde(default = "default_root_label")]
    pub root_label: String,

    /// Capacity of the renderer lifecycle event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Interval between frames when the renderer drives its own frame loop
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl UiConfigSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self {
            undo_coalesce_window_ms: default_undo_coalesce_window_ms(),
            history_capacity: default_history_capacity(),
            undo_enabled: default_undo_enabled(),
            default_dispatch_mode: DispatchMode::default(),
            root_label: default_root_label(),
            event_channel_capacity: default_event_channel_capacity(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }

    /// Parse settings from a JSON document, filling missing fields with defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> crate::Result<()> {
        if self.history_capacity == 0 {
            return Err(crate::Error::config("history_capacity must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        if self.frame_interval_ms == 0 {
            return Err(crate::Error::config("frame_interval_ms must be > 0"));
        }
        Ok(())
    }

    /// Coalescing window as a chrono duration
    pub fn coalesce_window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.undo_coalesce_window_ms as i64)
    }

    /// Frame interval as a std duration
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Set the coalescing window
    pub fn with_coalesce_window_ms(mut self, window_ms: u64) -> Self {
        self.undo_coalesce_window_ms = window_ms;
        self
    }

    /// Set the default dispatch mode
    pub fn with_default_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.default_dispatch_mode = mode;
        self
    }

    /// Set the history capacity
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

impl Default for UiConfigSettings {
    fn default() -> Self {
        Self::new()
    }
}

fn default_undo_coalesce_window_ms() -> u64 {
    2000
}

fn default_history_capacity() -> usize {
    100
}

fn default_undo_enabled() -> bool {
    true
}

fn default_root_label() -> String {
    "Configuration".to_string()
}

fn default_event_channel_capacity() -> usize {
    256
}

fn default_frame_interval_ms() -> u64 {
    16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let settings = UiConfigSettings::from_json("{}").unwrap();
        assert_eq!(settings, UiConfigSettings::default());
        assert_eq!(settings.undo_coalesce_window_ms, 2000);
        assert_eq!(settings.default_dispatch_mode, DispatchMode::PostFrame);
        assert_eq!(settings.root_label, "Configuration");
    }

    #[test]
    fn test_json_overrides() {
        let settings = UiConfigSettings::from_json(
            r#"{"undo_coalesce_window_ms": 500, "default_dispatch_mode": "immediate"}"#,
        )
        .unwrap();
        assert_eq!(settings.undo_coalesce_window_ms, 500);
        assert_eq!(settings.default_dispatch_mode, DispatchMode::Immediate);
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let settings = UiConfigSettings::new().with_history_capacity(0);
        assert!(settings.validate().is_err());
        assert!(UiConfigSettings::from_json(r#"{"frame_interval_ms": 0}"#).is_err());
    }
}
