//! Auto-save configuration.

use serde::{Deserialize, Serialize};

/// When the active page buffer is flushed to the page cache.
///
/// Page switches and exports always flush; this only governs the flushes
/// in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Whether idle flushing is enabled.
    pub enabled: bool,

    /// Quiet period after the last edit before flushing, in milliseconds.
    pub debounce_ms: u64,

    /// Upper bound on how long an edit may stay unflushed while edits keep
    /// arriving, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl AutoSaveConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Flush every edit as soon as it is checked.
    pub fn immediate() -> Self {
        Self {
            enabled: true,
            debounce_ms: 0,
            max_delay_ms: 0,
        }
    }

    pub fn should_flush(&self, since_last_edit_ms: u64, since_first_unflushed_ms: u64) -> bool {
        self.enabled
            && (since_last_edit_ms >= self.debounce_ms
                || since_first_unflushed_ms >= self.max_delay_ms)
    }
}
