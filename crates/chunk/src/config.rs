use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_CAPACITY;
use crate::sync::TranslationWindows;

/// Engine tuning. Every field has a default, so partial settings objects and a sparse
/// environment both load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(default)]
pub struct ChunkConfig {
    pub capacity: usize,
    /// Same text within this many seconds of the current chunk is a media replay.
    pub replay_window_s: f64,
    pub initial_max_delay_s: f64,
    pub initial_max_advance_s: f64,
    pub keep_around_s: f64,
    pub context_keep_around_s: f64,
    pub flash_duration_ms: u64,
    pub enhancement_timeout_ms: u64,
    pub event_capacity: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        let windows = TranslationWindows::default();
        Self {
            capacity: DEFAULT_CAPACITY,
            replay_window_s: 0.8,
            initial_max_delay_s: windows.max_initial_delay_s,
            initial_max_advance_s: windows.max_initial_advance_s,
            keep_around_s: windows.keep_around_s,
            context_keep_around_s: windows.context_keep_around_s,
            flash_duration_ms: 300,
            enhancement_timeout_ms: 3000,
            event_capacity: 64,
        }
    }
}

impl ChunkConfig {
    pub fn from_json(value: serde_json::Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Reads `CHUNK_*` variables, e.g. `CHUNK_CAPACITY=100`.
    pub fn from_env() -> crate::Result<Self> {
        Ok(envy::prefixed("CHUNK_").from_env()?)
    }

    pub fn translation_windows(&self) -> TranslationWindows {
        TranslationWindows {
            max_initial_delay_s: self.initial_max_delay_s,
            max_initial_advance_s: self.initial_max_advance_s,
            keep_around_s: self.keep_around_s,
            context_keep_around_s: self.context_keep_around_s,
        }
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    pub fn enhancement_timeout(&self) -> Duration {
        Duration::from_millis(self.enhancement_timeout_ms)
    }
}

/// User settings the engine consults synchronously.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Show only translations, each against an empty chunk.
    pub translation_only_mode: bool,
    /// Request pronunciation annotation for new text.
    #[serde(rename = "enable-furigana")]
    pub show_furigana: bool,
}

impl Settings {
    /// Reads the engine's flags out of the full settings object; unrelated keys are ignored.
    pub fn from_json(value: serde_json::Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
