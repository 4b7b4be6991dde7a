use crate::id::ChunkId;
use crate::text::ChunkText;
use crate::translation::ChunkTranslation;

/// One captured unit of text as shown to the user.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: ChunkText,
    /// Verbatim form kept when the editable text diverges from it (e.g. line breaks).
    pub original_text: Option<String>,
    pub translation: Option<ChunkTranslation>,
    pub playback_time_s: Option<f64>,
    pub selected: bool,
    pub history_flashing: bool,
}

impl Chunk {
    pub fn new(id: ChunkId, text: ChunkText) -> Self {
        Self {
            id,
            text,
            original_text: None,
            translation: None,
            playback_time_s: None,
            selected: false,
            history_flashing: false,
        }
    }

    pub fn with_original_text(mut self, original_text: Option<String>) -> Self {
        self.original_text = original_text;
        self
    }

    pub fn with_translation(mut self, translation: Option<ChunkTranslation>) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_playback_time_s(mut self, playback_time_s: Option<f64>) -> Self {
        self.playback_time_s = playback_time_s;
        self
    }

    pub fn original_or_base(&self) -> &str {
        self.original_text
            .as_deref()
            .unwrap_or_else(|| self.text.base())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FlashState {
    #[default]
    NotFlashing,
    WholeFlashing,
    RangeFlashing { range: (usize, usize) },
}

/// Summary of the chunk-history selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct SelectionInfo {
    pub selected_indices: Vec<usize>,
    pub some_have_original_text: bool,
    pub other_than_current_selected: bool,
}

/// The current chunk's translation plus whatever of the previous chunk's translation is
/// still useful as context.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TranslationWithContext {
    pub current: Option<String>,
    pub previous: Option<String>,
}
