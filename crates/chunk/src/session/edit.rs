use super::{ChunkSession, InsertInput, InsertOp, InsertOutcome, InsertParams};
use crate::transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "kebab-case")]
pub enum CopyMode {
    /// Effective text with line breaks removed.
    Text,
    /// Original text of the selected chunks, line breaks kept.
    OriginalText,
}

impl ChunkSession {
    pub async fn delete_selected_text(&mut self) -> Option<InsertOutcome> {
        let range = self.text_selection.range()?;
        let outcome = self
            .insert(
                InsertInput::transform(move |text| transform::delete_range(text, range)),
                InsertParams::default(),
            )
            .await;
        Some(outcome)
    }

    /// Removes every second character of the selection, or of the whole text.
    pub async fn delete_every_second_character(&mut self) -> InsertOutcome {
        let range = self
            .text_selection
            .range()
            .unwrap_or((0, self.current().text.char_len().saturating_sub(1)));
        self.insert(
            InsertInput::transform(move |text| transform::delete_every_second_char(text, range)),
            InsertParams::default(),
        )
        .await
    }

    pub async fn duplicate_selected_text(&mut self) -> Option<InsertOutcome> {
        let range = self.text_selection.range()?;
        let outcome = self
            .insert(
                InsertInput::transform(move |text| transform::duplicate_range(text, range)),
                InsertParams::default(),
            )
            .await;
        Some(outcome)
    }

    pub async fn hiragana_to_katakana_selected(&mut self) -> InsertOutcome {
        let converted = transform::hiragana_to_katakana(&self.current_effective_text());
        self.replace_selected(converted).await
    }

    pub async fn katakana_to_hiragana_selected(&mut self) -> InsertOutcome {
        let converted = transform::katakana_to_hiragana(&self.current_effective_text());
        self.replace_selected(converted).await
    }

    /// Replaces the selected text, or the whole text when nothing is selected.
    pub async fn replace_selected(&mut self, text: impl Into<String>) -> InsertOutcome {
        self.insert(
            InsertInput::Text(text.into()),
            InsertParams::with_op(InsertOp::ReplaceSelected),
        )
        .await
    }

    /// Text for the clipboard, flashing what was copied. `None` when there is nothing to
    /// copy.
    pub fn copy_text(&mut self, mode: CopyMode) -> Option<String> {
        let text = match mode {
            CopyMode::Text => self
                .effective_text_segments()
                .iter()
                .map(|segment| transform::clipboard_form(segment))
                .collect::<Vec<_>>()
                .join("\n"),
            CopyMode::OriginalText => self.original_effective_text_segments().join("\n"),
        };
        if text.is_empty() {
            return None;
        }

        let info = self.selection_info();
        if info.other_than_current_selected {
            self.flash_in_history(info.selected_indices);
        } else {
            self.flash_effective_current();
        }
        Some(text)
    }
}
