use std::fmt;
use std::ops::ControlFlow;

use super::ChunkSession;
use crate::enhance::EnhancementTicket;
use crate::events::ChunkEvent;
use crate::sync::TranslationSync;
use crate::text::{ChunkText, MaybeRuby, RawChunkText};
use crate::transform::splice;
use crate::types::Chunk;

/// New content for the current chunk.
pub enum InsertInput {
    Text(String),
    /// Already annotated text; used as is, without any merge op.
    Annotated(Vec<MaybeRuby>),
    /// Rewrites the current chunk's plain text.
    Transform(Box<dyn FnOnce(&str) -> String + Send>),
}

impl InsertInput {
    pub fn transform(f: impl FnOnce(&str) -> String + Send + 'static) -> Self {
        Self::Transform(Box::new(f))
    }
}

impl fmt::Debug for InsertInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Annotated(runs) => f.debug_tuple("Annotated").field(runs).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

impl From<&str> for InsertInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for InsertInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<MaybeRuby>> for InsertInput {
    fn from(value: Vec<MaybeRuby>) -> Self {
        Self::Annotated(value)
    }
}

/// How text input is merged with the current text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertOp {
    Append,
    #[default]
    Overwrite,
    /// Splice into the text selection; `alt_op` applies when nothing is selected.
    ReplaceSelected,
    /// `ReplaceSelected` while editing, `Overwrite` otherwise.
    OverwriteOrReplaceSelectedInEditMode,
}

impl InsertOp {
    fn resolve(self, alt_op: InsertOp, editing: bool, has_selection: bool) -> InsertOp {
        let op = match self {
            Self::OverwriteOrReplaceSelectedInEditMode if editing => Self::ReplaceSelected,
            Self::OverwriteOrReplaceSelectedInEditMode => Self::Overwrite,
            op => op,
        };
        match (op, alt_op) {
            (Self::ReplaceSelected, Self::Append) if !has_selection => Self::Append,
            (Self::ReplaceSelected, _) if !has_selection => Self::Overwrite,
            (op, _) => op,
        }
    }

    fn apply(self, input: &str, current: &str, selection: Option<(usize, usize)>) -> String {
        match (self, selection) {
            (Self::Append, _) => [current, input].concat(),
            (Self::ReplaceSelected, Some(range)) => splice(current, range, input),
            _ => input.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertParams {
    pub op: InsertOp,
    pub alt_op: InsertOp,
    /// Verbatim source text. Dropped when the op changed the input.
    pub original: Option<String>,
    pub playback_time_s: Option<f64>,
    pub allow_unchanged_text: bool,
    pub flash: bool,
    pub may_request_enhancement: bool,
    pub ignore_editing: bool,
    pub in_place: bool,
    pub force_keep_translation: bool,
}

impl Default for InsertParams {
    fn default() -> Self {
        Self {
            op: InsertOp::Overwrite,
            alt_op: InsertOp::Overwrite,
            original: None,
            playback_time_s: None,
            allow_unchanged_text: false,
            flash: false,
            may_request_enhancement: true,
            ignore_editing: false,
            in_place: false,
            force_keep_translation: false,
        }
    }
}

impl InsertParams {
    pub fn with_op(op: InsertOp) -> Self {
        Self {
            op,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Same text at nearly the same playback time as the current chunk.
    Replay,
    /// Merged into the edit buffer instead of the history.
    EditBuffer,
    Unchanged,
    Committed { index: usize, in_place: bool },
}

struct Transformed {
    raw: RawChunkText,
    original: Option<String>,
}

impl ChunkSession {
    /// Merges `input` into the history.
    ///
    /// When annotation is enabled and the session is not waiting for a new chunk, the
    /// enhancer is awaited before the chunk is committed; while waiting, the chunk is
    /// committed plain and annotated afterwards.
    pub async fn insert(
        &mut self,
        input: impl Into<InsertInput>,
        params: InsertParams,
    ) -> InsertOutcome {
        let Transformed { raw, original } = match self.transform_input(input.into(), &params) {
            ControlFlow::Continue(transformed) => transformed,
            ControlFlow::Break(outcome) => return outcome,
        };

        let plain_to_enhance = match &raw {
            RawChunkText::Plain(text)
                if params.may_request_enhancement
                    && self.settings.show_furigana
                    && !text.is_empty() =>
            {
                Some(text.clone())
            }
            _ => None,
        };

        let mut enhance_after_commit = false;
        let text = match plain_to_enhance {
            Some(plain) if !self.waiting => {
                let annotated = self.fetch_furigana(&plain).await.map(ChunkText::of);
                match annotated {
                    Some(annotated) if annotated.base() == plain => annotated,
                    Some(_) => {
                        tracing::debug!(text = %plain, "mismatched_enhancement_discarded");
                        ChunkText::of(raw)
                    }
                    None => ChunkText::of(raw),
                }
            }
            Some(_) => {
                enhance_after_commit = true;
                ChunkText::of(raw)
            }
            None => ChunkText::of(raw),
        };

        let outcome = self.commit(text, original, &params);

        if enhance_after_commit {
            self.enhance_current().await;
        }
        outcome
    }

    /// [`Self::insert`] without any annotation request, for callers that cannot await.
    pub(crate) fn insert_now(&mut self, input: InsertInput, params: InsertParams) -> InsertOutcome {
        match self.transform_input(input, &params) {
            ControlFlow::Continue(Transformed { raw, original }) => {
                self.commit(ChunkText::of(raw), original, &params)
            }
            ControlFlow::Break(outcome) => outcome,
        }
    }

    fn is_replay(&self, text: &str, playback_time_s: f64) -> bool {
        let current = self.current();
        current.playback_time_s.is_some_and(|time| {
            (playback_time_s - time).abs() <= self.config.replay_window_s
        }) && current.text.base() == text
    }

    fn transform_input(
        &mut self,
        input: InsertInput,
        params: &InsertParams,
    ) -> ControlFlow<InsertOutcome, Transformed> {
        let current_text = self.current().text.base().to_string();

        let (raw, original) = match input {
            InsertInput::Text(text) => {
                if params
                    .playback_time_s
                    .is_some_and(|time| self.is_replay(&text, time))
                {
                    tracing::debug!(text = %text, "replay_ignored");
                    return ControlFlow::Break(InsertOutcome::Replay);
                }

                if self.editing && !params.ignore_editing {
                    let selection = self.hooks.input_selection();
                    let op = params.op.resolve(params.alt_op, true, selection.is_some());
                    let merged = op.apply(&text, &self.edit_text, selection);
                    self.set_edit_text(merged);
                    return ControlFlow::Break(InsertOutcome::EditBuffer);
                }

                let selection = self.text_selection.range();
                let op = params
                    .op
                    .resolve(params.alt_op, self.editing, selection.is_some());
                let merged = op.apply(&text, &current_text, selection);
                let original = params.original.clone().filter(|_| merged == text);
                (merged, original)
            }
            InsertInput::Annotated(runs) => {
                return ControlFlow::Continue(Transformed {
                    raw: RawChunkText::Annotated(runs),
                    original: params.original.clone(),
                });
            }
            InsertInput::Transform(f) => (f(&current_text), None),
        };

        let original = original.or_else(|| raw.contains('\n').then(|| raw.clone()));
        if !params.allow_unchanged_text && raw == current_text {
            return ControlFlow::Break(InsertOutcome::Unchanged);
        }

        ControlFlow::Continue(Transformed {
            raw: RawChunkText::Plain(raw),
            original,
        })
    }

    fn commit(
        &mut self,
        text: ChunkText,
        original: Option<String>,
        params: &InsertParams,
    ) -> InsertOutcome {
        let current = self.buffer.current();
        let translation = if params.force_keep_translation {
            current.translation.clone()
        } else {
            self.sync
                .translation_for_new_chunk(current.translation.as_ref(), params.playback_time_s)
        };

        let in_place = params.in_place || self.buffer.is_pristine();
        let changed = !text.is_empty() && text.base() != current.text.base();
        let keep_selected = current.selected;
        if params.flash && changed {
            self.flash_effective_current();
        }

        let mut chunk = Chunk::new(self.ids.next_id(), text)
            .with_original_text(original)
            .with_translation(translation)
            .with_playback_time_s(params.playback_time_s);
        let chunk_id = chunk.id.clone();

        let index = if in_place {
            chunk.selected = keep_selected;
            let index = self.buffer.pointer();
            if let Some(previous) = self.buffer.replace(index, chunk) {
                self.notifier.emit(ChunkEvent::ChunkReplaced {
                    previous_id: previous.id,
                    chunk_id: chunk_id.clone(),
                    index,
                });
            }
            self.set_text_selection_quiet(None);
            index
        } else {
            if let Some(evicted) = self.buffer.push(chunk) {
                tracing::trace!(chunk_id = %evicted.id, "chunk_evicted");
                self.notifier
                    .emit(ChunkEvent::ChunkEvicted { chunk_id: evicted.id });
            }
            let index = self.buffer.latest_index();
            self.notifier.emit(ChunkEvent::ChunkAdded {
                chunk_id: chunk_id.clone(),
                index,
            });
            self.travel_to_last();
            index
        };

        if let Some(resolved) = TranslationSync::resolve_tentative(&mut self.buffer) {
            self.notifier
                .emit(ChunkEvent::TranslationChanged { index: resolved });
        }

        tracing::debug!(chunk_id = %chunk_id, index, in_place, "chunk_committed");
        InsertOutcome::Committed { index, in_place }
    }

    // ── Annotation ──────────────────────────────────────────────────────────

    async fn fetch_furigana(&self, text: &str) -> Option<Vec<MaybeRuby>> {
        let enhancer = self.enhancer.as_ref()?;
        match enhancer.enhance(text).await {
            Ok(runs) => Some(runs),
            Err(error) => {
                tracing::warn!(error = %error, "enhancement_failed");
                None
            }
        }
    }

    /// Identifies the current chunk for an annotation requested outside the session.
    pub fn enhancement_ticket(&self) -> EnhancementTicket {
        let current = self.current();
        EnhancementTicket {
            chunk_id: current.id.clone(),
            text: current.text.base().to_string(),
        }
    }

    /// Applies annotation runs to the chunk named by `ticket`.
    ///
    /// Results for chunks that were replaced or evicted meanwhile, or whose runs do not
    /// spell the ticket's text, are discarded. Returns whether the runs were applied.
    pub fn apply_enhancement(&mut self, ticket: &EnhancementTicket, runs: Vec<MaybeRuby>) -> bool {
        let Some(index) = self.buffer.position(&ticket.chunk_id) else {
            tracing::debug!(chunk_id = %ticket.chunk_id, "stale_enhancement_discarded");
            return false;
        };
        let annotated = ChunkText::of(runs);
        let matches = self
            .buffer
            .get(index)
            .is_some_and(|chunk| chunk.text.base() == ticket.text)
            && annotated.base() == ticket.text;
        if !matches {
            tracing::debug!(chunk_id = %ticket.chunk_id, "mismatched_enhancement_discarded");
            return false;
        }
        self.replace_text(index, annotated)
    }

    /// Annotates the current chunk unless it already is.
    pub async fn enhance_current(&mut self) -> bool {
        let current = self.current();
        if current.text.has_furigana() || current.text.is_empty() {
            return false;
        }
        let ticket = self.enhancement_ticket();
        match self.fetch_furigana(&ticket.text).await {
            Some(runs) => self.apply_enhancement(&ticket, runs),
            None => false,
        }
    }

    /// Strips the annotation from the current chunk.
    pub fn unenhance_current(&mut self) -> bool {
        let current = self.current();
        if !current.text.has_furigana() {
            return false;
        }
        let plain = current.text.without_furigana();
        self.replace_text(self.pointer(), plain)
    }

    /// Updates the furigana setting and annotates or strips the current chunk to match.
    pub async fn set_show_furigana(&mut self, show: bool) -> bool {
        self.settings.show_furigana = show;
        self.refresh_furigana().await
    }

    /// Brings the current chunk in line with the furigana setting, e.g. after navigating
    /// to a chunk captured under a different setting.
    pub async fn refresh_furigana(&mut self) -> bool {
        if self.settings.show_furigana {
            self.enhance_current().await
        } else {
            self.unenhance_current()
        }
    }

    /// Swaps the text of the chunk at `index`, keeping everything else. The chunk gets a
    /// new id.
    fn replace_text(&mut self, index: usize, text: ChunkText) -> bool {
        let Some(existing) = self.buffer.get(index) else {
            return false;
        };
        let chunk = Chunk {
            id: self.ids.next_id(),
            text,
            ..existing.clone()
        };
        let chunk_id = chunk.id.clone();
        match self.buffer.replace(index, chunk) {
            Some(previous) => {
                self.notifier.emit(ChunkEvent::ChunkReplaced {
                    previous_id: previous.id,
                    chunk_id,
                    index,
                });
                true
            }
            None => false,
        }
    }
}
