mod edit;
mod insert;
mod translation;


use capture_interface::ChunkVariant;
use tokio::sync::broadcast;

use crate::buffer::ChunkBuffer;
use crate::config::{ChunkConfig, Settings};
use crate::enhance::{Enhancer, TimeoutEnhancer};
use crate::events::{ChunkEvent, Notifier};
use crate::id::{IdGenerator, UuidIdGen};
use crate::selection::{TextSelection, TextSelectionState};
use crate::sync::TranslationSync;
use crate::text::{ChunkText, char_range};
use crate::translation::TranslationSegment;
use crate::types::{Chunk, FlashState, SelectionInfo, TranslationWithContext};

pub use edit::CopyMode;
pub use insert::{InsertInput, InsertOp, InsertOutcome, InsertParams};
pub use crate::sync::{TranslationDestination, TranslationPlacement};

/// What the embedding UI contributes to engine decisions.
pub trait ViewHooks: Send + Sync {
    /// Selection inside the edit-mode text input, used when splicing into the edit buffer.
    fn input_selection(&self) -> Option<(usize, usize)> {
        None
    }

    fn allowed_to_flash(&self) -> bool {
        true
    }
}

pub struct DefaultViewHooks;

impl ViewHooks for DefaultViewHooks {}

/// Chunk history of one capture session: the buffer, the pointer into it, text selection,
/// edit mode and translation matching.
///
/// All state is owned here and only changes through `&mut self` methods. Observers use
/// [`ChunkSession::subscribe`] to learn that something changed and the accessors to read it.
pub struct ChunkSession {
    config: ChunkConfig,
    settings: Settings,
    buffer: ChunkBuffer,
    sync: TranslationSync,
    text_selection: TextSelectionState,
    text_highlight: Option<(usize, usize)>,
    editing: bool,
    edit_text: String,
    waiting: bool,
    flash: FlashState,
    chunk_variants: Vec<ChunkVariant>,
    ids: Box<dyn IdGenerator>,
    enhancer: Option<Box<dyn Enhancer>>,
    hooks: Box<dyn ViewHooks>,
    notifier: Notifier,
}

impl ChunkSession {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ChunkSessionBuilder {
        ChunkSessionBuilder::default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChunkEvent> {
        self.notifier.subscribe()
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Replaces the settings without touching existing chunks. Use
    /// [`ChunkSession::set_show_furigana`] to also re-annotate the current chunk.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn chunks(&self) -> &ChunkBuffer {
        &self.buffer
    }

    pub fn pointer(&self) -> usize {
        self.buffer.pointer()
    }

    pub fn current(&self) -> &Chunk {
        self.buffer.current()
    }

    pub fn text_selection(&self) -> &TextSelectionState {
        &self.text_selection
    }

    pub fn text_highlight(&self) -> Option<(usize, usize)> {
        self.text_highlight
    }

    pub fn editing(&self) -> bool {
        self.editing
    }

    pub fn edit_text(&self) -> &str {
        &self.edit_text
    }

    pub fn waiting(&self) -> bool {
        self.waiting
    }

    pub fn flash_state(&self) -> FlashState {
        self.flash
    }

    /// Lower-ranked candidates of the most recent recognition.
    pub fn chunk_variants(&self) -> &[ChunkVariant] {
        &self.chunk_variants
    }

    pub(crate) fn set_chunk_variants(&mut self, variants: Vec<ChunkVariant>) {
        self.chunk_variants = variants;
    }

    pub fn pending_translation(&self) -> Option<&TranslationSegment> {
        self.sync.pending()
    }

    pub fn selection_info(&self) -> SelectionInfo {
        self.buffer.selection_info()
    }

    // ── Derived text ────────────────────────────────────────────────────────

    /// The selected part of the current chunk, or all of it without a selection.
    pub fn current_effective_text(&self) -> String {
        let text = self.current().text.base();
        match self.text_selection.range() {
            Some((start, end)) => char_range(text, start, end).to_string(),
            None => text.to_string(),
        }
    }

    fn effective_text_segments(&self) -> Vec<String> {
        if self.selection_info().other_than_current_selected {
            self.buffer
                .selected()
                .map(|c| c.text.base().to_string())
                .collect()
        } else {
            vec![self.current_effective_text()]
        }
    }

    fn original_effective_text_segments(&self) -> Vec<String> {
        self.buffer
            .selected()
            .map(|c| c.original_or_base().to_string())
            .collect()
    }

    /// Text that actions such as lookups operate on: the chunks selected in history when
    /// more than the current one is selected, otherwise [`Self::current_effective_text`].
    pub fn effective_text(&self) -> String {
        self.effective_text_segments().join("\n")
    }

    /// Like [`Self::effective_text`] over the selected chunks, preferring original text.
    pub fn original_effective_text(&self) -> String {
        self.original_effective_text_segments().join("\n")
    }

    pub fn translation_with_context(&self) -> Option<TranslationWithContext> {
        let pointer = self.pointer();
        let previous = pointer.checked_sub(1).and_then(|idx| self.buffer.get(idx));
        self.sync.with_context(
            previous,
            self.current(),
            self.settings.translation_only_mode,
        )
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    pub fn can_travel_by(&self, step: isize) -> bool {
        self.buffer.can_travel_by(step)
    }

    /// Moves the pointer by `step`, clamped to the history. Returns whether it was moved.
    ///
    /// Navigation leaves annotation alone; call [`Self::refresh_furigana`] afterwards to
    /// bring the new current chunk in line with the furigana setting.
    pub fn travel_by(&mut self, step: isize) -> bool {
        let moved = self.buffer.travel_by(step);
        if moved {
            self.after_pointer_change();
        }
        moved
    }

    /// Jumps to `idx`. Out-of-range indices are ignored. Like [`Self::travel_by`], does
    /// not re-annotate the new current chunk.
    pub fn travel_to(&mut self, idx: usize) -> bool {
        let moved = self.buffer.travel_to(idx);
        if moved {
            self.after_pointer_change();
        }
        moved
    }

    /// Jumps to the newest chunk. See [`Self::travel_by`] about annotation.
    pub fn travel_to_last(&mut self) {
        self.buffer.travel_to_last();
        self.after_pointer_change();
    }

    fn after_pointer_change(&mut self) {
        tracing::trace!(pointer = self.pointer(), "pointer_moved");
        self.notifier.emit(ChunkEvent::PointerMoved {
            pointer: self.pointer(),
        });
        self.set_text_selection_quiet(None);
        self.emit_history_selection();
    }

    // ── Selection ───────────────────────────────────────────────────────────

    /// Selects or deselects a chunk in history. Selecting any chunk other than the
    /// current one clears the text selection.
    pub fn select(&mut self, idx: usize, value: bool) {
        if !self.buffer.select(idx, value) {
            return;
        }
        if self.selection_info().other_than_current_selected {
            self.set_text_selection_quiet(None);
        }
        self.emit_history_selection();
    }

    pub fn select_only_current(&mut self) {
        if self.buffer.select_only_current() {
            self.emit_history_selection();
        }
    }

    /// Sets the text selection. A selection restricts the history selection to the
    /// current chunk.
    pub fn set_text_selection(&mut self, selection: Option<TextSelection>) {
        self.set_text_selection_quiet(selection);
        if selection.is_some() {
            self.select_only_current();
        }
    }

    pub fn finish_text_selection(&mut self) {
        if self.text_selection.finish() {
            self.emit_text_selection();
        }
    }

    pub fn select_all_text(&mut self) {
        let len = self.current().text.char_len();
        let mut state = self.text_selection.clone();
        state.select_all(len);
        self.set_text_selection(state.get().copied());
    }

    /// Adopts the externally tracked highlight as the text selection.
    pub fn select_highlighted_text(&mut self) {
        let mut state = self.text_selection.clone();
        if state.select_highlighted(self.text_highlight) {
            self.set_text_selection(state.get().copied());
        }
    }

    pub fn set_text_highlight(&mut self, highlight: Option<(usize, usize)>) {
        self.text_highlight = highlight;
    }

    pub fn is_whole_text_selected(&self) -> bool {
        self.text_selection
            .is_whole_text_selected(self.current().text.char_len())
    }

    fn set_text_selection_quiet(&mut self, selection: Option<TextSelection>) {
        if selection.is_none() {
            self.text_highlight = None;
        }
        if self.text_selection.set(selection) {
            self.emit_text_selection();
        }
    }

    fn emit_text_selection(&self) {
        self.notifier.emit(ChunkEvent::TextSelectionChanged {
            range: self.text_selection.range(),
        });
    }

    fn emit_history_selection(&self) {
        self.notifier.emit(ChunkEvent::HistorySelectionChanged {
            selected_indices: self.selection_info().selected_indices,
        });
    }

    // ── Editing ─────────────────────────────────────────────────────────────

    /// Enters edit mode with the current chunk's plain text. No-op while editing.
    pub fn start_editing(&mut self) {
        if self.editing {
            return;
        }
        self.set_text_selection_quiet(None);
        self.edit_text = self.current().text.base().to_string();
        self.editing = true;
        self.notifier.emit(ChunkEvent::EditingChanged { editing: true });
    }

    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        self.edit_text = text.into();
        self.notifier.emit(ChunkEvent::EditTextChanged);
    }

    /// Commits the edit buffer to the current chunk and leaves edit mode. No-op when idle.
    ///
    /// Annotation, if enabled, is requested only after the edit is committed.
    pub async fn finish_editing(&mut self) {
        if !self.editing {
            return;
        }
        let translation_only = self.settings.translation_only_mode;
        let text = self.edit_text.clone();
        self.insert_now(
            InsertInput::Text(text),
            InsertParams {
                ignore_editing: true,
                in_place: translation_only,
                force_keep_translation: translation_only,
                ..InsertParams::default()
            },
        );
        self.editing = false;
        self.notifier.emit(ChunkEvent::EditingChanged { editing: false });

        if self.settings.show_furigana {
            self.enhance_current().await;
        }
    }

    /// Marks whether a new chunk is expected shortly. While waiting, annotation of new
    /// text is requested after commit instead of before.
    pub fn set_waiting(&mut self, waiting: bool) {
        if self.waiting != waiting {
            self.waiting = waiting;
            self.notifier.emit(ChunkEvent::WaitingChanged { waiting });
        }
    }

    // ── Flash ───────────────────────────────────────────────────────────────

    /// Flashes the effective part of the current chunk. The UI ends the flash with
    /// [`Self::end_flash`] after [`ChunkConfig::flash_duration`].
    pub fn flash_effective_current(&mut self) {
        if !self.hooks.allowed_to_flash() {
            return;
        }
        self.flash = match self.text_selection.range() {
            Some(range) if !self.is_whole_text_selected() => FlashState::RangeFlashing { range },
            _ => FlashState::WholeFlashing,
        };
        self.notifier.emit(ChunkEvent::Flash { state: self.flash });
    }

    pub fn end_flash(&mut self) {
        if self.flash != FlashState::NotFlashing {
            self.flash = FlashState::NotFlashing;
            self.notifier.emit(ChunkEvent::Flash { state: self.flash });
        }
    }

    pub fn flash_in_history(&mut self, indices: Vec<usize>) {
        if !self.hooks.allowed_to_flash() {
            return;
        }
        self.buffer.set_history_flashing(&indices, true);
        self.notifier.emit(ChunkEvent::HistoryFlash {
            indices,
            flashing: true,
        });
    }

    pub fn end_history_flash(&mut self) {
        let indices: Vec<usize> = self
            .buffer
            .iter()
            .enumerate()
            .filter(|(_, c)| c.history_flashing)
            .map(|(idx, _)| idx)
            .collect();
        if indices.is_empty() {
            return;
        }
        self.buffer.set_history_flashing(&indices, false);
        self.notifier.emit(ChunkEvent::HistoryFlash {
            indices,
            flashing: false,
        });
    }
}

impl Default for ChunkSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct ChunkSessionBuilder {
    config: Option<ChunkConfig>,
    settings: Settings,
    ids: Option<Box<dyn IdGenerator>>,
    enhancer: Option<Box<dyn Enhancer>>,
    hooks: Option<Box<dyn ViewHooks>>,
}

impl ChunkSessionBuilder {
    pub fn config(mut self, config: ChunkConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    /// Annotation backend. It is bounded by [`ChunkConfig::enhancement_timeout`].
    pub fn enhancer(mut self, enhancer: impl Enhancer + 'static) -> Self {
        self.enhancer = Some(Box::new(enhancer));
        self
    }

    pub fn view_hooks(mut self, hooks: impl ViewHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    pub fn build(self) -> ChunkSession {
        let config = self.config.unwrap_or_default();
        let mut ids = self.ids.unwrap_or_else(|| Box::new(UuidIdGen));
        let initial = Chunk::new(ids.next_id(), ChunkText::empty());
        let timeout = config.enhancement_timeout();

        ChunkSession {
            buffer: ChunkBuffer::new(config.capacity, initial),
            sync: TranslationSync::new(config.translation_windows()),
            notifier: Notifier::new(config.event_capacity),
            settings: self.settings,
            text_selection: TextSelectionState::default(),
            text_highlight: None,
            editing: false,
            edit_text: String::new(),
            waiting: false,
            flash: FlashState::NotFlashing,
            chunk_variants: Vec::new(),
            ids,
            enhancer: self.enhancer.map(|inner| {
                Box::new(TimeoutEnhancer::new(inner, timeout)) as Box<dyn Enhancer>
            }),
            hooks: self.hooks.unwrap_or_else(|| Box::new(DefaultViewHooks)),
            config,
        }
    }
}
