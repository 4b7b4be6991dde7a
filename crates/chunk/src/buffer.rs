use std::collections::VecDeque;

use crate::translation::ChunkTranslation;
use crate::types::{Chunk, SelectionInfo};

pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded, ordered chunk history with a navigation pointer.
///
/// Never empty: it starts with one initial chunk and only loses chunks through FIFO
/// eviction when a push exceeds capacity. `pointer` always indexes an existing chunk.
#[derive(Debug, Clone)]
pub struct ChunkBuffer {
    chunks: VecDeque<Chunk>,
    pointer: usize,
    capacity: usize,
}

impl ChunkBuffer {
    pub fn new(capacity: usize, mut initial: Chunk) -> Self {
        let capacity = capacity.max(1);
        initial.selected = true;
        let mut chunks = VecDeque::with_capacity(capacity);
        chunks.push_back(initial);
        Self {
            chunks,
            pointer: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn current(&self) -> &Chunk {
        &self.chunks[self.pointer]
    }

    pub fn latest(&self) -> &Chunk {
        &self.chunks[self.latest_index()]
    }

    pub fn latest_index(&self) -> usize {
        self.chunks.len() - 1
    }

    pub fn get(&self, idx: usize) -> Option<&Chunk> {
        self.chunks.get(idx)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Chunk> + '_ {
        self.chunks.iter()
    }

    pub fn position(&self, id: &crate::ChunkId) -> Option<usize> {
        self.chunks.iter().position(|c| &c.id == id)
    }

    /// Whether the buffer still holds nothing but the untouched initial chunk.
    pub fn is_pristine(&self) -> bool {
        let current = self.current();
        self.chunks.len() == 1 && current.text.is_empty() && current.translation.is_none()
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut Chunk> {
        self.chunks.get_mut(idx)
    }

    /// Appends `chunk`, evicting the oldest chunk when over capacity. The pointer keeps
    /// addressing the same chunk unless that chunk was the one evicted.
    pub(crate) fn push(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.push_back(chunk);
        if self.chunks.len() <= self.capacity {
            return None;
        }
        let evicted = self.chunks.pop_front();
        self.pointer = self.pointer.saturating_sub(1);
        evicted
    }

    pub(crate) fn replace(&mut self, idx: usize, chunk: Chunk) -> Option<Chunk> {
        let slot = self.chunks.get_mut(idx)?;
        Some(std::mem::replace(slot, chunk))
    }

    pub(crate) fn set_translation(
        &mut self,
        idx: usize,
        translation: Option<ChunkTranslation>,
    ) -> bool {
        match self.chunks.get_mut(idx) {
            Some(chunk) if chunk.translation != translation => {
                chunk.translation = translation;
                true
            }
            _ => false,
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    /// Pointer after moving by `step`, and whether the move had to be clamped.
    pub fn new_pointer(&self, step: isize) -> (usize, bool) {
        let last = self.latest_index();
        match self.pointer.checked_add_signed(step) {
            Some(target) if target > last => (last, true),
            Some(target) => (target, false),
            None if step < 0 => (0, true),
            None => (last, true),
        }
    }

    pub fn can_travel_by(&self, step: isize) -> bool {
        step == 0 || !self.new_pointer(step).1
    }

    /// Moves the pointer, clamping at either end. Returns `false` for a zero step.
    pub(crate) fn travel_by(&mut self, step: isize) -> bool {
        if step == 0 {
            return false;
        }
        let (target, _) = self.new_pointer(step);
        self.set_pointer(target);
        true
    }

    /// Jumps to `idx`; out-of-range indices are ignored.
    pub(crate) fn travel_to(&mut self, idx: usize) -> bool {
        if idx >= self.chunks.len() {
            return false;
        }
        self.set_pointer(idx);
        true
    }

    pub(crate) fn travel_to_last(&mut self) {
        self.set_pointer(self.latest_index());
    }

    fn set_pointer(&mut self, idx: usize) {
        self.pointer = idx;
        self.select_only_current();
    }

    // ── History selection ───────────────────────────────────────────────────

    pub(crate) fn select(&mut self, idx: usize, value: bool) -> bool {
        match self.chunks.get_mut(idx) {
            Some(chunk) if chunk.selected != value => {
                chunk.selected = value;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn select_only_current(&mut self) -> bool {
        let pointer = self.pointer;
        let mut changed = false;
        for (idx, chunk) in self.chunks.iter_mut().enumerate() {
            let value = idx == pointer;
            if chunk.selected != value {
                chunk.selected = value;
                changed = true;
            }
        }
        changed
    }

    pub(crate) fn set_history_flashing(&mut self, indices: &[usize], value: bool) {
        for &idx in indices {
            if let Some(chunk) = self.chunks.get_mut(idx) {
                chunk.history_flashing = value;
            }
        }
    }

    pub fn selection_info(&self) -> SelectionInfo {
        let mut info = SelectionInfo::default();
        for (idx, chunk) in self.chunks.iter().enumerate().filter(|(_, c)| c.selected) {
            if idx != self.pointer {
                info.other_than_current_selected = true;
            }
            if chunk.original_text.is_some() {
                info.some_have_original_text = true;
            }
            info.selected_indices.push(idx);
        }
        info
    }

    pub fn selected(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter().filter(|c| c.selected)
    }
}
