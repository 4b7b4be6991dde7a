/// A contiguous, inclusive character range within the current chunk.
///
/// `anchor` is set while the user is still dragging; a selection is "in progress"
/// exactly while it is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TextSelection {
    pub range: (usize, usize),
    pub anchor: Option<usize>,
}

impl TextSelection {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            range: (start.min(end), start.max(end)),
            anchor: None,
        }
    }

    pub fn dragging(anchor: usize, to: usize) -> Self {
        Self {
            anchor: Some(anchor),
            ..Self::new(anchor, to)
        }
    }

    pub fn start(&self) -> usize {
        self.range.0.min(self.range.1)
    }

    pub fn end(&self) -> usize {
        self.range.0.max(self.range.1)
    }

    pub fn char_count(&self) -> usize {
        self.range.0.abs_diff(self.range.1) + 1
    }

    pub fn contains(&self, idx: usize) -> bool {
        (self.start()..=self.end()).contains(&idx)
    }

    fn bounds(&self) -> (usize, usize) {
        (self.start(), self.end())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextSelectionState {
    value: Option<TextSelection>,
}

impl TextSelectionState {
    pub fn get(&self) -> Option<&TextSelection> {
        self.value.as_ref()
    }

    pub fn range(&self) -> Option<(usize, usize)> {
        self.value.map(|s| s.bounds())
    }

    /// Returns whether the stored selection changed.
    pub fn set(&mut self, selection: Option<TextSelection>) -> bool {
        if self.value == selection {
            return false;
        }
        self.value = selection;
        true
    }

    pub fn clear(&mut self) -> bool {
        self.set(None)
    }

    pub fn in_progress(&self) -> bool {
        self.value.is_some_and(|s| s.anchor.is_some())
    }

    /// Ends a drag selection, keeping the selected range.
    pub fn finish(&mut self) -> bool {
        match self.value.as_mut() {
            Some(sel) if sel.anchor.is_some() => {
                sel.anchor = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_whole_text_selected(&self, text_len: usize) -> bool {
        match self.value {
            Some(sel) => text_len > 0 && sel.bounds() == (0, text_len - 1),
            None => false,
        }
    }

    /// Selects the whole text. Empty text has nothing to select.
    pub fn select_all(&mut self, text_len: usize) -> bool {
        if text_len == 0 {
            return self.clear();
        }
        self.set(Some(TextSelection::new(0, text_len - 1)))
    }

    /// Adopts a highlight tracked outside the engine, e.g. the native UI selection.
    pub fn select_highlighted(&mut self, highlight: Option<(usize, usize)>) -> bool {
        match highlight {
            Some((start, end)) => self.set(Some(TextSelection::new(start, end))),
            None => false,
        }
    }
}
