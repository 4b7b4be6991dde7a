use std::sync::OnceLock;

pub use capture_interface::MaybeRuby;

/// Text as it enters the history: either plain, or already split into runs carrying
/// optional pronunciation readings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(untagged)]
pub enum RawChunkText {
    Plain(String),
    Annotated(Vec<MaybeRuby>),
}

impl From<&str> for RawChunkText {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<String> for RawChunkText {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}

impl From<Vec<MaybeRuby>> for RawChunkText {
    fn from(value: Vec<MaybeRuby>) -> Self {
        Self::Annotated(value)
    }
}

/// Immutable chunk text.
///
/// The plain projection (`base`) of annotated text and the run view of plain text are
/// both derived on first access and cached. Every index accepted or returned here is a
/// character (Unicode scalar value) index into `base`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawChunkText", into = "RawChunkText")]
pub struct ChunkText {
    raw: RawChunkText,
    base: OnceLock<String>,
    runs: OnceLock<Vec<MaybeRuby>>,
    run_offsets: OnceLock<Vec<usize>>,
}

impl ChunkText {
    pub fn of(raw: impl Into<RawChunkText>) -> Self {
        Self {
            raw: raw.into(),
            base: OnceLock::new(),
            runs: OnceLock::new(),
            run_offsets: OnceLock::new(),
        }
    }

    pub fn empty() -> Self {
        Self::of(String::new())
    }

    pub fn raw(&self) -> &RawChunkText {
        &self.raw
    }

    pub fn base(&self) -> &str {
        match &self.raw {
            RawChunkText::Plain(text) => text,
            RawChunkText::Annotated(runs) => self
                .base
                .get_or_init(|| runs.iter().map(|r| r.base.as_str()).collect()),
        }
    }

    /// The annotated runs, if this text was constructed with them.
    pub fn maybe_rubies(&self) -> Option<&[MaybeRuby]> {
        match &self.raw {
            RawChunkText::Plain(_) => None,
            RawChunkText::Annotated(runs) => Some(runs),
        }
    }

    /// Run view of the text. Plain text is a single unannotated run.
    pub fn runs(&self) -> &[MaybeRuby] {
        match &self.raw {
            RawChunkText::Annotated(runs) => runs,
            RawChunkText::Plain(text) => self.runs.get_or_init(|| {
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![MaybeRuby::plain(text.clone())]
                }
            }),
        }
    }

    pub fn char_len(&self) -> usize {
        self.base().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.base().is_empty()
    }

    pub fn has_furigana(&self) -> bool {
        matches!(self.raw, RawChunkText::Annotated(_))
    }

    pub fn without_furigana(&self) -> ChunkText {
        Self::of(self.base().to_string())
    }

    /// Character offset at which each run starts.
    pub fn run_offsets(&self) -> &[usize] {
        self.run_offsets.get_or_init(|| {
            let mut offset = 0;
            self.runs()
                .iter()
                .map(|run| {
                    let start = offset;
                    offset += run.base.chars().count();
                    start
                })
                .collect()
        })
    }

    /// Index of the run containing the character at `char_idx`.
    pub fn run_index_at(&self, char_idx: usize) -> Option<usize> {
        if char_idx >= self.char_len() {
            return None;
        }
        let offsets = self.run_offsets();
        match offsets.binary_search(&char_idx) {
            Ok(mut idx) => {
                // Skip zero-width runs sharing the same offset.
                while idx + 1 < offsets.len() && offsets[idx + 1] == char_idx {
                    idx += 1;
                }
                Some(idx)
            }
            Err(idx) => Some(idx - 1),
        }
    }

    pub fn run_at(&self, char_idx: usize) -> Option<&MaybeRuby> {
        self.run_index_at(char_idx).map(|idx| &self.runs()[idx])
    }

    /// Runs overlapping the inclusive character range `start..=end`.
    pub fn runs_in_range(&self, start: usize, end: usize) -> &[MaybeRuby] {
        let len = self.char_len();
        if len == 0 || start > end || start >= len {
            return &[];
        }
        let (Some(first), Some(last)) = (self.run_index_at(start), self.run_index_at(end.min(len - 1)))
        else {
            return &[];
        };
        &self.runs()[first..=last]
    }
}

impl Default for ChunkText {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for ChunkText {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl From<RawChunkText> for ChunkText {
    fn from(raw: RawChunkText) -> Self {
        Self::of(raw)
    }
}

impl From<ChunkText> for RawChunkText {
    fn from(text: ChunkText) -> Self {
        text.raw
    }
}

/// Byte offset of the `char_idx`-th character, clamped to the end of `s`.
pub(crate) fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map_or(s.len(), |(offset, _)| offset)
}

/// Characters `start..=end` of `s`, clamped to its bounds.
pub fn char_range(s: &str, start: usize, end: usize) -> &str {
    if start > end {
        return "";
    }
    let from = byte_offset(s, start);
    let to = byte_offset(s, end.saturating_add(1));
    &s[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotated() -> ChunkText {
        ChunkText::of(vec![
            MaybeRuby::ruby("漢字", "かんじ"),
            MaybeRuby::plain("を"),
            MaybeRuby::ruby("読", "よ"),
            MaybeRuby::plain("む"),
        ])
    }

    #[test]
    fn base_is_derived_from_runs() {
        let text = annotated();
        assert_eq!(text.base(), "漢字を読む");
        assert_eq!(text.char_len(), 5);
        assert!(text.has_furigana());
    }

    #[test]
    fn plain_text_has_single_run() {
        let text = ChunkText::of("abc");
        assert_eq!(text.runs(), &[MaybeRuby::plain("abc")]);
        assert_eq!(text.maybe_rubies(), None);
        assert!(!text.has_furigana());
        assert!(ChunkText::empty().runs().is_empty());
    }

    #[test]
    fn without_furigana_keeps_base() {
        let plain = annotated().without_furigana();
        assert_eq!(plain.base(), "漢字を読む");
        assert!(!plain.has_furigana());
    }

    #[test]
    fn run_lookup_by_char_index() {
        let text = annotated();
        assert_eq!(text.run_offsets(), &[0, 2, 3, 4]);
        assert_eq!(text.run_at(1), Some(&MaybeRuby::ruby("漢字", "かんじ")));
        assert_eq!(text.run_at(3), Some(&MaybeRuby::ruby("読", "よ")));
        assert_eq!(text.run_at(5), None);
    }

    #[test]
    fn runs_overlapping_range() {
        let text = annotated();
        let runs = text.runs_in_range(1, 3);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].base, "漢字");
        assert_eq!(runs[2].base, "読");
        assert!(text.runs_in_range(7, 9).is_empty());
    }

    #[test]
    fn equality_ignores_caches() {
        let a = annotated();
        let _ = a.base();
        assert_eq!(a, annotated());
        assert_ne!(ChunkText::of("漢字を読む"), annotated());
    }

    #[test]
    fn char_range_is_inclusive_and_clamped() {
        assert_eq!(char_range("日本語です", 1, 2), "本語");
        assert_eq!(char_range("abc", 1, 10), "bc");
        assert_eq!(char_range("abc", 2, 1), "");
    }

    #[test]
    fn serializes_as_raw_text() {
        let json = serde_json::to_value(ChunkText::of("猫")).unwrap();
        assert_eq!(json, serde_json::json!("猫"));

        let back: ChunkText = serde_json::from_value(serde_json::json!([
            { "base": "猫", "text": "ねこ" }
        ]))
        .unwrap();
        assert_eq!(back.base(), "猫");
        assert!(back.has_furigana());
    }
}
