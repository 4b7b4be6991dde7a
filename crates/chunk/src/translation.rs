/// Number of chunk changes after which a carried-forward translation disappears.
pub const DECAY_AFTER_CHUNK_CHANGES: u32 = 3;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TranslationSegment {
    pub text: String,
    #[serde(default)]
    pub playback_time_s: Option<f64>,
    /// Attached before the chunk it really belongs to could be told apart.
    #[serde(default)]
    pub tentative: bool,
}

impl TranslationSegment {
    pub fn new(text: impl Into<String>, playback_time_s: Option<f64>) -> Self {
        Self {
            text: text.into(),
            playback_time_s,
            tentative: false,
        }
    }

    pub fn into_tentative(self) -> Self {
        Self {
            tentative: true,
            ..self
        }
    }

    /// Segment identity: same text at the same playback time. Provenance is ignored.
    pub fn same_as(&self, other: &TranslationSegment) -> bool {
        self.text == other.text && self.playback_time_s == other.playback_time_s
    }
}

/// Immutable translation attached to a chunk.
///
/// Transformations never mutate; `None` from one of them means the translation is no
/// longer retained.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct ChunkTranslation {
    segments: Vec<TranslationSegment>,
    decay_counter: Option<u32>,
}

impl ChunkTranslation {
    pub fn with_segment(segment: TranslationSegment) -> Self {
        Self {
            segments: vec![segment],
            decay_counter: None,
        }
    }

    fn with_segments(segments: Vec<TranslationSegment>) -> Option<Self> {
        (!segments.is_empty()).then_some(Self {
            segments,
            decay_counter: None,
        })
    }

    /// The same segments, one chunk change closer to expiry.
    pub fn decaying(&self) -> Option<Self> {
        let counter = self
            .decay_counter
            .unwrap_or(DECAY_AFTER_CHUNK_CHANGES)
            .saturating_sub(1);
        (counter > 0).then(|| Self {
            segments: self.segments.clone(),
            decay_counter: Some(counter),
        })
    }

    /// Appends `segment` unless an identical one is already present.
    pub fn supplemented_with(&self, segment: TranslationSegment) -> Self {
        if self.has_segment(&segment) {
            return self.clone();
        }
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self {
            segments,
            decay_counter: None,
        }
    }

    pub fn removing_tentative_segments_shared_with(&self, other: &ChunkTranslation) -> Option<Self> {
        Self::with_segments(
            self.segments
                .iter()
                .filter(|s| !s.tentative || !other.has_segment(s))
                .cloned()
                .collect(),
        )
    }

    pub fn has_segment(&self, segment: &TranslationSegment) -> bool {
        self.segments.iter().any(|s| s.same_as(segment))
    }

    pub fn has_tentative_segments(&self) -> bool {
        self.segments.iter().any(|s| s.tentative)
    }

    pub fn segments(&self) -> &[TranslationSegment] {
        &self.segments
    }

    pub fn text(&self) -> String {
        segments_to_string(&self.segments)
    }

    pub fn last_segment_playback_time_s(&self) -> Option<f64> {
        self.segments.last().and_then(|s| s.playback_time_s)
    }

    pub fn decay_counter(&self) -> Option<u32> {
        self.decay_counter
    }

    pub fn is_decaying(&self) -> bool {
        self.decay_counter.is_some()
    }
}

pub fn segments_to_string<'a>(segments: impl IntoIterator<Item = &'a TranslationSegment>) -> String {
    segments
        .into_iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, t: f64) -> TranslationSegment {
        TranslationSegment::new(text, Some(t))
    }

    #[test]
    fn decays_after_three_changes() {
        let fresh = ChunkTranslation::with_segment(seg("Hello", 1.0));

        let once = fresh.decaying().unwrap();
        assert_eq!(once.decay_counter(), Some(2));
        let twice = once.decaying().unwrap();
        assert_eq!(twice.decay_counter(), Some(1));
        assert!(twice.decaying().is_none());
        assert_eq!(twice.segments(), fresh.segments());
    }

    #[test]
    fn supplementing_skips_duplicates() {
        let tr = ChunkTranslation::with_segment(seg("a", 1.0));

        let same = tr.supplemented_with(seg("a", 1.0).into_tentative());
        assert_eq!(same.segments().len(), 1);

        let more = tr.supplemented_with(seg("b", 2.0));
        assert_eq!(more.text(), "a b");
        assert_eq!(more.last_segment_playback_time_s(), Some(2.0));
    }

    #[test]
    fn supplementing_resets_decay() {
        let tr = ChunkTranslation::with_segment(seg("a", 1.0))
            .decaying()
            .unwrap();
        assert!(tr.is_decaying());
        assert!(!tr.supplemented_with(seg("b", 2.0)).is_decaying());
    }

    #[test]
    fn removes_only_shared_tentative_segments() {
        let tr = ChunkTranslation::with_segment(seg("a", 1.0))
            .supplemented_with(seg("b", 4.0).into_tentative())
            .supplemented_with(seg("c", 5.0).into_tentative());
        let later = ChunkTranslation::with_segment(seg("b", 4.0));

        let cleaned = tr.removing_tentative_segments_shared_with(&later).unwrap();
        assert_eq!(cleaned.text(), "a c");
    }

    #[test]
    fn removing_everything_drops_translation() {
        let tr = ChunkTranslation::with_segment(seg("b", 4.0).into_tentative());
        let later = ChunkTranslation::with_segment(seg("b", 4.0));
        assert!(tr.removing_tentative_segments_shared_with(&later).is_none());
    }

    #[test]
    fn confirmed_segments_survive_cleanup() {
        let tr = ChunkTranslation::with_segment(seg("b", 4.0));
        let later = ChunkTranslation::with_segment(seg("b", 4.0));
        assert_eq!(tr.removing_tentative_segments_shared_with(&later), Some(tr));
    }
}
