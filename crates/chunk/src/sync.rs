use crate::buffer::ChunkBuffer;
use crate::translation::{ChunkTranslation, TranslationSegment, segments_to_string};
use crate::types::{Chunk, TranslationWithContext};

/// Time windows, in seconds of media playback, used to guess which chunk a translation
/// segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TranslationWindows {
    /// How long after the latest chunk a segment still counts as that chunk's translation.
    pub max_initial_delay_s: f64,
    /// How far a pending segment may precede the chunk it seeds.
    pub max_initial_advance_s: f64,
    /// Maximum age of a translation carried forward onto the next chunk.
    pub keep_around_s: f64,
    /// Maximum age of previous-chunk segments shown as context.
    pub context_keep_around_s: f64,
}

impl Default for TranslationWindows {
    fn default() -> Self {
        Self {
            max_initial_delay_s: 0.9,
            max_initial_advance_s: 0.9,
            keep_around_s: 7.0,
            context_keep_around_s: 11.0,
        }
    }
}

/// Which chunk an untimed translation is addressed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranslationDestination {
    #[default]
    Latest,
    Current,
}

/// Where an incoming translation segment ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationPlacement {
    /// Became the sole confirmed translation of the chunk at `index`.
    Confirmed { index: usize },
    /// Appended tentatively to the chunk at `index` and held as pending for the next chunk.
    Tentative { index: usize },
}

impl TranslationPlacement {
    pub fn index(&self) -> usize {
        match self {
            Self::Confirmed { index } | Self::Tentative { index } => *index,
        }
    }
}

/// Matches translation segments to chunks by playback time.
///
/// Owns the single pending-segment slot of a session.
#[derive(Debug, Clone, Default)]
pub struct TranslationSync {
    windows: TranslationWindows,
    pending: Option<TranslationSegment>,
}

impl TranslationSync {
    pub fn new(windows: TranslationWindows) -> Self {
        Self {
            windows,
            pending: None,
        }
    }

    pub fn windows(&self) -> &TranslationWindows {
        &self.windows
    }

    /// Segment that may still turn out to belong to the next chunk.
    pub fn pending(&self) -> Option<&TranslationSegment> {
        self.pending.as_ref()
    }

    pub(crate) fn attach(
        &mut self,
        buffer: &mut ChunkBuffer,
        segment: TranslationSegment,
        destination: TranslationDestination,
    ) -> TranslationPlacement {
        let latest = buffer.latest_index();

        let Some(time) = segment.playback_time_s else {
            let index = match destination {
                TranslationDestination::Latest => latest,
                TranslationDestination::Current => buffer.pointer(),
            };
            return Self::confirm(buffer, index, segment);
        };

        // Without a time on the latest chunk there is nothing to disambiguate against.
        let Some(latest_time) = buffer.latest().playback_time_s else {
            return Self::confirm(buffer, latest, segment);
        };

        // A negative delta means a rewind or a new video.
        let delta = time - latest_time;
        if delta <= self.windows.max_initial_delay_s {
            return Self::confirm(buffer, latest, segment);
        }

        tracing::debug!(delta_s = delta, text = %segment.text, "translation_pending");
        self.pending = Some(segment.clone());
        let tentative = segment.into_tentative();
        let translation = match &buffer.latest().translation {
            Some(existing) => existing.supplemented_with(tentative),
            None => ChunkTranslation::with_segment(tentative),
        };
        buffer.set_translation(latest, Some(translation));
        TranslationPlacement::Tentative { index: latest }
    }

    pub(crate) fn confirm(
        buffer: &mut ChunkBuffer,
        index: usize,
        segment: TranslationSegment,
    ) -> TranslationPlacement {
        buffer.set_translation(index, Some(ChunkTranslation::with_segment(segment)));
        TranslationPlacement::Confirmed { index }
    }

    /// Initial translation of a chunk arriving at `playback_time_s` after `previous`.
    ///
    /// A pending segment that arrived shortly before the chunk seeds it; the pending slot
    /// is emptied either way. Failing that, a recent enough translation of the previous
    /// chunk is carried over in decaying form.
    pub(crate) fn translation_for_new_chunk(
        &mut self,
        previous: Option<&ChunkTranslation>,
        playback_time_s: Option<f64>,
    ) -> Option<ChunkTranslation> {
        let time = playback_time_s?;

        if let Some(pending) = self.pending.take() {
            let accepted = pending.playback_time_s.is_some_and(|pending_time| {
                let advance = time - pending_time;
                (0.0..=self.windows.max_initial_advance_s).contains(&advance)
            });
            if accepted {
                tracing::debug!(text = %pending.text, "pending_translation_accepted");
                return Some(ChunkTranslation::with_segment(pending));
            }
        }

        let previous = previous?;
        let delta = time - previous.last_segment_playback_time_s()?;
        if delta > 0.0 && delta <= self.windows.keep_around_s {
            previous.decaying()
        } else {
            None
        }
    }

    /// Drops tentative segments from the third-to-last chunk that the second-to-last chunk
    /// has since been confirmed to share. Returns the index of the chunk that changed.
    pub(crate) fn resolve_tentative(buffer: &mut ChunkBuffer) -> Option<usize> {
        let len = buffer.len();
        if len <= 3 {
            return None;
        }
        let subsequent = buffer.get(len - 2)?.translation.clone()?;
        let index = len - 3;
        let current = buffer.get(index)?.translation.as_ref()?;
        if !current.has_tentative_segments() {
            return None;
        }
        let cleaned = current.removing_tentative_segments_shared_with(&subsequent);
        buffer.set_translation(index, cleaned).then_some(index)
    }

    /// The current chunk's translation together with those segments of the previous chunk's
    /// translation that are still relevant as context.
    pub fn with_context(
        &self,
        previous: Option<&Chunk>,
        current: &Chunk,
        translation_only_mode: bool,
    ) -> Option<TranslationWithContext> {
        let prev = previous.and_then(|c| c.translation.as_ref());
        let curr = current.translation.as_ref();
        if prev.is_none() && curr.is_none() {
            return None;
        }

        let previous = prev.and_then(|prev| {
            let kept: Vec<_> = prev
                .segments()
                .iter()
                .filter(|seg| match seg.playback_time_s {
                    None => translation_only_mode,
                    Some(seg_time) => current.playback_time_s.is_none_or(|curr_time| {
                        let delta = curr_time - seg_time;
                        (0.0..=self.windows.context_keep_around_s).contains(&delta)
                    }),
                })
                .filter(|seg| !curr.is_some_and(|c| c.has_segment(seg)))
                .collect();
            (!kept.is_empty()).then(|| segments_to_string(kept))
        });

        Some(TranslationWithContext {
            current: curr.map(ChunkTranslation::text),
            previous,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{IdGenerator, SequentialIdGen};
    use crate::text::ChunkText;

    fn timed_buffer(times: &[Option<f64>]) -> ChunkBuffer {
        let mut ids = SequentialIdGen::new();
        let mut chunks = times
            .iter()
            .map(|t| Chunk::new(ids.next_id(), ChunkText::of("x")).with_playback_time_s(*t));
        let mut buffer = ChunkBuffer::new(50, chunks.next().unwrap());
        for chunk in chunks {
            buffer.push(chunk);
        }
        buffer
    }

    fn seg(text: &str, t: f64) -> TranslationSegment {
        TranslationSegment::new(text, Some(t))
    }

    fn text_of(buffer: &ChunkBuffer, idx: usize) -> Option<String> {
        buffer.get(idx)?.translation.as_ref().map(ChunkTranslation::text)
    }

    #[test]
    fn untimed_segment_goes_to_destination() {
        let mut sync = TranslationSync::default();
        let mut buffer = timed_buffer(&[Some(1.0), Some(2.0)]);
        buffer.travel_to(0);

        let placement = sync.attach(
            &mut buffer,
            TranslationSegment::new("cur", None),
            TranslationDestination::Current,
        );
        assert_eq!(placement, TranslationPlacement::Confirmed { index: 0 });

        sync.attach(
            &mut buffer,
            TranslationSegment::new("last", None),
            TranslationDestination::Latest,
        );
        assert_eq!(text_of(&buffer, 0).as_deref(), Some("cur"));
        assert_eq!(text_of(&buffer, 1).as_deref(), Some("last"));
    }

    #[test]
    fn early_segment_confirms_latest() {
        let mut sync = TranslationSync::default();
        let mut buffer = timed_buffer(&[Some(5.0)]);

        let placement = sync.attach(&mut buffer, seg("hi", 5.5), TranslationDestination::Latest);
        assert_eq!(placement, TranslationPlacement::Confirmed { index: 0 });
        assert!(sync.pending().is_none());

        sync.attach(&mut buffer, seg("again", 5.8), TranslationDestination::Latest);
        assert_eq!(text_of(&buffer, 0).as_deref(), Some("again"));
    }

    #[test]
    fn rewind_confirms_latest() {
        let mut sync = TranslationSync::default();
        let mut buffer = timed_buffer(&[Some(50.0)]);
        let placement = sync.attach(&mut buffer, seg("back", 3.0), TranslationDestination::Latest);
        assert_eq!(placement, TranslationPlacement::Confirmed { index: 0 });
    }

    #[test]
    fn untimed_latest_chunk_takes_segment() {
        let mut sync = TranslationSync::default();
        let mut buffer = timed_buffer(&[None]);
        let placement = sync.attach(&mut buffer, seg("x", 100.0), TranslationDestination::Latest);
        assert_eq!(placement, TranslationPlacement::Confirmed { index: 0 });
    }

    #[test]
    fn late_segment_is_tentative_and_pending() {
        let mut sync = TranslationSync::default();
        let mut buffer = timed_buffer(&[Some(5.0)]);
        sync.attach(&mut buffer, seg("first", 5.2), TranslationDestination::Latest);

        let placement = sync.attach(&mut buffer, seg("late", 8.0), TranslationDestination::Latest);
        assert_eq!(placement, TranslationPlacement::Tentative { index: 0 });
        assert_eq!(sync.pending(), Some(&seg("late", 8.0)));

        let tr = buffer.latest().translation.as_ref().unwrap();
        assert_eq!(tr.text(), "first late");
        assert!(tr.segments()[1].tentative);
    }

    #[test]
    fn pending_seeds_next_chunk_within_window() {
        let mut sync = TranslationSync::default();
        let mut buffer = timed_buffer(&[Some(5.0)]);
        sync.attach(&mut buffer, seg("late", 8.0), TranslationDestination::Latest);

        let previous = buffer.latest().translation.clone();
        let tr = sync
            .translation_for_new_chunk(previous.as_ref(), Some(8.3))
            .unwrap();
        assert_eq!(tr.segments(), &[seg("late", 8.0)]);
        assert!(!tr.is_decaying());
        assert!(sync.pending().is_none());
    }

    #[test]
    fn pending_is_cleared_even_when_rejected() {
        let mut sync = TranslationSync::default();
        let mut buffer = timed_buffer(&[Some(5.0)]);
        sync.attach(&mut buffer, seg("late", 8.0), TranslationDestination::Latest);

        assert!(sync.translation_for_new_chunk(None, Some(9.5)).is_none());
        assert!(sync.pending().is_none());
    }

    #[test]
    fn pending_survives_untimed_chunk() {
        let mut sync = TranslationSync::default();
        let mut buffer = timed_buffer(&[Some(5.0)]);
        sync.attach(&mut buffer, seg("late", 8.0), TranslationDestination::Latest);

        assert!(sync.translation_for_new_chunk(None, None).is_none());
        assert!(sync.pending().is_some());
    }

    #[test]
    fn recent_translation_is_carried_decaying() {
        let mut sync = TranslationSync::default();
        let previous = ChunkTranslation::with_segment(seg("ctx", 10.0));

        let carried = sync
            .translation_for_new_chunk(Some(&previous), Some(12.0))
            .unwrap();
        assert_eq!(carried.decay_counter(), Some(2));

        assert!(sync.translation_for_new_chunk(Some(&previous), Some(17.5)).is_none());
        assert!(sync.translation_for_new_chunk(Some(&previous), Some(10.0)).is_none());
    }

    #[test]
    fn tentative_resolved_two_chunks_back() {
        let mut buffer = timed_buffer(&[Some(1.0), Some(5.0), Some(8.3), Some(9.0)]);
        let tentative = ChunkTranslation::with_segment(seg("a", 5.1))
            .supplemented_with(seg("b", 8.0).into_tentative());
        buffer.set_translation(1, Some(tentative));
        buffer.set_translation(2, Some(ChunkTranslation::with_segment(seg("b", 8.0))));

        assert_eq!(TranslationSync::resolve_tentative(&mut buffer), Some(1));
        assert_eq!(text_of(&buffer, 1).as_deref(), Some("a"));
        assert_eq!(TranslationSync::resolve_tentative(&mut buffer), None);
    }

    #[test]
    fn short_history_is_not_resolved() {
        let mut buffer = timed_buffer(&[Some(5.0), Some(8.3), Some(9.0)]);
        buffer.set_translation(
            0,
            Some(ChunkTranslation::with_segment(seg("b", 8.0).into_tentative())),
        );
        buffer.set_translation(1, Some(ChunkTranslation::with_segment(seg("b", 8.0))));
        assert_eq!(TranslationSync::resolve_tentative(&mut buffer), None);
    }

    #[test]
    fn context_filters_previous_segments() {
        let sync = TranslationSync::default();
        let mut ids = SequentialIdGen::new();
        let shared = seg("shared", 19.0);

        let previous = Chunk::new(ids.next_id(), ChunkText::of("p")).with_translation(Some(
            ChunkTranslation::with_segment(seg("old", 1.0))
                .supplemented_with(seg("recent", 15.0))
                .supplemented_with(shared.clone())
                .supplemented_with(seg("future", 30.0))
                .supplemented_with(TranslationSegment::new("untimed", None)),
        ));
        let current = Chunk::new(ids.next_id(), ChunkText::of("c"))
            .with_playback_time_s(Some(20.0))
            .with_translation(Some(ChunkTranslation::with_segment(shared)));

        let ctx = sync.with_context(Some(&previous), &current, false).unwrap();
        assert_eq!(ctx.current.as_deref(), Some("shared"));
        assert_eq!(ctx.previous.as_deref(), Some("recent"));

        let ctx = sync.with_context(Some(&previous), &current, true).unwrap();
        assert_eq!(ctx.previous.as_deref(), Some("recent untimed"));
    }

    #[test]
    fn no_context_without_translations() {
        let sync = TranslationSync::default();
        let mut ids = SequentialIdGen::new();
        let current = Chunk::new(ids.next_id(), ChunkText::of("c"));
        assert!(sync.with_context(None, &current, false).is_none());
    }
}
