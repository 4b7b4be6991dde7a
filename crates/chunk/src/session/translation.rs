use super::{ChunkSession, InsertInput, InsertParams};
use crate::events::ChunkEvent;
use crate::sync::{TranslationDestination, TranslationPlacement, TranslationSync};
use crate::translation::TranslationSegment;

impl ChunkSession {
    /// Attaches an incoming translation to the chunk it most likely belongs to.
    pub fn handle_incoming_translation(
        &mut self,
        text: impl Into<String>,
        playback_time_s: Option<f64>,
    ) -> TranslationPlacement {
        self.handle_incoming_translation_to(text, TranslationDestination::Latest, playback_time_s)
    }

    /// Like [`Self::handle_incoming_translation`], addressing untimed translations to
    /// `destination`. Timed translations always target the latest chunk.
    pub fn handle_incoming_translation_to(
        &mut self,
        text: impl Into<String>,
        destination: TranslationDestination,
        playback_time_s: Option<f64>,
    ) -> TranslationPlacement {
        let segment = TranslationSegment::new(text, playback_time_s);

        let placement = if self.settings.translation_only_mode {
            self.insert_now(
                InsertInput::Text(String::new()),
                InsertParams {
                    playback_time_s,
                    allow_unchanged_text: true,
                    ..InsertParams::default()
                },
            );
            let latest = self.buffer.latest_index();
            TranslationSync::confirm(&mut self.buffer, latest, segment)
        } else {
            self.sync.attach(&mut self.buffer, segment, destination)
        };

        tracing::debug!(?placement, "translation_attached");
        self.notifier.emit(ChunkEvent::TranslationChanged {
            index: placement.index(),
        });
        placement
    }
}
