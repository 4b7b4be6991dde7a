use capture_interface::{ChunkVariant, IncomingMessage};

use crate::config::Settings;
use crate::session::{ChunkSession, InsertInput, InsertOp, InsertParams};
use crate::text::MaybeRuby;

/// Marker the recognizer leaves in variant content; never shown.
const VARIANT_MARKER: char = '@';

/// A backend message, normalised into what the session should do with it.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkInput {
    /// Best recognition candidate to insert, with the remaining candidates.
    Text {
        text: String,
        params: InsertParams,
        alternatives: Vec<ChunkVariant>,
    },
    Translation {
        text: String,
        playback_time_s: Option<f64>,
    },
    /// Annotation runs for text the backend was asked to annotate.
    Annotation { runs: Vec<MaybeRuby> },
}

impl ChunkInput {
    /// Returns `None` for messages that carry nothing for the chunk history.
    pub fn from_message(message: IncomingMessage, settings: &Settings) -> Option<Self> {
        match message {
            IncomingMessage::ChunkVariants {
                variants,
                playback_time_s,
            } => {
                let mut variants = variants.into_iter();
                let best = variants.next()?;
                let text = best.content.replace(VARIANT_MARKER, "");

                if settings.translation_only_mode {
                    return Some(Self::Translation {
                        text,
                        playback_time_s,
                    });
                }

                Some(Self::Text {
                    text,
                    params: InsertParams {
                        op: InsertOp::OverwriteOrReplaceSelectedInEditMode,
                        original: best.original_content,
                        playback_time_s,
                        allow_unchanged_text: true,
                        flash: true,
                        ..InsertParams::default()
                    },
                    alternatives: variants.collect(),
                })
            }
            IncomingMessage::ChunkTranslation {
                translation,
                playback_time_s,
            } => Some(Self::Translation {
                text: translation,
                playback_time_s,
            }),
            IncomingMessage::ChunkWithFurigana {
                chunk_with_furigana,
            } => Some(Self::Annotation {
                runs: chunk_with_furigana.maybe_rubies,
            }),
            _ => None,
        }
    }
}

impl ChunkSession {
    pub async fn apply_input(&mut self, input: ChunkInput) {
        match input {
            ChunkInput::Text {
                text,
                params,
                alternatives,
            } => {
                self.insert(InsertInput::Text(text), params).await;
                if !alternatives.is_empty() {
                    self.set_chunk_variants(alternatives);
                }
            }
            ChunkInput::Translation {
                text,
                playback_time_s,
            } => {
                self.handle_incoming_translation(text, playback_time_s);
            }
            ChunkInput::Annotation { runs } => {
                // Only an annotation of the current text is applied.
                let ticket = self.enhancement_ticket();
                self.apply_enhancement(&ticket, runs);
            }
        }
    }

    /// Converts and applies a backend message.
    pub async fn handle_message(&mut self, message: IncomingMessage) {
        if let Some(input) = ChunkInput::from_message(message, &self.settings()) {
            self.apply_input(input).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture_interface::ChunkWithFurigana;

    fn variant(content: &str) -> ChunkVariant {
        ChunkVariant {
            content: content.to_string(),
            original_content: Some(format!("{content}\n")),
            labels: Vec::new(),
            score: 1.0,
        }
    }

    #[test]
    fn best_variant_is_inserted_without_markers() {
        let input = ChunkInput::from_message(
            IncomingMessage::ChunkVariants {
                variants: vec![variant("猫@が"), variant("描が")],
                playback_time_s: Some(3.0),
            },
            &Settings::default(),
        )
        .unwrap();

        let (text, params, alternatives) = match input {
            ChunkInput::Text {
                text,
                params,
                alternatives,
            } => (text, params, alternatives),
            other => panic!("expected text input, got {other:?}"),
        };
        assert_eq!(text, "猫が");
        assert_eq!(params.op, InsertOp::OverwriteOrReplaceSelectedInEditMode);
        assert_eq!(params.original.as_deref(), Some("猫@が\n"));
        assert_eq!(params.playback_time_s, Some(3.0));
        assert!(params.allow_unchanged_text && params.flash);
        assert_eq!(alternatives, vec![variant("描が")]);
    }

    #[test]
    fn variants_become_translations_in_translation_only_mode() {
        let settings = Settings {
            translation_only_mode: true,
            ..Settings::default()
        };
        let input = ChunkInput::from_message(
            IncomingMessage::ChunkVariants {
                variants: vec![variant("Hello@")],
                playback_time_s: None,
            },
            &settings,
        );
        assert_eq!(
            input,
            Some(ChunkInput::Translation {
                text: "Hello".to_string(),
                playback_time_s: None,
            })
        );
    }

    #[test]
    fn empty_variants_are_ignored() {
        let input = ChunkInput::from_message(
            IncomingMessage::ChunkVariants {
                variants: Vec::new(),
                playback_time_s: None,
            },
            &Settings::default(),
        );
        assert!(input.is_none());
    }

    #[tokio::test]
    async fn annotation_applies_to_matching_current_chunk() {
        let mut session = ChunkSession::builder()
            .id_generator(crate::SequentialIdGen::new())
            .build();
        session
            .handle_message(IncomingMessage::ChunkVariants {
                variants: vec![variant("猫")],
                playback_time_s: None,
            })
            .await;

        session
            .handle_message(IncomingMessage::ChunkWithFurigana {
                chunk_with_furigana: ChunkWithFurigana {
                    maybe_rubies: vec![MaybeRuby::ruby("犬", "いぬ")],
                },
            })
            .await;
        assert!(!session.current().text.has_furigana());

        session
            .handle_message(IncomingMessage::ChunkWithFurigana {
                chunk_with_furigana: ChunkWithFurigana {
                    maybe_rubies: vec![MaybeRuby::ruby("猫", "ねこ")],
                },
            })
            .await;
        assert!(session.current().text.has_furigana());
    }

    #[tokio::test]
    async fn alternatives_are_kept_for_picking() {
        let mut session = ChunkSession::new();
        session
            .handle_message(IncomingMessage::ChunkVariants {
                variants: vec![variant("a"), variant("b"), variant("c")],
                playback_time_s: None,
            })
            .await;
        assert_eq!(session.current().text.base(), "a");
        assert_eq!(session.chunk_variants().len(), 2);
    }
}
