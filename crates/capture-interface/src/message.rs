use crate::common_derives;

common_derives! {
    /// One annotated run of text: `base` characters with an optional pronunciation
    /// reading attached to them.
    pub struct MaybeRuby {
        pub base: String,
        pub text: Option<String>,
    }
}

impl MaybeRuby {
    pub fn plain(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            text: None,
        }
    }

    pub fn ruby(base: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            text: Some(text.into()),
        }
    }

    pub fn is_ruby(&self) -> bool {
        self.text.is_some()
    }
}

common_derives! {
    /// A ranked recognition candidate. The backend sends candidates best-first.
    #[serde(rename_all = "camelCase")]
    pub struct ChunkVariant {
        pub content: String,
        #[serde(default)]
        pub original_content: Option<String>,
        #[serde(default)]
        pub labels: Vec<String>,
        #[serde(default)]
        pub score: f64,
    }
}

common_derives! {
    #[serde(rename_all = "camelCase")]
    pub struct ChunkWithFurigana {
        pub maybe_rubies: Vec<MaybeRuby>,
    }
}

common_derives! {
    /// Messages pushed by the backend transport that concern the chunk history.
    #[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
    #[non_exhaustive]
    pub enum IncomingMessage {
        ChunkVariants {
            variants: Vec<ChunkVariant>,
            #[serde(default)]
            playback_time_s: Option<f64>,
        },
        ChunkTranslation {
            translation: String,
            #[serde(default)]
            playback_time_s: Option<f64>,
        },
        ChunkWithFurigana {
            chunk_with_furigana: ChunkWithFurigana,
        },
    }
}

impl IncomingMessage {
    pub fn playback_time_s(&self) -> Option<f64> {
        match self {
            Self::ChunkVariants {
                playback_time_s, ..
            }
            | Self::ChunkTranslation {
                playback_time_s, ..
            } => *playback_time_s,
            Self::ChunkWithFurigana { .. } => None,
        }
    }
}
