use crate::{MaybeRuby, common_derives};

common_derives! {
    #[serde(rename_all = "kebab-case")]
    pub enum Enhancement {
        Furigana,
    }
}

common_derives! {
    /// Body of a `get-chunk-enhancements` request.
    pub struct ChunkEnhancementsRequest {
        pub text: String,
        pub enhancements: Vec<Enhancement>,
    }
}

impl ChunkEnhancementsRequest {
    pub fn furigana(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            enhancements: vec![Enhancement::Furigana],
        }
    }
}

common_derives! {
    #[serde(rename_all = "camelCase")]
    pub struct ChunkEnhancements {
        #[serde(default)]
        pub furigana_maybe_rubies: Vec<MaybeRuby>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_kebab_case_enhancements() {
        let json = serde_json::to_value(ChunkEnhancementsRequest::furigana("猫")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "text": "猫", "enhancements": ["furigana"] })
        );
    }

    #[test]
    fn response_defaults_to_no_runs() {
        let res: ChunkEnhancements = serde_json::from_str("{}").unwrap();
        assert!(res.furigana_maybe_rubies.is_empty());
    }
}
