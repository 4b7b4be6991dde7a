#[derive(Clone, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Fixture {
    /// Recognized subtitles with playback times; translations arrive early and late.
    Timed,
    /// Captured text without playback times, with a furigana annotation.
    Untimed,
}

impl Fixture {
    pub fn json(&self) -> &'static str {
        match self {
            Self::Timed => include_str!("fixtures/timed.json"),
            Self::Untimed => include_str!("fixtures/untimed.json"),
        }
    }
}
