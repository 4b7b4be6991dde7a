use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use capture_interface::{ChunkEnhancements, ChunkEnhancementsRequest};

use crate::id::ChunkId;
use crate::text::MaybeRuby;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async pronunciation-annotation contract.
///
/// Given plain text, returns the same text split into runs with optional readings. The
/// concatenated `base` of the returned runs is expected to equal the input.
///
/// The session awaits the enhancer inside `insert` when it is not waiting for a new chunk,
/// so implementations should bound their own latency (see [`TimeoutEnhancer`]).
pub trait Enhancer: Send + Sync {
    fn enhance<'a>(&'a self, text: &'a str) -> BoxFuture<'a, crate::Result<Vec<MaybeRuby>>>;
}

impl<E: Enhancer + ?Sized> Enhancer for Box<E> {
    fn enhance<'a>(&'a self, text: &'a str) -> BoxFuture<'a, crate::Result<Vec<MaybeRuby>>> {
        (**self).enhance(text)
    }
}

/// Request/response leg of the backend transport that serves enhancements.
pub trait EnhancementTransport: Send + Sync {
    fn get_chunk_enhancements(
        &self,
        request: ChunkEnhancementsRequest,
    ) -> BoxFuture<'_, crate::Result<ChunkEnhancements>>;
}

/// Adapts an [`EnhancementTransport`] into an [`Enhancer`].
pub struct TransportEnhancer<T>(pub T);

impl<T: EnhancementTransport> Enhancer for TransportEnhancer<T> {
    fn enhance<'a>(&'a self, text: &'a str) -> BoxFuture<'a, crate::Result<Vec<MaybeRuby>>> {
        Box::pin(async move {
            if text.is_empty() {
                return Ok(Vec::new());
            }
            let response = self
                .0
                .get_chunk_enhancements(ChunkEnhancementsRequest::furigana(text))
                .await?;
            Ok(response.furigana_maybe_rubies)
        })
    }
}

/// Fails an enhancement that takes longer than `timeout`.
pub struct TimeoutEnhancer<E> {
    inner: E,
    timeout: Duration,
}

impl<E> TimeoutEnhancer<E> {
    pub fn new(inner: E, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl<E: Enhancer> Enhancer for TimeoutEnhancer<E> {
    fn enhance<'a>(&'a self, text: &'a str) -> BoxFuture<'a, crate::Result<Vec<MaybeRuby>>> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, self.inner.enhance(text)).await {
                Ok(result) => result,
                Err(_) => Err(crate::Error::EnhancementTimedOut(self.timeout)),
            }
        })
    }
}

/// Snapshot of the chunk an enhancement was requested for.
///
/// A result is applied only while a chunk with `chunk_id` still exists and still has
/// `text` as its plain text; anything else means the chunk was superseded meanwhile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementTicket {
    pub chunk_id: ChunkId,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct SlowEnhancer(Duration);

    impl Enhancer for SlowEnhancer {
        fn enhance<'a>(&'a self, text: &'a str) -> BoxFuture<'a, crate::Result<Vec<MaybeRuby>>> {
            Box::pin(async move {
                tokio::time::sleep(self.0).await;
                Ok(vec![MaybeRuby::plain(text)])
            })
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        requests: Mutex<Vec<ChunkEnhancementsRequest>>,
    }

    impl EnhancementTransport for RecordingTransport {
        fn get_chunk_enhancements(
            &self,
            request: ChunkEnhancementsRequest,
        ) -> BoxFuture<'_, crate::Result<ChunkEnhancements>> {
            self.requests.lock().unwrap().push(request);
            Box::pin(async {
                Ok(ChunkEnhancements {
                    furigana_maybe_rubies: vec![MaybeRuby::ruby("猫", "ねこ")],
                })
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_enhancement_times_out() {
        let enhancer = TimeoutEnhancer::new(
            SlowEnhancer(Duration::from_secs(10)),
            Duration::from_secs(3),
        );
        let err = enhancer.enhance("猫").await.unwrap_err();
        assert!(matches!(err, crate::Error::EnhancementTimedOut(d) if d == Duration::from_secs(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_enhancement_passes_through() {
        let enhancer = TimeoutEnhancer::new(
            SlowEnhancer(Duration::from_millis(100)),
            Duration::from_secs(3),
        );
        assert_eq!(
            enhancer.enhance("猫").await.unwrap(),
            vec![MaybeRuby::plain("猫")]
        );
    }

    #[tokio::test]
    async fn transport_enhancer_requests_furigana() {
        let enhancer = TransportEnhancer(RecordingTransport::default());
        let runs = enhancer.enhance("猫").await.unwrap();
        assert_eq!(runs, vec![MaybeRuby::ruby("猫", "ねこ")]);

        let requests = enhancer.0.requests.lock().unwrap();
        assert_eq!(requests.as_slice(), &[ChunkEnhancementsRequest::furigana("猫")]);
    }

    #[tokio::test]
    async fn transport_enhancer_skips_empty_text() {
        let enhancer = TransportEnhancer(RecordingTransport::default());
        assert!(enhancer.enhance("").await.unwrap().is_empty());
        assert!(enhancer.0.requests.lock().unwrap().is_empty());
    }
}
