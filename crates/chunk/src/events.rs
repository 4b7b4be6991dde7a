use tokio::sync::broadcast;

use crate::id::ChunkId;
use crate::types::FlashState;

/// Change notifications for observers of a [`crate::ChunkSession`].
///
/// Events carry only what changed; observers read the new state back through the
/// session's accessors.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type")]
pub enum ChunkEvent {
    #[serde(rename = "chunkAdded")]
    ChunkAdded { chunk_id: ChunkId, index: usize },
    #[serde(rename = "chunkReplaced")]
    ChunkReplaced {
        previous_id: ChunkId,
        chunk_id: ChunkId,
        index: usize,
    },
    #[serde(rename = "chunkEvicted")]
    ChunkEvicted { chunk_id: ChunkId },
    #[serde(rename = "pointerMoved")]
    PointerMoved { pointer: usize },
    #[serde(rename = "translationChanged")]
    TranslationChanged { index: usize },
    #[serde(rename = "textSelectionChanged")]
    TextSelectionChanged { range: Option<(usize, usize)> },
    #[serde(rename = "historySelectionChanged")]
    HistorySelectionChanged { selected_indices: Vec<usize> },
    #[serde(rename = "editingChanged")]
    EditingChanged { editing: bool },
    #[serde(rename = "editTextChanged")]
    EditTextChanged,
    #[serde(rename = "waitingChanged")]
    WaitingChanged { waiting: bool },
    #[serde(rename = "flash")]
    Flash { state: FlashState },
    #[serde(rename = "historyFlash")]
    HistoryFlash { indices: Vec<usize>, flashing: bool },
}

pub(crate) struct Notifier {
    tx: broadcast::Sender<ChunkEvent>,
}

impl Notifier {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ChunkEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, event: ChunkEvent) {
        // No subscribers is a normal state.
        let _ = self.tx.send(event);
    }
}
