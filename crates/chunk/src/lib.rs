pub mod buffer;
pub mod config;
pub mod enhance;
pub mod events;
pub mod id;
pub mod input;
pub mod selection;
pub mod session;
pub mod sync;
pub mod text;
pub mod transform;
pub mod translation;
pub mod types;

mod error;

pub use buffer::ChunkBuffer;
pub use config::{ChunkConfig, Settings};
pub use enhance::{
    BoxFuture, EnhancementTicket, EnhancementTransport, Enhancer, TimeoutEnhancer,
    TransportEnhancer,
};
pub use error::{Error, Result};
pub use events::ChunkEvent;
pub use id::{ChunkId, IdGenerator, SequentialIdGen, UuidIdGen};
pub use input::ChunkInput;
pub use selection::{TextSelection, TextSelectionState};
pub use session::{
    ChunkSession, ChunkSessionBuilder, CopyMode, DefaultViewHooks, InsertInput, InsertOp,
    InsertOutcome, InsertParams, TranslationDestination, TranslationPlacement, ViewHooks,
};
pub use sync::{TranslationSync, TranslationWindows};
pub use text::{ChunkText, MaybeRuby, RawChunkText};
pub use translation::{ChunkTranslation, DECAY_AFTER_CHUNK_CHANGES, TranslationSegment};
pub use types::{Chunk, FlashState, SelectionInfo, TranslationWithContext};
