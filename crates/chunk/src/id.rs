use std::fmt;

/// Identity of one stored chunk value. A chunk replaced in place receives a fresh id,
/// so anything keyed by id (enhancement tickets, UI caches) goes stale with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(transparent)]
pub struct ChunkId(String);

impl ChunkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChunkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub trait IdGenerator: Send + Sync {
    fn next_id(&mut self) -> ChunkId;
}

#[derive(Default)]
pub struct UuidIdGen;

impl IdGenerator for UuidIdGen {
    fn next_id(&mut self) -> ChunkId {
        ChunkId(uuid::Uuid::new_v4().to_string())
    }
}

/// Deterministic ids (`"0"`, `"1"`, …) for tests and fixture replays.
#[derive(Default)]
pub struct SequentialIdGen(u64);

impl SequentialIdGen {
    pub fn new() -> Self {
        Self(0)
    }
}

impl IdGenerator for SequentialIdGen {
    fn next_id(&mut self) -> ChunkId {
        let id = self.0;
        self.0 += 1;
        ChunkId(id.to_string())
    }
}
