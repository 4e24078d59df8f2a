//! Chunk handles and the chunk registry
//!
//! A chunk is a contiguous block of input lines, shuffled in memory and
//! persisted as `chunk_<seq>.txt`. The registry owns every handle until
//! the merger draws it.

use std::path::{Path, PathBuf};

use rand::Rng;

/// Reference to a persisted chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHandle {
    path: PathBuf,
    sequence: u64,
    line_count: usize,
    byte_len: u64,
}

impl ChunkHandle {
    pub(crate) fn new(path: PathBuf, sequence: u64, line_count: usize, byte_len: u64) -> Self {
        Self {
            path,
            sequence,
            line_count,
            byte_len,
        }
    }

    /// File name for the chunk with the given sequence number
    pub fn file_name(sequence: u64) -> String {
        format!("chunk_{}.txt", sequence)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creation order, strictly increasing within a run
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }
}

/// Set of chunk handles produced by a split
///
/// Consumed destructively: each handle leaves the registry exactly once.
#[derive(Debug, Default)]
pub struct ChunkRegistry {
    handles: Vec<ChunkHandle>,
}

impl ChunkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fully written chunk
    pub(crate) fn register(&mut self, handle: ChunkHandle) {
        debug_assert!(
            self.handles
                .last()
                .map_or(true, |last| last.sequence < handle.sequence),
            "chunk sequence numbers must increase"
        );
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handles still registered. Creation order until the first draw.
    pub fn handles(&self) -> &[ChunkHandle] {
        &self.handles
    }

    /// Total lines across all registered chunks
    pub fn total_lines(&self) -> u64 {
        self.handles.iter().map(|h| h.line_count as u64).sum()
    }

    /// Remove and return one handle chosen uniformly at random.
    ///
    /// Swap-remove keeps each draw O(1). Repeated draws yield every
    /// ordering of the handles with equal probability.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<ChunkHandle> {
        if self.handles.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.handles.len());
        Some(self.handles.swap_remove(idx))
    }
}
