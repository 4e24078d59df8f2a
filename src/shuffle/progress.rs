//! Progress counters for a shuffle run
//!
//! - Written only by the core (chunker and merger)
//! - Read by the optional status thread
//! - Never consulted for correctness

use std::sync::atomic::{AtomicU64, Ordering};

/// Run progress shared with observers
///
/// All counters use Relaxed ordering. Observers may see a slightly stale
/// value, which is fine for status display.
#[derive(Debug, Default)]
pub struct ShuffleProgress {
    /// Input lines read so far
    lines_read: AtomicU64,
    /// Chunks persisted by the chunker
    chunks_created: AtomicU64,
    /// Chunks not yet merged into the output
    chunks_remaining: AtomicU64,
    /// Chunks appended to the output
    chunks_merged: AtomicU64,
    /// Bytes appended to the output
    bytes_written: AtomicU64,
}

impl ShuffleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    // Split phase

    pub fn increment_lines_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a persisted chunk; it stays pending until merged
    pub fn record_chunk_created(&self) {
        self.chunks_created.fetch_add(1, Ordering::Relaxed);
        self.chunks_remaining.fetch_add(1, Ordering::Relaxed);
    }

    // Merge phase

    /// Reset the pending count to the chunks about to be merged
    pub fn set_chunks_remaining(&self, count: u64) {
        self.chunks_remaining.store(count, Ordering::Relaxed);
    }

    /// Record a chunk appended to the output
    pub fn record_chunk_merged(&self, bytes: u64) {
        self.chunks_merged.fetch_add(1, Ordering::Relaxed);
        let _ = self
            .chunks_remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(n.saturating_sub(1))
            });
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    pub fn chunks_remaining(&self) -> u64 {
        self.chunks_remaining.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            chunks_created: self.chunks_created.load(Ordering::Relaxed),
            chunks_remaining: self.chunks_remaining.load(Ordering::Relaxed),
            chunks_merged: self.chunks_merged.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of run progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub lines_read: u64,
    pub chunks_created: u64,
    pub chunks_remaining: u64,
    pub chunks_merged: u64,
    pub bytes_written: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_progress_is_zero() {
        let progress = ShuffleProgress::new();
        assert_eq!(progress.snapshot(), ProgressSnapshot::default());
    }

    #[test]
    fn test_chunk_lifecycle_counts() {
        let progress = ShuffleProgress::new();
        progress.record_chunk_created();
        progress.record_chunk_created();
        assert_eq!(progress.chunks_remaining(), 2);

        progress.record_chunk_merged(10);
        let snapshot = progress.snapshot();
        assert_eq!(snapshot.chunks_created, 2);
        assert_eq!(snapshot.chunks_remaining, 1);
        assert_eq!(snapshot.chunks_merged, 1);
        assert_eq!(snapshot.bytes_written, 10);
    }

    #[test]
    fn test_remaining_never_wraps() {
        let progress = ShuffleProgress::new();
        progress.record_chunk_merged(3);
        assert_eq!(progress.chunks_remaining(), 0);

        progress.set_chunks_remaining(2);
        progress.record_chunk_merged(3);
        assert_eq!(progress.chunks_remaining(), 1);
    }

    #[test]
    fn test_reads_from_other_thread() {
        use std::sync::Arc;
        use std::thread;

        let progress = Arc::new(ShuffleProgress::new());
        for _ in 0..5 {
            progress.record_chunk_created();
        }

        let observer = Arc::clone(&progress);
        let seen = thread::spawn(move || observer.chunks_remaining())
            .join()
            .unwrap();
        assert_eq!(seen, 5);
    }
}
