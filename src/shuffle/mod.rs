//! External line shuffling with bounded memory
//!
//! Two phases over a per-run temporary directory:
//!
//! 1. **Split**: read the input sequentially, cut it into chunks of
//!    `chunk_size` lines, shuffle each chunk in memory and persist it.
//! 2. **Merge**: draw chunks uniformly at random without replacement and
//!    append each one whole to the output, deleting it afterwards.
//!
//! # Randomness
//!
//! The result is not a uniform permutation of the file. Lines that start
//! in the same chunk stay together in one contiguous block of the output;
//! only chunk order and order within a chunk are random. Lowering
//! `chunk_size` mixes more finely at the cost of more temporary files.
//!
//! # Failure
//!
//! The temporary directory is always removed. The output file is not: a
//! failed merge can leave it partially written.

mod chunk;
mod chunker;
mod config;
mod errors;
mod merger;
mod pipeline;
mod progress;

pub use chunk::{ChunkHandle, ChunkRegistry};
pub use chunker::Chunker;
pub use config::{ShuffleConfig, DEFAULT_CHUNK_SIZE};
pub use errors::{ShuffleError, ShuffleErrorCode, ShuffleResult};
pub use merger::{MergeStats, Merger};
pub use pipeline::{shuffle_file, ShuffleReport, TEMP_DIR_PREFIX};
pub use progress::{ProgressSnapshot, ShuffleProgress};
