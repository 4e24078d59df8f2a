//! chunkshuf - shuffle line-oriented files too large for memory
//!
//! Input lines are cut into fixed-size chunks, each chunk is shuffled in
//! memory and written to a temporary directory, then the chunks are
//! appended to the output in random order. See [`shuffle`] for the
//! randomness this does and does not provide.

pub mod cli;
pub mod observability;
pub mod shuffle;
