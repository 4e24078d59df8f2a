//! Split phase: input lines into shuffled, persisted chunks
//!
//! Lines are raw bytes up to and including `\n`. Content is never decoded,
//! so CRLF endings and non-UTF-8 input pass through unchanged. A final line
//! without a terminator gets `\n` appended so it cannot fuse with whatever
//! chunk follows it in the output.

use std::cell::Cell;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;

use super::chunk::{ChunkHandle, ChunkRegistry};
use super::errors::{ShuffleError, ShuffleResult};
use super::progress::ShuffleProgress;
use crate::observability::{trace_event, Event, Logger, Severity};

/// Initial capacity of the line buffer. The buffer grows up to the chunk
/// capacity as needed.
const MAX_PREALLOCATED_LINES: usize = 64 * 1024;

/// Splits an input file into shuffled chunks inside `chunk_dir`
///
/// Sequence numbers keep increasing across calls to `split`, so several
/// registries can share one directory.
pub struct Chunker<'a> {
    chunk_dir: PathBuf,
    capacity: usize,
    next_sequence: Cell<u64>,
    progress: &'a ShuffleProgress,
}

impl<'a> Chunker<'a> {
    /// Create a chunker writing into `chunk_dir`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `capacity` is zero.
    pub fn new(
        chunk_dir: &Path,
        capacity: usize,
        progress: &'a ShuffleProgress,
    ) -> ShuffleResult<Self> {
        if capacity == 0 {
            return Err(ShuffleError::invalid_config("chunk capacity must be > 0"));
        }
        Ok(Self {
            chunk_dir: chunk_dir.to_path_buf(),
            capacity,
            next_sequence: Cell::new(0),
            progress,
        })
    }

    /// Split `input_path` into chunks of at most `capacity` lines.
    ///
    /// Every chunk but the last holds exactly `capacity` lines. Handles are
    /// returned in creation order.
    ///
    /// # Errors
    ///
    /// - `InputNotFound` if the input is missing or is a directory
    /// - `IoFailure` for any other read or write error
    pub fn split<R: Rng + ?Sized>(
        &self,
        input_path: &Path,
        rng: &mut R,
    ) -> ShuffleResult<ChunkRegistry> {
        let mut reader = BufReader::new(open_input(input_path)?);
        let mut registry = ChunkRegistry::new();
        let mut buffer: Vec<Vec<u8>> =
            Vec::with_capacity(self.capacity.min(MAX_PREALLOCATED_LINES));

        loop {
            let mut line = Vec::new();
            let n = reader
                .read_until(b'\n', &mut line)
                .map_err(|e| ShuffleError::io_at_path("Failed to read", input_path, e))?;
            if n == 0 {
                break;
            }
            if line.last() != Some(&b'\n') {
                line.push(b'\n');
            }

            buffer.push(line);
            self.progress.increment_lines_read();

            if buffer.len() == self.capacity {
                self.flush_chunk(&mut buffer, &mut registry, rng)?;
            }
        }

        if !buffer.is_empty() {
            self.flush_chunk(&mut buffer, &mut registry, rng)?;
        }

        Ok(registry)
    }

    /// Shuffle the buffered lines, persist them and register the chunk
    fn flush_chunk<R: Rng + ?Sized>(
        &self,
        buffer: &mut Vec<Vec<u8>>,
        registry: &mut ChunkRegistry,
        rng: &mut R,
    ) -> ShuffleResult<()> {
        buffer.shuffle(rng);

        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);
        let path = self.chunk_dir.join(ChunkHandle::file_name(sequence));
        let byte_len = write_lines(&path, buffer)
            .map_err(|e| ShuffleError::io_at_path("Failed to write chunk", &path, e))?;

        if Logger::enabled(Severity::Trace) {
            trace_event(
                Event::ChunkWritten,
                &[
                    ("bytes", byte_len.to_string().as_str()),
                    ("lines", buffer.len().to_string().as_str()),
                    ("sequence", sequence.to_string().as_str()),
                ],
            );
        }

        registry.register(ChunkHandle::new(path, sequence, buffer.len(), byte_len));
        self.progress.record_chunk_created();
        buffer.clear();
        Ok(())
    }
}

fn open_input(path: &Path) -> ShuffleResult<File> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ShuffleError::input_not_found(path),
        _ => ShuffleError::io_at_path("Failed to open input", path, e),
    })?;

    let metadata = file
        .metadata()
        .map_err(|e| ShuffleError::io_at_path("Failed to stat input", path, e))?;
    if metadata.is_dir() {
        return Err(ShuffleError::input_not_found(path));
    }

    Ok(file)
}

/// Write all lines to a new file, returning the byte count.
/// Fails with `AlreadyExists` rather than overwrite another chunk.
/// The file is flushed and closed before returning.
fn write_lines(path: &Path, lines: &[Vec<u8>]) -> io::Result<u64> {
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let mut writer = BufWriter::new(file);
    let mut written = 0u64;
    for line in lines {
        writer.write_all(line)?;
        written += line.len() as u64;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuffle::ShuffleErrorCode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use tempfile::TempDir;

    fn numbered_lines(n: usize) -> String {
        (1..=n).map(|i| format!("L{}\n", i)).collect()
    }

    fn setup(input: &[u8]) -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("input.txt");
        fs::write(&input_path, input).unwrap();
        let chunk_dir = temp_dir.path().join("chunks");
        fs::create_dir(&chunk_dir).unwrap();
        (temp_dir, input_path, chunk_dir)
    }

    fn sorted_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut lines: Vec<Vec<u8>> = bytes
            .split_inclusive(|b| *b == b'\n')
            .map(|l| l.to_vec())
            .collect();
        lines.sort();
        lines
    }

    #[test]
    fn test_ten_lines_chunk_size_three() {
        let (_temp, input_path, chunk_dir) = setup(numbered_lines(10).as_bytes());
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(&chunk_dir, 3, &progress).unwrap();
        let registry = chunker
            .split(&input_path, &mut StdRng::seed_from_u64(3))
            .unwrap();

        let sizes: Vec<usize> = registry.handles().iter().map(|h| h.line_count()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);

        let sequences: Vec<u64> = registry.handles().iter().map(|h| h.sequence()).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3]);

        assert_eq!(progress.lines_read(), 10);
        assert_eq!(progress.chunks_remaining(), 4);
    }

    #[test]
    fn test_each_chunk_permutes_its_block() {
        let input = numbered_lines(10);
        let (_temp, input_path, chunk_dir) = setup(input.as_bytes());
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(&chunk_dir, 3, &progress).unwrap();
        let registry = chunker
            .split(&input_path, &mut StdRng::seed_from_u64(11))
            .unwrap();

        let input_lines: Vec<&str> = input.split_inclusive('\n').collect();
        for (handle, block) in registry.handles().iter().zip(input_lines.chunks(3)) {
            let contents = fs::read(handle.path()).unwrap();
            assert_eq!(contents.len() as u64, handle.byte_len());
            assert_eq!(
                sorted_lines(&contents),
                sorted_lines(block.concat().as_bytes())
            );
        }
    }

    #[test]
    fn test_chunk_count_is_ceiling() {
        for (lines, capacity, expected) in [(0, 4, 0), (1, 4, 1), (4, 4, 1), (5, 4, 2), (9, 2, 5)] {
            let (_temp, input_path, chunk_dir) = setup(numbered_lines(lines).as_bytes());
            let progress = ShuffleProgress::new();
            let chunker = Chunker::new(&chunk_dir, capacity, &progress).unwrap();
            let registry = chunker
                .split(&input_path, &mut StdRng::seed_from_u64(0))
                .unwrap();
            assert_eq!(registry.len(), expected, "lines={} capacity={}", lines, capacity);
        }
    }

    #[test]
    fn test_capacity_larger_than_input_gives_one_chunk() {
        let (_temp, input_path, chunk_dir) = setup(numbered_lines(7).as_bytes());
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(&chunk_dir, 1000, &progress).unwrap();
        let registry = chunker
            .split(&input_path, &mut StdRng::seed_from_u64(5))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.handles()[0].line_count(), 7);
    }

    #[test]
    fn test_empty_input_gives_no_chunks() {
        let (_temp, input_path, chunk_dir) = setup(b"");
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(&chunk_dir, 3, &progress).unwrap();
        let registry = chunker
            .split(&input_path, &mut StdRng::seed_from_u64(0))
            .unwrap();

        assert!(registry.is_empty());
        assert_eq!(fs::read_dir(&chunk_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_trailing_newline_is_terminated() {
        let (_temp, input_path, chunk_dir) = setup(b"a\nb\nc");
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(&chunk_dir, 10, &progress).unwrap();
        let registry = chunker
            .split(&input_path, &mut StdRng::seed_from_u64(0))
            .unwrap();

        let contents = fs::read(registry.handles()[0].path()).unwrap();
        assert_eq!(sorted_lines(&contents), sorted_lines(b"a\nb\nc\n"));
    }

    #[test]
    fn test_crlf_and_binary_bytes_preserved() {
        let input: &[u8] = b"one\r\n\xff\xfe\n\r\n";
        let (_temp, input_path, chunk_dir) = setup(input);
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(&chunk_dir, 2, &progress).unwrap();
        let registry = chunker
            .split(&input_path, &mut StdRng::seed_from_u64(0))
            .unwrap();

        let mut all = Vec::new();
        for handle in registry.handles() {
            all.extend(fs::read(handle.path()).unwrap());
        }
        assert_eq!(sorted_lines(&all), sorted_lines(input));
    }

    #[test]
    fn test_missing_input_is_input_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(temp_dir.path(), 3, &progress).unwrap();
        let err = chunker
            .split(&temp_dir.path().join("absent.txt"), &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert_eq!(err.code(), ShuffleErrorCode::InputNotFound);
    }

    #[test]
    fn test_directory_input_is_input_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(temp_dir.path(), 3, &progress).unwrap();
        let err = chunker
            .split(temp_dir.path(), &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert_eq!(err.code(), ShuffleErrorCode::InputNotFound);
    }

    #[test]
    fn test_unwritable_chunk_dir_is_io_failure() {
        let (_temp, input_path, chunk_dir) = setup(b"x\n");
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(&chunk_dir.join("gone"), 3, &progress).unwrap();
        let err = chunker
            .split(&input_path, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert_eq!(err.code(), ShuffleErrorCode::IoFailure);
    }

    #[test]
    fn test_second_split_keeps_first_registry_intact() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.txt");
        let second = temp_dir.path().join("b.txt");
        fs::write(&first, "a1\na2\n").unwrap();
        fs::write(&second, "b1\nb2\n").unwrap();
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(temp_dir.path(), 2, &progress).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let registry_a = chunker.split(&first, &mut rng).unwrap();
        let registry_b = chunker.split(&second, &mut rng).unwrap();

        assert_eq!(registry_a.handles()[0].sequence(), 0);
        assert_eq!(registry_b.handles()[0].sequence(), 1);
        assert_ne!(registry_a.handles()[0].path(), registry_b.handles()[0].path());

        let contents = fs::read(registry_a.handles()[0].path()).unwrap();
        assert_eq!(sorted_lines(&contents), sorted_lines(b"a1\na2\n"));
    }

    #[test]
    fn test_existing_chunk_file_is_not_overwritten() {
        let (_temp, input_path, chunk_dir) = setup(b"new\n");
        let taken = chunk_dir.join(ChunkHandle::file_name(0));
        fs::write(&taken, "old\n").unwrap();
        let progress = ShuffleProgress::new();
        let chunker = Chunker::new(&chunk_dir, 3, &progress).unwrap();

        let err = chunker
            .split(&input_path, &mut StdRng::seed_from_u64(0))
            .unwrap_err();

        assert_eq!(err.code(), ShuffleErrorCode::IoFailure);
        assert_eq!(fs::read_to_string(&taken).unwrap(), "old\n");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let progress = ShuffleProgress::new();
        assert!(Chunker::new(temp_dir.path(), 0, &progress).is_err());
    }
}
