//! Interactive status reporting
//!
//! A detached thread prints a prompt, then waits for lines on stdin and
//! answers each one with the current progress. It only reads the shared counters; the run never
//! waits for it, and it is abandoned when the process exits.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

use crate::observability::{Event, Logger};
use crate::shuffle::ShuffleProgress;

const PROMPT: &str = "Press Enter to show program status...";

/// Spawn the status thread on stdin/stdout
pub fn spawn_status_reporter(progress: Arc<ShuffleProgress>) -> io::Result<()> {
    thread::Builder::new()
        .name("chunkshuf-status".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            let stdout = io::stdout();
            // Stops quietly once stdin closes or stdout breaks.
            let _ = report_status(stdin.lock(), stdout, &progress);
        })?;
    Ok(())
}

/// Print the prompt, then answer every input line with one status line
/// until `input` ends
fn report_status<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    progress: &ShuffleProgress,
) -> io::Result<()> {
    writeln!(output, "{}", PROMPT)?;
    output.flush()?;

    for line in input.lines() {
        line?;
        Logger::trace(Event::StatusRequested.as_str(), &[]);
        let snapshot = progress.snapshot();
        writeln!(
            output,
            "status: {} chunks remaining ({} created, {} merged, {} lines read)",
            snapshot.chunks_remaining,
            snapshot.chunks_created,
            snapshot.chunks_merged,
            snapshot.lines_read
        )?;
        output.flush()?;
    }
    Ok(())
}
