//! Observable events of a shuffle run

use std::fmt;

/// Lifecycle events emitted by the pipeline and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Run
    RunStart,
    RunComplete,
    RunFailed,

    // Configuration
    ConfigLoaded,

    // Temporary storage
    TempDirCreated,
    TempDirRemoved,

    // Split phase
    ChunkWritten,

    // Merge phase
    ChunkMerged,

    // Status thread
    StatusRequested,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RunStart => "SHUFFLE_RUN_BEGIN",
            Event::RunComplete => "SHUFFLE_RUN_COMPLETE",
            Event::RunFailed => "SHUFFLE_RUN_FAILED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TempDirCreated => "TEMP_DIR_CREATED",
            Event::TempDirRemoved => "TEMP_DIR_REMOVED",
            Event::ChunkWritten => "CHUNK_WRITTEN",
            Event::ChunkMerged => "CHUNK_MERGED",
            Event::StatusRequested => "STATUS_REQUESTED",
        }
    }

    /// Returns true if this event ends the process with a failure
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::RunFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_are_upper_snake_case() {
        let events = [
            Event::RunStart,
            Event::RunComplete,
            Event::RunFailed,
            Event::ConfigLoaded,
            Event::TempDirCreated,
            Event::TempDirRemoved,
            Event::ChunkWritten,
            Event::ChunkMerged,
            Event::StatusRequested,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::RunFailed.is_fatal());
        assert!(!Event::RunComplete.is_fatal());
        assert!(!Event::ChunkMerged.is_fatal());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::TempDirRemoved), "TEMP_DIR_REMOVED");
    }
}
