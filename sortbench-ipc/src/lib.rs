#![warn(missing_docs)]
//! Sortbench IPC Protocol
//!
//! Binary protocol spoken between the scheduler (supervisor) and the worker
//! processes that execute candidate sorts. Messages are rkyv archives wrapped
//! in length-prefixed frames, so a worker that dies mid-write leaves a short
//! frame the supervisor can detect instead of a half-parsed message.

mod framing;
mod messages;

pub use framing::{FrameError, FrameReader, FrameWriter, MAX_FRAME_SIZE, read_frame, write_frame};
pub use messages::{FailureKind, RunRequest, SupervisorCommand, WorkerCapabilities, WorkerMessage};

/// Protocol version for compatibility checking
pub const PROTOCOL_VERSION: u32 = 1;

/// Environment variable carrying the inherited `<read_fd>,<write_fd>` pair
pub const IPC_FD_ENV: &str = "SORTBENCH_IPC_FD";

/// Environment variable naming the CPU a worker pins itself to
pub const WORKER_CPU_ENV: &str = "SORTBENCH_WORKER_CPU";

/// Hidden command-line flag that turns a sortbench binary into a worker
pub const WORKER_FLAG: &str = "--sortbench-worker";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_flag_is_long_option() {
        assert!(WORKER_FLAG.starts_with("--"));
        assert!(!IPC_FD_ENV.is_empty());
        assert_ne!(IPC_FD_ENV, WORKER_CPU_ENV);
    }
}
