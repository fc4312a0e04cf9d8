//! IPC Message Types
//!
//! One `Run` command produces exactly one reply: `Completed` or `Failure`.
//! A timeout is never reported by the worker itself; the supervisor observes
//! silence and kills the process.

use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};

/// A single work unit as seen by a worker process.
///
/// The worker regenerates the input array from `seed`, `size` and `iteration`
/// so that arrays never cross the pipe and every unit starts from fresh data.
#[derive(Debug, Clone, PartialEq, Eq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct RunRequest {
    /// Registered display name of the candidate
    pub candidate: String,
    /// Number of elements to generate
    pub size: u64,
    /// 1-based iteration index within the size
    pub iteration: u32,
    /// Run-wide workload seed
    pub seed: u64,
    /// Smallest generated value (inclusive)
    pub min_value: i64,
    /// Largest generated value (inclusive)
    pub max_value: i64,
}

/// Worker capabilities advertised during handshake
#[derive(Debug, Clone, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct WorkerCapabilities {
    /// Protocol version for compatibility
    pub protocol_version: u32,
    /// Process id of the worker
    pub pid: u32,
    /// Number of candidates registered in the worker binary
    pub candidate_count: u32,
}

impl WorkerCapabilities {
    /// Capabilities of the current process
    pub fn current(candidate_count: u32) -> Self {
        Self {
            protocol_version: crate::PROTOCOL_VERSION,
            pid: std::process::id(),
            candidate_count,
        }
    }
}

/// Messages sent from Worker to Supervisor
#[derive(Debug, Clone, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub enum WorkerMessage {
    /// Initial handshake with worker capabilities
    Hello(WorkerCapabilities),

    /// The candidate returned a correct result
    Completed {
        /// Wall-clock time of the sort call alone
        duration_nanos: u64,
    },

    /// The candidate returned, but the unit does not count as a sample
    Failure {
        /// Error category
        kind: FailureKind,
        /// Human-readable reason
        message: String,
    },
}

/// Categories of non-completing runs reported by a live worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub enum FailureKind {
    /// The candidate panicked
    Panic,
    /// The output was not a sorted permutation of the input
    IncorrectOutput,
    /// No candidate with the requested name is registered in the worker
    UnknownCandidate,
}

/// Commands sent from Supervisor to Worker
#[derive(Debug, Clone, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub enum SupervisorCommand {
    /// Execute one work unit
    Run(RunRequest),

    /// Health check; the worker does not reply
    Ping,

    /// Request graceful shutdown
    Shutdown,
}
