//! Supervisor Process
//!
//! Owns worker processes for process isolation. A worker runs one unit at a
//! time; the supervisor waits for the reply with `poll(2)` and SIGKILLs the
//! worker when the deadline passes. A killed or crashed worker is dropped and
//! the next unit gets a fresh one.

use sortbench_ipc::{
    FailureKind, FrameError, FrameReader, FrameWriter, IPC_FD_ENV, PROTOCOL_VERSION, RunRequest,
    SupervisorCommand, WORKER_CPU_ENV, WORKER_FLAG, WorkerCapabilities, WorkerMessage,
};
use std::env;
use std::os::unix::io::{FromRawFd, RawFd};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long a freshly spawned worker has to say hello
const HELLO_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest single `poll` wait; between waits the child's liveness is checked
const POLL_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to spawn worker: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("IPC error: {0}")]
    IpcError(String),

    #[error("worker crashed: {0}")]
    WorkerCrashed(String),

    #[error("timed out waiting for worker")]
    Timeout,

    #[error("worker protocol error: expected {expected}, got {got}")]
    ProtocolError { expected: String, got: String },
}

impl From<FrameError> for SupervisorError {
    fn from(e: FrameError) -> Self {
        SupervisorError::IpcError(e.to_string())
    }
}

/// What a live worker reported for one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitReply {
    /// Verified result; duration of the sort call alone
    Completed(Duration),
    /// The candidate returned or panicked without producing a valid result
    Failed { kind: FailureKind, message: String },
}

/// Result of polling for data
#[derive(Debug)]
enum PollResult {
    DataAvailable,
    Timeout,
    PipeClosed,
    Error(std::io::Error),
}

/// Wait for data to be available on a file descriptor with timeout
fn wait_for_data(fd: i32, timeout_ms: i32) -> PollResult {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    let result = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };

    if result < 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() == std::io::ErrorKind::Interrupted {
            // Ctrl-C lands here; the caller re-polls with the remaining time.
            return PollResult::Timeout;
        }
        PollResult::Error(err)
    } else if result == 0 {
        PollResult::Timeout
    } else if pollfd.revents & libc::POLLIN != 0 {
        PollResult::DataAvailable
    } else if pollfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
        PollResult::PipeClosed
    } else {
        PollResult::Timeout
    }
}

/// Create a close-on-exec pipe pair, returning (read_fd, write_fd).
///
/// Both ends are close-on-exec from the start, so a worker spawned by another
/// slot at the same moment never inherits them.
#[cfg(target_os = "linux")]
fn create_pipe() -> Result<(RawFd, RawFd), std::io::Error> {
    let mut fds = [0 as RawFd; 2];
    let ret = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok((fds[0], fds[1]))
}

/// Create a close-on-exec pipe pair, returning (read_fd, write_fd).
#[cfg(not(target_os = "linux"))]
fn create_pipe() -> Result<(RawFd, RawFd), std::io::Error> {
    let mut fds = [0 as RawFd; 2];
    let ret = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    for &fd in &fds {
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFD);
            libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC);
        }
    }
    Ok((fds[0], fds[1]))
}

/// Lowest descriptor the child parks its pipe ends on before placing them at 3/4
const PARK_FD_MIN: RawFd = 10;

/// Child side of the spawn, run between fork and exec.
///
/// Every inherited pipe end is close-on-exec. The two the worker needs are
/// first duplicated above fd 4 so that placing them cannot clobber each other,
/// then `dup2`ed onto 3 and 4, which clears close-on-exec on the copies only.
/// Only async-signal-safe calls are made here.
fn place_worker_fds(cmd_read: RawFd, msg_write: RawFd) -> std::io::Result<()> {
    unsafe {
        let parked_cmd = libc::fcntl(cmd_read, libc::F_DUPFD_CLOEXEC, PARK_FD_MIN);
        if parked_cmd < 0 {
            return Err(std::io::Error::last_os_error());
        }
        let parked_msg = libc::fcntl(msg_write, libc::F_DUPFD_CLOEXEC, PARK_FD_MIN);
        if parked_msg < 0 {
            return Err(std::io::Error::last_os_error());
        }
        if libc::dup2(parked_cmd, 3) < 0 || libc::dup2(parked_msg, 4) < 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Close a raw file descriptor.
fn close_fd(fd: RawFd) {
    unsafe {
        libc::close(fd);
    }
}

/// Worker process handle
pub struct WorkerHandle {
    child: Child,
    reader: FrameReader<std::fs::File>,
    writer: FrameWriter<std::fs::File>,
    capabilities: Option<WorkerCapabilities>,
    msg_read_fd: RawFd,
}

impl WorkerHandle {
    /// Spawn a worker from the current executable using fd 3/4 for IPC,
    /// optionally pinned to `cpu`.
    pub fn spawn(cpu: Option<usize>) -> Result<Self, SupervisorError> {
        let binary = env::current_exe().map_err(SupervisorError::SpawnFailed)?;
        Self::spawn_binary(&binary, cpu)
    }

    /// Spawn a worker from a specific binary
    pub fn spawn_binary(binary: &Path, cpu: Option<usize>) -> Result<Self, SupervisorError> {
        // cmd_pipe: supervisor writes commands → worker reads from fd 3
        let (cmd_read, cmd_write) = create_pipe()?;
        // msg_pipe: worker writes messages from fd 4 → supervisor reads
        let (msg_read, msg_write) = match create_pipe() {
            Ok(fds) => fds,
            Err(e) => {
                close_fd(cmd_read);
                close_fd(cmd_write);
                return Err(SupervisorError::SpawnFailed(e));
            }
        };

        let mut command = Command::new(binary);
        command
            .arg(WORKER_FLAG)
            .env(IPC_FD_ENV, "3,4")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        if let Some(cpu) = cpu {
            command.env(WORKER_CPU_ENV, cpu.to_string());
        }

        unsafe {
            command.pre_exec(move || place_worker_fds(cmd_read, msg_write));
        }

        let child = match command.spawn() {
            Ok(c) => c,
            Err(e) => {
                close_fd(cmd_read);
                close_fd(cmd_write);
                close_fd(msg_read);
                close_fd(msg_write);
                return Err(SupervisorError::SpawnFailed(e));
            }
        };

        close_fd(cmd_read);
        close_fd(msg_write);

        let writer_file = unsafe { std::fs::File::from_raw_fd(cmd_write) };
        let reader_file = unsafe { std::fs::File::from_raw_fd(msg_read) };

        let mut handle = Self {
            child,
            reader: FrameReader::new(reader_file),
            writer: FrameWriter::new(writer_file),
            capabilities: None,
            msg_read_fd: msg_read,
        };

        handle.wait_for_hello()?;
        Ok(handle)
    }

    /// Wait for Hello message from worker and validate protocol version
    fn wait_for_hello(&mut self) -> Result<(), SupervisorError> {
        let msg = self.receive(Some(HELLO_TIMEOUT))?;

        match msg {
            WorkerMessage::Hello(caps) => {
                if caps.protocol_version != PROTOCOL_VERSION {
                    return Err(SupervisorError::ProtocolError {
                        expected: format!("protocol version {}", PROTOCOL_VERSION),
                        got: format!("protocol version {}", caps.protocol_version),
                    });
                }
                tracing::debug!(
                    pid = caps.pid,
                    candidates = caps.candidate_count,
                    "Worker ready"
                );
                self.capabilities = Some(caps);
                Ok(())
            }
            other => Err(SupervisorError::ProtocolError {
                expected: "Hello".to_string(),
                got: format!("{:?}", other),
            }),
        }
    }

    /// Get worker capabilities
    pub fn capabilities(&self) -> Option<&WorkerCapabilities> {
        self.capabilities.as_ref()
    }

    /// Run one unit. On `Err(Timeout)` the worker has already been killed.
    pub fn run_unit(
        &mut self,
        request: &RunRequest,
        timeout: Option<Duration>,
    ) -> Result<UnitReply, SupervisorError> {
        self.writer.write(&SupervisorCommand::Run(request.clone()))?;

        match self.receive(timeout)? {
            WorkerMessage::Completed { duration_nanos } => {
                Ok(UnitReply::Completed(Duration::from_nanos(duration_nanos)))
            }
            WorkerMessage::Failure { kind, message } => Ok(UnitReply::Failed { kind, message }),
            WorkerMessage::Hello(_) => Err(SupervisorError::ProtocolError {
                expected: "Completed/Failure".to_string(),
                got: "Hello".to_string(),
            }),
        }
    }

    /// Wait for the next message, killing the worker if `timeout` passes first.
    fn receive(&mut self, timeout: Option<Duration>) -> Result<WorkerMessage, SupervisorError> {
        let start = Instant::now();

        loop {
            let slice = match timeout {
                Some(limit) => {
                    let remaining = limit.saturating_sub(start.elapsed());
                    if remaining.is_zero() {
                        self.kill_now();
                        return Err(SupervisorError::Timeout);
                    }
                    remaining.min(POLL_SLICE)
                }
                None => POLL_SLICE,
            };

            // Buffered bytes may hold an incomplete frame that will never be
            // completed, so liveness is still checked.
            if self.reader.has_buffered_data() {
                if !self.is_alive() {
                    return Err(SupervisorError::WorkerCrashed(
                        "worker exited with partial data buffered".to_string(),
                    ));
                }
            } else {
                match wait_for_data(self.msg_read_fd, slice.as_millis().max(1) as i32) {
                    PollResult::DataAvailable => {}
                    PollResult::Timeout => {
                        if !self.is_alive() {
                            return Err(SupervisorError::WorkerCrashed(self.exit_description()));
                        }
                        continue;
                    }
                    PollResult::PipeClosed => {
                        return Err(SupervisorError::WorkerCrashed(self.exit_description()));
                    }
                    PollResult::Error(e) => {
                        return Err(SupervisorError::WorkerCrashed(format!("pipe error: {}", e)));
                    }
                }
            }

            return match self.reader.read::<WorkerMessage>() {
                Ok(msg) => Ok(msg),
                Err(FrameError::EndOfStream) => {
                    Err(SupervisorError::WorkerCrashed(self.exit_description()))
                }
                Err(e) => {
                    if !self.is_alive() {
                        return Err(SupervisorError::WorkerCrashed(self.exit_description()));
                    }
                    Err(SupervisorError::IpcError(e.to_string()))
                }
            };
        }
    }

    /// How the worker ended, for crash messages
    fn exit_description(&mut self) -> String {
        use std::os::unix::process::ExitStatusExt;

        // Give the kernel a moment to reap a child whose pipe just closed.
        let deadline = Instant::now() + Duration::from_millis(200);
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    return match (status.code(), status.signal()) {
                        (Some(code), _) => format!("exited with status {}", code),
                        (None, Some(sig)) => format!("killed by signal {}", sig),
                        _ => "exited".to_string(),
                    };
                }
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(5));
                }
                Ok(None) => return "closed its pipe".to_string(),
                Err(e) => return format!("unknown state ({})", e),
            }
        }
    }

    /// Shutdown the worker gracefully
    pub fn shutdown(mut self) -> Result<(), SupervisorError> {
        self.writer.write(&SupervisorCommand::Shutdown)?;
        let _ = self.child.wait();
        Ok(())
    }

    /// Check if worker process is still running
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Process id of the worker
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    fn kill_now(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if self.is_alive() {
            self.kill_now();
        }
    }
}
