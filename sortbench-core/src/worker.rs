//! Worker Process Entry Point
//!
//! The worker side of process isolation. The supervisor sends one `Run`
//! command at a time and waits, with a deadline, for the reply; a worker that
//! misses the deadline is killed, never asked to stop.
//!
//! On Unix, uses fd 3/4 for IPC (set via `SORTBENCH_IPC_FD`). Elsewhere, falls
//! back to stdin/stdout.

use crate::measure::pin_to_cpu;
use crate::run::{UnitFailure, measure_unit};
use crate::signal::{install_worker_handlers, shutdown_requested};
use crate::{WorkloadGenerator, find_candidate, registered_candidates};
use sortbench_ipc::{
    FailureKind, FrameReader, FrameWriter, IPC_FD_ENV, RunRequest, SupervisorCommand,
    WORKER_CPU_ENV, WorkerCapabilities, WorkerMessage,
};

#[cfg(unix)]
use std::os::unix::io::FromRawFd;

/// IPC transport: either inherited fd pair or stdin/stdout fallback.
enum IpcTransport {
    #[cfg(unix)]
    Fds { read_fd: i32, write_fd: i32 },
    Stdio,
}

fn detect_transport() -> IpcTransport {
    #[cfg(unix)]
    if let Ok(val) = std::env::var(IPC_FD_ENV) {
        let parts: Vec<&str> = val.split(',').collect();
        if parts.len() == 2 {
            if let (Ok(r), Ok(w)) = (parts[0].parse::<i32>(), parts[1].parse::<i32>()) {
                return IpcTransport::Fds {
                    read_fd: r,
                    write_fd: w,
                };
            }
        }
        eprintln!(
            "sortbench: warning: invalid {IPC_FD_ENV}={val:?} (expected <read_fd>,<write_fd>), falling back to stdio"
        );
    }
    IpcTransport::Stdio
}

/// Worker main loop
pub struct WorkerMain {
    reader: FrameReader<Box<dyn std::io::Read>>,
    writer: FrameWriter<Box<dyn std::io::Write>>,
}

impl WorkerMain {
    /// Create a new worker, using fd 3/4 if `SORTBENCH_IPC_FD` is set, otherwise stdin/stdout.
    pub fn new() -> Self {
        match detect_transport() {
            #[cfg(unix)]
            IpcTransport::Fds { read_fd, write_fd } => {
                let read_file = unsafe { std::fs::File::from_raw_fd(read_fd) };
                let write_file = unsafe { std::fs::File::from_raw_fd(write_fd) };
                Self {
                    reader: FrameReader::new(Box::new(read_file) as Box<dyn std::io::Read>),
                    writer: FrameWriter::new(Box::new(write_file) as Box<dyn std::io::Write>),
                }
            }
            IpcTransport::Stdio => Self {
                reader: FrameReader::new(Box::new(std::io::stdin()) as Box<dyn std::io::Read>),
                writer: FrameWriter::new(Box::new(std::io::stdout()) as Box<dyn std::io::Write>),
            },
        }
    }

    /// Run the worker main loop until `Shutdown`, SIGTERM, or the pipe closes
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        install_worker_handlers();

        let candidate_count = registered_candidates().len() as u32;
        self.writer
            .write(&WorkerMessage::Hello(WorkerCapabilities::current(candidate_count)))?;

        if let Some(cpu) = std::env::var(WORKER_CPU_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            if let Err(e) = pin_to_cpu(cpu) {
                eprintln!("sortbench: warning: could not pin worker to cpu {cpu}: {e}");
            }
        }

        loop {
            if shutdown_requested() {
                break;
            }

            let command: SupervisorCommand = self.reader.read()?;

            match command {
                SupervisorCommand::Run(request) => {
                    let reply = Self::execute(&request);
                    self.writer.write(&reply)?;
                }
                SupervisorCommand::Ping => {}
                SupervisorCommand::Shutdown => break,
            }
        }

        Ok(())
    }

    fn execute(request: &RunRequest) -> WorkerMessage {
        let candidate = match find_candidate(&request.candidate) {
            Ok(c) => c,
            Err(e) => {
                return WorkerMessage::Failure {
                    kind: FailureKind::UnknownCandidate,
                    message: e.to_string(),
                };
            }
        };

        let generator = WorkloadGenerator::new(request.seed)
            .with_range(request.min_value, request.max_value);

        match measure_unit(
            candidate,
            &generator,
            request.size as usize,
            request.iteration,
        ) {
            Ok(elapsed) => WorkerMessage::Completed {
                duration_nanos: elapsed.as_nanos() as u64,
            },
            Err(UnitFailure::Panic(message)) => WorkerMessage::Failure {
                kind: FailureKind::Panic,
                message,
            },
            Err(UnitFailure::IncorrectOutput(e)) => WorkerMessage::Failure {
                kind: FailureKind::IncorrectOutput,
                message: e.to_string(),
            },
        }
    }
}

impl Default for WorkerMain {
    fn default() -> Self {
        Self::new()
    }
}
