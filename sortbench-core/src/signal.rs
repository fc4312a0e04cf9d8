//! Shutdown Flag
//!
//! SIGINT/SIGTERM only flip an atomic; the scheduler and the worker loop poll
//! it between work units.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Whether a graceful shutdown has been requested
pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::Relaxed)
}

/// Request a graceful shutdown (used by the signal handler and embedders)
pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::Relaxed);
}

/// Install handlers for SIGINT and SIGTERM that set the shutdown flag.
#[cfg(unix)]
pub fn install_shutdown_handler() {
    install_for(libc::SIGINT);
    install_for(libc::SIGTERM);
}

#[cfg(not(unix))]
pub fn install_shutdown_handler() {}

/// SIGTERM only; a Ctrl-C in the terminal reaches the worker's process group
/// too, and the supervisor decides when the worker stops.
#[cfg(unix)]
pub(crate) fn install_worker_handlers() {
    install_for(libc::SIGTERM);
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_IGN);
    }
}

#[cfg(not(unix))]
pub(crate) fn install_worker_handlers() {}

#[cfg(unix)]
fn install_for(signal: libc::c_int) {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = shutdown_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut sa.sa_mask);
        libc::sigaction(signal, &sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn shutdown_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::Relaxed);
}
