//! Process-wide stop request
//!
//! The flag is the default cancellation signal of a [`Harvest`](crate::Harvest):
//! scanners stop before their next page and workers drop what is still queued.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// Exit status of a run stopped by a signal
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}

pub fn is_shutdown_requested() -> bool {
    shutdown_flag().load(Ordering::Relaxed)
}

/// Ask the current run to stop. Returns true if a stop was already pending.
pub fn request_shutdown() -> bool {
    shutdown_flag().swap(true, Ordering::Relaxed)
}

/// Route SIGINT and SIGTERM to [`request_shutdown`].
///
/// The first signal lets the run wind down and keep what it saved; a second
/// one exits on the spot with [`INTERRUPTED_EXIT_CODE`].
pub fn install_signal_handlers() -> io::Result<()> {
    for signal in [signal_hook::consts::SIGTERM, signal_hook::consts::SIGINT] {
        // SAFETY: the handler only does an atomic swap and low_level::exit,
        // which calls _exit without running atexit hooks or flushing stdio
        unsafe {
            signal_hook::low_level::register(signal, || {
                if request_shutdown() {
                    signal_hook::low_level::exit(i32::from(INTERRUPTED_EXIT_CODE));
                }
            })?;
        }
    }
    Ok(())
}
