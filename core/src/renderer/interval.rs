//! Write interval checker

use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Calls a function at a fixed interval until a stop signal arrives or the sending side of the
/// stop channel is dropped.
pub struct WriteIntervalChecker {
    /// Time between calls.
    interval: Duration,

    /// Stop signal.
    stop: Receiver<()>,
}

impl WriteIntervalChecker {
    /// Create a new `WriteIntervalChecker`.
    ///
    /// * `interval` - Time between calls.
    /// * `stop`     - Stop signal.
    pub fn new(interval: Duration, stop: Receiver<()>) -> Self {
        Self { interval, stop }
    }

    /// Blocks calling `f` every interval until stopped. Returns the number of calls.
    ///
    /// * `f` - The function.
    pub fn run<F: FnMut()>(&self, mut f: F) -> usize {
        let mut calls = 0;
        loop {
            match self.stop.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => {
                    f();
                    calls += 1;
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        calls
    }
}
