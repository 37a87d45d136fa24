//! Blocking driver for callers that give a transfer its own thread.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use crate::net::Network;
use crate::{State, Transfer};

/// How [`run_to_end`] left the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The transfer reached [`State::Closed`].
    Closed,
    /// The transfer reached [`State::Error`].
    Failed,
    /// The transfer was never started.
    NotStarted,
}

/// Tick `transfer` until it finishes, sleeping `interval` between ticks.
///
/// Each tick is passed the real time elapsed since the previous one.
pub fn run_to_end<N: Network, W: Write>(
    transfer: &mut Transfer<N, W>,
    interval: Duration,
) -> Outcome {
    let mut last = Instant::now();

    loop {
        match transfer.state() {
            State::Closed => return Outcome::Closed,
            State::Error => return Outcome::Failed,
            State::Initialized => return Outcome::NotStarted,
            _ => {}
        }

        let now = Instant::now();
        transfer.tick(now - last);
        last = now;

        if !transfer.is_finished() {
            thread::sleep(interval);
        }
    }
}
