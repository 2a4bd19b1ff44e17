// src/oneshot.rs

//! Single readiness waits over a caller-built slice of records.
//!
//! [`poll`] is the convenience form. [`Poller`] is the same thing with a
//! buffer that survives between calls, for callers that repeatedly poll more
//! than a handful of descriptors.

use crate::error::Result;
use crate::os::{DefaultWait, ReadinessWait};
use crate::record::PollRecord;

/// Waits once for any of `records` to become ready.
///
/// Fills in `returned` on every record and returns how many descriptors the
/// kernel reported ready. `timeout_us` is in microseconds: negative waits
/// forever, zero returns immediately.
///
/// # Errors
///
/// `TimedOut` when nothing became ready (every `returned` is then empty),
/// `System` when the wait itself failed (records are left untouched).
pub fn poll<T>(records: &mut [PollRecord<T>], timeout_us: i64) -> Result<usize> {
    Poller::<DefaultWait>::new().poll(records, timeout_us)
}

/// A wait strategy plus whatever scratch space it keeps between calls.
///
/// The scratch lives exactly as long as the `Poller`.
#[derive(Debug, Default)]
pub struct Poller<W: ReadinessWait = DefaultWait> {
    wait: W,
}

impl<W: ReadinessWait> Poller<W> {
    pub fn new() -> Self {
        Poller { wait: W::default() }
    }

    pub fn poll<T>(&mut self, records: &mut [PollRecord<T>], timeout_us: i64) -> Result<usize> {
        self.wait.wait(records, timeout_us)
    }
}
