// src/os/mod.rs
//
// Native readiness mechanisms. Both are compiled on every unix target; the
// build script decides which one backs `DefaultWait`.

pub mod poll;
pub mod select;

#[cfg(test)]
mod wait_tests;

use crate::error::Result;
use crate::event::PollEvents;
use crate::record::PollRecord;

pub use poll::{PollFlags, PollWait};
pub use select::{SelectMask, SelectWait};

/// A native "wait for readiness" primitive plus its flag translation.
///
/// Implementations fill in `returned` on every record when they succeed,
/// leave records untouched on `System` errors, and clear `returned` on every
/// record when they time out.
pub trait ReadinessWait: Default {
    /// How this mechanism spells a set of events.
    type Native: Copy;

    fn to_native(events: PollEvents) -> Self::Native;
    fn from_native(native: Self::Native) -> PollEvents;

    /// Blocks for at most `timeout_us` microseconds (negative: no limit).
    ///
    /// Returns the number of ready descriptors as the kernel counts them.
    fn wait<T>(&mut self, records: &mut [PollRecord<T>], timeout_us: i64) -> Result<usize>;
}

#[cfg(not(readypoll_select))]
pub type DefaultWait = PollWait;

#[cfg(readypoll_select)]
pub type DefaultWait = SelectWait;

pub(crate) fn clear_returned<T>(records: &mut [PollRecord<T>]) {
    for record in records.iter_mut() {
        record.returned = PollEvents::empty();
    }
}
