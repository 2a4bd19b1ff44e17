// src/error.rs

use nix::errno::Errno;
use std::os::unix::io::RawFd;
use thiserror::Error;

/// Everything a poll, one-shot or pollset, can report besides success.
///
/// `TimedOut` and `NotFound` are routine outcomes; use [`PollError::is_timeout`]
/// and [`PollError::is_not_found`] to tell them apart from real failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollError {
    #[error("readiness wait failed: {0}")]
    System(Errno),
    #[error("timed out with no descriptor ready")]
    TimedOut,
    #[error("pollset is full ({capacity} descriptors)")]
    Full { capacity: usize },
    #[error("descriptor {fd} is not in the pollset")]
    NotFound { fd: RawFd },
    #[error("could not allocate room for {requested} descriptors")]
    Alloc { requested: usize },
}

impl PollError {
    /// Captures `errno` right after a failed native call.
    pub(crate) fn last_os_error() -> Self {
        PollError::System(Errno::last())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PollError::TimedOut)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PollError::NotFound { .. })
    }

    /// The propagated errno, if this came from the kernel.
    pub fn errno(&self) -> Option<Errno> {
        match *self {
            PollError::System(errno) => Some(errno),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PollError>;
