// src/os/poll.rs

//! poll(2) backed readiness waiting using raw `libc` FFI calls.
//! It defines the native bitflags and the one-to-one translation from
//! [`PollEvents`], and the single wait primitive the pollset reuses.

use bitflags::bitflags;
use log::trace;

use super::{clear_returned, ReadinessWait};
use crate::error::{PollError, Result};
use crate::event::PollEvents;
use crate::record::PollRecord;
use crate::timeout;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PollFlags: libc::c_short {
        const POLLIN = libc::POLLIN;
        const POLLPRI = libc::POLLPRI;
        const POLLOUT = libc::POLLOUT;
        const POLLERR = libc::POLLERR;
        const POLLHUP = libc::POLLHUP;
        const POLLNVAL = libc::POLLNVAL;
    }
}

const EVENT_MAP: [(PollEvents, PollFlags); 6] = [
    (PollEvents::READABLE, PollFlags::POLLIN),
    (PollEvents::PRIORITY, PollFlags::POLLPRI),
    (PollEvents::WRITABLE, PollFlags::POLLOUT),
    (PollEvents::ERROR, PollFlags::POLLERR),
    (PollEvents::HANGUP, PollFlags::POLLHUP),
    (PollEvents::INVALID, PollFlags::POLLNVAL),
];

/// Record counts up to this size are polled from a stack buffer.
pub const SMALL_POLL_LIMIT: usize = 8;

pub(crate) const EMPTY_POLLFD: libc::pollfd = libc::pollfd {
    fd: -1,
    events: 0,
    revents: 0,
};

pub(crate) fn new_pollfd<T>(record: &PollRecord<T>) -> libc::pollfd {
    libc::pollfd {
        fd: record.descriptor.raw_fd(),
        events: PollWait::to_native(record.requested).bits(),
        revents: 0,
    }
}

pub(crate) fn pollfd_events(pollfd: &libc::pollfd) -> PollEvents {
    PollWait::from_native(PollFlags::from_bits_truncate(pollfd.revents))
}

/// The one native wait: poll(2) over `fds`, with the shared status policy.
///
/// `Ok(n)` always has `n > 0`; zero ready descriptors is `TimedOut`.
pub(crate) fn native_poll(fds: &mut [libc::pollfd], timeout_us: i64) -> Result<usize> {
    let timeout_ms = timeout::to_poll_millis(timeout_us);
    trace!(
        "poll: waiting on {} fds with timeout {}ms ({}us requested)",
        fds.len(),
        timeout_ms,
        timeout_us
    );

    let ready = unsafe {
        libc::poll(
            fds.as_mut_ptr(),
            fds.len() as libc::nfds_t,
            timeout_ms,
        )
    };

    if ready < 0 {
        let err = PollError::last_os_error();
        trace!("poll: failed: {}", err);
        return Err(err);
    }
    trace!("poll: {} fds ready", ready);
    if ready == 0 {
        return Err(PollError::TimedOut);
    }
    Ok(ready as usize)
}

/// Waits with poll(2), keeping a reusable buffer for large record sets.
#[derive(Debug, Default)]
pub struct PollWait {
    pub(super) scratch: Vec<libc::pollfd>,
}

impl PollWait {
    pub fn new() -> Self {
        Self::default()
    }

    fn wait_on<T>(
        fds: &mut [libc::pollfd],
        records: &mut [PollRecord<T>],
        timeout_us: i64,
    ) -> Result<usize> {
        for (fd, record) in fds.iter_mut().zip(records.iter()) {
            *fd = new_pollfd(record);
        }
        match native_poll(fds, timeout_us) {
            Ok(ready) => {
                for (fd, record) in fds.iter().zip(records.iter_mut()) {
                    record.returned = pollfd_events(fd);
                }
                Ok(ready)
            }
            Err(PollError::TimedOut) => {
                clear_returned(records);
                Err(PollError::TimedOut)
            }
            Err(err) => Err(err),
        }
    }
}

impl ReadinessWait for PollWait {
    type Native = PollFlags;

    fn to_native(events: PollEvents) -> PollFlags {
        EVENT_MAP
            .iter()
            .filter(|(portable, _)| events.contains(*portable))
            .fold(PollFlags::empty(), |acc, (_, native)| acc | *native)
    }

    fn from_native(native: PollFlags) -> PollEvents {
        EVENT_MAP
            .iter()
            .filter(|(_, flag)| native.contains(*flag))
            .fold(PollEvents::empty(), |acc, (portable, _)| acc | *portable)
    }

    fn wait<T>(&mut self, records: &mut [PollRecord<T>], timeout_us: i64) -> Result<usize> {
        if records.len() <= SMALL_POLL_LIMIT {
            let mut fds = [EMPTY_POLLFD; SMALL_POLL_LIMIT];
            return Self::wait_on(&mut fds[..records.len()], records, timeout_us);
        }

        if self.scratch.len() < records.len() {
            let extra = records.len() - self.scratch.len();
            self.scratch
                .try_reserve_exact(extra)
                .map_err(|_| PollError::Alloc {
                    requested: records.len(),
                })?;
            self.scratch.resize(records.len(), EMPTY_POLLFD);
        }
        Self::wait_on(&mut self.scratch[..records.len()], records, timeout_us)
    }
}
