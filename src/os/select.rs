// src/os/select.rs

//! select(2) fallback for targets without poll(2).
//!
//! select only knows three sets. Priority, error, hangup and invalid interest
//! all go into the exceptional set, and anything reported there comes back as
//! `ERROR`. Descriptors at or above `FD_SETSIZE` cannot be expressed at all.

use bitflags::bitflags;
use log::trace;
use nix::errno::Errno;
use std::os::unix::io::RawFd;
use std::{mem, ptr};

use super::{clear_returned, ReadinessWait};
use crate::error::{PollError, Result};
use crate::event::PollEvents;
use crate::record::PollRecord;
use crate::timeout;

bitflags! {
    /// Which of select's three sets a descriptor belongs to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SelectMask: u8 {
        const READ = 0b001;
        const WRITE = 0b010;
        const EXCEPT = 0b100;
    }
}

struct FdSet(libc::fd_set);

impl FdSet {
    fn new() -> Self {
        let mut set = mem::MaybeUninit::<libc::fd_set>::uninit();
        unsafe {
            libc::FD_ZERO(set.as_mut_ptr());
            FdSet(set.assume_init())
        }
    }

    fn insert(&mut self, fd: RawFd) {
        unsafe { libc::FD_SET(fd, &mut self.0) }
    }

    fn contains(&self, fd: RawFd) -> bool {
        unsafe { libc::FD_ISSET(fd, &self.0) }
    }

    fn as_mut_ptr(&mut self) -> *mut libc::fd_set {
        &mut self.0
    }
}

fn check_selectable(fd: RawFd) -> Result<()> {
    if fd < 0 {
        return Err(PollError::System(Errno::EBADF));
    }
    if fd as usize >= libc::FD_SETSIZE as usize {
        return Err(PollError::System(Errno::EINVAL));
    }
    Ok(())
}

/// Waits with select(2). Stateless; the sets live on the stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectWait;

impl SelectWait {
    pub fn new() -> Self {
        SelectWait
    }
}

impl ReadinessWait for SelectWait {
    type Native = SelectMask;

    fn to_native(events: PollEvents) -> SelectMask {
        let mut mask = SelectMask::empty();
        if events.contains(PollEvents::READABLE) {
            mask |= SelectMask::READ;
        }
        if events.contains(PollEvents::WRITABLE) {
            mask |= SelectMask::WRITE;
        }
        if events.intersects(PollEvents::EXCEPTIONAL) {
            mask |= SelectMask::EXCEPT;
        }
        mask
    }

    fn from_native(native: SelectMask) -> PollEvents {
        let mut events = PollEvents::empty();
        if native.contains(SelectMask::READ) {
            events |= PollEvents::READABLE;
        }
        if native.contains(SelectMask::WRITE) {
            events |= PollEvents::WRITABLE;
        }
        if native.contains(SelectMask::EXCEPT) {
            events |= PollEvents::ERROR;
        }
        events
    }

    fn wait<T>(&mut self, records: &mut [PollRecord<T>], timeout_us: i64) -> Result<usize> {
        let mut read_set = FdSet::new();
        let mut write_set = FdSet::new();
        let mut except_set = FdSet::new();
        let mut max_fd: RawFd = -1;

        for record in records.iter() {
            let fd = record.descriptor.raw_fd();
            check_selectable(fd)?;
            let mask = Self::to_native(record.requested);
            if mask.contains(SelectMask::READ) {
                read_set.insert(fd);
            }
            if mask.contains(SelectMask::WRITE) {
                write_set.insert(fd);
            }
            if mask.contains(SelectMask::EXCEPT) {
                except_set.insert(fd);
            }
            max_fd = max_fd.max(fd);
        }

        let mut tv = timeout::to_timeval(timeout_us);
        let tv_ptr = tv
            .as_mut()
            .map_or(ptr::null_mut(), |tv| tv as *mut libc::timeval);
        trace!(
            "select: waiting on {} records (max fd {}) with timeout {}us",
            records.len(),
            max_fd,
            timeout_us
        );

        let ready = unsafe {
            libc::select(
                max_fd + 1,
                read_set.as_mut_ptr(),
                write_set.as_mut_ptr(),
                except_set.as_mut_ptr(),
                tv_ptr,
            )
        };

        if ready < 0 {
            let err = PollError::last_os_error();
            trace!("select: failed: {}", err);
            return Err(err);
        }
        trace!("select: {} set bits ready", ready);
        if ready == 0 {
            clear_returned(records);
            return Err(PollError::TimedOut);
        }

        for record in records.iter_mut() {
            let fd = record.descriptor.raw_fd();
            let mut mask = SelectMask::empty();
            if read_set.contains(fd) {
                mask |= SelectMask::READ;
            }
            if write_set.contains(fd) {
                mask |= SelectMask::WRITE;
            }
            if except_set.contains(fd) {
                mask |= SelectMask::EXCEPT;
            }
            record.returned = Self::from_native(mask);
        }
        Ok(ready as usize)
    }
}
