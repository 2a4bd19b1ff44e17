// src/pollset.rs

//! A fixed-capacity, reusable set of descriptors polled as a unit.
//!
//! The pollset keeps the poll(2) array pre-built next to the caller's
//! records, so repeated polls don't rebuild it. Capacity is chosen at
//! creation and never grows: adding past it reports [`PollError::Full`].
//!
//! Invariant: `native[i]` and `query[i]` describe the same descriptor for every
//! `i < len()`, through any sequence of `add` and `remove`.

use log::{debug, trace};

use crate::descriptor::Descriptor;
use crate::error::{PollError, Result};
use crate::os::poll::{native_poll, new_pollfd, pollfd_events};
use crate::record::PollRecord;


#[derive(Debug)]
pub struct Pollset<T = ()> {
    capacity: usize,
    native: Vec<libc::pollfd>,
    query: Vec<PollRecord<T>>,
    results: Vec<PollRecord<T>>,
}

fn reserve<V>(capacity: usize) -> Result<Vec<V>> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)
        .map_err(|_| PollError::Alloc {
            requested: capacity,
        })?;
    Ok(v)
}

impl<T> Pollset<T> {
    /// Allocates room for exactly `capacity` descriptors.
    pub fn create(capacity: usize) -> Result<Self> {
        let pollset = Pollset {
            capacity,
            native: reserve(capacity)?,
            query: reserve(capacity)?,
            results: reserve(capacity)?,
        };
        debug!("Pollset created with capacity {}", capacity);
        Ok(pollset)
    }

    /// Releases the pollset. Nothing beyond its own storage is held today.
    pub fn destroy(self) -> Result<()> {
        debug!(
            "Pollset destroyed ({} of {} slots in use)",
            self.len(),
            self.capacity
        );
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.query.len()
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// The live records, in the order they were added.
    pub fn records(&self) -> &[PollRecord<T>] {
        &self.query
    }

    /// Appends `record`. The same descriptor may be added more than once.
    pub fn add(&mut self, record: PollRecord<T>) -> Result<()> {
        if self.len() == self.capacity {
            return Err(PollError::Full {
                capacity: self.capacity,
            });
        }
        let pollfd = new_pollfd(&record);
        trace!(
            "Pollset add: fd {} with {} at index {}",
            pollfd.fd,
            record.requested,
            self.len()
        );
        self.native.push(pollfd);
        self.query.push(record);
        Ok(())
    }

    /// Drops every entry for `descriptor`'s native fd, not just the first.
    pub fn remove(&mut self, descriptor: Descriptor) -> Result<()> {
        let fd = descriptor.raw_fd();
        let mut kept = 0;
        for i in 0..self.native.len() {
            if self.native[i].fd == fd {
                continue;
            }
            if kept != i {
                self.native.swap(kept, i);
                self.query.swap(kept, i);
            }
            kept += 1;
        }

        let removed = self.native.len() - kept;
        if removed == 0 {
            return Err(PollError::NotFound { fd });
        }
        self.native.truncate(kept);
        self.query.truncate(kept);
        debug!("Pollset remove: fd {} ({} entries)", fd, removed);
        Ok(())
    }
}

impl<T: Clone> Pollset<T> {
    /// Waits for any member to become ready and returns the ready ones.
    ///
    /// Results follow insertion order and carry each record's payload; their
    /// `returned` set holds what fired. Always waits with poll(2), whichever
    /// strategy the one-shot [`crate::poll`] uses. Timeout semantics and
    /// status policy match the one-shot form.
    pub fn poll(&mut self, timeout_us: i64) -> Result<&[PollRecord<T>]> {
        native_poll(&mut self.native, timeout_us)?;

        self.results.clear();
        for (pollfd, record) in self.native.iter().zip(self.query.iter()) {
            if pollfd.revents == 0 {
                continue;
            }
            let mut ready = record.clone();
            ready.returned = pollfd_events(pollfd);
            self.results.push(ready);
        }
        Ok(&self.results)
    }
}
