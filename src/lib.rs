// src/lib.rs

//! Portable descriptor readiness polling.
//!
//! One event vocabulary ([`PollEvents`]) and one calling convention over
//! poll(2) or, when the `select` feature is on, select(2). Unix only.
//! Use [`poll`] for a single wait over records you build each time, or a
//! [`Pollset`] to keep a fixed-capacity set around and poll it repeatedly.
//!
//! Timeouts are signed microseconds: negative waits forever, zero returns
//! immediately. See [`timeout`].

pub mod config;
pub mod descriptor;
pub mod error;
pub mod event;
pub mod oneshot;
pub mod os;
pub mod pollset;
pub mod record;
pub mod timeout;

pub use descriptor::Descriptor;
pub use error::{PollError, Result};
pub use event::PollEvents;
pub use oneshot::{poll, Poller};
pub use os::{DefaultWait, PollWait, ReadinessWait, SelectWait};
pub use pollset::Pollset;
pub use record::PollRecord;
