// src/event.rs

//! The portable readiness vocabulary shared by every wait strategy.
//!
//! Callers always speak in [`PollEvents`]. Each native mechanism in
//! [`crate::os`] owns the translation to and from its own representation.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Readiness conditions a caller can ask for and be told about.
    ///
    /// `ERROR`, `HANGUP` and `INVALID` are only ever reported; asking for them
    /// is allowed but the kernel reports them regardless of interest on poll(2).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct PollEvents: u16 {
        /// Normal data can be read without blocking.
        const READABLE = 0x001;
        /// Priority (out-of-band) data can be read.
        const PRIORITY = 0x002;
        /// Writing will not block.
        const WRITABLE = 0x004;
        /// An error condition is pending.
        const ERROR = 0x010;
        /// The peer hung up.
        const HANGUP = 0x020;
        /// The descriptor is not open.
        const INVALID = 0x040;
    }
}

impl PollEvents {
    /// Conditions that select(2) can only observe through its exceptional set.
    pub const EXCEPTIONAL: PollEvents = PollEvents::PRIORITY
        .union(PollEvents::ERROR)
        .union(PollEvents::HANGUP)
        .union(PollEvents::INVALID);
}

impl fmt::Display for PollEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}
