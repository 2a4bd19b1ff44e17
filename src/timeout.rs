// src/timeout.rs

//! Timeouts cross the public API as signed microseconds.
//!
//! A negative value blocks until something is ready. Zero returns
//! immediately. So "block forever" must be spelled with a negative value,
//! never with zero.

use std::time::Duration;

pub const INFINITE: i64 = -1;
pub const IMMEDIATE: i64 = 0;

/// `None` maps to [`INFINITE`]; durations too long for `i64` saturate.
pub fn from_duration(timeout: Option<Duration>) -> i64 {
    match timeout {
        None => INFINITE,
        Some(d) => i64::try_from(d.as_micros()).unwrap_or(i64::MAX),
    }
}

/// Milliseconds for poll(2).
///
/// Positive values truncate, so anything under one millisecond becomes an
/// immediate poll.
pub(crate) fn to_poll_millis(timeout_us: i64) -> libc::c_int {
    if timeout_us > 0 {
        libc::c_int::try_from(timeout_us / 1000).unwrap_or(libc::c_int::MAX)
    } else if timeout_us == 0 {
        0
    } else {
        -1
    }
}

/// The timeval for select(2); `None` means pass a null pointer and wait forever.
pub(crate) fn to_timeval(timeout_us: i64) -> Option<libc::timeval> {
    if timeout_us < 0 {
        return None;
    }
    Some(libc::timeval {
        tv_sec: (timeout_us / 1_000_000) as libc::time_t,
        tv_usec: (timeout_us % 1_000_000) as libc::suseconds_t,
    })
}
