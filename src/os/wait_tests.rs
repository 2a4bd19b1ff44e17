// src/os/wait_tests.rs

#![cfg(test)]

use super::{PollFlags, PollWait, ReadinessWait, SelectMask, SelectWait};
use crate::descriptor::Descriptor;
use crate::error::PollError;
use crate::event::PollEvents;
use crate::record::PollRecord;
use crate::timeout;
use nix::errno::Errno;
use nix::sys::resource::{getrlimit, Resource};
use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;
use std::thread;
use std::time::{Duration, Instant};

const WAKE_DELAY: Duration = Duration::from_millis(50);
const PROMPT: Duration = Duration::from_millis(500);

const ALL_BITS: [PollEvents; 6] = [
    PollEvents::READABLE,
    PollEvents::PRIORITY,
    PollEvents::WRITABLE,
    PollEvents::ERROR,
    PollEvents::HANGUP,
    PollEvents::INVALID,
];

/// One more descriptor than poll(2) accepts, or `None` when the soft
/// RLIMIT_NOFILE is too large to build a record array past it.
fn past_nofile_limit() -> Option<usize> {
    let (soft, _) = getrlimit(Resource::RLIMIT_NOFILE).expect("getrlimit");
    if soft == libc::RLIM_INFINITY || soft > (1 << 22) {
        log::warn!("RLIMIT_NOFILE soft limit {} too large to exceed", soft);
        return None;
    }
    usize::try_from(soft).ok().map(|soft| soft + 1)
}

fn readable_record(stream: &UnixStream) -> PollRecord<&'static str> {
    PollRecord::with_payload(Descriptor::socket(stream), PollEvents::READABLE, "reader")
}

// --- Translation ---

#[test_log::test]
fn test_poll_translation_round_trips_every_bit() {
    for bit in ALL_BITS {
        assert_eq!(
            PollWait::from_native(PollWait::to_native(bit)),
            bit,
            "round trip of {:?}",
            bit
        );
    }
    let all = ALL_BITS.iter().fold(PollEvents::empty(), |acc, b| acc | *b);
    assert_eq!(PollWait::from_native(PollWait::to_native(all)), all);
    assert_eq!(
        PollWait::to_native(PollEvents::READABLE | PollEvents::WRITABLE),
        PollFlags::POLLIN | PollFlags::POLLOUT
    );
}

#[test_log::test]
fn test_select_translation_collapses_exceptional_bits() {
    for bit in [PollEvents::ERROR, PollEvents::HANGUP, PollEvents::INVALID, PollEvents::PRIORITY] {
        assert_eq!(SelectWait::to_native(bit), SelectMask::EXCEPT);
        assert_eq!(
            SelectWait::from_native(SelectWait::to_native(bit)),
            PollEvents::ERROR,
            "collapse of {:?}",
            bit
        );
    }
    let combined = PollEvents::ERROR | PollEvents::HANGUP | PollEvents::INVALID;
    assert_eq!(
        SelectWait::from_native(SelectWait::to_native(combined)),
        PollEvents::ERROR
    );
    for bit in [PollEvents::READABLE, PollEvents::WRITABLE] {
        assert_eq!(SelectWait::from_native(SelectWait::to_native(bit)), bit);
    }
}

// --- Shared behaviour, run against both mechanisms ---

fn zero_timeout_returns_promptly<W: ReadinessWait>() {
    let (a, _b) = UnixStream::pair().expect("socketpair");
    let mut records = [readable_record(&a)];
    records[0].returned = PollEvents::READABLE;

    let started = Instant::now();
    let result = W::default().wait(&mut records, timeout::IMMEDIATE);
    assert_eq!(result, Err(PollError::TimedOut));
    assert!(started.elapsed() < PROMPT, "zero timeout blocked");
    assert!(records[0].returned.is_empty());
}

fn negative_timeout_blocks_until_ready<W: ReadinessWait>() {
    let (a, mut b) = UnixStream::pair().expect("socketpair");
    let writer = thread::spawn(move || {
        thread::sleep(WAKE_DELAY);
        b.write_all(b"x").expect("write to peer");
        b
    });

    let mut records = [readable_record(&a)];
    let started = Instant::now();
    let ready = W::default()
        .wait(&mut records, timeout::INFINITE)
        .expect("wait should succeed once the peer writes");
    let _b = writer.join().expect("writer thread");

    assert!(ready >= 1);
    assert!(started.elapsed() >= WAKE_DELAY / 2);
    assert!(records[0].returned.contains(PollEvents::READABLE));
    assert_eq!(records[0].payload, "reader");
}

fn results_keep_input_order_and_payloads<W: ReadinessWait>() {
    let (idle, _idle_peer) = UnixStream::pair().expect("socketpair");
    let (busy, mut busy_peer) = UnixStream::pair().expect("socketpair");
    let (spare, _spare_peer) = UnixStream::pair().expect("socketpair");
    busy_peer.write_all(b"ping").expect("write");

    let mut records = [
        PollRecord::with_payload(Descriptor::socket(&idle), PollEvents::READABLE, 10u32),
        PollRecord::with_payload(Descriptor::socket(&busy), PollEvents::READABLE, 20u32),
        PollRecord::with_payload(Descriptor::socket(&spare), PollEvents::WRITABLE, 30u32),
    ];
    let ready = W::default()
        .wait(&mut records, 1_000_000)
        .expect("two records are ready");
    assert!(ready >= 2);

    assert!(records[0].returned.is_empty());
    assert_eq!(records[1].returned, PollEvents::READABLE);
    assert_eq!(records[2].returned, PollEvents::WRITABLE);
    let payloads: Vec<u32> = records.iter().map(|r| r.payload).collect();
    assert_eq!(payloads, vec![10, 20, 30]);
}

#[test_log::test]
fn test_poll_zero_timeout_returns_promptly() {
    zero_timeout_returns_promptly::<PollWait>();
}

#[test_log::test]
fn test_select_zero_timeout_returns_promptly() {
    zero_timeout_returns_promptly::<SelectWait>();
}

#[test_log::test]
fn test_poll_negative_timeout_blocks_until_ready() {
    negative_timeout_blocks_until_ready::<PollWait>();
}

#[test_log::test]
fn test_select_negative_timeout_blocks_until_ready() {
    negative_timeout_blocks_until_ready::<SelectWait>();
}

#[test_log::test]
fn test_poll_results_keep_input_order_and_payloads() {
    results_keep_input_order_and_payloads::<PollWait>();
}

#[test_log::test]
fn test_select_results_keep_input_order_and_payloads() {
    results_keep_input_order_and_payloads::<SelectWait>();
}

// --- Mechanism specifics ---

#[test_log::test]
fn test_poll_reports_hangup_distinctly() {
    let (a, b) = UnixStream::pair().expect("socketpair");
    drop(b);
    let mut records = [PollRecord::new(Descriptor::socket(&a), PollEvents::READABLE)];
    PollWait::new()
        .wait(&mut records, timeout::IMMEDIATE)
        .expect("closed peer is reported");
    assert!(records[0].returned.contains(PollEvents::HANGUP));
}

#[test_log::test]
fn test_poll_reports_invalid_descriptor() {
    // Far above any open descriptor, so the kernel answers POLLNVAL.
    let bogus = Descriptor::File(i32::MAX - 1);
    let mut records = [PollRecord::new(bogus, PollEvents::READABLE)];
    let ready = PollWait::new()
        .wait(&mut records, timeout::IMMEDIATE)
        .expect("invalid descriptors count as ready");
    assert_eq!(ready, 1);
    assert_eq!(records[0].returned, PollEvents::INVALID);
}

#[test_log::test]
fn test_select_rejects_unrepresentable_descriptor() {
    let mut records = [PollRecord::new(Descriptor::File(i32::MAX - 1), PollEvents::READABLE)];
    records[0].returned = PollEvents::WRITABLE;
    let result = SelectWait::new().wait(&mut records, timeout::IMMEDIATE);
    assert_eq!(result, Err(PollError::System(Errno::EINVAL)));
    // No partial results on a system error.
    assert_eq!(records[0].returned, PollEvents::WRITABLE);

    let mut negative = [PollRecord::new(Descriptor::File(-1), PollEvents::READABLE)];
    assert_eq!(
        SelectWait::new().wait(&mut negative, timeout::IMMEDIATE),
        Err(PollError::System(Errno::EBADF))
    );
}

#[test_log::test]
fn test_poll_kernel_failure_leaves_records_untouched() {
    let Some(count) = past_nofile_limit() else {
        return;
    };
    let (a, _b) = UnixStream::pair().expect("socketpair");
    let mut record = PollRecord::new(Descriptor::socket(&a), PollEvents::READABLE);
    record.returned = PollEvents::PRIORITY | PollEvents::WRITABLE;
    let mut records = vec![record; count];

    let result = PollWait::new().wait(&mut records, timeout::IMMEDIATE);
    assert_eq!(result, Err(PollError::System(Errno::EINVAL)));
    assert!(records
        .iter()
        .all(|r| r.returned == PollEvents::PRIORITY | PollEvents::WRITABLE));
}

#[test_log::test]
fn test_poll_large_record_set_uses_scratch_and_reuses_it() {
    let (a, mut b) = UnixStream::pair().expect("socketpair");
    b.write_all(b"data").expect("write");

    let count = super::poll::SMALL_POLL_LIMIT * 3;
    let mut records: Vec<PollRecord<usize>> = (0..count)
        .map(|i| PollRecord::with_payload(Descriptor::socket(&a), PollEvents::READABLE, i))
        .collect();

    let mut waiter = PollWait::new();
    let ready = waiter.wait(&mut records, 1_000_000).expect("ready");
    assert_eq!(ready, count);
    assert!(records.iter().all(|r| r.returned == PollEvents::READABLE));
    assert!(records.iter().enumerate().all(|(i, r)| r.payload == i));
    let grown = waiter.scratch.capacity();
    assert!(grown >= count);

    let ready = waiter.wait(&mut records, 1_000_000).expect("still ready");
    assert_eq!(ready, count);
    assert_eq!(waiter.scratch.capacity(), grown);
    assert_eq!(a.as_raw_fd(), records[count - 1].descriptor.raw_fd());
}
