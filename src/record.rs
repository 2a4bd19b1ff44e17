// src/record.rs

use crate::descriptor::Descriptor;
use crate::event::PollEvents;

/// One descriptor's interest going in and its readiness coming out.
///
/// `payload` is never inspected; it travels with the record so results can be
/// matched back to whatever the caller keeps per descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRecord<T = ()> {
    pub descriptor: Descriptor,
    pub requested: PollEvents,
    pub returned: PollEvents,
    pub payload: T,
}

impl PollRecord<()> {
    pub fn new(descriptor: Descriptor, requested: PollEvents) -> Self {
        Self::with_payload(descriptor, requested, ())
    }
}

impl<T> PollRecord<T> {
    pub fn with_payload(descriptor: Descriptor, requested: PollEvents, payload: T) -> Self {
        PollRecord {
            descriptor,
            requested,
            returned: PollEvents::empty(),
            payload,
        }
    }

    /// True when the last wait reported anything for this descriptor.
    pub fn is_ready(&self) -> bool {
        !self.returned.is_empty()
    }
}
