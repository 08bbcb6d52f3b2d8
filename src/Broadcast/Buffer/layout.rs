use crossbeam_utils::CachePadded;
use std::mem::size_of;
use std::sync::atomic::AtomicU64;

use crate::Broadcast::Structs::Buffer_Structs::RecordHeader;

/// Smallest data ring accepted, in bytes. Must be a power of two.
pub const MIN_CAPACITY: usize = 1024;

/// Every record starts on this boundary.
pub const RECORD_ALIGNMENT: usize = 8;

/// Size of the header in front of each payload.
pub const HEADER_LENGTH: usize = size_of::<RecordHeader>();

/// Type id of the filler record written when a message does not fit
/// before the end of the ring.
pub const PADDING_MSG_TYPE_ID: i32 = -1;

/// Messages may use at most this fraction of the ring (`capacity / 8`).
pub const MAX_MSG_LENGTH_DIVISOR: usize = 8;

/// The control block located directly after the data ring.
///
/// Each counter sits on its own cache line.
#[repr(C, align(128))]
pub struct BroadcastTrailer {
    /// Position the transmitter is about to write up to. Stored before the
    /// record bytes are touched, which is what lets readers detect overwrite.
    pub tail_intent: CachePadded<AtomicU64>,

    /// Position after the last fully published record.
    pub tail: CachePadded<AtomicU64>,

    /// Start position of the most recently published record. A lapped
    /// receiver jumps here.
    pub latest: CachePadded<AtomicU64>,
}

/// Size of the trailer in bytes.
pub const TRAILER_LENGTH: usize = size_of::<BroadcastTrailer>();

/// Round `value` up to the next multiple of `alignment` (a power of two).
#[inline]
pub const fn align(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

/// Total bytes required for a ring of `capacity` data bytes.
#[inline]
pub const fn bytes_for_ring(capacity: usize) -> usize {
    capacity + TRAILER_LENGTH
}

/// Check a data ring capacity.
pub fn check_capacity(capacity: usize) -> crate::Core::error::Result<()> {
    if !capacity.is_power_of_two() {
        return Err(crate::Core::error::BroadcastError::InvalidCapacity {
            capacity,
            reason: "ring capacity must be a positive power of two",
        });
    }
    if capacity < MIN_CAPACITY {
        return Err(crate::Core::error::BroadcastError::InvalidCapacity {
            capacity,
            reason: "ring capacity below minimum of 1024 bytes",
        });
    }
    Ok(())
}
