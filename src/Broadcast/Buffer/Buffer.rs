// This is the shared broadcast ring - a data band of records followed by the trailer

use super::layout::BroadcastTrailer;
use crate::Core::SharedMemory::SharedMemoryBackend;

use std::sync::Arc;

/// A view over one broadcast ring: `capacity` bytes of records followed by
/// a [`BroadcastTrailer`].
///
/// This struct is NOT stored in shared memory. It holds the backing region
/// alive and caches pointers into it, so transmitters and receivers in the
/// same process can clone it freely.
///
/// ### Concurrency Design:
/// - **Transmitter**: the single writer. Announces the range it is about to
///   overwrite in `tail_intent`, writes the record, then publishes `latest`
///   and `tail`.
/// - **Receivers**: never write to the region. They read `tail` to find new
///   records and compare their cursor against `tail_intent` after reading to
///   learn whether the record was overwritten underneath them.
pub struct BroadcastBuffer {
    /// Keeps the heap block or shared mapping alive.
    pub(crate) memory: Arc<dyn SharedMemoryBackend>,

    /// Start of the data band.
    pub(crate) base: *mut u8,

    /// Trailer located at `base + capacity`.
    pub(crate) trailer: *const BroadcastTrailer,

    /// Size of the data band in bytes (power of two).
    pub(crate) capacity: usize,

    /// `capacity - 1`, wraps positions into offsets.
    pub(crate) mask: usize,
}

impl Clone for BroadcastBuffer {
    fn clone(&self) -> Self {
        Self {
            memory: Arc::clone(&self.memory),
            base: self.base,
            trailer: self.trailer,
            capacity: self.capacity,
            mask: self.mask,
        }
    }
}

unsafe impl Send for BroadcastBuffer {}
unsafe impl Sync for BroadcastBuffer {}
