use std::ptr;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};
use std::sync::Arc;

use super::layout::{
    bytes_for_ring, check_capacity, BroadcastTrailer, MAX_MSG_LENGTH_DIVISOR, MIN_CAPACITY,
    TRAILER_LENGTH,
};
use super::Buffer::BroadcastBuffer;
use crate::Broadcast::Structs::Buffer_Structs::RecordHeader;
use crate::Core::error::{BroadcastError, Result};
use crate::Core::SharedMemory::{HeapMemory, SharedMemoryBackend, REGION_ALIGNMENT};

impl BroadcastBuffer {
    /// Allocate an in-process ring with `capacity` data bytes.
    pub fn new_local(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        let memory = HeapMemory::new(bytes_for_ring(capacity))?;
        Self::from_memory(Arc::new(memory))
    }

    /// Wrap an existing region. The data capacity is the region size minus
    /// the trailer and must come out as a power of two.
    ///
    /// The region is used as-is: a freshly created one is zeroed, which is a
    /// valid empty ring; an attached one keeps whatever the transmitter wrote.
    pub fn from_memory(memory: Arc<dyn SharedMemoryBackend>) -> Result<Self> {
        let size = memory.size();
        if size < bytes_for_ring(MIN_CAPACITY) {
            return Err(BroadcastError::RegionTooSmall {
                required: bytes_for_ring(MIN_CAPACITY),
                actual: size,
            });
        }

        let capacity = size - TRAILER_LENGTH;
        check_capacity(capacity)?;

        let base = memory.as_ptr();
        if (base as usize) % REGION_ALIGNMENT != 0 {
            return Err(BroadcastError::MisalignedRegion {
                address: base as usize,
                alignment: REGION_ALIGNMENT,
            });
        }

        // Safety: size covers capacity + TRAILER_LENGTH and capacity is a
        // multiple of the trailer alignment.
        let trailer = unsafe { base.add(capacity) as *const BroadcastTrailer };

        Ok(Self {
            memory,
            base,
            trailer,
            capacity,
            mask: capacity - 1,
        })
    }

    /// Size of the data band in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// Largest payload a transmitter accepts for this ring.
    #[inline]
    pub fn max_msg_length(&self) -> usize {
        self.capacity / MAX_MSG_LENGTH_DIVISOR
    }

    /// The backing region.
    pub fn memory(&self) -> &Arc<dyn SharedMemoryBackend> {
        &self.memory
    }

    #[inline]
    pub(crate) fn trailer(&self) -> &BroadcastTrailer {
        // Safety: trailer points inside `memory`, which self keeps alive.
        unsafe { &*self.trailer }
    }

    #[inline]
    pub fn tail(&self) -> u64 {
        self.trailer().tail.load(Acquire)
    }

    #[inline]
    pub fn tail_intent(&self) -> u64 {
        self.trailer().tail_intent.load(Acquire)
    }

    #[inline]
    pub fn latest(&self) -> u64 {
        self.trailer().latest.load(Acquire)
    }

    /// Tail as last written by this process's transmitter.
    #[inline]
    pub(crate) fn tail_relaxed(&self) -> u64 {
        self.trailer().tail.load(Relaxed)
    }

    #[inline]
    pub(crate) fn publish_tail_intent(&self, value: u64) {
        self.trailer().tail_intent.store(value, Release);
        // Keep the record writes that follow from moving above the intent.
        std::sync::atomic::fence(Release);
    }

    #[inline]
    pub(crate) fn publish_latest(&self, value: u64) {
        self.trailer().latest.store(value, Release);
    }

    #[inline]
    pub(crate) fn publish_tail(&self, value: u64) {
        self.trailer().tail.store(value, Release);
    }

    /// Read the record header at `offset`.
    #[inline]
    pub(crate) fn header_at(&self, offset: usize) -> RecordHeader {
        debug_assert!(offset + super::layout::HEADER_LENGTH <= self.capacity);
        // Safety: offset is record aligned and inside the data band. The
        // transmitter may be writing the same bytes; callers validate.
        unsafe { ptr::read_volatile(self.base.add(offset) as *const RecordHeader) }
    }

    #[inline]
    pub(crate) fn write_header(&self, offset: usize, header: RecordHeader) {
        debug_assert!(offset + super::layout::HEADER_LENGTH <= self.capacity);
        unsafe { ptr::write_volatile(self.base.add(offset) as *mut RecordHeader, header) }
    }

    #[inline]
    pub(crate) fn write_bytes(&self, offset: usize, src: &[u8]) {
        debug_assert!(offset + src.len() <= self.capacity);
        unsafe { ptr::copy_nonoverlapping(src.as_ptr(), self.base.add(offset), src.len()) }
    }

    /// Copy `dst.len()` bytes starting at `offset` out of the data band.
    ///
    /// The transmitter may be overwriting the range; callers validate the
    /// record before trusting `dst`.
    #[inline]
    pub(crate) fn copy_out(&self, offset: usize, dst: &mut [u8]) {
        debug_assert!(offset + dst.len() <= self.capacity);
        unsafe { ptr::copy_nonoverlapping(self.base.add(offset), dst.as_mut_ptr(), dst.len()) }
    }

    /// View `length` bytes of the data band starting at `offset`.
    ///
    /// # Safety
    /// The bytes may be overwritten by the transmitter at any time. Callers
    /// must copy them out and validate the record before trusting the copy.
    #[inline]
    pub(crate) unsafe fn bytes_at(&self, offset: usize, length: usize) -> &[u8] {
        debug_assert!(offset + length <= self.capacity);
        std::slice::from_raw_parts(self.base.add(offset), length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_ring_starts_empty() {
        let buffer = BroadcastBuffer::new_local(4096).unwrap();
        assert_eq!(buffer.capacity(), 4096);
        assert_eq!(buffer.mask(), 4095);
        assert_eq!(buffer.max_msg_length(), 512);
        assert_eq!(buffer.tail(), 0);
        assert_eq!(buffer.tail_intent(), 0);
        assert_eq!(buffer.latest(), 0);
    }

    #[test]
    fn rejects_bad_capacity() {
        assert!(matches!(
            BroadcastBuffer::new_local(3000),
            Err(BroadcastError::InvalidCapacity { capacity: 3000, .. })
        ));
    }

    #[test]
    fn rejects_region_that_is_not_power_of_two_plus_trailer() {
        let memory = HeapMemory::new(4096).unwrap();
        assert!(matches!(
            BroadcastBuffer::from_memory(Arc::new(memory)),
            Err(BroadcastError::InvalidCapacity { .. })
        ));
    }

    #[test]
    fn rejects_tiny_region() {
        let memory = HeapMemory::new(256).unwrap();
        assert!(matches!(
            BroadcastBuffer::from_memory(Arc::new(memory)),
            Err(BroadcastError::RegionTooSmall { actual: 256, .. })
        ));
    }

    /// Heap block handed out 8 bytes past its aligned start.
    #[derive(Debug)]
    struct Shifted(HeapMemory);

    impl SharedMemoryBackend for Shifted {
        fn as_ptr(&self) -> *mut u8 {
            unsafe { self.0.as_ptr().add(8) }
        }

        fn size(&self) -> usize {
            self.0.size() - 8
        }

        fn raw_handle(&self) -> crate::Core::SharedMemory::RawHandle {
            self.0.raw_handle()
        }
    }

    #[test]
    fn rejects_misaligned_region() {
        let memory = Shifted(HeapMemory::new(bytes_for_ring(1024) + 8).unwrap());
        let address = memory.as_ptr() as usize;
        assert!(matches!(
            BroadcastBuffer::from_memory(Arc::new(memory)),
            Err(BroadcastError::MisalignedRegion { address: a, alignment: REGION_ALIGNMENT }) if a == address
        ));
    }

    #[test]
    fn copy_out_reads_band_bytes() {
        let buffer = BroadcastBuffer::new_local(1024).unwrap();
        buffer.write_bytes(1000, b"tail end");
        let mut dst = [0u8; 8];
        buffer.copy_out(1000, &mut dst);
        assert_eq!(&dst, b"tail end");
    }

    #[test]
    fn header_roundtrip_at_offset() {
        let buffer = BroadcastBuffer::new_local(1024).unwrap();
        let header = RecordHeader { length: 13, type_id: 7 };
        buffer.write_header(64, header);
        buffer.write_bytes(72, b"hello");
        assert_eq!(buffer.header_at(64), header);
        assert_eq!(unsafe { buffer.bytes_at(72, 5) }, b"hello");
    }
}
