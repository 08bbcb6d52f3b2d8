use super::Buffer::layout::{bytes_for_ring, check_capacity};
use super::Buffer::BroadcastBuffer;
use super::{BroadcastReceiver, BroadcastTransmitter, CopyBroadcastReceiver, SCRATCH_BUFFER_SIZE};
use crate::Core::error::Result;
use crate::Core::SharedMemory::{attach_shared_memory, create_shared_memory};
use std::sync::Arc;

pub struct BroadcastBuilder {
    capacity: usize,
    name: String,
    scratch_capacity: usize,
}

impl Default for BroadcastBuilder {
    fn default() -> Self {
        Self {
            capacity: 64 * 1024, // 64KB data ring
            name: String::from("dmxp_broadcast"),
            scratch_capacity: SCRATCH_BUFFER_SIZE,
        }
    }
}

impl BroadcastBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data ring size in bytes; must be a power of two.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Name of the region under /dev/shm.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Scratch buffer size for [`build_copy_receiver`](Self::build_copy_receiver).
    pub fn with_scratch_capacity(mut self, capacity: usize) -> Self {
        self.scratch_capacity = capacity;
        self
    }

    /// In-process ring on the heap.
    pub fn build_local(self) -> Result<(BroadcastTransmitter, BroadcastReceiver)> {
        let buffer = BroadcastBuffer::new_local(self.capacity)?;
        Ok((
            BroadcastTransmitter::new(buffer.clone()),
            BroadcastReceiver::new(buffer),
        ))
    }

    /// Create (or truncate) the shared region and become its transmitter.
    pub fn build_transmitter(self) -> Result<BroadcastTransmitter> {
        check_capacity(self.capacity)?;
        let shm = create_shared_memory(bytes_for_ring(self.capacity), Some(&self.name))?;
        let buffer = BroadcastBuffer::from_memory(Arc::from(shm))?;
        Ok(BroadcastTransmitter::new(buffer))
    }

    /// Attach to an existing shared region as a raw receiver.
    pub fn build_receiver(self) -> Result<BroadcastReceiver> {
        check_capacity(self.capacity)?;
        let shm = attach_shared_memory(&self.name, bytes_for_ring(self.capacity))?;
        let buffer = BroadcastBuffer::from_memory(Arc::from(shm))?;
        Ok(BroadcastReceiver::new(buffer))
    }

    /// Attach to an existing shared region and catch up to its tail.
    pub fn build_copy_receiver(self) -> Result<CopyBroadcastReceiver<BroadcastReceiver>> {
        let scratch_capacity = self.scratch_capacity;
        let receiver = self.build_receiver()?;
        CopyBroadcastReceiver::with_scratch_capacity(receiver, scratch_capacity)
    }
}
