// src/Broadcast/copy_receiver.rs

use super::transport::BroadcastTransport;
use crate::Core::error::{BroadcastError, Result};

/// Default size of the scratch buffer messages are copied into.
pub const SCRATCH_BUFFER_SIZE: usize = 4096;

/// Callback for messages handed out by [`CopyBroadcastReceiver::receive`].
///
/// `buffer` is the receiver's whole scratch buffer; the message occupies
/// `buffer[offset..offset + length]`. The bytes are a private copy and stay
/// put until the handler returns.
pub trait MessageHandler {
    fn on_message(&mut self, type_id: i32, buffer: &[u8], offset: usize, length: usize);
}

impl<F> MessageHandler for F
where
    F: FnMut(i32, &[u8], usize, usize),
{
    #[inline]
    fn on_message(&mut self, type_id: i32, buffer: &[u8], offset: usize, length: usize) {
        self(type_id, buffer, offset, length)
    }
}

/// Fixed-size copy target, allocated once and reused for every message.
struct ScratchBuffer {
    bytes: Box<[u8]>,
}

impl ScratchBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

/// Receiver that copies each broadcast message into a private buffer before
/// handing it to the caller, so a slow handler cannot observe the transmitter
/// overwriting the message.
///
/// Construction skips whatever backlog the transport already holds. Once the
/// receiver reports [`BroadcastError::Overrun`] it should be dropped and a
/// fresh one attached.
pub struct CopyBroadcastReceiver<T: BroadcastTransport> {
    receiver: T,
    scratch: ScratchBuffer,
    skipped_on_attach: u64,
}

impl<T: BroadcastTransport> CopyBroadcastReceiver<T> {
    /// Wrap `receiver` with a scratch buffer of [`SCRATCH_BUFFER_SIZE`] bytes.
    pub fn new(receiver: T) -> Self {
        Self::build(receiver, SCRATCH_BUFFER_SIZE)
    }

    /// Wrap `receiver` with a scratch buffer of `capacity` bytes.
    pub fn with_scratch_capacity(receiver: T, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BroadcastError::InvalidCapacity {
                capacity,
                reason: "scratch buffer capacity must be greater than zero",
            });
        }
        Ok(Self::build(receiver, capacity))
    }

    fn build(mut receiver: T, capacity: usize) -> Self {
        let scratch = ScratchBuffer::new(capacity);

        // Scan up to date instead of replaying history, otherwise a receiver
        // reconnecting to a busy ring risks never catching up.
        let mut skipped = 0u64;
        while receiver.receive_next() {
            skipped += 1;
        }
        log::debug!("copy receiver attached, skipped {} backlog messages", skipped);

        Self {
            receiver,
            scratch,
            skipped_on_attach: skipped,
        }
    }

    /// Receive at most one message.
    ///
    /// # Returns
    /// * `Ok(1)` if a message was copied and passed to `handler`
    /// * `Ok(0)` if nothing new was available
    /// * `Err(Overrun)` if the transmitter overtook this receiver, before or
    ///   during the copy; `handler` is not called
    /// * `Err(ScratchCapacity)` if the message does not fit the scratch buffer
    pub fn receive<H: MessageHandler>(&mut self, handler: &mut H) -> Result<usize> {
        let receiver = &mut self.receiver;
        let last_seen_lapped_count = receiver.lapped_count();

        if !receiver.receive_next() {
            return Ok(0);
        }

        if last_seen_lapped_count != receiver.lapped_count() {
            log::warn!("copy receiver overtaken before read");
            return Err(BroadcastError::Overrun);
        }

        let length = receiver.length();
        let capacity = self.scratch.capacity();
        if length > capacity {
            log::error!("message of {} bytes exceeds scratch buffer of {}", length, capacity);
            return Err(BroadcastError::ScratchCapacity {
                required: length,
                capacity,
            });
        }

        let type_id = receiver.type_id();
        if !receiver.copy_into(&mut self.scratch.bytes[..length]) {
            // The header changed under us, so the record was overwritten.
            log::warn!("copy receiver overtaken during read");
            return Err(BroadcastError::Overrun);
        }

        if !receiver.validate() {
            log::warn!("copy receiver overtaken during read");
            return Err(BroadcastError::Overrun);
        }

        handler.on_message(type_id, &self.scratch.bytes, 0, length);
        Ok(1)
    }

    /// Capacity of the scratch buffer in bytes.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Number of messages discarded while catching up at construction.
    pub fn messages_skipped_on_attach(&self) -> u64 {
        self.skipped_on_attach
    }

    /// Lapped count of the wrapped transport.
    pub fn lapped_count(&self) -> u64 {
        self.receiver.lapped_count()
    }

    /// Borrow the wrapped transport.
    pub fn get_ref(&self) -> &T {
        &self.receiver
    }

    /// Give the transport back.
    pub fn into_inner(self) -> T {
        self.receiver
    }
}
