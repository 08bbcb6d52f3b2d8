// src/Broadcast/receiver.rs

use super::Buffer::layout::{align, HEADER_LENGTH, PADDING_MSG_TYPE_ID, RECORD_ALIGNMENT};
use super::Buffer::BroadcastBuffer;
use super::transport::BroadcastTransport;
use std::sync::atomic::{fence, AtomicU64, Ordering};
use std::sync::Arc;

/// A receiver for messages broadcast over a [`BroadcastBuffer`].
///
/// Each receiver keeps its own cursor; receivers never write to the ring, so
/// any number of them can follow one transmitter. A receiver starts at
/// position 0, which means one attaching to a ring that is already in use
/// sees the backlog first (and will usually be lapped straight to `latest`).
///
/// The payload returned by [`bytes`](BroadcastTransport::bytes) points into
/// the ring itself. Use [`crate::Broadcast::CopyBroadcastReceiver`] for a
/// private copy that is checked against overwrite.
pub struct BroadcastReceiver {
    buffer: BroadcastBuffer,
    /// Start of the current record. Validation is checked against it.
    cursor: u64,
    /// Start of the record after the current one.
    next_record: u64,
    /// Offset of the current record's header in the data band.
    record_offset: usize,
    lapped_count: Arc<AtomicU64>,
}

impl BroadcastReceiver {
    pub fn new(buffer: BroadcastBuffer) -> Self {
        Self {
            buffer,
            cursor: 0,
            next_record: 0,
            record_offset: 0,
            lapped_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared handle to the lapped counter, for monitoring from other threads.
    pub fn lapped_count_handle(&self) -> &Arc<AtomicU64> {
        &self.lapped_count
    }

    /// Offset of the current payload within the data band.
    pub fn offset(&self) -> usize {
        self.record_offset + HEADER_LENGTH
    }

    /// Start of the current record.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn buffer(&self) -> &BroadcastBuffer {
        &self.buffer
    }

    /// Whether the record starting at `cursor` can still be intact: the
    /// transmitter has not announced a write that reaches it a lap later.
    #[inline]
    fn validate_at(&self, cursor: u64) -> bool {
        // Order the preceding record reads before the intent load.
        fence(Ordering::Acquire);
        cursor + self.buffer.capacity() as u64 > self.buffer.tail_intent()
    }

    /// Count a lap and return the start of the newest record.
    fn jump_to_latest(&self, from: u64) -> u64 {
        let lapped = self.lapped_count.fetch_add(1, Ordering::AcqRel) + 1;
        let latest = self.buffer.latest();
        log::warn!(
            "broadcast receiver lapped (count {}), jumping from {} to latest {}",
            lapped,
            from,
            latest
        );
        latest
    }

    #[inline]
    fn aligned_record_length(&self, offset: usize) -> u64 {
        let length = self.buffer.header_at(offset).length.max(HEADER_LENGTH as i32) as usize;
        align(length, RECORD_ALIGNMENT) as u64
    }
}

impl BroadcastTransport for BroadcastReceiver {
    fn lapped_count(&self) -> u64 {
        self.lapped_count.load(Ordering::Acquire)
    }

    fn receive_next(&mut self) -> bool {
        let tail = self.buffer.tail();
        let mut cursor = self.next_record;

        if tail <= cursor {
            return false;
        }

        let mask = self.buffer.mask() as u64;
        if !self.validate_at(cursor) {
            cursor = self.jump_to_latest(cursor);
        }

        let mut record_offset = (cursor & mask) as usize;
        let mut next_record = cursor + self.aligned_record_length(record_offset);

        if self.buffer.header_at(record_offset).type_id == PADDING_MSG_TYPE_ID {
            // The padding length decides where the real record starts, so it
            // must not have been overwritten while we read it.
            if self.validate_at(cursor) {
                cursor = next_record;
            } else {
                cursor = self.jump_to_latest(cursor);
            }
            record_offset = (cursor & mask) as usize;
            next_record = cursor + self.aligned_record_length(record_offset);
        }

        self.cursor = cursor;
        self.next_record = next_record;
        self.record_offset = record_offset;
        true
    }

    fn type_id(&self) -> i32 {
        self.buffer.header_at(self.record_offset).type_id
    }

    fn length(&self) -> usize {
        let record_length = self.buffer.header_at(self.record_offset).length as usize;
        // A torn header can claim anything; keep the view inside the band.
        record_length
            .saturating_sub(HEADER_LENGTH)
            .min(self.buffer.capacity() - self.offset())
    }

    fn bytes(&self) -> &[u8] {
        // Safety: offset + length stays inside the data band (see length()).
        unsafe { self.buffer.bytes_at(self.offset(), self.length()) }
    }

    fn copy_into(&self, dst: &mut [u8]) -> bool {
        let offset = self.offset();
        if dst.len() > self.buffer.capacity() - offset {
            return false;
        }
        self.buffer.copy_out(offset, dst);
        true
    }

    fn validate(&self) -> bool {
        self.validate_at(self.cursor)
    }
}

impl Clone for BroadcastReceiver {
    /// An independent receiver over the same ring, at the same position,
    /// with its own lapped counter.
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer.clone(),
            cursor: self.cursor,
            next_record: self.next_record,
            record_offset: self.record_offset,
            lapped_count: Arc::new(AtomicU64::new(self.lapped_count())),
        }
    }
}
