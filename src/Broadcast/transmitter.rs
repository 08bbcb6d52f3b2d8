// In src/Broadcast/transmitter.rs
use super::Buffer::layout::{align, HEADER_LENGTH, PADDING_MSG_TYPE_ID, RECORD_ALIGNMENT};
use super::Buffer::BroadcastBuffer;
use crate::Broadcast::Structs::Buffer_Structs::RecordHeader;
use crate::Core::error::{BroadcastError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// The single writer of a broadcast ring.
///
/// Transmitting never waits for receivers: when the ring is full the oldest
/// records are overwritten. Receivers that fall a whole lap behind notice it
/// through the `tail_intent` counter.
pub struct BroadcastTransmitter {
    buffer: BroadcastBuffer,
    max_msg_length: usize,
}

impl BroadcastTransmitter {
    /// Take the writer role for `buffer`. Continues from the ring's current
    /// tail, so a restarted transmitter does not rewind attached receivers.
    pub fn new(buffer: BroadcastBuffer) -> Self {
        let max_msg_length = buffer.max_msg_length();
        Self {
            buffer,
            max_msg_length,
        }
    }

    /// Publish one message.
    ///
    /// # Arguments
    /// * `type_id` - Message type, must be greater than zero
    /// * `payload` - At most [`max_msg_length`](Self::max_msg_length) bytes
    ///
    /// # Returns
    /// * `Err(InvalidTypeId)` / `Err(MessageTooLong)` if the message is rejected
    pub fn transmit(&mut self, type_id: i32, payload: &[u8]) -> Result<()> {
        if type_id < 1 {
            return Err(BroadcastError::InvalidTypeId(type_id));
        }
        if payload.len() > self.max_msg_length {
            return Err(BroadcastError::MessageTooLong {
                length: payload.len(),
                max: self.max_msg_length,
            });
        }

        let buffer = &self.buffer;
        let capacity = buffer.capacity();
        let record_length = payload.len() + HEADER_LENGTH;
        let aligned_record_length = align(record_length, RECORD_ALIGNMENT);

        let mut current_tail = buffer.tail_relaxed();
        let mut record_offset = (current_tail as usize) & buffer.mask();
        let to_end_of_buffer = capacity - record_offset;

        if to_end_of_buffer < aligned_record_length {
            // Not enough room before the end: pad out and start over at 0.
            buffer.publish_tail_intent(
                current_tail + to_end_of_buffer as u64 + aligned_record_length as u64,
            );
            buffer.write_header(
                record_offset,
                RecordHeader {
                    length: to_end_of_buffer as i32,
                    type_id: PADDING_MSG_TYPE_ID,
                },
            );
            current_tail += to_end_of_buffer as u64;
            record_offset = 0;
        } else {
            buffer.publish_tail_intent(current_tail + aligned_record_length as u64);
        }

        buffer.write_header(
            record_offset,
            RecordHeader {
                length: record_length as i32,
                type_id,
            },
        );
        buffer.write_bytes(record_offset + HEADER_LENGTH, payload);

        buffer.publish_latest(current_tail);
        buffer.publish_tail(current_tail + aligned_record_length as u64);
        Ok(())
    }

    /// Returns the maximum message size that can be sent
    pub fn max_msg_length(&self) -> usize {
        self.max_msg_length
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn buffer(&self) -> &BroadcastBuffer {
        &self.buffer
    }

    /// Share this transmitter between producer threads.
    pub fn into_shared(self) -> SharedTransmitter {
        SharedTransmitter {
            max_msg_length: self.max_msg_length,
            inner: Arc::new(Mutex::new(self)),
        }
    }
}

/// A [`BroadcastTransmitter`] several producer threads can publish through.
///
/// The ring has exactly one writer at a time; clones of this handle take
/// turns on a `parking_lot` mutex. Receivers are unaffected and never block.
#[derive(Clone)]
pub struct SharedTransmitter {
    inner: Arc<Mutex<BroadcastTransmitter>>,
    max_msg_length: usize,
}

impl SharedTransmitter {
    pub fn transmit(&self, type_id: i32, payload: &[u8]) -> Result<()> {
        self.inner.lock().transmit(type_id, payload)
    }

    /// Largest payload accepted; fixed by the ring capacity.
    pub fn max_msg_length(&self) -> usize {
        self.max_msg_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_type_ids() {
        let buffer = BroadcastBuffer::new_local(1024).unwrap();
        let mut tx = BroadcastTransmitter::new(buffer);
        assert!(matches!(tx.transmit(0, b"x"), Err(BroadcastError::InvalidTypeId(0))));
        assert!(matches!(
            tx.transmit(PADDING_MSG_TYPE_ID, b"x"),
            Err(BroadcastError::InvalidTypeId(-1))
        ));
    }

    #[test]
    fn rejects_oversized_messages() {
        let buffer = BroadcastBuffer::new_local(1024).unwrap();
        let mut tx = BroadcastTransmitter::new(buffer);
        assert_eq!(tx.max_msg_length(), 128);
        assert!(tx.transmit(1, &[0u8; 128]).is_ok());
        assert!(matches!(
            tx.transmit(1, &[0u8; 129]),
            Err(BroadcastError::MessageTooLong { length: 129, max: 128 })
        ));
    }

    #[test]
    fn advances_tail_by_aligned_record_length() {
        let buffer = BroadcastBuffer::new_local(1024).unwrap();
        let mut tx = BroadcastTransmitter::new(buffer.clone());
        tx.transmit(3, b"abc").unwrap();
        assert_eq!(buffer.tail(), 16);
        assert_eq!(buffer.tail_intent(), 16);
        assert_eq!(buffer.latest(), 0);
        assert_eq!(buffer.header_at(0), RecordHeader { length: 11, type_id: 3 });

        tx.transmit(4, &[]).unwrap();
        assert_eq!(buffer.tail(), 24);
        assert_eq!(buffer.latest(), 16);
    }

    #[test]
    fn pads_when_record_does_not_fit_before_end() {
        let buffer = BroadcastBuffer::new_local(1024).unwrap();
        let mut tx = BroadcastTransmitter::new(buffer.clone());
        // 8 records of 120 aligned bytes leaves 64 bytes at the end
        for _ in 0..8 {
            tx.transmit(1, &[7u8; 112]).unwrap();
        }
        assert_eq!(buffer.tail(), 960);

        tx.transmit(2, &[9u8; 100]).unwrap();
        assert_eq!(
            buffer.header_at(960),
            RecordHeader { length: 64, type_id: PADDING_MSG_TYPE_ID }
        );
        assert_eq!(buffer.latest(), 1024);
        assert_eq!(buffer.tail(), 1024 + 112);
        assert_eq!(buffer.header_at(0), RecordHeader { length: 108, type_id: 2 });
    }

    #[test]
    fn shared_transmitter_reports_limit_while_locked() {
        let buffer = BroadcastBuffer::new_local(2048).unwrap();
        let shared = BroadcastTransmitter::new(buffer.clone()).into_shared();
        let guard = shared.inner.lock();
        assert_eq!(shared.clone().max_msg_length(), 256);
        drop(guard);
        shared.transmit(1, &[0u8; 256]).unwrap();
        assert_eq!(buffer.tail(), 264);
    }

    #[test]
    fn restarted_transmitter_continues_from_tail() {
        let buffer = BroadcastBuffer::new_local(1024).unwrap();
        BroadcastTransmitter::new(buffer.clone()).transmit(1, b"one").unwrap();
        BroadcastTransmitter::new(buffer.clone()).transmit(1, b"two").unwrap();
        assert_eq!(buffer.tail(), 32);
        assert_eq!(buffer.latest(), 16);
    }
}
