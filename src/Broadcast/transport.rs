/// The read side of a broadcast transport, as seen by a single consumer.
///
/// A transport exposes one "current message" at a time. After
/// [`receive_next`](BroadcastTransport::receive_next) returns `true` the
/// accessors describe that message until the next call. The bytes live in
/// memory the producer keeps writing to, so a reader that copies them must
/// call [`validate`](BroadcastTransport::validate) afterwards before trusting
/// the copy.
pub trait BroadcastTransport {
    /// Number of times this consumer was found to have been overtaken.
    /// Never decreases.
    fn lapped_count(&self) -> u64;

    /// Move to the next unread message. Returns `false` when nothing new
    /// has been published. Never blocks.
    fn receive_next(&mut self) -> bool;

    /// Type id of the current message.
    fn type_id(&self) -> i32;

    /// Payload length of the current message in bytes.
    fn length(&self) -> usize;

    /// Payload of the current message, exactly [`length`](BroadcastTransport::length)
    /// bytes, borrowed from the shared region.
    fn bytes(&self) -> &[u8];

    /// Copy the first `dst.len()` payload bytes of the current message into
    /// `dst`. Returns `false` if the message does not hold that many bytes,
    /// in which case `dst` is left unspecified.
    ///
    /// Transports over memory the producer writes concurrently override this
    /// with a raw copy, so no shared reference to the bytes is formed.
    fn copy_into(&self, dst: &mut [u8]) -> bool {
        match self.bytes().get(..dst.len()) {
            Some(src) => {
                dst.copy_from_slice(src);
                true
            }
            None => false,
        }
    }

    /// Whether the current message is still intact, i.e. the producer has
    /// not started overwriting it since `receive_next` returned.
    fn validate(&self) -> bool;
}

impl<T: BroadcastTransport + ?Sized> BroadcastTransport for &mut T {
    fn lapped_count(&self) -> u64 {
        (**self).lapped_count()
    }

    fn receive_next(&mut self) -> bool {
        (**self).receive_next()
    }

    fn type_id(&self) -> i32 {
        (**self).type_id()
    }

    fn length(&self) -> usize {
        (**self).length()
    }

    fn bytes(&self) -> &[u8] {
        (**self).bytes()
    }

    fn copy_into(&self, dst: &mut [u8]) -> bool {
        (**self).copy_into(dst)
    }

    fn validate(&self) -> bool {
        (**self).validate()
    }
}

impl<T: BroadcastTransport + ?Sized> BroadcastTransport for Box<T> {
    fn lapped_count(&self) -> u64 {
        (**self).lapped_count()
    }

    fn receive_next(&mut self) -> bool {
        (**self).receive_next()
    }

    fn type_id(&self) -> i32 {
        (**self).type_id()
    }

    fn length(&self) -> usize {
        (**self).length()
    }

    fn bytes(&self) -> &[u8] {
        (**self).bytes()
    }

    fn copy_into(&self, dst: &mut [u8]) -> bool {
        (**self).copy_into(dst)
    }

    fn validate(&self) -> bool {
        (**self).validate()
    }
}
