use std::fmt;
use crate::Broadcast::Buffer::BroadcastBuffer;
use crate::Broadcast::{BroadcastReceiver, BroadcastTransmitter, BroadcastTransport, CopyBroadcastReceiver};

/// Debug function for BroadcastBuffer
///
/// Shows the region location and the three trailer counters without
/// touching record bytes.
pub fn debug_broadcast_buffer(buffer: &BroadcastBuffer, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BroadcastBuffer")
        .field("base", &format_args!("0x{:x}", buffer.base as usize))
        .field("capacity", &buffer.capacity())
        .field("handle", &buffer.memory().raw_handle())
        .field("tail_intent", &buffer.tail_intent())
        .field("tail", &buffer.tail())
        .field("latest", &buffer.latest())
        .finish()
}

/// Debug function for BroadcastReceiver
pub fn debug_broadcast_receiver(receiver: &BroadcastReceiver, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BroadcastReceiver")
        .field("cursor", &receiver.cursor())
        .field("lapped_count", &receiver.lapped_count())
        .field("buffer", receiver.buffer())
        .finish()
}

/// Debug function for BroadcastTransmitter
pub fn debug_broadcast_transmitter(transmitter: &BroadcastTransmitter, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BroadcastTransmitter")
        .field("max_msg_length", &transmitter.max_msg_length())
        .field("buffer", transmitter.buffer())
        .finish()
}

/// Debug function for CopyBroadcastReceiver
///
/// The scratch contents are never printed; they are stale between calls.
pub fn debug_copy_receiver<T: BroadcastTransport>(
    receiver: &CopyBroadcastReceiver<T>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct("CopyBroadcastReceiver")
        .field("scratch_capacity", &receiver.scratch_capacity())
        .field("skipped_on_attach", &receiver.messages_skipped_on_attach())
        .field("lapped_count", &receiver.lapped_count())
        .finish_non_exhaustive()
}
