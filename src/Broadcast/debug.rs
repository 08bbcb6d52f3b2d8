use super::Buffer::BroadcastBuffer;
use super::{BroadcastReceiver, BroadcastTransmitter, BroadcastTransport, CopyBroadcastReceiver};
use std::fmt;

// Debug proxy implementations that call the standalone debug functions
impl fmt::Debug for BroadcastBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_broadcast_buffer(self, f)
    }
}

impl fmt::Debug for BroadcastReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_broadcast_receiver(self, f)
    }
}

impl fmt::Debug for BroadcastTransmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_broadcast_transmitter(self, f)
    }
}

impl<T: BroadcastTransport> fmt::Debug for CopyBroadcastReceiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_copy_receiver(self, f)
    }
}
