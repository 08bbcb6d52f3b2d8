mod builder;
mod copy_receiver;
mod debug;
mod receiver;
mod transmitter;
pub mod transport;

pub use builder::BroadcastBuilder;
pub use copy_receiver::{CopyBroadcastReceiver, MessageHandler, SCRATCH_BUFFER_SIZE};
pub use receiver::BroadcastReceiver;
pub use transmitter::{BroadcastTransmitter, SharedTransmitter};
pub use transport::BroadcastTransport;

pub mod Buffer {
    pub mod Buffer;
    pub mod Buffer_impl;
    pub mod layout;
    pub use Buffer::BroadcastBuffer; // re-export for stable path
}

pub mod Structs {
    pub mod Buffer_Structs;
    pub use Buffer_Structs::RecordHeader; // re-export for stable path
}
