//! Lock-free broadcast over a shared-memory ring.
//!
//! One transmitter writes variable-length records into a power-of-two ring
//! followed by a small trailer of counters; any number of receivers follow it
//! without ever blocking it. A receiver that falls a full lap behind is
//! overtaken and detects it through the `tail_intent` counter.
//!
//! [`Broadcast::CopyBroadcastReceiver`] is the convenient consumer API: it
//! skips the backlog on attach, copies each message into a private scratch
//! buffer, validates the copy and only then calls the handler. Overtake is
//! reported as [`Core::error::BroadcastError::Overrun`], never as silent
//! corruption.

// Module naming follows project convention
#[allow(non_snake_case)]
pub mod Broadcast;

#[allow(non_snake_case)]
pub mod Core;

#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}

pub use Broadcast::{
    BroadcastBuilder, BroadcastReceiver, BroadcastTransmitter, BroadcastTransport,
    CopyBroadcastReceiver, MessageHandler, SharedTransmitter,
};
pub use Core::error::{BroadcastError, Result};
