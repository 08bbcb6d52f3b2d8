//! Error types for the broadcast ring and its receivers.

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BroadcastError>;

#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// The transmitter overwrote a record before this receiver finished with it.
    /// The receiver's position is no longer trustworthy; attach a fresh one.
    #[error("Unable to keep up with broadcast buffer")]
    Overrun,

    /// A message is larger than the receiver's fixed scratch buffer.
    #[error("Buffer required size {required} but only has {capacity}")]
    ScratchCapacity { required: usize, capacity: usize },

    /// Ring or scratch capacity rejected at construction.
    #[error("Invalid capacity {capacity}: {reason}")]
    InvalidCapacity { capacity: usize, reason: &'static str },

    /// Backing memory cannot hold the ring plus its trailer.
    #[error("Region too small: required {required} bytes, got {actual}")]
    RegionTooSmall { required: usize, actual: usize },

    /// Backing memory does not start on the ring's required boundary.
    #[error("Region at 0x{address:x} is not aligned to {alignment} bytes")]
    MisalignedRegion { address: usize, alignment: usize },

    /// Message type ids must be positive; -1 is reserved for padding records.
    #[error("Message type id must be greater than zero: {0}")]
    InvalidTypeId(i32),

    #[error("Message too long ({length} > {max})")]
    MessageTooLong { length: usize, max: usize },

    /// Shared memory creation, attachment or mapping failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BroadcastError {
    /// True when the receiver was lapped and must be rebuilt.
    pub fn is_overrun(&self) -> bool {
        matches!(self, BroadcastError::Overrun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_receiver_wording() {
        assert_eq!(
            BroadcastError::Overrun.to_string(),
            "Unable to keep up with broadcast buffer"
        );
        let err = BroadcastError::ScratchCapacity {
            required: 4097,
            capacity: 4096,
        };
        assert_eq!(err.to_string(), "Buffer required size 4097 but only has 4096");
        assert!(!err.is_overrun());
        assert!(BroadcastError::Overrun.is_overrun());
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BroadcastError = io.into();
        assert!(matches!(err, BroadcastError::Io(_)));
    }
}
