// Record header written in front of every payload in the broadcast ring

// no atomics in RecordHeader; keep as plain integral types for ABI

/// Header that precedes each payload in the data ring.
/// ABI-stable across languages; all fields are native-endian `i32`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordHeader {
    /// Length of the whole record in bytes, header included (before alignment).
    pub length: i32,
    /// Message type id; `PADDING_MSG_TYPE_ID` for padding records.
    pub type_id: i32,
}
