// Layout conformance tests for ABI stability across processes.
// These tests assert sizes, alignments, and field offsets for
// RecordHeader and BroadcastTrailer. They also print the observed values
// to aid debugging when a mismatch occurs on a given platform.
use crossbeam_utils::CachePadded;
use dmxp_broadcast::Broadcast::Buffer::layout::{
    align, bytes_for_ring, BroadcastTrailer, HEADER_LENGTH, RECORD_ALIGNMENT, TRAILER_LENGTH,
};
use dmxp_broadcast::Broadcast::Structs::RecordHeader;
use memoffset::offset_of;
use std::mem::{align_of, size_of};
use std::sync::atomic::AtomicU64;

#[test]
fn test_record_header_layout() {
    let size = size_of::<RecordHeader>();
    let align = align_of::<RecordHeader>();
    let off_length = offset_of!(RecordHeader, length);
    let off_type_id = offset_of!(RecordHeader, type_id);

    println!(
        "RecordHeader => size: {size}, align: {align}, offsets: [length:{off_length}, type_id:{off_type_id}]"
    );

    assert_eq!(size, 8);
    assert_eq!(HEADER_LENGTH, size);
    assert_eq!(align, align_of::<i32>());
    assert_eq!(off_length, 0);
    assert_eq!(off_type_id, 4);
    // every record header lands on an aligned boundary
    assert_eq!(RECORD_ALIGNMENT % align, 0);
}

#[test]
fn test_trailer_layout() {
    let line = size_of::<CachePadded<AtomicU64>>();
    let off_tail_intent = offset_of!(BroadcastTrailer, tail_intent);
    let off_tail = offset_of!(BroadcastTrailer, tail);
    let off_latest = offset_of!(BroadcastTrailer, latest);

    println!(
        "BroadcastTrailer => size: {}, padded counter: {line}, offsets: [tail_intent:{off_tail_intent}, tail:{off_tail}, latest:{off_latest}]",
        TRAILER_LENGTH
    );

    assert_eq!(off_tail_intent, 0);
    assert_eq!(off_tail, line);
    assert_eq!(off_latest, 2 * line);
    assert_eq!(align_of::<BroadcastTrailer>(), 128);
    assert_eq!(TRAILER_LENGTH, align(3 * line, 128));
    assert_eq!(bytes_for_ring(1024), 1024 + TRAILER_LENGTH);
}
