// Allocation tracking tests for the broadcast hot path
//
// Note: dhat only allows one profiler per process at a time, so the tests
// here are marked #[serial_test::serial].
//
// # Run all allocation tracking tests
// cargo test --test allocation_tracking -- --nocapture

use dmxp_broadcast::Broadcast::{BroadcastBuilder, CopyBroadcastReceiver, MessageHandler};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

struct Checksum {
    messages: u64,
    sum: u64,
}

impl MessageHandler for Checksum {
    fn on_message(&mut self, type_id: i32, buffer: &[u8], offset: usize, length: usize) {
        self.messages += 1;
        self.sum += type_id as u64;
        for b in &buffer[offset..offset + length] {
            self.sum += *b as u64;
        }
    }
}

#[test]
#[serial_test::serial]
fn test_transmit_and_receive_do_not_allocate() {
    let _profiler = dhat::Profiler::builder().testing().build();

    // every allocation happens up front: ring, scratch buffer, payload
    let (mut tx, raw) = BroadcastBuilder::new()
        .with_capacity(16 * 1024)
        .build_local()
        .unwrap();
    let mut rx = CopyBroadcastReceiver::new(raw);
    let mut handler = Checksum { messages: 0, sum: 0 };
    let payload = [7u8; 100];

    let before = dhat::HeapStats::get();

    // enough traffic to wrap the ring many times over
    for i in 0..10_000 {
        tx.transmit(1 + (i % 4), &payload).unwrap();
        assert_eq!(rx.receive(&mut handler).unwrap(), 1);
    }

    let after = dhat::HeapStats::get();
    println!(
        "Heap blocks before/after: {}/{}, bytes: {}/{}",
        before.total_blocks, after.total_blocks, before.total_bytes, after.total_bytes
    );

    dhat::assert_eq!(after.total_blocks, before.total_blocks);
    dhat::assert_eq!(after.total_bytes, before.total_bytes);
    assert_eq!(handler.messages, 10_000);
}
