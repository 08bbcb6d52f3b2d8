pub mod SharedMemory;
pub mod error;

pub use SharedMemory::{
    attach_shared_memory, create_shared_memory, unlink_shared_memory, HeapMemory, RawHandle,
    SharedMemoryBackend,
};
