// Backing regions for the broadcast ring
// /dev/shm + mmap when transmitter and receivers live in different processes,
// an aligned heap block when they share one

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::io;
use std::ptr::NonNull;

#[cfg(target_os = "linux")]
use std::fs::{File, OpenOptions};
#[cfg(target_os = "linux")]
use std::os::fd::AsRawFd;
#[cfg(target_os = "linux")]
use std::os::unix::fs::OpenOptionsExt;

/// Alignment of every region handed to the broadcast buffer.
pub const REGION_ALIGNMENT: usize = 128;

#[cfg(target_os = "linux")]
const DEFAULT_REGION_NAME: &str = "dmxp_broadcast";

/// A block of memory a [`crate::Broadcast::Buffer::BroadcastBuffer`] can
/// be laid over. The block stays mapped for as long as the value lives.
pub trait SharedMemoryBackend: Send + Sync + fmt::Debug {
    /// First byte of the region.
    fn as_ptr(&self) -> *mut u8;

    /// Length of the region in bytes.
    fn size(&self) -> usize;

    /// What the region is backed by.
    fn raw_handle(&self) -> RawHandle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawHandle {
    /// File descriptor of the /dev/shm object
    Fd(i32),
    /// Process-private heap allocation
    Heap,
}

fn shm_path(name: &str) -> String {
    format!("/dev/shm/{}", name.trim_start_matches('/'))
}

/// Create the named ring region, truncating any previous one to `size`
/// zeroed bytes.
///
/// `name` defaults to "dmxp_broadcast".
#[cfg(target_os = "linux")]
pub fn create_shared_memory(size: usize, name: Option<&str>) -> io::Result<Box<dyn SharedMemoryBackend>> {
    let region = ShmRegion::create(name.unwrap_or(DEFAULT_REGION_NAME), size)?;
    Ok(Box::new(region))
}

/// Map an existing ring region that holds at least `min_size` bytes.
#[cfg(target_os = "linux")]
pub fn attach_shared_memory(name: &str, min_size: usize) -> io::Result<Box<dyn SharedMemoryBackend>> {
    let region = ShmRegion::attach(name, min_size)?;
    Ok(Box::new(region))
}

/// Remove the named region from /dev/shm. Live mappings keep working.
#[cfg(target_os = "linux")]
pub fn unlink_shared_memory(name: &str) -> io::Result<()> {
    std::fs::remove_file(shm_path(name))
}

#[cfg(not(target_os = "linux"))]
fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "broadcast rings in shared memory need Linux /dev/shm",
    )
}

#[cfg(not(target_os = "linux"))]
pub fn create_shared_memory(_size: usize, _name: Option<&str>) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Err(unsupported())
}

#[cfg(not(target_os = "linux"))]
pub fn attach_shared_memory(_name: &str, _min_size: usize) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Err(unsupported())
}

#[cfg(not(target_os = "linux"))]
pub fn unlink_shared_memory(_name: &str) -> io::Result<()> {
    Err(unsupported())
}

/// A /dev/shm object mapped read-write and shared.
#[cfg(target_os = "linux")]
pub struct ShmRegion {
    base: NonNull<u8>,
    len: usize,
    // closes the descriptor after the mapping is gone
    file: File,
}

#[cfg(target_os = "linux")]
unsafe impl Send for ShmRegion {}
#[cfg(target_os = "linux")]
unsafe impl Sync for ShmRegion {}

#[cfg(target_os = "linux")]
impl ShmRegion {
    pub fn create(name: &str, size: usize) -> io::Result<Self> {
        let path = shm_path(name);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&path)
            .map_err(|e| io::Error::new(e.kind(), format!("cannot create ring region {}: {}", path, e)))?;

        // ftruncate on a fresh object gives zero-filled pages, i.e. an empty ring
        file.set_len(size as u64)?;

        let region = Self::map(file, size)?;
        log::info!("created broadcast region {} ({} bytes)", path, size);
        Ok(region)
    }

    pub fn attach(name: &str, min_size: usize) -> io::Result<Self> {
        let path = shm_path(name);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("no ring region {}: {}", path, e)))?;

        let len = file.metadata()?.len() as usize;
        if len < min_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("ring region {} holds {} bytes, need {}", path, len, min_size),
            ));
        }

        let region = Self::map(file, len)?;
        log::info!("attached broadcast region {} ({} bytes)", path, len);
        Ok(region)
    }

    fn map(file: File, len: usize) -> io::Result<Self> {
        let addr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        // page aligned, so REGION_ALIGNMENT holds
        NonNull::new(addr as *mut u8)
            .map(|base| Self { base, len, file })
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "mmap returned null"))
    }
}

#[cfg(target_os = "linux")]
impl Drop for ShmRegion {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base.as_ptr() as *mut libc::c_void, self.len);
        }
    }
}

#[cfg(target_os = "linux")]
impl fmt::Debug for ShmRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShmRegion")
            .field("base", &self.base)
            .field("len", &self.len)
            .field("fd", &self.file.as_raw_fd())
            .finish()
    }
}

#[cfg(target_os = "linux")]
impl SharedMemoryBackend for ShmRegion {
    fn as_ptr(&self) -> *mut u8 {
        self.base.as_ptr()
    }

    fn size(&self) -> usize {
        self.len
    }

    fn raw_handle(&self) -> RawHandle {
        RawHandle::Fd(self.file.as_raw_fd())
    }
}

/// Zeroed, `REGION_ALIGNMENT`-aligned heap block for rings that never
/// leave the process.
#[derive(Debug)]
pub struct HeapMemory {
    block: NonNull<u8>,
    layout: Layout,
}

unsafe impl Send for HeapMemory {}
unsafe impl Sync for HeapMemory {}

impl HeapMemory {
    pub fn new(size: usize) -> io::Result<Self> {
        if size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty heap region"));
        }
        let layout = Layout::from_size_align(size, REGION_ALIGNMENT)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        let block = unsafe { alloc_zeroed(layout) };
        NonNull::new(block)
            .map(|block| Self { block, layout })
            .ok_or_else(|| io::Error::new(io::ErrorKind::OutOfMemory, "heap region allocation failed"))
    }
}

impl Drop for HeapMemory {
    fn drop(&mut self) {
        unsafe { dealloc(self.block.as_ptr(), self.layout) }
    }
}

impl SharedMemoryBackend for HeapMemory {
    fn as_ptr(&self) -> *mut u8 {
        self.block.as_ptr()
    }

    fn size(&self) -> usize {
        self.layout.size()
    }

    fn raw_handle(&self) -> RawHandle {
        RawHandle::Heap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_memory_is_zeroed_and_aligned() {
        let mem = HeapMemory::new(4096).unwrap();
        assert_eq!(mem.size(), 4096);
        assert_eq!(mem.as_ptr() as usize % REGION_ALIGNMENT, 0);
        assert_eq!(mem.raw_handle(), RawHandle::Heap);
        let bytes = unsafe { std::slice::from_raw_parts(mem.as_ptr(), mem.size()) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn heap_memory_rejects_zero_size() {
        assert!(HeapMemory::new(0).is_err());
    }

    #[test]
    fn shm_path_strips_leading_slash() {
        assert_eq!(shm_path("/ring"), "/dev/shm/ring");
        assert_eq!(shm_path("ring"), "/dev/shm/ring");
    }
}
