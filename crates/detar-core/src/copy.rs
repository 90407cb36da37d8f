//! Pooled copy buffers for streaming file content.
//!
//! Extracting many large files back to back would otherwise allocate a
//! fresh buffer per file. Buffers are checked out of a [`CopyBufferPool`]
//! for one extraction and go back to it when dropped. A buffer is only ever
//! used by one thread at a time; the pool just lets it be reused later.

use std::io;
use std::io::Read;
use std::io::Write;
use std::mem;
use std::ops::Deref;
use std::ops::DerefMut;
use std::sync::Mutex;
use std::sync::PoisonError;

/// Size of a copy buffer (512 KiB).
pub const COPY_BUFFER_SIZE: usize = 512 * 1024;

/// Upper bound on idle buffers kept by a pool.
const MAX_IDLE_BUFFERS: usize = 4;

/// Heap-allocated buffer for copying entry content.
///
/// # Examples
///
/// ```
/// use detar_core::copy::{CopyBuffer, copy_with_buffer};
/// use std::io::Cursor;
///
/// let mut buffer = CopyBuffer::new();
/// let mut output = Vec::new();
/// let copied = copy_with_buffer(&mut Cursor::new(b"hello"), &mut output, &mut buffer)?;
/// assert_eq!(copied, 5);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Allocates a new zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Zero-length placeholder, left behind when a pooled buffer goes home.
    fn empty() -> Self {
        Self { buf: Box::default() }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool of reusable copy buffers.
#[derive(Debug)]
pub struct CopyBufferPool {
    idle: Mutex<Vec<CopyBuffer>>,
}

static GLOBAL_POOL: CopyBufferPool = CopyBufferPool::new();

impl CopyBufferPool {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Returns the process-wide pool.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_POOL
    }

    /// Checks out a buffer, allocating one if the pool is empty.
    pub fn get(&self) -> PooledBuffer<'_> {
        let buffer = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_else(CopyBuffer::new);
        PooledBuffer { pool: self, buffer }
    }

    /// Number of buffers currently waiting for reuse.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn put(&self, buffer: CopyBuffer) {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE_BUFFERS {
            idle.push(buffer);
        }
    }
}

impl Default for CopyBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A buffer checked out of a [`CopyBufferPool`], returned on drop.
#[derive(Debug)]
pub struct PooledBuffer<'p> {
    pool: &'p CopyBufferPool,
    buffer: CopyBuffer,
}

impl Deref for PooledBuffer<'_> {
    type Target = CopyBuffer;

    fn deref(&self) -> &CopyBuffer {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut CopyBuffer {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let buffer = mem::replace(&mut self.buffer, CopyBuffer::empty());
        self.pool.put(buffer);
    }
}

/// Copies everything from `reader` to `writer` through `buffer`.
///
/// Interrupted reads are retried. Returns the number of bytes copied.
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> io::Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;
        total += bytes_read as u64;
    }

    Ok(total)
}
