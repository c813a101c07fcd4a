//! Pooled output buffers
//!
//! A process-wide pool of growable byte buffers used to accumulate
//! encoded messages before transmission and to hold reply payloads
//! during decoding. A checked-out buffer is exclusively owned by its
//! holder and returns to the pool exactly once, when dropped, on every
//! exit path including errors.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use parking_lot::Mutex;

struct PoolInner {
    /// Idle buffers available for checkout
    idle: Mutex<Vec<BytesMut>>,

    /// Initial capacity of freshly allocated buffers
    buffer_capacity: usize,

    /// Max idle buffers retained; excess returns are dropped
    max_pooled: usize,

    /// Buffers currently checked out
    in_flight: AtomicUsize,

    /// Total checkouts since creation
    checkouts: AtomicUsize,
}

/// Shared pool of reusable byte buffers
///
/// Cloning the pool clones a handle to the same underlying free-list;
/// all clones share checkout accounting.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

impl BufferPool {
    /// Create a pool handing out buffers of the given initial capacity
    pub fn new(buffer_capacity: usize, max_pooled: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(Vec::new()),
                buffer_capacity,
                max_pooled,
                in_flight: AtomicUsize::new(0),
                checkouts: AtomicUsize::new(0),
            }),
        }
    }

    /// Check out a buffer, allocating if the pool is empty
    pub fn checkout(&self) -> PooledBuffer {
        let buffer = self
            .inner
            .idle
            .lock()
            .pop()
            .unwrap_or_else(|| BytesMut::with_capacity(self.inner.buffer_capacity));

        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        self.inner.checkouts.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(in_flight = self.in_flight(), "Buffer checked out");

        PooledBuffer {
            buffer,
            pool: self.clone(),
        }
    }

    /// Number of buffers currently checked out
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Total checkouts since the pool was created
    pub fn checkouts(&self) -> usize {
        self.inner.checkouts.load(Ordering::SeqCst)
    }

    /// Return a buffer to the pool
    fn release(&self, mut buffer: BytesMut) {
        buffer.clear();
        {
            let mut idle = self.inner.idle.lock();
            if idle.len() < self.inner.max_pooled {
                idle.push(buffer);
            }
        }
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(in_flight = self.in_flight(), "Buffer released");
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("buffer_capacity", &self.inner.buffer_capacity)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// A buffer checked out of a [`BufferPool`]
///
/// Dereferences to [`BytesMut`] for writing. Dropping the value returns
/// the underlying buffer to the pool; there is no other release path, so
/// release happens exactly once regardless of how the owning scope exits.
pub struct PooledBuffer {
    buffer: BytesMut,
    pool: BufferPool,
}

impl PooledBuffer {
    /// The accumulated bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }
}

impl std::ops::Deref for PooledBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buffer
    }
}

impl std::ops::DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        self.pool.release(buffer);
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.buffer.len())
            .finish()
    }
}
