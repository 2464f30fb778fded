//! Producer and consumer handles over a shared [`BoundedBuffer`].
//!
//! Both handle types are `Clone`, so any number of producer and consumer
//! threads can share one buffer. The buffer closes by itself once every
//! producer is gone (consumers drain what is left and then stop), or once every
//! consumer is gone (producers fail fast instead of blocking forever).

use crate::buffer::{BoundedBuffer, Stats};
use crate::config::Builder;
use crate::error::{ConfigError, PutError, TakeError};
use crate::loom::{Arc, AtomicUsize, Ordering};
use crate::trace::{debug, error};
#[cfg(not(loom))]
use std::time::Duration;

struct Shared<T> {
    buffer: BoundedBuffer<T>,
    producers: AtomicUsize,
    consumers: AtomicUsize,
}

/// Creates a buffer holding up to `capacity` items and returns a handle pair.
pub fn channel<T>(capacity: usize) -> Result<(Producer<T>, Consumer<T>), ConfigError> {
    Builder::new(capacity).channel()
}

pub(crate) fn from_buffer<T>(buffer: BoundedBuffer<T>) -> (Producer<T>, Consumer<T>) {
    let shared = Arc::new(Shared {
        buffer,
        producers: AtomicUsize::new(1),
        consumers: AtomicUsize::new(1),
    });
    (
        Producer {
            inner: shared.clone(),
        },
        Consumer { inner: shared },
    )
}

pub struct Producer<T> {
    inner: Arc<Shared<T>>,
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        self.inner.producers.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        // the last producer closes the buffer, otherwise consumers
        // blocked on an empty buffer would never wake up.
        if self.inner.producers.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!(buffer = %self.inner.buffer.name(), "last producer dropped");
            self.inner.buffer.close();
        }
    }
}

impl<T> Producer<T> {
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        self.inner.buffer.put(item)
    }

    pub fn try_put(&self, item: T) -> Result<(), PutError<T>> {
        self.inner.buffer.try_put(item)
    }

    #[cfg(not(loom))]
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
        self.inner.buffer.put_timeout(item, timeout)
    }

    pub fn close(&self) -> bool {
        self.inner.buffer.close()
    }

    pub fn close_handle(&self) -> CloseHandle<T> {
        CloseHandle {
            inner: self.inner.clone(),
        }
    }

    /// Returns whether this channel is closed.
    pub fn is_closed(&self) -> bool {
        self.inner.buffer.is_closed()
    }

    pub fn len(&self) -> usize {
        self.inner.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.buffer.capacity()
    }
}

pub struct Consumer<T> {
    inner: Arc<Shared<T>>,
}

impl<T> Clone for Consumer<T> {
    fn clone(&self) -> Self {
        self.inner.consumers.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Drop for Consumer<T> {
    fn drop(&mut self) {
        if self.inner.consumers.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!(buffer = %self.inner.buffer.name(), "last consumer dropped");
            self.inner.buffer.close();
        }
    }
}

/// Blocking iterator over a consumer, see [`Consumer::iter`].
pub struct Iter<'a, T> {
    consumer: &'a Consumer<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.consumer.next_item()
    }
}

/// Owning blocking iterator, see [`Consumer::iter`].
pub struct IntoIter<T> {
    consumer: Consumer<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.consumer.next_item()
    }
}

impl<T> IntoIterator for Consumer<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { consumer: self }
    }
}

impl<'a, T> IntoIterator for &'a Consumer<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> Consumer<T> {
    /// Blocks for each item and ends once the buffer is closed and drained.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { consumer: self }
    }

    fn next_item(&self) -> Option<T> {
        match self.take() {
            Ok(item) => Some(item),
            Err(TakeError::Poisoned) => {
                error!(buffer = %self.inner.buffer.name(), "consumer stopped on poisoned buffer");
                None
            }
            Err(_) => None,
        }
    }

    pub fn take(&self) -> Result<T, TakeError> {
        self.inner.buffer.take()
    }

    pub fn try_take(&self) -> Result<T, TakeError> {
        self.inner.buffer.try_take()
    }

    #[cfg(not(loom))]
    pub fn take_timeout(&self, timeout: Duration) -> Result<T, TakeError> {
        self.inner.buffer.take_timeout(timeout)
    }

    pub fn close(&self) -> bool {
        self.inner.buffer.close()
    }

    pub fn close_handle(&self) -> CloseHandle<T> {
        CloseHandle {
            inner: self.inner.clone(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.buffer.is_closed()
    }

    pub fn len(&self) -> usize {
        self.inner.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.buffer.capacity()
    }

    pub fn stats(&self) -> Stats {
        self.inner.buffer.stats()
    }
}

/// Closes the channel from outside the producer/consumer set.
///
/// Meant for shutdown triggers such as a signal-watching thread. Holding one
/// does not count as a producer or consumer, so it never delays the automatic
/// close when the last of those drops.
pub struct CloseHandle<T> {
    inner: Arc<Shared<T>>,
}

impl<T> Clone for CloseHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> CloseHandle<T> {
    pub fn close(&self) -> bool {
        self.inner.buffer.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.buffer.is_closed()
    }
}
