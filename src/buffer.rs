use crate::config::Config;
use crate::error::{ConfigError, Poisoned, PutError, PutErrorKind, TakeError};
use crate::loom::MutexGuard;
use crate::monitor::Monitor;
use crate::ring::Ring;
use crate::trace::{debug, error, trace, warn};
use std::fmt;
#[cfg(not(loom))]
use std::time::{Duration, Instant};

/// Where a buffer is in its shutdown sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Accepting puts and takes.
    Open,
    /// Closed, but items remain to be taken.
    Closing,
    /// Closed and empty. Terminal.
    Drained,
}

/// Counters maintained under the buffer lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Successful inserts.
    pub puts: u64,
    /// Successful removals.
    pub takes: u64,
    /// Inserts refused because the buffer was closed.
    pub rejected_puts: u64,
    /// Largest number of items ever held at once.
    pub high_water: usize,
}

struct Inner<T> {
    ring: Ring<T>,
    closed: bool,
    stats: Stats,
}

impl<T> Inner<T> {
    fn put_blocked(&self) -> bool {
        self.ring.is_full() && !self.closed
    }

    fn take_blocked(&self) -> bool {
        self.ring.is_empty() && !self.closed
    }
}

/// A fixed-capacity FIFO shared by any number of producer and consumer threads.
///
/// `put` blocks while the buffer is full and `take` blocks while it is empty.
/// [`close`] wakes every blocked thread: pending and future puts fail with
/// `Closed`, while takes keep succeeding until the remaining items are drained.
///
/// ```
/// use bounded_buffer::BoundedBuffer;
///
/// let buffer = BoundedBuffer::new(3).unwrap();
/// buffer.put(1).unwrap();
/// buffer.put(2).unwrap();
/// buffer.close();
///
/// assert_eq!(buffer.take(), Ok(1));
/// assert_eq!(buffer.take(), Ok(2));
/// assert!(buffer.take().unwrap_err().is_closed());
/// assert!(buffer.put(3).unwrap_err().is_closed());
/// ```
///
/// [`close`]: BoundedBuffer::close
pub struct BoundedBuffer<T> {
    monitor: Monitor<Inner<T>>,
    capacity: usize,
    name: String,
}

impl<T> BoundedBuffer<T> {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(Config::new(capacity))
    }

    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let name = config.name.unwrap_or_else(|| "bounded-buffer".to_string());
        debug!(buffer = %name, capacity = config.capacity, "buffer created");

        Ok(Self {
            monitor: Monitor::new(Inner {
                ring: Ring::with_capacity(config.capacity),
                closed: false,
                stats: Stats::default(),
            }),
            capacity: config.capacity,
            name,
        })
    }

    /// Inserts `item`, blocking while the buffer is full.
    ///
    /// Fails with `Closed` if the buffer is closed before space frees up; the
    /// item is returned inside the error.
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        let waited = self.monitor.acquire().and_then(|guard| {
            if guard.put_blocked() {
                trace!(buffer = %self.name, "put blocked, buffer full");
            }
            self.monitor.wait_not_full(guard, Inner::put_blocked)
        });

        match waited {
            Ok(guard) => self.insert(guard, item, PutErrorKind::Full),
            Err(poisoned) => Err(self.put_poisoned(poisoned, item)),
        }
    }

    /// Inserts `item` only if there is room right now.
    pub fn try_put(&self, item: T) -> Result<(), PutError<T>> {
        match self.monitor.acquire() {
            Ok(guard) => self.insert(guard, item, PutErrorKind::Full),
            Err(poisoned) => Err(self.put_poisoned(poisoned, item)),
        }
    }

    /// Like [`put`](BoundedBuffer::put), but waits at most `timeout` for space.
    #[cfg(not(loom))]
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return self.put(item),
        };

        let waited = self
            .monitor
            .acquire()
            .and_then(|guard| self.monitor.wait_not_full_until(guard, deadline, Inner::put_blocked));

        match waited {
            Ok(guard) => self.insert(guard, item, PutErrorKind::Timeout),
            Err(poisoned) => Err(self.put_poisoned(poisoned, item)),
        }
    }

    /// Removes the oldest item, blocking while the buffer is empty.
    ///
    /// `Closed` means the buffer was closed and every item has been taken. It
    /// is the end-of-stream signal, not a fault.
    pub fn take(&self) -> Result<T, TakeError> {
        let guard = self.monitor.acquire().and_then(|guard| {
            if guard.take_blocked() {
                trace!(buffer = %self.name, "take blocked, buffer empty");
            }
            self.monitor.wait_not_empty(guard, Inner::take_blocked)
        });

        match guard {
            Ok(guard) => self.remove(guard, TakeError::Empty),
            Err(poisoned) => Err(self.take_poisoned(poisoned)),
        }
    }

    /// Removes the oldest item if there is one right now.
    pub fn try_take(&self) -> Result<T, TakeError> {
        match self.monitor.acquire() {
            Ok(guard) => self.remove(guard, TakeError::Empty),
            Err(poisoned) => Err(self.take_poisoned(poisoned)),
        }
    }

    /// Like [`take`](BoundedBuffer::take), but waits at most `timeout` for an item.
    #[cfg(not(loom))]
    pub fn take_timeout(&self, timeout: Duration) -> Result<T, TakeError> {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return self.take(),
        };

        let guard = self
            .monitor
            .acquire()
            .and_then(|guard| self.monitor.wait_not_empty_until(guard, deadline, Inner::take_blocked));

        match guard {
            Ok(guard) => self.remove(guard, TakeError::Timeout),
            Err(poisoned) => Err(self.take_poisoned(poisoned)),
        }
    }

    /// Closes the buffer and wakes every blocked producer and consumer.
    ///
    /// Returns `true` if this call closed the buffer and `false` if it was
    /// already closed. Works on a poisoned buffer too, so shutdown always
    /// reaches the waiters.
    pub fn close(&self) -> bool {
        let (mut guard, poisoned) = self.monitor.acquire_poisoned();
        if poisoned {
            warn!(buffer = %self.name, "closing a poisoned buffer");
        }

        if guard.closed {
            return false;
        }
        guard.closed = true;
        debug!(buffer = %self.name, remaining = guard.ring.len(), "buffer closed");
        drop(guard);

        self.monitor.broadcast();
        true
    }

    /// Number of items held at the moment of the call.
    pub fn len(&self) -> usize {
        self.snapshot(|inner| inner.ring.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.snapshot(|inner| inner.closed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> Lifecycle {
        self.snapshot(|inner| match (inner.closed, inner.ring.is_empty()) {
            (false, _) => Lifecycle::Open,
            (true, false) => Lifecycle::Closing,
            (true, true) => Lifecycle::Drained,
        })
    }

    pub fn stats(&self) -> Stats {
        self.snapshot(|inner| inner.stats)
    }

    fn snapshot<R>(&self, f: impl FnOnce(&Inner<T>) -> R) -> R {
        let (guard, _) = self.monitor.acquire_poisoned();
        f(&*guard)
    }

    fn insert(
        &self,
        mut guard: MutexGuard<'_, Inner<T>>,
        item: T,
        when_full: PutErrorKind,
    ) -> Result<(), PutError<T>> {
        let inner = &mut *guard;
        if inner.closed {
            inner.stats.rejected_puts += 1;
            return Err(PutError::new(PutErrorKind::Closed, item));
        }
        if inner.ring.is_full() {
            return Err(PutError::new(when_full, item));
        }

        // Safety: the ring was checked for room above, under the same guard.
        unsafe {
            inner.ring.push_unchecked(item);
        }
        inner.stats.puts += 1;
        inner.stats.high_water = inner.stats.high_water.max(inner.ring.len());
        drop(guard);

        self.monitor.signal_not_empty();
        Ok(())
    }

    fn remove(
        &self,
        mut guard: MutexGuard<'_, Inner<T>>,
        when_empty: TakeError,
    ) -> Result<T, TakeError> {
        let inner = &mut *guard;
        if inner.ring.is_empty() {
            return Err(if inner.closed {
                TakeError::Closed
            } else {
                when_empty
            });
        }

        // Safety: the ring was checked for an item above, under the same guard.
        let item = unsafe { inner.ring.pop_unchecked() };
        inner.stats.takes += 1;
        drop(guard);

        self.monitor.signal_not_full();
        Ok(item)
    }

    fn put_poisoned(&self, _: Poisoned, item: T) -> PutError<T> {
        error!(buffer = %self.name, "put on a poisoned buffer");
        PutError::new(PutErrorKind::Poisoned, item)
    }

    fn take_poisoned(&self, _: Poisoned) -> TakeError {
        error!(buffer = %self.name, "take on a poisoned buffer");
        TakeError::Poisoned
    }
}

impl<T> fmt::Debug for BoundedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedBuffer")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("state", &self.state())
            .finish()
    }
}
