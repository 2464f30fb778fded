use core::cmp;
use std::mem::MaybeUninit;
use std::slice::from_raw_parts_mut;

/// Fixed-capacity circular slot storage.
///
/// Live items occupy `[head, head + count)` modulo the capacity. The ring has
/// no synchronization of its own; it is only ever touched through `&mut` while
/// the owning buffer's lock is held.
pub(crate) struct Ring<T> {
    buf: Box<[MaybeUninit<T>]>,
    head: usize,
    count: usize,
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        unsafe {
            let (front, back) = self.as_mut_slices();
            std::ptr::drop_in_place(front);
            std::ptr::drop_in_place(back);
        }
    }
}

impl<T> Ring<T> {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        assert!(cap > 0, "ring capacity must be non-zero");

        let buf = (0..cap).map(|_| MaybeUninit::uninit()).collect();
        Self {
            buf,
            head: 0,
            count: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Writes `item` into the slot after the newest one.
    ///
    /// # Safety
    ///
    /// The ring must not be full.
    pub(crate) unsafe fn push_unchecked(&mut self, item: T) {
        debug_assert!(!self.is_full());
        let idx = self.index(self.head + self.count);
        self.buf.get_unchecked_mut(idx).write(item);
        self.count += 1;
    }

    /// Moves the oldest item out of the ring.
    ///
    /// # Safety
    ///
    /// The ring must not be empty.
    pub(crate) unsafe fn pop_unchecked(&mut self) -> T {
        debug_assert!(!self.is_empty());
        let item = self.buf.get_unchecked(self.head).assume_init_read();
        self.head = self.index(self.head + 1);
        self.count -= 1;
        item
    }

    fn index(&self, pos: usize) -> usize {
        pos % self.capacity()
    }

    unsafe fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let ptr: *mut T = self.buf.as_mut_ptr().cast();
        // the live region may wrap past the end of the array
        let front_len = cmp::min(self.count, self.capacity() - self.head);
        let back_len = self.count - front_len;
        let front = from_raw_parts_mut(ptr.add(self.head), front_len);
        let back = from_raw_parts_mut(ptr, back_len);
        (front, back)
    }
}
