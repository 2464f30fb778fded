use crate::error::Poisoned;
use crate::loom::{Condvar, Mutex};
use std::fmt;

/// A counter that can only be read or written with its lock held.
///
/// Every mutation wakes threads parked in [`wait_until`], which re-check
/// their predicate before returning.
///
/// [`wait_until`]: GuardedCounter::wait_until
pub struct GuardedCounter {
    value: Mutex<i64>,
    changed: Condvar,
}

impl GuardedCounter {
    pub fn new(initial: i64) -> Self {
        Self {
            value: Mutex::new(initial),
            changed: Condvar::new(),
        }
    }

    /// Adds one and returns the new value.
    pub fn increment(&self) -> Result<i64, Poisoned> {
        self.add(1)
    }

    /// Adds `delta` and returns the new value.
    pub fn add(&self, delta: i64) -> Result<i64, Poisoned> {
        self.update(|value| {
            *value += delta;
            *value
        })
    }

    pub fn get(&self) -> Result<i64, Poisoned> {
        self.value.lock().map(|value| *value).map_err(|_| Poisoned)
    }

    /// Runs `f` on the value under the lock and returns its result.
    ///
    /// A panic inside `f` poisons the counter for good.
    pub fn update<R>(&self, f: impl FnOnce(&mut i64) -> R) -> Result<R, Poisoned> {
        let mut value = self.value.lock().map_err(|_| Poisoned)?;
        let ret = f(&mut *value);
        drop(value);

        self.changed.notify_all();
        Ok(ret)
    }

    /// Blocks until `pred` holds for the value, then returns that value.
    pub fn wait_until(&self, mut pred: impl FnMut(i64) -> bool) -> Result<i64, Poisoned> {
        let mut value = self.value.lock().map_err(|_| Poisoned)?;
        while !pred(*value) {
            value = self.changed.wait(value).map_err(|_| Poisoned)?;
        }
        Ok(*value)
    }
}

impl Default for GuardedCounter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for GuardedCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("GuardedCounter");
        match self.get() {
            Ok(value) => d.field("value", &value),
            Err(_) => d.field("value", &format_args!("<poisoned>")),
        };
        d.finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::GuardedCounter;
    use crate::error::Poisoned;
    use std::thread;

    #[test]
    fn concurrent_increments_are_not_lost() {
        let counter = GuardedCounter::default();

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..10_000 {
                        counter.increment().unwrap();
                    }
                });
            }
        });

        assert_eq!(counter.get(), Ok(80_000));
    }

    #[test]
    fn read_modify_write_under_one_lock() {
        let counter = GuardedCounter::new(0);

        thread::scope(|s| {
            for _ in 0..10 {
                s.spawn(|| {
                    counter
                        .update(|value| {
                            let seen = *value;
                            thread::yield_now();
                            *value = seen + 1;
                        })
                        .unwrap();
                });
            }
        });

        assert_eq!(counter.get(), Ok(10));
    }

    #[test]
    fn wait_until_sees_updates() {
        let counter = GuardedCounter::new(0);

        thread::scope(|s| {
            let waiter = s.spawn(|| counter.wait_until(|value| value >= 5));
            for _ in 0..5 {
                counter.increment().unwrap();
            }
            assert_eq!(waiter.join().unwrap(), Ok(5));
        });
    }

    #[test]
    fn panic_in_update_poisons() {
        let counter = GuardedCounter::new(3);

        let result = thread::scope(|s| {
            s.spawn(|| counter.update(|_| panic!("boom"))).join()
        });
        assert!(result.is_err());

        assert_eq!(counter.get(), Err(Poisoned));
        assert_eq!(counter.add(1), Err(Poisoned));
        assert_eq!(counter.wait_until(|_| true), Err(Poisoned));
    }
}
