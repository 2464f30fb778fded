use crate::error::Poisoned;
use crate::loom::{Condvar, Mutex, MutexGuard};
#[cfg(not(loom))]
use std::time::Instant;

/// A lock paired with the two conditions a bounded queue waits on.
///
/// Every read or write of `S` goes through the guard returned by
/// [`acquire`], so the lock is released on every exit path, including
/// unwinding. Waiters pass the predicate that keeps them blocked; it is
/// re-evaluated under the lock after every wakeup, which absorbs spurious
/// wakeups and broadcasts meant for somebody else.
///
/// [`acquire`]: Monitor::acquire
pub(crate) struct Monitor<S> {
    state: Mutex<S>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<S> Monitor<S> {
    pub(crate) fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    pub(crate) fn acquire(&self) -> Result<MutexGuard<'_, S>, Poisoned> {
        self.state.lock().map_err(|_| Poisoned)
    }

    /// Acquires the lock even if it is poisoned. The flag reports whether it was.
    ///
    /// Only for diagnostics and shutdown, which must work on a broken buffer.
    pub(crate) fn acquire_poisoned(&self) -> (MutexGuard<'_, S>, bool) {
        match self.state.lock() {
            Ok(guard) => (guard, false),
            Err(poisoned) => (poisoned.into_inner(), true),
        }
    }

    pub(crate) fn wait_not_full<'a>(
        &self,
        guard: MutexGuard<'a, S>,
        blocked: impl FnMut(&S) -> bool,
    ) -> Result<MutexGuard<'a, S>, Poisoned> {
        wait_while(&self.not_full, guard, blocked)
    }

    pub(crate) fn wait_not_empty<'a>(
        &self,
        guard: MutexGuard<'a, S>,
        blocked: impl FnMut(&S) -> bool,
    ) -> Result<MutexGuard<'a, S>, Poisoned> {
        wait_while(&self.not_empty, guard, blocked)
    }

    /// Like [`wait_not_full`](Monitor::wait_not_full), but gives up at
    /// `deadline`. The caller re-checks the predicate on the returned guard.
    #[cfg(not(loom))]
    pub(crate) fn wait_not_full_until<'a>(
        &self,
        guard: MutexGuard<'a, S>,
        deadline: Instant,
        blocked: impl FnMut(&S) -> bool,
    ) -> Result<MutexGuard<'a, S>, Poisoned> {
        wait_while_until(&self.not_full, guard, deadline, blocked)
    }

    #[cfg(not(loom))]
    pub(crate) fn wait_not_empty_until<'a>(
        &self,
        guard: MutexGuard<'a, S>,
        deadline: Instant,
        blocked: impl FnMut(&S) -> bool,
    ) -> Result<MutexGuard<'a, S>, Poisoned> {
        wait_while_until(&self.not_empty, guard, deadline, blocked)
    }

    pub(crate) fn signal_not_full(&self) {
        self.not_full.notify_one();
    }

    pub(crate) fn signal_not_empty(&self) {
        self.not_empty.notify_one();
    }

    /// Wakes every waiter on both conditions.
    pub(crate) fn broadcast(&self) {
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}

fn wait_while<'a, S>(
    cond: &Condvar,
    mut guard: MutexGuard<'a, S>,
    mut blocked: impl FnMut(&S) -> bool,
) -> Result<MutexGuard<'a, S>, Poisoned> {
    while blocked(&*guard) {
        guard = cond.wait(guard).map_err(|_| Poisoned)?;
    }
    Ok(guard)
}

#[cfg(not(loom))]
fn wait_while_until<'a, S>(
    cond: &Condvar,
    mut guard: MutexGuard<'a, S>,
    deadline: Instant,
    mut blocked: impl FnMut(&S) -> bool,
) -> Result<MutexGuard<'a, S>, Poisoned> {
    while blocked(&*guard) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let (next, _) = cond
            .wait_timeout(guard, deadline - now)
            .map_err(|_| Poisoned)?;
        guard = next;
    }
    Ok(guard)
}
