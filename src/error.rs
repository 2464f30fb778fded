use std::fmt;

/// Rejected buffer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,
}

/// The lock guarding a buffer or counter was poisoned by a panicking holder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("lock poisoned by a panic while it was held")]
pub struct Poisoned;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PutErrorKind {
    #[error("put failed because buffer is full")]
    Full,
    #[error("put timed out waiting for free space")]
    Timeout,
    #[error("put failed because buffer is closed")]
    Closed,
    #[error("put failed because buffer lock is poisoned")]
    Poisoned,
}

impl PutErrorKind {
    pub fn is_full(&self) -> bool {
        matches!(self, PutErrorKind::Full)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PutErrorKind::Timeout)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, PutErrorKind::Closed)
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self, PutErrorKind::Poisoned)
    }
}

impl From<Poisoned> for PutErrorKind {
    fn from(_: Poisoned) -> Self {
        PutErrorKind::Poisoned
    }
}

/// A failed insert. The rejected item is handed back through [`into_inner`].
///
/// [`into_inner`]: PutError::into_inner
#[derive(Clone, PartialEq, Eq)]
pub struct PutError<T> {
    pub(crate) kind: PutErrorKind,
    pub(crate) val: T,
}

impl<T> PutError<T> {
    pub(crate) fn new(kind: PutErrorKind, val: T) -> Self {
        Self { kind, val }
    }

    pub fn kind(&self) -> PutErrorKind {
        self.kind
    }

    pub fn is_full(&self) -> bool {
        self.kind.is_full()
    }

    pub fn is_timeout(&self) -> bool {
        self.kind.is_timeout()
    }

    pub fn is_closed(&self) -> bool {
        self.kind.is_closed()
    }

    pub fn is_poisoned(&self) -> bool {
        self.kind.is_poisoned()
    }

    pub fn into_inner(self) -> T {
        self.val
    }
}

impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutError").field("kind", &self.kind).finish()
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl<T> std::error::Error for PutError<T> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TakeError {
    #[error("taking from an empty buffer")]
    Empty,
    #[error("take timed out waiting for an item")]
    Timeout,
    #[error("taking from a closed and drained buffer")]
    Closed,
    #[error("take failed because buffer lock is poisoned")]
    Poisoned,
}

impl TakeError {
    pub fn is_empty(&self) -> bool {
        matches!(self, TakeError::Empty)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TakeError::Timeout)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, TakeError::Closed)
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self, TakeError::Poisoned)
    }
}

impl From<Poisoned> for TakeError {
    fn from(_: Poisoned) -> Self {
        TakeError::Poisoned
    }
}
