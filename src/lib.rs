//! A fixed-capacity blocking queue for multiple producer and consumer threads,
//! built from one mutex and two condition variables.

mod buffer;
pub mod channel;
pub mod config;
mod counter;
pub mod error;
mod loom;
mod monitor;
mod ring;
pub mod trace;

pub use buffer::{BoundedBuffer, Lifecycle, Stats};
pub use channel::{channel, CloseHandle, Consumer, Producer};
pub use config::{Builder, Config};
pub use counter::GuardedCounter;
pub use error::{ConfigError, Poisoned, PutError, PutErrorKind, TakeError};
