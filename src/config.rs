//! Buffer construction settings.

use crate::buffer::BoundedBuffer;
use crate::channel::{self, Consumer, Producer};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of items held at once. Must be at least 1.
    pub capacity: usize,
    /// Label attached to log events. Defaults to `bounded-buffer`.
    pub name: Option<String>,
}

impl Config {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Builds either a bare [`BoundedBuffer`] or a producer/consumer handle pair.
///
/// ```
/// use bounded_buffer::Builder;
///
/// let (producer, consumer) = Builder::new(8).name("jobs").channel::<u32>().unwrap();
/// producer.put(1).unwrap();
/// drop(producer);
/// assert_eq!(consumer.iter().collect::<Vec<_>>(), vec![1]);
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn new(capacity: usize) -> Self {
        Self {
            config: Config::new(capacity),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_name(name);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn build<T>(self) -> Result<BoundedBuffer<T>, ConfigError> {
        BoundedBuffer::with_config(self.config)
    }

    pub fn channel<T>(self) -> Result<(Producer<T>, Consumer<T>), ConfigError> {
        self.build().map(channel::from_buffer)
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_fails_validation() {
        assert_eq!(Config::new(0).validate(), Err(ConfigError::ZeroCapacity));
        assert_eq!(Config::new(1).validate(), Ok(()));
        assert!(Builder::new(0).build::<()>().is_err());
        assert!(Builder::new(0).channel::<()>().is_err());
    }

    #[test]
    fn builder_carries_name() {
        let builder = Builder::new(4).name("frames");
        assert_eq!(builder.config().name.as_deref(), Some("frames"));

        let buffer = builder.build::<u8>().unwrap();
        assert_eq!(buffer.name(), "frames");
        assert_eq!(buffer.capacity(), 4);
    }

    #[test]
    fn default_name() {
        let buffer = Builder::new(1).build::<u8>().unwrap();
        assert_eq!(buffer.name(), "bounded-buffer");
    }
}
