use core::time::Duration;

use crate::{ConfigError, Generator, GeneratorConfig, SequenceResolver, TimeSource};
#[cfg(feature = "std")]
use crate::{AtomicResolver, SystemClock};

/// Assembles a [`Generator`].
///
/// Defaults: [`DEFAULT_EPOCH`], node ID `0`, a fresh [`AtomicResolver`] and
/// the [`SystemClock`].
///
/// Invalid configuration is a programmer error: [`Self::build`] panics on
/// it. [`Self::try_build`] returns the [`ConfigError`] instead.
///
/// ```
/// use ferroflake::{ConfigError, Generator};
///
/// let err = Generator::builder().node_id(1024).try_build().unwrap_err();
/// assert_eq!(err, ConfigError::NodeIdOutOfRange { node_id: 1024 });
/// ```
///
/// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
/// [`AtomicResolver`]: crate::AtomicResolver
/// [`SystemClock`]: crate::SystemClock
#[derive(Debug, Clone)]
#[must_use]
pub struct GeneratorBuilder<R, T> {
    config: GeneratorConfig,
    resolver: R,
    time: T,
}

#[cfg(feature = "std")]
impl Generator<AtomicResolver, SystemClock> {
    /// Starts building a generator on the system clock.
    pub fn builder() -> GeneratorBuilder<AtomicResolver, SystemClock> {
        GeneratorBuilder::with_parts(AtomicResolver::new(), SystemClock)
    }
}

impl<R, T> GeneratorBuilder<R, T> {
    /// Starts from an explicit resolver and clock with the default
    /// configuration. The entry point on `no_std`.
    pub fn with_parts(resolver: R, time: T) -> Self {
        Self {
            config: GeneratorConfig::default(),
            resolver,
            time,
        }
    }

    /// Sets the epoch as a [`Duration`] since the Unix epoch.
    pub fn epoch(mut self, epoch: Duration) -> Self {
        self.config.epoch_millis = u64::try_from(epoch.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the epoch in milliseconds since the Unix epoch.
    pub fn epoch_millis(mut self, epoch_millis: u64) -> Self {
        self.config.epoch_millis = epoch_millis;
        self
    }

    /// Sets the node ID, `0..=1023`.
    pub fn node_id(mut self, node_id: u16) -> Self {
        self.config.node_id = node_id;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Swaps the sequence resolver.
    pub fn resolver<R2>(self, resolver: R2) -> GeneratorBuilder<R2, T> {
        GeneratorBuilder {
            config: self.config,
            resolver,
            time: self.time,
        }
    }

    /// Swaps the clock.
    pub fn clock<T2>(self, time: T2) -> GeneratorBuilder<R, T2> {
        GeneratorBuilder {
            config: self.config,
            resolver: self.resolver,
            time,
        }
    }
}

impl<R, T> GeneratorBuilder<R, T>
where
    R: SequenceResolver,
    T: TimeSource,
{
    /// Validates the configuration against the clock and builds the
    /// generator.
    ///
    /// # Errors
    ///
    /// See [`GeneratorConfig::validate`].
    pub fn try_build(self) -> Result<Generator<R, T>, ConfigError> {
        Generator::new(self.config, self.resolver, self.time)
    }

    /// Builds the generator.
    ///
    /// # Panics
    ///
    /// Panics if the epoch is zero, after the current time, or more than
    /// `2^41 - 1` ms in the past, or if the node ID exceeds 1023.
    pub fn build(self) -> Generator<R, T> {
        match self.try_build() {
            Ok(generator) => generator,
            Err(e) => panic!("invalid generator configuration: {e}"),
        }
    }
}
