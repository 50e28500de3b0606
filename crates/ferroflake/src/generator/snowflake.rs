use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ConfigError, Error, GeneratorConfig, MAX_SEQUENCE, MAX_TIMESTAMP, ParsedId, Result,
    SequenceResolver, TimeSource, compose,
};

/// Number of clock polls between `yield_now` calls while waiting for the next
/// millisecond.
#[cfg(feature = "std")]
const YIELD_EVERY: u32 = 64;

/// A Snowflake ID generator.
///
/// Owns an immutable [`GeneratorConfig`], a [`SequenceResolver`] (the
/// lock-free [`AtomicResolver`] by default) and a [`TimeSource`]. It is
/// `Send + Sync` whenever its resolver and clock are, so one instance can be
/// shared across threads behind an `Arc` or a `static`.
///
/// Several generators with different node IDs can coexist in one process;
/// each owns its own resolver state.
///
/// ## Example
///
/// ```
/// use ferroflake::{Generator, parse_id};
/// use std::time::Duration;
///
/// let generator = Generator::builder()
///     .epoch(Duration::from_millis(1_420_070_400_000))
///     .node_id(7)
///     .build();
///
/// let a = generator.try_next_id().unwrap();
/// let b = generator.try_next_id().unwrap();
/// assert!(b > a);
/// assert_eq!(parse_id(a).node_id, 7);
/// ```
///
/// [`AtomicResolver`]: crate::AtomicResolver
#[derive(Debug)]
pub struct Generator<R, T> {
    config: GeneratorConfig,
    epoch_millis: i64,
    resolver: R,
    time: T,
}

impl<R, T> Generator<R, T>
where
    R: SequenceResolver,
    T: TimeSource,
{
    /// Creates a generator after validating `config` against `time`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the epoch or node ID is invalid, see
    /// [`GeneratorConfig::validate`].
    pub fn new(config: GeneratorConfig, resolver: R, time: T) -> Result<Self, ConfigError> {
        config.validate(time.current_millis())?;
        Ok(Self {
            epoch_millis: config.epoch_millis_i64(),
            config,
            resolver,
            time,
        })
    }

    /// Generates the next ID, returning `0` on error.
    ///
    /// This discards the error of [`Self::try_next_id`]. Use the fallible form
    /// wherever a misconfigured epoch must be noticed.
    pub fn next_id(&self) -> u64 {
        self.try_next_id().unwrap_or_default()
    }

    /// Generates the next ID.
    ///
    /// If the current millisecond is used up, or the clock is behind the last
    /// millisecond the resolver has seen, this spins until the clock moves
    /// forward. The wait holds no lock.
    ///
    /// # Errors
    ///
    /// - [`Error::EpochExceeded`] if the offset from the epoch is negative or
    ///   does not fit in 41 bits
    /// - any error returned by the resolver
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(node_id = self.config.node_id)))]
    pub fn try_next_id(&self) -> Result<u64> {
        generate(
            &self.resolver,
            &self.time,
            self.epoch_millis,
            self.config.node_id,
        )
    }
}

impl<R, T> Generator<R, T> {
    /// Maps a decoded ID back to its issue time, as a [`Duration`] since the
    /// Unix epoch, using this generator's epoch.
    pub const fn generate_time(&self, parsed: &ParsedId) -> Duration {
        parsed.generate_time(self.config.epoch())
    }

    /// Like [`Self::generate_time`], as a [`SystemTime`].
    ///
    /// [`SystemTime`]: std::time::SystemTime
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    #[cfg(all(feature = "std", not(all(target_arch = "wasm32", target_os = "unknown"))))]
    pub fn generate_system_time(&self, parsed: &ParsedId) -> std::time::SystemTime {
        std::time::UNIX_EPOCH + self.generate_time(parsed)
    }

    /// The validated configuration.
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The node ID embedded in every ID.
    pub const fn node_id(&self) -> u16 {
        self.config.node_id
    }

    /// The epoch as a [`Duration`] since the Unix epoch.
    pub const fn epoch(&self) -> Duration {
        self.config.epoch()
    }

    /// The sequence resolver, e.g. to inspect [`AtomicResolver::state`].
    ///
    /// [`AtomicResolver::state`]: crate::AtomicResolver::state
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }
}

/// Samples the clock, resolves a sequence and packs the ID.
pub(crate) fn generate<R, T>(resolver: &R, time: &T, epoch_millis: i64, node_id: u16) -> Result<u64>
where
    R: SequenceResolver + ?Sized,
    T: TimeSource + ?Sized,
{
    let mut now = time.current_millis();
    let mut sequence = resolve_at(resolver, now, epoch_millis)?;

    while sequence >= MAX_SEQUENCE {
        #[cfg(feature = "tracing")]
        tracing::debug!(millis = now, "sequence exhausted, waiting for next millisecond");
        now = wait_for_next_millis(time, now);
        sequence = resolve_at(resolver, now, epoch_millis)?;
    }

    let offset = now.saturating_sub(epoch_millis);
    if !(0..=MAX_TIMESTAMP as i64).contains(&offset) {
        return Err(cold_epoch_exceeded(offset));
    }

    Ok(compose(offset as u64, node_id, sequence))
}

/// Resolves the sequence for `now`. A reading the resolver cannot track that
/// also lies before the epoch (a clock set before 1970) is reported as
/// [`Error::EpochExceeded`].
fn resolve_at<R>(resolver: &R, now: i64, epoch_millis: i64) -> Result<u16>
where
    R: SequenceResolver + ?Sized,
{
    match resolver.resolve(now) {
        Err(Error::ClockOutOfRange { .. }) if now < epoch_millis => {
            Err(cold_epoch_exceeded(now.saturating_sub(epoch_millis)))
        }
        result => result,
    }
}

/// Busy-polls `time` until it reads strictly later than `last`.
fn wait_for_next_millis<T>(time: &T, last: i64) -> i64
where
    T: TimeSource + ?Sized,
{
    #[cfg(feature = "std")]
    let mut polls: u32 = 0;
    loop {
        let now = time.current_millis();
        if now > last {
            return now;
        }

        #[cfg(feature = "std")]
        {
            polls = polls.wrapping_add(1);
            if polls % YIELD_EVERY == 0 {
                std::thread::yield_now();
                continue;
            }
        }
        core::hint::spin_loop();
    }
}

#[cold]
#[inline(never)]
fn cold_epoch_exceeded(offset: i64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::error!(offset, "timestamp offset outside the 41-bit range");
    Error::EpochExceeded { offset }
}
