/// A result type defaulting to the runtime [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors surfaced while generating IDs.
///
/// Sequence exhaustion and clock regression are not errors: both are absorbed
/// by the generator as added latency.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The millisecond offset from the epoch does not fit in 41 bits, or is
    /// negative. The configured epoch is in the future or more than ~69 years
    /// in the past.
    #[error("timestamp offset {offset}ms is outside the 41-bit range, check the configured epoch")]
    EpochExceeded {
        /// `now - epoch` in milliseconds.
        offset: i64,
    },

    /// The clock reported a millisecond outside the window the
    /// [`AtomicResolver`](crate::AtomicResolver) can track.
    #[error("clock reading {millis}ms is outside the resolver's tracking window")]
    ClockOutOfRange {
        /// The rejected Unix millisecond.
        millis: i64,
    },

    /// A custom sequence resolver failed.
    #[error("sequence resolver failed: {reason}")]
    Resolver {
        /// Human-readable failure reason.
        reason: &'static str,
    },

    /// The resolver's mutex was poisoned by a panicking thread.
    #[cfg_attr(docsrs, doc(cfg(all(feature = "lock", not(feature = "parking-lot")))))]
    #[cfg(all(feature = "lock", not(feature = "parking-lot")))]
    #[error("sequence resolver lock poisoned")]
    LockPoisoned,
}

#[cfg(all(feature = "lock", not(feature = "parking-lot")))]
impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}

/// Invalid startup configuration.
///
/// These represent programmer error. [`GeneratorBuilder::build`] and the
/// setters in [`global`] panic with this message; use
/// [`GeneratorBuilder::try_build`] to inspect it instead.
///
/// [`GeneratorBuilder::build`]: crate::GeneratorBuilder::build
/// [`GeneratorBuilder::try_build`]: crate::GeneratorBuilder::try_build
/// [`global`]: crate::global
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The epoch is the Unix epoch itself, i.e. was never set.
    #[error("the epoch cannot be the zero value")]
    EpochUnset,

    /// The epoch lies after the current time.
    #[error("the epoch ({epoch_millis}ms) cannot be after the current time ({now_millis}ms)")]
    EpochInFuture { epoch_millis: i64, now_millis: i64 },

    /// `now - epoch` already exceeds the 41-bit horizon.
    #[error("{elapsed_millis}ms have elapsed since the epoch, exceeding the 2^41-1ms (~69 year) lifetime")]
    EpochHorizonExceeded { elapsed_millis: i64 },

    /// The node ID does not fit in 10 bits.
    #[error("node id {node_id} exceeds the maximum of 1023")]
    NodeIdOutOfRange { node_id: u16 },
}
