#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    MAX_SEQUENCE, Result,
    resolver::{Advance, SequenceResolver, advance, cold_clock_behind, mutex::Mutex},
};

/// A mutex-backed sequence resolver.
///
/// Same contract as [`AtomicResolver`], but the `(millisecond, sequence)` pair
/// sits behind a lock. Useful as a reference implementation, or where fair
/// access matters more than raw throughput. Unlike [`AtomicResolver`] it
/// tracks the full `i64` millisecond range.
///
/// With the `parking-lot` feature the lock is a `parking_lot::Mutex` and never
/// poisons.
///
/// ## See Also
/// - [`AtomicResolver`]
///
/// [`AtomicResolver`]: crate::AtomicResolver
#[derive(Debug, Default)]
pub struct LockResolver {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<(i64, u16)>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<(i64, u16)>,
}

impl LockResolver {
    /// Creates a resolver that has not observed any millisecond yet.
    pub fn new() -> Self {
        Self::from_state(0, 0)
    }

    /// Creates a resolver that behaves as if `sequence` was last issued at
    /// `millis`.
    pub fn from_state(millis: i64, sequence: u16) -> Self {
        let state = (millis, sequence & MAX_SEQUENCE);
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(state)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(state),
        }
    }

    /// Resolves the sequence for `millis`. See [`SequenceResolver`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if another thread panicked while
    /// holding the lock (std mutex only).
    ///
    /// [`Error::LockPoisoned`]: crate::Error
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn resolve(&self, millis: i64) -> Result<u16> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        let (last_millis, last_sequence) = *state;
        match advance(last_millis, last_sequence, millis) {
            Advance::Next(sequence) => {
                *state = (millis, sequence);
                Ok(sequence)
            }
            Advance::Exhausted => Ok(MAX_SEQUENCE),
            Advance::ClockBehind => Ok(cold_clock_behind(millis, last_millis)),
        }
    }
}

impl SequenceResolver for LockResolver {
    fn resolve(&self, millis: i64) -> Result<u16> {
        self.resolve(millis)
    }
}
