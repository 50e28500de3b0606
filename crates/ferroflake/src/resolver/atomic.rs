use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, MAX_SEQUENCE, Result, SEQUENCE_BITS,
    resolver::{Advance, SequenceResolver, advance, cold_clock_behind},
};

/// Width of the millisecond half of the packed state word.
pub const TRACKED_MILLIS_BITS: u32 = u64::BITS - SEQUENCE_BITS;

/// Largest Unix millisecond an [`AtomicResolver`] can track (`2^52 - 1`, far
/// past the year 100 000).
pub const MAX_TRACKED_MILLIS: i64 = (1 << TRACKED_MILLIS_BITS) - 1;

const SEQUENCE_MASK: u64 = MAX_SEQUENCE as u64;

/// A lock-free sequence resolver.
///
/// The last millisecond observed and the last sequence issued within it are
/// packed into a single [`AtomicU64`]:
///
/// ```text
///  Bit Index:  63                    12 11             0
///              +------------------------+---------------+
///  Field:      | Unix millis (52)       | sequence (12) |
///              +------------------------+---------------+
/// ```
///
/// Every update is one `compare_exchange` on that word, so the pair can never
/// be observed half-written. Callers that lose the race reload and retry; no
/// caller ever blocks.
///
/// A clock reading outside `0..=MAX_TRACKED_MILLIS` is rejected with
/// [`Error::ClockOutOfRange`] rather than truncated.
///
/// ## See Also
/// - [`LockResolver`]
///
/// [`LockResolver`]: crate::LockResolver
#[derive(Debug)]
pub struct AtomicResolver {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
}

impl Default for AtomicResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicResolver {
    /// Creates a resolver that has not observed any millisecond yet.
    ///
    /// This is a `const fn`, so a resolver can back a `static`:
    ///
    /// ```
    /// use ferroflake::{AtomicResolver, SequenceResolver};
    ///
    /// static RESOLVER: AtomicResolver = AtomicResolver::new();
    ///
    /// assert_eq!(RESOLVER.resolve(1), Ok(0));
    /// assert_eq!(RESOLVER.resolve(1), Ok(1));
    /// assert_eq!(RESOLVER.resolve(2), Ok(0));
    /// ```
    pub const fn new() -> Self {
        Self::from_state(0, 0)
    }

    /// Creates a resolver that behaves as if `sequence` was last issued at
    /// `millis`.
    ///
    /// Useful for restoring state or for simulating a clock that was ahead.
    /// `millis` is masked to the 52-bit tracking window.
    pub const fn from_state(millis: i64, sequence: u16) -> Self {
        let packed = pack(millis, sequence);
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(packed)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(packed),
        }
    }

    /// Returns the `(millisecond, sequence)` pair last published.
    pub fn state(&self) -> (i64, u16) {
        unpack(self.state.load(Ordering::Relaxed))
    }

    /// Resolves the sequence for `millis`.
    ///
    /// Returns `0` for a millisecond newer than the last one seen, the next
    /// sequence for the same millisecond, and [`MAX_SEQUENCE`] when the
    /// millisecond is used up or `millis` is older than the last one seen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockOutOfRange`] if `millis` is negative or above
    /// [`MAX_TRACKED_MILLIS`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn resolve(&self, millis: i64) -> Result<u16> {
        if !(0..=MAX_TRACKED_MILLIS).contains(&millis) {
            return Err(Error::ClockOutOfRange { millis });
        }

        let mut current = self.state.load(Ordering::Relaxed);
        loop {
            let (last_millis, last_sequence) = unpack(current);

            let sequence = match advance(last_millis, last_sequence, millis) {
                Advance::Next(sequence) => sequence,
                Advance::Exhausted => return Ok(MAX_SEQUENCE),
                Advance::ClockBehind => return Ok(cold_clock_behind(millis, last_millis)),
            };

            match self.state.compare_exchange_weak(
                current,
                pack(millis, sequence),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(sequence),
                // Another caller published first; re-evaluate against theirs.
                Err(actual) => current = actual,
            }
        }
    }
}

impl SequenceResolver for AtomicResolver {
    fn resolve(&self, millis: i64) -> Result<u16> {
        self.resolve(millis)
    }
}

const fn pack(millis: i64, sequence: u16) -> u64 {
    ((millis as u64 & MAX_TRACKED_MILLIS as u64) << SEQUENCE_BITS)
        | (sequence as u64 & SEQUENCE_MASK)
}

const fn unpack(packed: u64) -> (i64, u16) {
    (
        (packed >> SEQUENCE_BITS) as i64,
        (packed & SEQUENCE_MASK) as u16,
    )
}
