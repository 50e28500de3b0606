use core::{cmp::Ordering, ops::Deref};

use crate::{MAX_SEQUENCE, Result};

/// Produces the next sequence number for a millisecond on this node.
///
/// Implementations must be callable concurrently and must never hand out the
/// same sequence twice for the same millisecond. Returning [`MAX_SEQUENCE`]
/// tells the caller that the millisecond is used up (or that the clock is
/// behind the last millisecond seen) and that it should retry once the clock
/// has advanced.
///
/// Closures of the shape `Fn(i64) -> Result<u16>` are resolvers, which makes
/// it easy to plug in a test double:
///
/// ```
/// use ferroflake::{Generator, SequenceResolver};
///
/// let always_zero = |_millis: i64| -> ferroflake::Result<u16> { Ok(0) };
/// assert_eq!(always_zero.resolve(42), Ok(0));
///
/// let generator = Generator::builder().resolver(always_zero).build();
/// assert_eq!(ferroflake::parse_id(generator.next_id()).sequence, 0);
/// ```
pub trait SequenceResolver {
    /// Returns the sequence to use for `millis` (Unix milliseconds).
    ///
    /// # Errors
    ///
    /// Implementation defined; the generator returns the error unchanged.
    fn resolve(&self, millis: i64) -> Result<u16>;
}

impl<F> SequenceResolver for F
where
    F: Fn(i64) -> Result<u16>,
{
    fn resolve(&self, millis: i64) -> Result<u16> {
        self(millis)
    }
}

/// A resolver reached through a pointer: `&R`, `Arc<R>`, `Box<R>`, ...
///
/// Lets several generators draw from one coordinator, e.g. a `static`
/// [`AtomicResolver`], so they never issue the same sequence for the same
/// millisecond. Only useful for generators that also share a node ID.
///
/// ```
/// use ferroflake::{AtomicResolver, Generator, SharedResolver, parse_id};
///
/// static RESOLVER: AtomicResolver = AtomicResolver::new();
///
/// let a = Generator::builder().resolver(SharedResolver(&RESOLVER)).build();
/// let b = Generator::builder().resolver(SharedResolver(&RESOLVER)).build();
///
/// assert_ne!(a.try_next_id().unwrap(), b.try_next_id().unwrap());
/// ```
///
/// [`AtomicResolver`]: crate::AtomicResolver
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SharedResolver<P>(pub P);

impl<P> SequenceResolver for SharedResolver<P>
where
    P: Deref,
    P::Target: SequenceResolver,
{
    fn resolve(&self, millis: i64) -> Result<u16> {
        self.0.resolve(millis)
    }
}

/// Outcome of advancing the `(last millisecond, last sequence)` pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    /// Publish `sequence` for the requested millisecond.
    Next(u16),
    /// The millisecond is used up.
    Exhausted,
    /// The requested millisecond is older than the last one seen.
    ClockBehind,
}

/// The state transition shared by every built-in resolver.
pub(crate) fn advance(last_millis: i64, last_sequence: u16, millis: i64) -> Advance {
    match last_millis.cmp(&millis) {
        Ordering::Greater => Advance::ClockBehind,
        Ordering::Equal => match (last_sequence + 1) & MAX_SEQUENCE {
            0 => Advance::Exhausted,
            next => Advance::Next(next),
        },
        Ordering::Less => Advance::Next(0),
    }
}

#[cold]
#[inline(never)]
pub(crate) fn cold_clock_behind(_millis: i64, _last_millis: i64) -> u16 {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        millis = _millis,
        last_millis = _last_millis,
        "clock behind last observed millisecond"
    );
    MAX_SEQUENCE
}
