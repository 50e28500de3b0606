//! A process-wide generator behind free functions.
//!
//! For callers that want one implicit generator per process instead of
//! passing a [`Generator`] around. It runs on the [`SystemClock`] and, unless
//! replaced, a `static` [`AtomicResolver`], so the default path takes no lock.
//!
//! Configure it once at startup, before any ID is generated:
//!
//! ```
//! use ferroflake::global;
//! use std::time::Duration;
//!
//! global::set_epoch(Duration::from_millis(1_420_070_400_000));
//! global::set_node_id(5);
//!
//! let id = global::next_id().unwrap();
//! assert_eq!(global::parse_id(id).node_id, 5);
//! ```
//!
//! The setters panic on invalid input, matching
//! [`GeneratorBuilder::build`]. Changing the epoch after IDs have been issued
//! makes [`generate_time`] report wrong times for those IDs.
//!
//! [`Generator`]: crate::Generator
//! [`GeneratorBuilder::build`]: crate::GeneratorBuilder::build

use core::time::Duration;
use std::sync::{PoisonError, RwLock};

use portable_atomic::{AtomicBool, AtomicI64, AtomicU16, Ordering};

use crate::{
    AtomicResolver, DEFAULT_EPOCH, ParsedId, Result, SequenceResolver, SystemClock, TimeSource,
    generate, validate_epoch, validate_node_id,
};

pub use crate::parse_id;

/// A resolver that can be installed process-wide.
pub type BoxedResolver = Box<dyn SequenceResolver + Send + Sync>;

static RESOLVER: AtomicResolver = AtomicResolver::new();
static EPOCH_MILLIS: AtomicI64 = AtomicI64::new(DEFAULT_EPOCH.as_millis() as i64);
static NODE_ID: AtomicU16 = AtomicU16::new(0);

// Checked first so the default path never touches the lock.
static HAS_CUSTOM_RESOLVER: AtomicBool = AtomicBool::new(false);
static CUSTOM_RESOLVER: RwLock<Option<BoxedResolver>> = RwLock::new(None);

/// Generates the next ID from the process-wide generator.
///
/// # Errors
///
/// Returns [`Error::EpochExceeded`] if the epoch is misconfigured, or the
/// error of a custom resolver.
///
/// [`Error::EpochExceeded`]: crate::Error::EpochExceeded
pub fn next_id() -> Result<u64> {
    let epoch_millis = EPOCH_MILLIS.load(Ordering::Relaxed);
    let node_id = NODE_ID.load(Ordering::Relaxed);

    if HAS_CUSTOM_RESOLVER.load(Ordering::Acquire) {
        let custom = CUSTOM_RESOLVER
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(resolver) = custom.as_deref() {
            return generate(resolver, &SystemClock, epoch_millis, node_id);
        }
    }

    generate(&RESOLVER, &SystemClock, epoch_millis, node_id)
}

/// Generates the next ID, returning `0` on error. See [`next_id`].
pub fn id() -> u64 {
    next_id().unwrap_or_default()
}

/// Maps a decoded ID to its issue time, as a [`Duration`] since the Unix
/// epoch, using the current process-wide epoch.
pub fn generate_time(parsed: &ParsedId) -> Duration {
    parsed.generate_time(epoch())
}

/// The process-wide epoch.
pub fn epoch() -> Duration {
    Duration::from_millis(EPOCH_MILLIS.load(Ordering::Relaxed) as u64)
}

/// The process-wide node ID.
pub fn node_id() -> u16 {
    NODE_ID.load(Ordering::Relaxed)
}

/// Sets the process-wide epoch.
///
/// # Panics
///
/// Panics if `epoch` is zero, after the current time, or more than
/// `2^41 - 1` ms in the past.
pub fn set_epoch(epoch: Duration) {
    let epoch_millis = u64::try_from(epoch.as_millis()).unwrap_or(u64::MAX);
    if let Err(e) = validate_epoch(epoch_millis, SystemClock.current_millis()) {
        panic!("invalid epoch: {e}");
    }
    EPOCH_MILLIS.store(epoch_millis as i64, Ordering::Relaxed);
}

/// Sets the process-wide node ID.
///
/// # Panics
///
/// Panics if `node_id` exceeds 1023.
pub fn set_node_id(node_id: u16) {
    if let Err(e) = validate_node_id(node_id) {
        panic!("invalid node id: {e}");
    }
    NODE_ID.store(node_id, Ordering::Relaxed);
}

/// Replaces the sequence resolver. `None` keeps the current one.
pub fn set_sequence_resolver(resolver: Option<BoxedResolver>) {
    let Some(resolver) = resolver else {
        return;
    };
    let mut custom = CUSTOM_RESOLVER
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *custom = Some(resolver);
    HAS_CUSTOM_RESOLVER.store(true, Ordering::Release);
}

/// Goes back to the built-in lock-free resolver.
pub fn reset_sequence_resolver() {
    let mut custom = CUSTOM_RESOLVER
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    HAS_CUSTOM_RESOLVER.store(false, Ordering::Release);
    *custom = None;
}
