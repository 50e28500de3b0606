use core::time::Duration;

/// Default epoch: Monday, November 10, 2008 23:00:00 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_226_358_000_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A source of wall-clock time.
///
/// Implementations return milliseconds since the Unix epoch in UTC, so the
/// reading is free of timezone and DST discontinuities. The value may repeat
/// or move backward (e.g. under NTP correction); the resolvers handle both.
///
/// Swap in a fixed or stepped clock to make generation deterministic in
/// tests.
///
/// # Example
///
/// ```
/// use ferroflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> i64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current Unix time in milliseconds.
    fn current_millis(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> i64 {
        (**self).current_millis()
    }
}

#[cfg(feature = "std")]
impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> i64 {
        (**self).current_millis()
    }
}

/// The system wall clock, truncated to milliseconds.
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[cfg(feature = "std")]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

#[cfg(all(feature = "std", not(all(target_arch = "wasm32", target_os = "unknown"))))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(all(feature = "std", target_arch = "wasm32", target_os = "unknown"))]
use web_time::{SystemTime, UNIX_EPOCH};

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn current_millis(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => millis_i64(since),
            // Clock set before 1970.
            Err(e) => -millis_i64(e.duration()),
        }
    }
}

/// Converts a duration to whole milliseconds, saturating at `i64::MAX`.
#[cfg(feature = "std")]
pub(crate) fn millis_i64(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
