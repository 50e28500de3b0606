use core::time::Duration;

use crate::{ConfigError, DEFAULT_EPOCH, MAX_NODE_ID, MAX_TIMESTAMP};

/// Startup configuration of a [`Generator`].
///
/// Built once and owned by the generator; it never changes afterwards. Use
/// [`GeneratorBuilder`] to assemble and validate one, or [`Self::validate`]
/// directly when the values come from elsewhere (e.g. a config file via the
/// `serde` feature).
///
/// [`Generator`]: crate::Generator
/// [`GeneratorBuilder`]: crate::GeneratorBuilder
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    /// Epoch in milliseconds since the Unix epoch. Defaults to
    /// [`DEFAULT_EPOCH`].
    pub epoch_millis: u64,
    /// Node ID embedded in every ID, `0..=1023`. Defaults to `0`.
    pub node_id: u16,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            epoch_millis: DEFAULT_EPOCH.as_millis() as u64,
            node_id: 0,
        }
    }
}

impl GeneratorConfig {
    /// The epoch as a [`Duration`] since the Unix epoch.
    pub const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }

    /// Checks the configuration against the current time `now_millis`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EpochUnset`] if the epoch is zero
    /// - [`ConfigError::EpochInFuture`] if the epoch is after `now_millis`
    /// - [`ConfigError::EpochHorizonExceeded`] if more than `2^41 - 1` ms have
    ///   passed since the epoch
    /// - [`ConfigError::NodeIdOutOfRange`] if the node ID exceeds 1023
    pub fn validate(&self, now_millis: i64) -> Result<(), ConfigError> {
        validate_epoch(self.epoch_millis, now_millis)?;
        validate_node_id(self.node_id)
    }

    pub(crate) fn epoch_millis_i64(&self) -> i64 {
        i64::try_from(self.epoch_millis).unwrap_or(i64::MAX)
    }
}

pub(crate) fn validate_epoch(epoch_millis: u64, now_millis: i64) -> Result<(), ConfigError> {
    if epoch_millis == 0 {
        return Err(ConfigError::EpochUnset);
    }

    let epoch_millis = i64::try_from(epoch_millis).unwrap_or(i64::MAX);
    if epoch_millis > now_millis {
        return Err(ConfigError::EpochInFuture {
            epoch_millis,
            now_millis,
        });
    }

    // Cannot be negative: the epoch is not after `now`.
    let elapsed_millis = now_millis - epoch_millis;
    if elapsed_millis as u64 > MAX_TIMESTAMP {
        return Err(ConfigError::EpochHorizonExceeded { elapsed_millis });
    }

    Ok(())
}

pub(crate) fn validate_node_id(node_id: u16) -> Result<(), ConfigError> {
    if node_id > MAX_NODE_ID {
        return Err(ConfigError::NodeIdOutOfRange { node_id });
    }
    Ok(())
}
