use core::{fmt, time::Duration};

/// Number of bits holding the millisecond offset from the epoch.
pub const TIMESTAMP_BITS: u32 = 41;

/// Number of bits holding the node ID.
pub const NODE_ID_BITS: u32 = 10;

/// Number of bits holding the per-millisecond sequence.
pub const SEQUENCE_BITS: u32 = 12;

/// Largest representable timestamp offset: `2^41 - 1` ms (~69 years).
pub const MAX_TIMESTAMP: u64 = (1 << TIMESTAMP_BITS) - 1;

/// Largest representable node ID: `2^10 - 1`.
pub const MAX_NODE_ID: u16 = (1 << NODE_ID_BITS) - 1;

/// Largest representable sequence: `2^12 - 1`.
///
/// Resolvers return this value as the exhaustion sentinel, so the usable
/// sequence range per millisecond is `0..MAX_SEQUENCE`.
pub const MAX_SEQUENCE: u16 = (1 << SEQUENCE_BITS) - 1;

/// Bit position of the node ID field.
pub const NODE_ID_SHIFT: u32 = SEQUENCE_BITS;

/// Bit position of the timestamp field.
pub const TIMESTAMP_SHIFT: u32 = NODE_ID_BITS + SEQUENCE_BITS;

/// Packs the three fields into a raw identifier.
///
/// Each field is masked to its width; callers are expected to have range
/// checked the timestamp beforehand (see [`Error::EpochExceeded`]).
///
/// ```
/// use ferroflake::{compose, parse_id};
///
/// let id = compose(100, 5, 1);
/// assert_eq!(id, (100 << 22) | (5 << 12) | 1);
/// assert_eq!(parse_id(id).timestamp, 100);
/// ```
///
/// [`Error::EpochExceeded`]: crate::Error::EpochExceeded
pub const fn compose(timestamp: u64, node_id: u16, sequence: u16) -> u64 {
    ((timestamp & MAX_TIMESTAMP) << TIMESTAMP_SHIFT)
        | (((node_id & MAX_NODE_ID) as u64) << NODE_ID_SHIFT)
        | (sequence & MAX_SEQUENCE) as u64
}

/// Decodes a raw identifier into its fields. Total: every `u64` decodes.
pub const fn parse_id(raw: u64) -> ParsedId {
    ParsedId {
        sequence: raw & MAX_SEQUENCE as u64,
        node_id: (raw >> NODE_ID_SHIFT) & MAX_NODE_ID as u64,
        timestamp: raw >> TIMESTAMP_SHIFT,
        raw,
    }
}

/// The decoded view of a Snowflake ID.
///
/// Holds no state of its own: every field is recomputed from `raw` by
/// [`parse_id`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParsedId {
    /// Per-millisecond sequence, `0..=4095`.
    pub sequence: u64,
    /// Node that issued the ID, `0..=1023`.
    pub node_id: u64,
    /// Milliseconds since the epoch in effect when the ID was issued.
    pub timestamp: u64,
    /// The original identifier.
    pub raw: u64,
}

impl ParsedId {
    /// Returns the issue time as a [`Duration`] since the Unix epoch, given
    /// the epoch the ID was generated against.
    ///
    /// Decoding with a different epoch than the one used at generation time
    /// yields a shifted (wrong) time.
    pub const fn generate_time(&self, epoch: Duration) -> Duration {
        epoch.saturating_add(Duration::from_millis(self.timestamp))
    }
}

impl From<u64> for ParsedId {
    fn from(raw: u64) -> Self {
        parse_id(raw)
    }
}

impl From<ParsedId> for u64 {
    fn from(parsed: ParsedId) -> Self {
        parsed.raw
    }
}

impl fmt::Display for ParsedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (ts={}, node={}, seq={})",
            self.raw, self.timestamp, self.node_id, self.sequence
        )
    }
}
