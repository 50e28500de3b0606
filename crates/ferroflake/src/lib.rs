//! # ferroflake
//!
//! Compact, sortable 64-bit Snowflake IDs generated without central
//! coordination.
//!
//! Every ID packs three fields, most-significant bits first:
//!
//! ```text
//!  Bit Index:  63            22 21             12 11             0
//!              +----------------+-----------------+---------------+
//!  Field:      | timestamp (41) |   node ID (10)  | sequence (12) |
//!              +----------------+-----------------+---------------+
//! ```
//!
//! The timestamp is the number of milliseconds since a configurable epoch
//! ([`DEFAULT_EPOCH`] is 2008-11-10T23:00:00Z). The sequence distinguishes IDs
//! issued by the same node within one millisecond and is coordinated by a
//! lock-free [`AtomicResolver`].
//!
//! ## Example
//!
//! ```
//! use ferroflake::{Generator, parse_id};
//!
//! let generator = Generator::builder().node_id(5).build();
//! let id = generator.try_next_id().unwrap();
//!
//! let parsed = parse_id(id);
//! assert_eq!(parsed.node_id, 5);
//! ```
//!
//! ## Feature flags
//!
//! - `std` (default): [`SystemClock`] and `std::error::Error` impls.
//! - `global` (default): a process-wide generator behind free functions in
//!   [`global`].
//! - `lock`: the mutex-backed [`LockResolver`]; `parking-lot` swaps in
//!   `parking_lot::Mutex`.
//! - `cache-padded`: pads the [`AtomicResolver`] state to a cache line.
//! - `tracing`: spans and events from the generator and resolvers.
//! - `serde`: (de)serialization of [`ParsedId`] and [`GeneratorConfig`].
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod generator;
#[cfg_attr(docsrs, doc(cfg(feature = "global")))]
#[cfg(feature = "global")]
pub mod global;
mod id;
mod resolver;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::resolver::*;
pub use crate::time::*;
