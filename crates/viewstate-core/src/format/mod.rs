//! Viewstate wire-format decoding.
//!
//! The format follows the same layered structure for every concern:
//! - `layout`: marker bytes, fixed widths and the preamble (source of truth)
//! - `marker`: closed marker set with an exhaustive byte match
//! - `reader`: bounds-checked cursor and the varint convention
//! - `parser`: marker dispatch and primitive values
//! - `composite`: values that nest other values
//! - `error`: explicit, actionable errors
//!
//! Decoding is pure: no I/O, no logging, no shared state. Each decode owns
//! its cursor, so independent payloads can be decoded concurrently.

mod composite;
pub mod error;
pub mod layout;
pub mod marker;
pub mod parser;
pub mod reader;

pub use error::ViewstateError;
pub use parser::{ValueParser, parse, parse_with_options};
