//! squitter: Pure decode library for Mode S / ADS-B frames.
//!
//! No async, no I/O — just algorithms. Frame-aligned bytes go in, typed
//! messages and resolved positions come out. Every operation is a pure
//! function, so decoding can run on any number of threads without
//! coordination.

pub mod bits;
pub mod codecs;
pub mod cpr;
pub mod crc;
pub mod decode;
pub mod frame;
pub mod types;

// Re-export commonly used types at crate root
pub use cpr::{resolve_global, resolve_local, CprFormat, CprSample, Location};
pub use decode::{decode, decode_basics, message_type};
pub use frame::{parse, ExtendedSquitter, ModeSFrame};
pub use types::*;
