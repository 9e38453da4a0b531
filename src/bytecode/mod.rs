//! Versioned byte encoding of syntax trees.
//!
//! Used to hand trees across process boundaries (a parser process feeding
//! an analysis server, or an on-disk cache). All integers are little-endian.
//!
//! ```text
//! header: "NXSB" | version: u16 | node count: u32 | root: u32
//! node:   tag: u8 | start: u32 | end: u32 | payload
//! ```
//!
//! Strings are a `u32` byte length followed by UTF-8. Id lists are a `u32`
//! count followed by ids. An absent optional id is `u32::MAX`. Node tags
//! are listed in [`tag`].

mod decode;
mod encode;
mod error;
pub mod tag;

pub use decode::decode;
pub use encode::encode;
pub use error::DecodeError;

/// Leading bytes of every encoded tree.
pub const MAGIC: [u8; 4] = *b"NXSB";

/// Current format version.
pub const VERSION: u16 = 1;

/// Encoding of an absent optional id.
pub(crate) const NONE: u32 = u32::MAX;
