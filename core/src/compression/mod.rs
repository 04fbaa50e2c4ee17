//! compression/mod.rs
//! Frame-per-call zstd sessions that apply dictionary views.
//!
//! Notes:
//! - Every frame gets a fresh engine context; the view decides what is loaded into it.
//! - A prefix is consumed by the first successful frame of a session, on both sides.
//! - Checksums are on by default so a wrong prefix is detected on decode.

pub mod codecs;
pub mod stream;
pub mod types;

pub use codecs::*;
pub use stream::*;
pub use types::*;
