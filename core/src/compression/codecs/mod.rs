//! compression/codecs/mod.rs

pub mod zstd;

pub use zstd::*;
