//! zstd-dict-core
//!
//! Pure Rust zstd dictionary handle.
//! One dictionary blob, loaded as digested, undigested or prefix.
//! No Python, no PyO3.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod dictionary;
pub mod compression;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{
        CompressionDict, Compressor, DecompressionDict, Decompressor, SessionConfig, ZstdCompressor,
        ZstdDecompressor,
    };
    pub use crate::dictionary::{
        train_dictionary, DictEngine, DictMode, DictView, DictionaryHandle, DigestState, DigestedDict,
        PrefixDict, UndigestedDict, ZstdDict, ZstdEngine,
    };
    pub use crate::telemetry::DictSnapshot;
    pub use crate::types::DictError;
}
