//! dictionary/mod.rs
//! One dictionary blob presented to zstd in one of three modes.
//!
//! Notes:
//! - Digested: pre-compiled per compression level and cached on the handle.
//! - Undigested: raw bytes, tables re-derived by the engine on every load.
//! - Prefix: raw bytes referenced for exactly one frame.
//! - Format validation is deferred to the first digested/undigested use.

pub mod cache;
pub mod engine;
pub mod handle;
pub mod train;
pub mod views;

pub use cache::DigestState;
pub use engine::*;
pub use handle::*;
pub use train::*;
pub use views::*;
