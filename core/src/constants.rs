//! constants.rs
//! Dictionary header layout, stable mode tags and session defaults.

/// Magic number opening a zstd-format dictionary.
pub const DICT_MAGIC: u32 = 0xEC30_A437;

/// Magic (4 bytes) followed by the little-endian dictionary id (4 bytes).
pub const DICT_HEADER_LEN: usize = 8;

/// Default compression level (matches zstd's own default).
pub const DEFAULT_LEVEL: i32 = 3;

/// Upper bound on a single decompressed frame when the frame header
/// does not carry its content size (32 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 32 * 1024 * 1024;

/// Stable dictionary-mode tags (u8) shared with the bindings.
pub mod mode_ids {
    pub const DIGESTED: u8   = 0;
    pub const UNDIGESTED: u8 = 1;
    pub const PREFIX: u8     = 2;
}
