//! compression/types.rs
//! Session traits and configuration.

use crate::constants::{DEFAULT_LEVEL, DEFAULT_MAX_FRAME_SIZE};
use crate::types::DictError;

// Require Send so sessions can move to worker threads.
pub trait Compressor: Send {
    /// Compress `input` into one complete frame appended to `out`.
    fn compress_frame(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), DictError>;
}

pub trait Decompressor: Send {
    /// Decompress exactly one frame from `input`, appending to `out`.
    fn decompress_frame(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), DictError>;
}

/// Session parameters; `None` means the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Compression level. Ignored when a digested dictionary is loaded,
    /// which carries its own level.
    pub level: Option<i32>,

    /// Append a content checksum to each frame. Default on.
    pub checksum: Option<bool>,

    /// Long distance matching. Only compatible with prefix mode.
    pub long_distance_matching: Option<bool>,

    /// Decompressed size bound for frames without a content size.
    pub max_frame_size: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LEVEL),
            checksum: Some(true),
            long_distance_matching: Some(false),
            max_frame_size: Some(DEFAULT_MAX_FRAME_SIZE),
        }
    }
}

impl SessionConfig {
    pub fn new(
        level: Option<i32>,
        checksum: Option<bool>,
        long_distance_matching: Option<bool>,
        max_frame_size: Option<usize>,
    ) -> Self {
        Self { level, checksum, long_distance_matching, max_frame_size }
    }

    pub fn with_level(level: i32) -> Self {
        Self { level: Some(level), ..Self::default() }
    }

    pub fn level(&self) -> i32 {
        self.level.unwrap_or(DEFAULT_LEVEL)
    }

    pub fn checksum(&self) -> bool {
        self.checksum.unwrap_or(true)
    }

    pub fn long_distance_matching(&self) -> bool {
        self.long_distance_matching.unwrap_or(false)
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size.unwrap_or(DEFAULT_MAX_FRAME_SIZE)
    }
}
