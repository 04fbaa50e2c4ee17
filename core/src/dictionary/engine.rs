//! dictionary/engine.rs
//! Seam between a dictionary handle and the compression engine.
//!
//! The handle only ever asks the engine to validate content and to build
//! digested artifacts. Releasing an artifact is its `Drop`.

use std::fmt;

use zstd_safe::{CDict, DDict};

use crate::constants::DICT_HEADER_LEN;
use crate::types::DictError;
use crate::utils::{has_dict_magic, read_dict_id};

/// Compression engine operations a [`DictionaryHandle`](super::DictionaryHandle) relies on.
pub trait DictEngine: Send + Sync {
    /// Digested compression dictionary, built once per level.
    type Digested: Send + Sync;
    /// Digested decompression dictionary, level-independent.
    type DecoderDigested: Send + Sync;

    /// Validate `content` as a dictionary. Raw content always passes.
    fn check_format(&self, content: &[u8], is_raw: bool) -> Result<(), DictError>;

    /// Build the digested compression dictionary for `level`.
    fn materialize(&self, content: &[u8], level: i32) -> Result<Self::Digested, DictError>;

    /// Build the digested decompression dictionary.
    fn materialize_decoder(&self, content: &[u8]) -> Result<Self::DecoderDigested, DictError>;
}

/// libzstd, through `zstd-safe`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZstdEngine;

/// A `ZSTD_CDict` compiled at a fixed compression level.
pub struct ZstdDigested {
    level: i32,
    cdict: CDict<'static>,
}

impl ZstdDigested {
    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn cdict(&self) -> &CDict<'static> {
        &self.cdict
    }
}

impl fmt::Debug for ZstdDigested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZstdDigested").field("level", &self.level).finish_non_exhaustive()
    }
}

/// A `ZSTD_DDict`.
pub struct ZstdDecoderDigested {
    ddict: DDict<'static>,
}

impl ZstdDecoderDigested {
    pub fn ddict(&self) -> &DDict<'static> {
        &self.ddict
    }
}

impl fmt::Debug for ZstdDecoderDigested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZstdDecoderDigested").finish_non_exhaustive()
    }
}

impl DictEngine for ZstdEngine {
    type Digested = ZstdDigested;
    type DecoderDigested = ZstdDecoderDigested;

    fn check_format(&self, content: &[u8], is_raw: bool) -> Result<(), DictError> {
        if is_raw {
            return Ok(());
        }
        if content.len() < DICT_HEADER_LEN {
            return Err(DictError::format(format!(
                "{} bytes is shorter than the {DICT_HEADER_LEN}-byte dictionary header",
                content.len()
            )));
        }
        if !has_dict_magic(content) {
            return Err(DictError::format(
                "missing dictionary magic number, pass is_raw=true for raw content",
            ));
        }
        if read_dict_id(content) == 0 {
            return Err(DictError::format("dictionary id is zero"));
        }
        // Header alone says nothing about the entropy tables; a throwaway
        // DDict makes libzstd parse them once.
        DDict::try_create(content)
            .map(drop)
            .ok_or_else(|| DictError::format("zstd rejected the dictionary entropy tables"))
    }

    fn materialize(&self, content: &[u8], level: i32) -> Result<ZstdDigested, DictError> {
        CDict::try_create(content, level)
            .map(|cdict| ZstdDigested { level, cdict })
            .ok_or_else(|| load_failure(content, "digested compression dictionary"))
    }

    fn materialize_decoder(&self, content: &[u8]) -> Result<ZstdDecoderDigested, DictError> {
        DDict::try_create(content)
            .map(|ddict| ZstdDecoderDigested { ddict })
            .ok_or_else(|| load_failure(content, "digested decompression dictionary"))
    }
}

// libzstd returns NULL both for bad entropy tables and for allocation failure.
// Only formatted content has tables to reject.
fn load_failure(content: &[u8], what: &str) -> DictError {
    if has_dict_magic(content) {
        DictError::format(format!("zstd rejected the dictionary tables while building a {what}"))
    } else {
        DictError::allocation(what)
    }
}
