//! compression/codecs/zstd.rs
//!
//! Zstd compressor/decompressor sessions driven by dictionary views.
//!
//! Design notes:
//! - A fresh `CCtx`/`DCtx` per frame; the session only keeps the view.
//! - Digested: the context references the cached `CDict`/`DDict`.
//! - Undigested: `load_dictionary` re-derives the tables for this frame.
//! - Prefix: `ref_prefix` until a frame succeeds, then the view is dropped.
//! - Frames without a declared content size are decoded in streaming
//!   chunks, bounded by `max_frame_size`.
//! - Errors are mapped into `DictError` with the zstd error name.

use zstd_safe::{CCtx, CParameter, DCtx, ErrorCode, InBuffer, OutBuffer};

use crate::compression::types::{Compressor, Decompressor, SessionConfig};
use crate::dictionary::{DictMode, DictView, ZstdDecoderDigested, ZstdDigested};
use crate::types::DictError;

/// View accepted by [`ZstdCompressor`].
pub type CompressionDict = DictView<ZstdDigested>;
/// View accepted by [`ZstdDecompressor`].
pub type DecompressionDict = DictView<ZstdDecoderDigested>;

// libzstd error names that mean "wrong history", as opposed to a damaged frame.
const MISMATCH_ERRORS: [&str; 2] = ["Restored data doesn't match checksum", "Dictionary mismatch"];

/// Zstd compressor, one frame per call.
#[derive(Debug)]
pub struct ZstdCompressor {
    config: SessionConfig,
    dict: Option<CompressionDict>,
}

/// Zstd decompressor, one frame per call.
#[derive(Debug)]
pub struct ZstdDecompressor {
    config: SessionConfig,
    dict: Option<DecompressionDict>,
}

impl ZstdCompressor {
    /// Create a compressor with an optional dictionary view.
    ///
    /// # Errors
    /// - `DictError::Incompatible` if long distance matching is enabled with a
    ///   digested or undigested dictionary.
    pub fn new(config: SessionConfig, dict: Option<CompressionDict>) -> Result<Self, DictError> {
        if config.long_distance_matching() {
            if let Some(view) = &dict {
                if view.mode() != DictMode::Prefix {
                    return Err(DictError::Incompatible { mode: view.mode() });
                }
            }
        }
        Ok(Self { config, dict })
    }

    /// Level used for the next frame: the digested dictionary's own level wins.
    pub fn effective_level(&self) -> i32 {
        match &self.dict {
            Some(DictView::Digested(d)) => d.artifact().level(),
            _ => self.config.level(),
        }
    }

    /// True while a prefix is waiting for the next frame.
    pub fn has_pending_prefix(&self) -> bool {
        matches!(self.dict, Some(DictView::Prefix(_)))
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, DictError> {
        let mut cctx = CCtx::try_create().ok_or_else(|| DictError::allocation("compression context"))?;
        cctx.set_parameter(CParameter::CompressionLevel(self.effective_level()))
            .map_err(|c| DictError::engine("set compression level", c))?;
        cctx.set_parameter(CParameter::ChecksumFlag(self.config.checksum()))
            .map_err(|c| DictError::engine("set checksum flag", c))?;
        if self.config.long_distance_matching() {
            cctx.set_parameter(CParameter::EnableLongDistanceMatching(true))
                .map_err(|c| DictError::engine("enable long distance matching", c))?;
        }

        match &self.dict {
            Some(DictView::Digested(d)) => {
                cctx.ref_cdict(d.artifact().cdict()).map_err(|c| DictError::engine("reference digested dictionary", c))?;
            }
            Some(DictView::Undigested(u)) => {
                cctx.load_dictionary(u.content()).map_err(|c| DictError::engine("load undigested dictionary", c))?;
            }
            Some(DictView::Prefix(p)) => {
                cctx.ref_prefix(p.content()).map_err(|c| DictError::engine("reference prefix", c))?;
            }
            None => {}
        }

        let mut frame = Vec::with_capacity(zstd_safe::compress_bound(input.len()));
        cctx.compress2(&mut frame, input).map_err(|c| DictError::engine("compress", c))?;
        Ok(frame)
    }
}

impl Compressor for ZstdCompressor {
    fn compress_frame(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), DictError> {
        let frame = self.encode(input)?;
        // Consumed only once a frame actually carried it.
        if self.has_pending_prefix() {
            self.dict = None;
        }
        out.extend_from_slice(&frame);
        Ok(())
    }
}

impl ZstdDecompressor {
    pub fn new(config: SessionConfig, dict: Option<DecompressionDict>) -> Self {
        Self { config, dict }
    }

    pub fn has_pending_prefix(&self) -> bool {
        matches!(self.dict, Some(DictView::Prefix(_)))
    }

    /// Content size from the frame header, `None` when the header omits it.
    fn declared_size(&self, input: &[u8]) -> Result<Option<usize>, DictError> {
        let max = self.config.max_frame_size();
        let declared = match zstd_safe::get_frame_content_size(input) {
            Ok(Some(size)) => usize::try_from(size).unwrap_or(usize::MAX),
            Ok(None) => return Ok(None),
            Err(_) => {
                return Err(DictError::Engine {
                    op: "read frame header",
                    msg: "input is not a zstd frame".into(),
                })
            }
        };
        if declared > max {
            return Err(DictError::Engine {
                op: "decompress",
                msg: format!("frame content size {declared} exceeds limit {max}"),
            });
        }
        Ok(Some(declared))
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, DictError> {
        let declared = self.declared_size(input)?;
        let prefixed = self.has_pending_prefix();

        let mut dctx = DCtx::try_create().ok_or_else(|| DictError::allocation("decompression context"))?;
        match &self.dict {
            Some(DictView::Digested(d)) => {
                dctx.ref_ddict(d.artifact().ddict()).map_err(|c| DictError::engine("reference digested dictionary", c))?;
            }
            Some(DictView::Undigested(u)) => {
                dctx.load_dictionary(u.content()).map_err(|c| DictError::engine("load undigested dictionary", c))?;
            }
            Some(DictView::Prefix(p)) => {
                dctx.ref_prefix(p.content()).map_err(|c| DictError::engine("reference prefix", c))?;
            }
            None => {}
        }

        let classify = |code: ErrorCode| decode_error(code, input, prefixed);
        match declared {
            Some(size) => {
                let mut frame = Vec::with_capacity(size);
                dctx.decompress(&mut frame, input).map_err(classify)?;
                Ok(frame)
            }
            None => stream_unsized(&mut dctx, input, self.config.max_frame_size(), classify),
        }
    }
}

impl Decompressor for ZstdDecompressor {
    fn decompress_frame(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), DictError> {
        let frame = self.decode(input)?;
        if self.has_pending_prefix() {
            self.dict = None;
        }
        out.extend_from_slice(&frame);
        Ok(())
    }
}

// A prefix mismatch can only be told apart from damage when the frame is
// structurally complete and the decoder failed on content.
fn decode_error(code: ErrorCode, input: &[u8], prefixed: bool) -> DictError {
    let name = zstd_safe::get_error_name(code);
    let complete = matches!(zstd_safe::find_frame_compressed_size(input), Ok(n) if n == input.len());
    if prefixed && complete && MISMATCH_ERRORS.contains(&name) {
        DictError::ContentMismatch { msg: name.to_string() }
    } else {
        DictError::engine("decompress", code)
    }
}

// Grow the output in `DCtx::out_size()` steps up to `max` bytes.
fn stream_unsized(
    dctx: &mut DCtx<'_>,
    input: &[u8],
    max: usize,
    classify: impl Fn(ErrorCode) -> DictError,
) -> Result<Vec<u8>, DictError> {
    let step = DCtx::out_size().max(1);
    let mut frame: Vec<u8> = Vec::with_capacity(step.min(max));
    let mut src = InBuffer::around(input);
    loop {
        if frame.len() == frame.capacity() {
            if frame.len() >= max {
                return Err(DictError::Engine {
                    op: "decompress",
                    msg: format!("frame output exceeds limit {max}"),
                });
            }
            frame.reserve_exact(step.min(max - frame.len()));
        }
        let pos = frame.len();
        let mut dst = OutBuffer::around_pos(&mut frame, pos);
        let hint = dctx.decompress_stream(&mut dst, &mut src).map_err(&classify)?;
        let room_left = dst.pos() < dst.capacity();

        let drained = src.pos() == input.len();
        if hint == 0 && drained {
            return Ok(frame);
        }
        if drained && room_left {
            return Err(DictError::Engine {
                op: "decompress",
                msg: "truncated frame".into(),
            });
        }
    }
}
