//! compression/stream.rs
//! Streaming helpers: one frame per chunk on the way in, frame splitting on the way out.
use std::io::Read;

use crate::compression::types::{Compressor, Decompressor};
use crate::types::DictError;

#[inline]
/// Summary: Compress data read from R in `chunk_size` blocks, yielding one frame per block.
/// - A prefix view on the compressor applies to the first frame only.
/// - Stops after the first error.
pub fn compress_stream<'c, R: Read + 'c>(
    mut r: R,
    chunk_size: usize,
    compressor: &'c mut dyn Compressor,
) -> impl Iterator<Item = Result<Vec<u8>, DictError>> + 'c {
    assert!(chunk_size > 0);
    let mut buf = vec![0u8; chunk_size];
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let n = match read_full(&mut r, &mut buf) {
            Ok(0) => {
                done = true;
                return None;
            }
            Ok(n) => n,
            Err(e) => {
                done = true;
                return Some(Err(DictError::Engine { op: "read", msg: e.to_string() }));
            }
        };
        let mut out = Vec::new();
        if let Err(e) = compressor.compress_frame(&buf[..n], &mut out) {
            done = true;
            return Some(Err(e));
        }
        Some(Ok(out))
    })
}

// Fill `buf` unless EOF comes first, so frame boundaries follow chunk_size.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Summary: Split concatenated frames and decompress each in order.
/// - Frame boundaries come from the zstd frame headers.
/// - Returns the concatenated output; the first error aborts.
pub fn decompress_frames(mut input: &[u8], decompressor: &mut dyn Decompressor) -> Result<Vec<u8>, DictError> {
    let mut out = Vec::new();
    while !input.is_empty() {
        let frame_len = zstd_safe::find_frame_compressed_size(input)
            .map_err(|c| DictError::engine("find frame boundary", c))?;
        let (frame, rest) = input.split_at(frame_len);
        decompressor.decompress_frame(frame, &mut out)?;
        input = rest;
    }
    Ok(out)
}
