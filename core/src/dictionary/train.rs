//! dictionary/train.rs
//! Build a formatted zstd dictionary from sample payloads.

use tracing::debug;

use crate::dictionary::handle::ZstdDict;
use crate::types::DictError;

/// Train a dictionary of at most `max_size` bytes from `samples`.
/// The result is an ordinary (non-raw) dictionary with a non-zero id.
pub fn train_dictionary<S: AsRef<[u8]>>(samples: &[S], max_size: usize) -> Result<ZstdDict, DictError> {
    let content = zstd::dict::from_samples(samples, max_size).map_err(|e| DictError::Engine {
        op: "train",
        msg: e.to_string(),
    })?;
    debug!(samples = samples.len(), bytes = content.len(), "trained dictionary");
    Ok(ZstdDict::new(content, false))
}
