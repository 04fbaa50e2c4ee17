//! dictionary/handle.rs
//!
//! `DictionaryHandle`: immutable dictionary bytes plus lazily-built digested
//! forms. Shared across threads behind an `Arc`; every accessor takes `&self`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace, warn};

use crate::dictionary::cache::{DigestCache, DigestSlot, DigestState};
use crate::dictionary::engine::{DictEngine, ZstdEngine};
use crate::dictionary::views::{DictMode, DictView, DigestedDict, PrefixDict, UndigestedDict};
use crate::telemetry::{DictCounters, DictSnapshot};
use crate::types::DictError;
use crate::utils::read_dict_id;

/// A zstd dictionary that can be loaded as digested, undigested or prefix.
pub type ZstdDict = DictionaryHandle<ZstdEngine>;

/// Dictionary bytes shared by any number of compression sessions.
///
/// - `content` and `is_raw` never change after construction.
/// - Construction never validates the format; the first digested or
///   undigested view does, and the outcome is remembered.
/// - Digested artifacts are cached per level for the handle's lifetime.
pub struct DictionaryHandle<E: DictEngine = ZstdEngine> {
    content: Arc<[u8]>,
    is_raw: bool,
    dict_id: u32,
    engine: E,
    format_check: OnceLock<Result<(), DictError>>,
    digested: DigestCache<E::Digested>,
    decoder: DigestSlot<E::DecoderDigested>,
    counters: DictCounters,
}

impl ZstdDict {
    /// Copy `content` into a new handle. Empty content is an empty dictionary.
    pub fn new(content: impl AsRef<[u8]>, is_raw: bool) -> Self {
        Self::with_engine(ZstdEngine, content, is_raw)
    }
}

impl<E: DictEngine> DictionaryHandle<E> {
    pub fn with_engine(engine: E, content: impl AsRef<[u8]>, is_raw: bool) -> Self {
        let content: Arc<[u8]> = Arc::from(content.as_ref());
        let dict_id = read_dict_id(&content);
        Self {
            content,
            is_raw,
            dict_id,
            engine,
            format_check: OnceLock::new(),
            digested: DigestCache::new(),
            decoder: DigestSlot::new(),
            counters: DictCounters::default(),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_raw(&self) -> bool {
        self.is_raw
    }

    /// Id from the dictionary header, whatever `is_raw` says; 0 without one.
    pub fn dict_id(&self) -> u32 {
        self.dict_id
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn ensure_format(&self) -> Result<(), DictError> {
        self.format_check
            .get_or_init(|| {
                self.counters.record_format_check();
                self.engine.check_format(&self.content, self.is_raw)
            })
            .clone()
    }

    /// Digested dictionary for `level`, built on first request and cached.
    ///
    /// Concurrent callers for the same level share one build. A failed build
    /// caches nothing, so a later call retries.
    pub fn view_digested(&self, level: i32) -> Result<DigestedDict<E::Digested>, DictError> {
        let lookup = self.digested.get_or_try_init(level, || {
            self.ensure_format()?;
            self.engine.materialize(&self.content, level)
        });
        match lookup {
            Ok((artifact, built)) => {
                self.counters.record_digest(built);
                if built {
                    debug!(level, dict_id = self.dict_id, bytes = self.content.len(), "materialized digested dictionary");
                } else {
                    trace!(level, dict_id = self.dict_id, "digested dictionary cache hit");
                }
                Ok(DigestedDict::new(Some(level), artifact))
            }
            Err(err) => {
                self.counters.record_digest_failure();
                warn!(level, dict_id = self.dict_id, error = %err, "digested dictionary unavailable");
                Err(err)
            }
        }
    }

    /// Raw content tagged for undigested loading. Never touches the cache.
    pub fn view_undigested(&self) -> Result<UndigestedDict, DictError> {
        self.ensure_format()?;
        self.counters.record_undigested();
        Ok(UndigestedDict::new(Arc::clone(&self.content)))
    }

    /// Content tagged for single-frame prefix use. No format check applies.
    pub fn view_prefix(&self) -> PrefixDict {
        self.counters.record_prefix();
        PrefixDict::new(Arc::clone(&self.content))
    }

    /// Digested decompression dictionary, built once.
    pub fn decoder_digest(&self) -> Result<DigestedDict<E::DecoderDigested>, DictError> {
        let (artifact, built) = self.decoder.get_or_try_init(|| {
            self.ensure_format()?;
            self.engine.materialize_decoder(&self.content)
        })?;
        if built {
            self.counters.record_decoder_digest();
            debug!(dict_id = self.dict_id, bytes = self.content.len(), "materialized decoder dictionary");
        }
        Ok(DigestedDict::new(None, artifact))
    }

    /// View for a compressor running at `level`.
    pub fn view(&self, mode: DictMode, level: i32) -> Result<DictView<E::Digested>, DictError> {
        match mode {
            DictMode::Digested => self.view_digested(level).map(DictView::Digested),
            DictMode::Undigested => self.view_undigested().map(DictView::Undigested),
            DictMode::Prefix => Ok(DictView::Prefix(self.view_prefix())),
        }
    }

    /// View for a decompressor. Digested mode uses the decoder digest.
    pub fn view_for_decompression(&self, mode: DictMode) -> Result<DictView<E::DecoderDigested>, DictError> {
        match mode {
            DictMode::Digested => self.decoder_digest().map(DictView::Digested),
            DictMode::Undigested => self.view_undigested().map(DictView::Undigested),
            DictMode::Prefix => Ok(DictView::Prefix(self.view_prefix())),
        }
    }

    pub fn digested_state(&self, level: i32) -> DigestState {
        self.digested.state(level)
    }

    pub fn cached_levels(&self) -> Vec<i32> {
        self.digested.cached_levels()
    }

    /// Build digested dictionaries for several levels in parallel.
    /// Returns the first error in `levels` order; successful levels stay cached.
    pub fn prewarm_digested(&self, levels: &[i32]) -> Result<(), DictError> {
        let results = crossbeam::thread::scope(|s| {
            let workers: Vec<_> = levels
                .iter()
                .map(|&level| s.spawn(move |_| self.view_digested(level).map(|_| ())))
                .collect();
            workers
                .into_iter()
                .map(|w| {
                    w.join()
                        .unwrap_or_else(|_| Err(DictError::State("prewarm worker panicked".into())))
                })
                .collect::<Vec<_>>()
        })
        .map_err(|_| DictError::State("prewarm scope panicked".into()))?;

        results.into_iter().collect()
    }

    pub fn telemetry(&self) -> DictSnapshot {
        DictSnapshot::from(
            self.dict_id,
            self.content.len(),
            self.is_raw,
            self.cached_levels(),
            self.counters.values(),
        )
    }
}

impl<E: DictEngine> fmt::Debug for DictionaryHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryHandle")
            .field("dict_id", &self.dict_id)
            .field("len", &self.content.len())
            .field("is_raw", &self.is_raw)
            .field("cached_levels", &self.cached_levels())
            .finish()
    }
}

impl<E: DictEngine> fmt::Display for DictionaryHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<ZstdDict dict_id={} dict_size={} is_raw={}>",
            self.dict_id,
            self.content.len(),
            self.is_raw
        )
    }
}
