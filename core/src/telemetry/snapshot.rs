//! telemetry/snapshot.rs
//!
//! Immutable snapshot of a dictionary handle: identity, cache contents and
//! counters, flattened into primitive fields for JSON and the bindings.

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::CounterValues;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictSnapshot {
    pub dict_id: u32,
    pub dict_size: usize,
    pub is_raw: bool,
    pub cached_levels: Vec<i32>,
    pub format_checks: u64,
    pub digests_built: u64,
    pub digest_hits: u64,
    pub digest_failures: u64,
    pub decoder_digests_built: u64,
    pub undigested_loads: u64,
    pub prefix_loads: u64,
}

impl DictSnapshot {
    pub fn from(
        dict_id: u32,
        dict_size: usize,
        is_raw: bool,
        cached_levels: Vec<i32>,
        counters: CounterValues,
    ) -> Self {
        Self {
            dict_id,
            dict_size,
            is_raw,
            cached_levels,
            format_checks: counters.format_checks,
            digests_built: counters.digests_built,
            digest_hits: counters.digest_hits,
            digest_failures: counters.digest_failures,
            decoder_digests_built: counters.decoder_digests_built,
            undigested_loads: counters.undigested_loads,
            prefix_loads: counters.prefix_loads,
        }
    }

    /// Share of successful digested lookups served from the cache.
    pub fn digest_hit_ratio(&self) -> f64 {
        let lookups = self.digests_built + self.digest_hits;
        if lookups == 0 {
            0.0
        } else {
            self.digest_hits as f64 / lookups as f64
        }
    }

    // Every level in the cache was built exactly once.
    pub fn sanity_check(&self) -> bool {
        self.digests_built == self.cached_levels.len() as u64
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
