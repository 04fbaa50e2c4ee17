//! telemetry/counters.rs
//! Live counters owned by a dictionary handle.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by view accessors.
#[derive(Debug, Default)]
pub struct DictCounters {
    format_checks: AtomicU64,
    digests_built: AtomicU64,
    digest_hits: AtomicU64,
    digest_failures: AtomicU64,
    decoder_digests_built: AtomicU64,
    undigested_loads: AtomicU64,
    prefix_loads: AtomicU64,
}

/// Plain copy of [`DictCounters`] at one instant.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterValues {
    pub format_checks: u64,
    pub digests_built: u64,
    pub digest_hits: u64,
    pub digest_failures: u64,
    pub decoder_digests_built: u64,
    pub undigested_loads: u64,
    pub prefix_loads: u64,
}

impl DictCounters {
    pub fn record_format_check(&self) {
        self.format_checks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a digested lookup: `built` is true when it materialised the artifact.
    pub fn record_digest(&self, built: bool) {
        let counter = if built { &self.digests_built } else { &self.digest_hits };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_digest_failure(&self) {
        self.digest_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decoder_digest(&self) {
        self.decoder_digests_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_undigested(&self) {
        self.undigested_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prefix(&self) {
        self.prefix_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn values(&self) -> CounterValues {
        CounterValues {
            format_checks: self.format_checks.load(Ordering::Relaxed),
            digests_built: self.digests_built.load(Ordering::Relaxed),
            digest_hits: self.digest_hits.load(Ordering::Relaxed),
            digest_failures: self.digest_failures.load(Ordering::Relaxed),
            decoder_digests_built: self.decoder_digests_built.load(Ordering::Relaxed),
            undigested_loads: self.undigested_loads.load(Ordering::Relaxed),
            prefix_loads: self.prefix_loads.load(Ordering::Relaxed),
        }
    }
}
