#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use zstd_dict_core::{
        dictionary::{DictEngine, DictionaryHandle, DigestState},
        types::DictError,
    };

    /// Engine double: counts builds, can fail or stall on demand.
    #[derive(Default)]
    struct CountingEngine {
        built: AtomicUsize,
        decoder_built: AtomicUsize,
        format_checks: AtomicUsize,
        fail_next: AtomicUsize,
        delay: Duration,
    }

    #[derive(Debug)]
    struct FakeDigest {
        level: i32,
        serial: usize,
    }

    impl CountingEngine {
        fn slow(ms: u64) -> Self {
            Self { delay: Duration::from_millis(ms), ..Self::default() }
        }

        fn failing(times: usize) -> Self {
            Self { fail_next: AtomicUsize::new(times), ..Self::default() }
        }

        fn built(&self) -> usize {
            self.built.load(Ordering::SeqCst)
        }
    }

    impl DictEngine for CountingEngine {
        type Digested = FakeDigest;
        type DecoderDigested = FakeDigest;

        fn check_format(&self, content: &[u8], is_raw: bool) -> Result<(), DictError> {
            self.format_checks.fetch_add(1, Ordering::SeqCst);
            if is_raw || content.starts_with(b"DICT") {
                Ok(())
            } else {
                Err(DictError::format("missing DICT tag"))
            }
        }

        fn materialize(&self, _content: &[u8], level: i32) -> Result<FakeDigest, DictError> {
            if self.fail_next.load(Ordering::SeqCst) > 0 {
                self.fail_next.fetch_sub(1, Ordering::SeqCst);
                return Err(DictError::allocation("fake digest"));
            }
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            let serial = self.built.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(FakeDigest { level, serial })
        }

        fn materialize_decoder(&self, _content: &[u8]) -> Result<FakeDigest, DictError> {
            let serial = self.decoder_built.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(FakeDigest { level: 0, serial })
        }
    }

    fn handle(engine: CountingEngine) -> DictionaryHandle<CountingEngine> {
        DictionaryHandle::with_engine(engine, b"DICT trained bytes", false)
    }

    #[test]
    fn construction_touches_no_engine_state() {
        let h = handle(CountingEngine::default());
        assert_eq!(h.engine().format_checks.load(Ordering::SeqCst), 0);
        assert_eq!(h.engine().built(), 0);
    }

    #[test]
    fn repeated_level_materializes_once() {
        let h = handle(CountingEngine::default());
        let a = h.view_digested(3).unwrap();
        let b = h.view_digested(3).unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.artifact().serial, 1);
        assert_eq!(h.engine().built(), 1);
        assert_eq!(h.digested_state(3), DigestState::Cached);
    }

    #[test]
    fn levels_are_independent_entries() {
        let h = handle(CountingEngine::default());
        let l3 = h.view_digested(3).unwrap();
        let l9 = h.view_digested(9).unwrap();
        assert!(!l3.ptr_eq(&l9));
        assert_eq!(l3.artifact().level, 3);
        assert_eq!(l9.artifact().level, 9);

        // Re-reading one level leaves the other untouched.
        assert!(h.view_digested(9).unwrap().ptr_eq(&l9));
        assert!(h.view_digested(3).unwrap().ptr_eq(&l3));
        assert_eq!(h.engine().built(), 2);
    }

    #[test]
    fn allocation_failure_is_retried_by_next_call() {
        let h = handle(CountingEngine::failing(1));

        let err = h.view_digested(5).unwrap_err();
        assert!(matches!(err, DictError::Allocation { .. }));
        assert_eq!(h.digested_state(5), DigestState::Absent);
        assert!(h.cached_levels().is_empty());

        let view = h.view_digested(5).expect("retry should succeed");
        assert_eq!(view.artifact().serial, 1);
        assert_eq!(h.digested_state(5), DigestState::Cached);

        let snapshot = h.telemetry();
        assert_eq!(snapshot.digest_failures, 1);
        assert_eq!(snapshot.digests_built, 1);
    }

    #[test]
    fn format_failure_never_reaches_materialize() {
        let h = DictionaryHandle::with_engine(CountingEngine::default(), b"no tag here", false);
        assert!(matches!(h.view_digested(1), Err(DictError::Format { .. })));
        assert!(matches!(h.view_digested(2), Err(DictError::Format { .. })));
        assert_eq!(h.engine().built(), 0);
        assert_eq!(h.engine().format_checks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_callers_share_one_build() {
        let h = Arc::new(handle(CountingEngine::slow(20)));

        let views: Vec<_> = thread::scope(|s| {
            let workers: Vec<_> = (0..8).map(|_| s.spawn(|| h.view_digested(4).unwrap())).collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(views.len(), 8);
        assert_eq!(h.engine().built(), 1);
        assert!(views.iter().all(|v| v.ptr_eq(&views[0])));

        let snapshot = h.telemetry();
        assert_eq!(snapshot.digests_built, 1);
        assert_eq!(snapshot.digest_hits, 7);
    }

    #[test]
    fn cached_level_stays_visible_during_hits() {
        let h = handle(CountingEngine::default());
        h.view_digested(3).unwrap();
        let stop = AtomicBool::new(false);

        let misses = thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    while !stop.load(Ordering::Relaxed) {
                        h.view_digested(3).unwrap();
                    }
                });
            }
            let misses = (0..20_000)
                .filter(|_| h.digested_state(3) != DigestState::Cached || h.cached_levels() != [3])
                .count();
            stop.store(true, Ordering::Relaxed);
            misses
        });

        assert_eq!(misses, 0);
        assert_eq!(h.engine().built(), 1);
        assert!(h.telemetry().sanity_check());
    }

    #[test]
    fn undigested_and_prefix_skip_the_engine() {
        let h = handle(CountingEngine::default());
        h.view_undigested().unwrap();
        h.view_prefix();
        assert_eq!(h.engine().built(), 0);
        assert!(h.cached_levels().is_empty());
    }

    #[test]
    fn decoder_digest_is_separate_from_level_cache() {
        let h = handle(CountingEngine::default());
        let d1 = h.decoder_digest().unwrap();
        let d2 = h.decoder_digest().unwrap();
        assert!(d1.ptr_eq(&d2));
        assert_eq!(h.engine().decoder_built.load(Ordering::SeqCst), 1);
        assert_eq!(h.engine().built(), 0);
    }

    #[test]
    fn prewarm_builds_each_level_once() {
        let h = handle(CountingEngine::slow(5));
        h.prewarm_digested(&[1, 3, 5, 3]).unwrap();
        assert_eq!(h.cached_levels(), vec![1, 3, 5]);
        assert_eq!(h.engine().built(), 3);
    }

    #[test]
    fn prewarm_reports_format_error() {
        let h = DictionaryHandle::with_engine(CountingEngine::default(), b"untagged", false);
        let err = h.prewarm_digested(&[1, 2]).unwrap_err();
        assert!(matches!(err, DictError::Format { .. }));
        assert!(h.cached_levels().is_empty());
    }
}
