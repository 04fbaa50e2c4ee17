//! dictionary/views.rs
//! Read-only views handed from a dictionary handle to compression sessions.

use std::fmt;
use std::sync::Arc;

use num_enum::TryFromPrimitive;

use crate::constants::mode_ids;

/// How a session loads the dictionary.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum DictMode {
    Digested   = mode_ids::DIGESTED,
    Undigested = mode_ids::UNDIGESTED,
    Prefix     = mode_ids::PREFIX,
}

impl fmt::Display for DictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DictMode::Digested => "digested",
            DictMode::Undigested => "undigested",
            DictMode::Prefix => "prefix",
        };
        f.write_str(name)
    }
}

/// A cached digested artifact.
///
/// Loading a digested dictionary into a compressor lets the parameters
/// compiled into it override some of the compressor's advanced parameters.
/// Two views of the same cache entry are [`ptr_eq`](Self::ptr_eq).
pub struct DigestedDict<D> {
    level: Option<i32>,
    artifact: Arc<D>,
}

impl<D> DigestedDict<D> {
    pub(crate) fn new(level: Option<i32>, artifact: Arc<D>) -> Self {
        Self { level, artifact }
    }

    /// Compression level the artifact was compiled for; `None` for decoder digests.
    pub fn level(&self) -> Option<i32> {
        self.level
    }

    pub fn artifact(&self) -> &D {
        &self.artifact
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.artifact, &other.artifact)
    }
}

impl<D> Clone for DigestedDict<D> {
    fn clone(&self) -> Self {
        Self { level: self.level, artifact: Arc::clone(&self.artifact) }
    }
}

impl<D> fmt::Debug for DigestedDict<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestedDict").field("level", &self.level).finish_non_exhaustive()
    }
}

/// Raw content loaded fresh by the engine on every use.
/// Never overrides the compressor's advanced parameters.
#[derive(Clone, Debug)]
pub struct UndigestedDict {
    content: Arc<[u8]>,
}

impl UndigestedDict {
    pub(crate) fn new(content: Arc<[u8]>) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Content referenced as a prefix for exactly one frame.
/// Decompression must be given the same bytes.
#[derive(Clone, Debug)]
pub struct PrefixDict {
    content: Arc<[u8]>,
}

impl PrefixDict {
    pub(crate) fn new(content: Arc<[u8]>) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// One of the three views, as accepted by sessions.
pub enum DictView<D> {
    Digested(DigestedDict<D>),
    Undigested(UndigestedDict),
    Prefix(PrefixDict),
}

impl<D> DictView<D> {
    pub fn mode(&self) -> DictMode {
        match self {
            DictView::Digested(_) => DictMode::Digested,
            DictView::Undigested(_) => DictMode::Undigested,
            DictView::Prefix(_) => DictMode::Prefix,
        }
    }
}

impl<D> Clone for DictView<D> {
    fn clone(&self) -> Self {
        match self {
            DictView::Digested(d) => DictView::Digested(d.clone()),
            DictView::Undigested(u) => DictView::Undigested(u.clone()),
            DictView::Prefix(p) => DictView::Prefix(p.clone()),
        }
    }
}

impl<D> fmt::Debug for DictView<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictView::Digested(d) => f.debug_tuple("Digested").field(d).finish(),
            DictView::Undigested(u) => f.debug_tuple("Undigested").field(u).finish(),
            DictView::Prefix(p) => f.debug_tuple("Prefix").field(p).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_tags_are_stable() {
        assert_eq!(DictMode::Digested as u8, 0);
        assert_eq!(DictMode::Undigested as u8, 1);
        assert_eq!(DictMode::Prefix as u8, 2);
        assert_eq!(DictMode::try_from(2u8).unwrap(), DictMode::Prefix);
        assert!(DictMode::try_from(3u8).is_err());
    }

    #[test]
    fn cloned_digest_shares_artifact() {
        let view = DigestedDict::new(Some(3), Arc::new(17u32));
        let copy = view.clone();
        assert!(view.ptr_eq(&copy));
        assert_eq!(copy.level(), Some(3));

        let other = DigestedDict::new(Some(3), Arc::new(17u32));
        assert!(!view.ptr_eq(&other));
    }

    #[test]
    fn view_reports_mode() {
        let content: Arc<[u8]> = Arc::from(&b"abc"[..]);
        let view: DictView<u32> = DictView::Prefix(PrefixDict::new(content));
        assert_eq!(view.mode(), DictMode::Prefix);
        assert_eq!(view.mode().to_string(), "prefix");
    }
}
