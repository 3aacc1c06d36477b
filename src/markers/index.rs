use crate::foundation::core::secs_to_ms;
use crate::markers::alignment::{AlignedWord, SegmentAlignment};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Resolved marker: name and offset from segment start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerEntry {
    /// Marker name.
    pub name: String,
    /// Offset from segment start in milliseconds.
    pub offset_ms: u64,
}

/// Word span in milliseconds, `[start_ms, end_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    /// Inclusive start.
    pub start_ms: u64,
    /// Exclusive end.
    pub end_ms: u64,
}

/// Immutable marker name → offset lookup for one segment.
///
/// Entries keep authored order even when offsets are not monotonic. For a repeated name the first
/// entry wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerIndex {
    entries: SmallVec<[MarkerEntry; 8]>,
    by_name: HashMap<String, usize>,
    words: Vec<WordSpan>,
}

impl MarkerIndex {
    /// Index with no markers and no words.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(name, offset_ms)` pairs in authored order.
    pub fn build<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut out = Self::default();
        let mut last = 0u64;
        for (name, offset_ms) in markers {
            let name = name.into();
            if out.by_name.contains_key(&name) {
                tracing::debug!(marker = %name, "duplicate marker name, keeping first");
                continue;
            }
            if offset_ms < last {
                tracing::warn!(
                    marker = %name,
                    offset_ms,
                    previous_ms = last,
                    "marker timestamps out of order, keeping authored order"
                );
            }
            last = last.max(offset_ms);
            out.by_name.insert(name.clone(), out.entries.len());
            out.entries.push(MarkerEntry { name, offset_ms });
        }
        out
    }

    /// Build from a segment's alignment data, resolving inline markers from `narration` when the
    /// aligner did not.
    pub fn from_alignment(alignment: &SegmentAlignment, narration: Option<&str>) -> Self {
        let markers = alignment.markers_for(narration);
        Self::build(markers.into_iter().map(|m| (m.id, secs_to_ms(m.time))))
            .with_words(&alignment.words)
    }

    /// Attach word spans used for word highlighting.
    pub fn with_words(mut self, words: &[AlignedWord]) -> Self {
        self.words = words
            .iter()
            .map(|w| WordSpan {
                start_ms: secs_to_ms(w.start),
                end_ms: secs_to_ms(w.end),
            })
            .collect();
        self
    }

    /// Offset of `name`, or `None` when the marker was never resolved.
    pub fn lookup(&self, name: &str) -> Option<u64> {
        self.by_name.get(name).map(|&i| self.entries[i].offset_ms)
    }

    /// `true` when `name` has a resolved offset.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Entries in authored order.
    pub fn entries(&self) -> &[MarkerEntry] {
        &self.entries
    }

    /// Word spans in spoken order.
    pub fn words(&self) -> &[WordSpan] {
        &self.words
    }

    /// Number of distinct markers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no marker is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the word spoken at `offset_ms` (`start <= t < end`).
    pub fn word_at(&self, offset_ms: u64) -> Option<usize> {
        self.words
            .iter()
            .position(|w| w.start_ms <= offset_ms && offset_ms < w.end_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/markers/index.rs"]
mod tests;
