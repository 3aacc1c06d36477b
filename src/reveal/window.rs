use serde::{Deserialize, Serialize};

/// Progressive reveal keyed on the current segment index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SegmentWindow {
    /// Visible only while segment `on` is current.
    On {
        /// Segment index.
        on: usize,
    },
    /// Visible from segment `from` through segment `until` (inclusive), or onwards.
    Span {
        /// First segment index.
        from: usize,
        /// Last segment index, inclusive.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        until: Option<usize>,
    },
}

impl SegmentWindow {
    /// Window for a single segment.
    pub fn on(index: usize) -> Self {
        Self::On { on: index }
    }

    /// Window starting at `from`, optionally ending at `until`.
    pub fn span(from: usize, until: Option<usize>) -> Self {
        if let Some(u) = until
            && u < from
        {
            tracing::warn!(from, until = u, "segment window ends before it starts, never visible");
        }
        Self::Span { from, until }
    }

    /// Whether the window is visible while `current` is the active segment index.
    pub fn is_visible(self, current: usize) -> bool {
        match self {
            Self::On { on } => current == on,
            Self::Span { from, until } => current >= from && until.is_none_or(|u| current <= u),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/window.rs"]
mod tests;
