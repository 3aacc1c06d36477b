use crate::foundation::error::{SlidecueError, SlidecueResult};
use crate::scene::model::{PresentationDef, SlideMetadata};
use crate::scene::validate::validate_presentation;
use crate::timing::calculator::{DurationCalculator, PresentationDurationReport};
use crate::timing::config::{ResolvedTiming, TimingConfig};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Authored presentation: ordered slides plus optional presentation-level timing.
///
/// This is the JSON-facing representation handed over by the authoring tool. It is read-only once
/// loaded; duration reports and playback plans are derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    def: PresentationDef,
}

impl Presentation {
    /// Build a presentation from slides in memory.
    pub fn new(slides: Vec<SlideMetadata>, timing: Option<TimingConfig>) -> Self {
        Self {
            def: PresentationDef {
                id: None,
                title: None,
                timing,
                slides,
            },
        }
    }

    /// Parse a presentation from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SlidecueResult<Self> {
        let def: PresentationDef = serde_json::from_reader(r)
            .map_err(|e| SlidecueError::validation(format!("parse presentation JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a presentation from a JSON string.
    pub fn from_json_str(s: &str) -> SlidecueResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a presentation from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SlidecueResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SlidecueError::validation(format!("open presentation JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize back to pretty JSON.
    pub fn to_json_pretty(&self) -> SlidecueResult<String> {
        serde_json::to_string_pretty(&self.def)
            .map_err(|e| SlidecueError::serde(format!("serialize presentation: {e}")))
    }

    /// Check authoring rules. Advisory: calculators and the clock accept unvalidated input.
    pub fn validate(&self) -> SlidecueResult<()> {
        validate_presentation(&self.def)
            .map_err(|e| SlidecueError::validation(format!("presentation validation failed:\n{e}")))
    }

    /// Optional presentation id.
    pub fn id(&self) -> Option<&str> {
        self.def.id.as_deref()
    }

    /// Optional display title.
    pub fn title(&self) -> Option<&str> {
        self.def.title.as_deref()
    }

    /// Presentation-level timing overrides.
    pub fn timing(&self) -> Option<&TimingConfig> {
        self.def.timing.as_ref()
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[SlideMetadata] {
        &self.def.slides
    }

    /// Duration report over the given global defaults.
    pub fn duration_report(&self, defaults: &ResolvedTiming) -> PresentationDurationReport {
        DurationCalculator::new(*defaults).presentation_duration(self.slides(), self.timing())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/presentation.rs"]
mod tests;
