use crate::foundation::error::{SlidecueError, SlidecueResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Partial delay configuration in milliseconds.
///
/// `None` means "inherit from the next outer level". Values are accepted as authored, including
/// negatives; conversion to seconds clamps them later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingConfig {
    /// Gap after a segment that is not the last of its slide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub between_segments: Option<f64>,
    /// Gap after the last segment of a non-final slide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub between_slides: Option<f64>,
    /// Gap after the last segment of the final slide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_final_slide: Option<f64>,
    /// Silence before the first segment of narrated playback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_first_slide: Option<f64>,
}

impl TimingConfig {
    /// Config with every field unset.
    pub const EMPTY: Self = Self {
        between_segments: None,
        between_slides: None,
        after_final_slide: None,
        before_first_slide: None,
    };

    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Iterate the defined fields as `(camelCase name, value)`.
    pub(crate) fn defined_fields(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("betweenSegments", self.between_segments),
            ("betweenSlides", self.between_slides),
            ("afterFinalSlide", self.after_final_slide),
            ("beforeFirstSlide", self.before_first_slide),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name, v)))
    }
}

/// Fully populated delay configuration in milliseconds.
///
/// Serves both as the global-defaults level and as the output of [`resolve_timing`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTiming {
    /// Gap after a segment that is not the last of its slide.
    pub between_segments: f64,
    /// Gap after the last segment of a non-final slide.
    pub between_slides: f64,
    /// Gap after the last segment of the final slide.
    pub after_final_slide: f64,
    /// Silence before the first segment of narrated playback.
    pub before_first_slide: f64,
}

impl ResolvedTiming {
    /// Built-in global defaults.
    pub const DEFAULT: Self = Self {
        between_segments: 500.0,
        between_slides: 1000.0,
        after_final_slide: 2000.0,
        before_first_slide: 0.0,
    };

    /// Overlay the defined fields of `cfg` on top of `self`.
    pub fn merged(self, cfg: &TimingConfig) -> Self {
        Self {
            between_segments: cfg.between_segments.unwrap_or(self.between_segments),
            between_slides: cfg.between_slides.unwrap_or(self.between_slides),
            after_final_slide: cfg.after_final_slide.unwrap_or(self.after_final_slide),
            before_first_slide: cfg.before_first_slide.unwrap_or(self.before_first_slide),
        }
    }

    /// Parse global defaults from JSON. Missing fields keep the built-in defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> SlidecueResult<Self> {
        let partial: TimingConfig = serde_json::from_reader(r)
            .map_err(|e| SlidecueError::validation(format!("parse timing defaults JSON: {e}")))?;
        Ok(Self::DEFAULT.merged(&partial))
    }

    /// Parse global defaults from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SlidecueResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SlidecueError::validation(format!("open timing defaults '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

impl Default for ResolvedTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Resolve the effective delays for one decision point.
///
/// Each field independently takes the first defined value scanning segment, slide, presentation
/// and finally `defaults`. A level that defines only some fields does not mask the others.
pub fn resolve_timing(
    defaults: &ResolvedTiming,
    demo: Option<&TimingConfig>,
    slide: Option<&TimingConfig>,
    segment: Option<&TimingConfig>,
) -> ResolvedTiming {
    let levels = [segment, slide, demo];
    let pick = |field: fn(&TimingConfig) -> Option<f64>, fallback: f64| {
        levels
            .iter()
            .flatten()
            .find_map(|cfg| field(cfg))
            .unwrap_or(fallback)
    };

    ResolvedTiming {
        between_segments: pick(|c| c.between_segments, defaults.between_segments),
        between_slides: pick(|c| c.between_slides, defaults.between_slides),
        after_final_slide: pick(|c| c.after_final_slide, defaults.after_final_slide),
        before_first_slide: pick(|c| c.before_first_slide, defaults.before_first_slide),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/config.rs"]
mod tests;
