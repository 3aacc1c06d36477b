use crate::markers::parse::parse_markers;
use crate::scene::model::{AudioSegment, MarkerRange, PresentationDef, SegmentId, SlideMetadata};
use crate::timing::config::TimingConfig;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaError {
    pub(crate) path: Vec<SchemaPathElem>,
    pub(crate) message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaErrors {
    pub(crate) errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

pub(crate) fn validate_presentation(def: &PresentationDef) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();
    let mut path = Vec::new();

    if let Some(timing) = &def.timing {
        path.push(SchemaPathElem::Field("timing"));
        validate_timing(timing, &mut path, &mut errors);
        path.pop();
    }

    let mut coords = HashSet::new();
    path.push(SchemaPathElem::Field("slides"));
    for (i, slide) in def.slides.iter().enumerate() {
        path.push(SchemaPathElem::Index(i));
        if !coords.insert((slide.chapter, slide.slide)) {
            errors.push(SchemaError::at(
                &path,
                format!(
                    "duplicate slide coordinates chapter {} slide {}",
                    slide.chapter, slide.slide
                ),
            ));
        }
        validate_slide(slide, &mut path, &mut errors);
        path.pop();
    }
    path.pop();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

fn validate_slide(
    slide: &SlideMetadata,
    path: &mut Vec<SchemaPathElem>,
    errors: &mut Vec<SchemaError>,
) {
    if slide.title.trim().is_empty() {
        path.push(SchemaPathElem::Field("title"));
        errors.push(SchemaError::at(path, "title must be non-empty"));
        path.pop();
    }

    if let Some(timing) = &slide.timing {
        path.push(SchemaPathElem::Field("timing"));
        validate_timing(timing, path, errors);
        path.pop();
    }

    path.push(SchemaPathElem::Field("ranges"));
    validate_ranges(&slide.ranges, path, errors);
    path.pop();

    let mut seen: HashSet<&SegmentId> = HashSet::new();
    path.push(SchemaPathElem::Field("audioSegments"));
    for (j, seg) in slide.audio_segments.iter().enumerate() {
        path.push(SchemaPathElem::Index(j));
        if !seen.insert(&seg.id) {
            path.push(SchemaPathElem::Field("id"));
            errors.push(SchemaError::at(
                path,
                format!("duplicate segment id '{}'", seg.id),
            ));
            path.pop();
        }
        validate_segment(j, seg, path, errors);
        path.pop();
    }
    path.pop();
}

fn validate_segment(
    position: usize,
    seg: &AudioSegment,
    path: &mut Vec<SchemaPathElem>,
    errors: &mut Vec<SchemaError>,
) {
    if let SegmentId::Index(n) = seg.id
        && n != position as u64
    {
        path.push(SchemaPathElem::Field("id"));
        errors.push(SchemaError::at(
            path,
            format!("numeric id {n} does not match segment position {position}"),
        ));
        path.pop();
    }
    if let SegmentId::Name(name) = &seg.id
        && name.trim().is_empty()
    {
        path.push(SchemaPathElem::Field("id"));
        errors.push(SchemaError::at(path, "id must be non-empty"));
        path.pop();
    }

    if let Some(p) = &seg.audio_file_path
        && p.trim().is_empty()
    {
        path.push(SchemaPathElem::Field("audioFilePath"));
        errors.push(SchemaError::at(
            path,
            "audioFilePath must be non-empty when present",
        ));
        path.pop();
    }

    if let Some(d) = seg.duration
        && (!d.is_finite() || d < 0.0)
    {
        path.push(SchemaPathElem::Field("duration"));
        errors.push(SchemaError::at(
            path,
            format!("duration must be finite and >= 0 (got {d})"),
        ));
        path.pop();
    }

    if let Some(timing) = &seg.timing {
        path.push(SchemaPathElem::Field("timing"));
        validate_timing(timing, path, errors);
        path.pop();
    }

    path.push(SchemaPathElem::Field("markers"));
    for (k, m) in seg.markers.iter().enumerate() {
        if m.trim().is_empty() {
            path.push(SchemaPathElem::Index(k));
            errors.push(SchemaError::at(path, "marker name must be non-empty"));
            path.pop();
        }
    }
    path.pop();

    if let Some(text) = &seg.narration_text {
        let parsed = parse_markers(text);
        let mut ids = HashSet::new();
        for m in &parsed.markers {
            if !ids.insert(m.id.as_str()) {
                path.push(SchemaPathElem::Field("narrationText"));
                errors.push(SchemaError::at(
                    path,
                    format!("marker '{}' appears more than once", m.id),
                ));
                path.pop();
            }
        }
    }

    path.push(SchemaPathElem::Field("ranges"));
    validate_ranges(&seg.ranges, path, errors);
    path.pop();
}

fn validate_ranges(
    ranges: &[MarkerRange],
    path: &mut Vec<SchemaPathElem>,
    errors: &mut Vec<SchemaError>,
) {
    for (i, r) in ranges.iter().enumerate() {
        path.push(SchemaPathElem::Index(i));
        if r.name.trim().is_empty() {
            path.push(SchemaPathElem::Field("name"));
            errors.push(SchemaError::at(path, "range name must be non-empty"));
            path.pop();
        }
        if r.from.trim().is_empty() {
            path.push(SchemaPathElem::Field("from"));
            errors.push(SchemaError::at(path, "range start marker must be non-empty"));
            path.pop();
        }
        if let Some(until) = &r.until
            && until.trim().is_empty()
        {
            path.push(SchemaPathElem::Field("until"));
            errors.push(SchemaError::at(path, "range end marker must be non-empty"));
            path.pop();
        }
        path.pop();
    }
}

fn validate_timing(
    timing: &TimingConfig,
    path: &mut Vec<SchemaPathElem>,
    errors: &mut Vec<SchemaError>,
) {
    for (name, v) in timing.defined_fields() {
        if !v.is_finite() || v < 0.0 {
            path.push(SchemaPathElem::Field(name));
            errors.push(SchemaError::at(
                path,
                format!("delay must be finite and >= 0 ms (got {v})"),
            ));
            path.pop();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/validate.rs"]
mod tests;
