//! Delay configuration hierarchy and duration reports.
//!
//! Delays are authored in milliseconds at four levels (segment, slide, presentation, global
//! defaults). [`resolve_timing`] merges them field by field; the calculator turns the result into
//! per-segment, per-slide and whole-presentation durations in seconds.

pub(crate) mod calculator;
pub(crate) mod config;
