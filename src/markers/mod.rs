//! Narration markers: inline syntax, alignment data and per-segment offset index.

pub(crate) mod alignment;
pub(crate) mod index;
pub(crate) mod parse;
