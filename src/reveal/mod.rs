//! Reveal state derived from the playback position: reached markers, active ranges, segment
//! windows.

pub(crate) mod evaluate;
pub(crate) mod window;
