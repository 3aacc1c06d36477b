/// Crate-wide result alias.
pub type SlidecueResult<T> = Result<T, SlidecueError>;

/// Errors surfaced to callers.
///
/// Degraded data (missing markers, absent audio, out-of-order timestamps) is never reported
/// through this type; it is logged and recovered locally.
#[derive(thiserror::Error, Debug)]
pub enum SlidecueError {
    /// Authored input failed to load or violates a structural rule.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rejected playback command (bad seek target, mode change while running).
    #[error("playback error: {0}")]
    Playback(String),

    /// Alignment data could not be loaded or addressed.
    #[error("alignment error: {0}")]
    Alignment(String),

    /// Report or model (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecueError {
    /// Build a [`SlidecueError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlidecueError::Playback`].
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`SlidecueError::Alignment`].
    pub fn alignment(msg: impl Into<String>) -> Self {
        Self::Alignment(msg.into())
    }

    /// Build a [`SlidecueError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
