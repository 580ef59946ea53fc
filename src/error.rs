//! Error type shared by the quantizer, the compositor and the I/O wrappers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArtworkError>;

#[derive(Debug, Error)]
pub enum ArtworkError {
    /// Malformed or empty input handed to one of the pipeline stages.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The call cannot proceed with the given state (e.g. nothing to draw).
    #[error("precondition failed: {reason}")]
    PreconditionFailed { reason: &'static str },

    /// The input bytes are not an image the `image` crate can read.
    #[error("unable to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Writing the rendered canvas as PNG failed.
    #[error("PNG encode error: {0}")]
    Encode(#[source] image::ImageError),
}

impl ArtworkError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
