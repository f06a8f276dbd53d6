//! Common code shared between `classifier` and `image_sender`.
pub mod protocol;

/// Error type.
pub type Error = Box<dyn std::error::Error>;
