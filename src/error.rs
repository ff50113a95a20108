//! # Error standards
//!
//! This module provides a standardised error enum and result type for this crate.

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Standard result type used in the sgm crate.
pub type Result<T> = std::result::Result<T, Error>;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Target image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error(
        "Target image is {target_width}x{target_height} but reference image is \
        {reference_width}x{reference_height}"
    )]
    DimensionMismatch {
        target_width: u32,
        target_height: u32,
        reference_width: u32,
        reference_height: u32,
    },

    #[error("No appearance cost is enabled, census and gradient weights are both zero")]
    NoAppearanceCost,

    #[error("No cost volume is available, compute a disparity map first")]
    NoCostVolume,

    #[error("Failed to create output directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write cost slice image: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "statistics")]
    #[error("Failed to plot statistics: {0}")]
    Statistics(String),
}
