//! # Semi-global stereo matching
//!
//! This crate computes dense disparity maps from rectified greyscale stereo pairs using
//! semi-global matching.
//!
//! ```no_run
//! use cv_sgm::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = StereoFrame::from_dynamic(&image::open("left.png")?, &image::open("right.png")?);
//!
//! let mut sgm = Sgm::new(Params {
//!     min_disparity: -32,
//!     num_disparities: 64,
//!     ..Params::default()
//! });
//!
//! let disp = sgm.compute(&frame)?;
//! disp.to_luma_normalised().save("disparity.png")?;
//! # Ok(())
//! # }
//! ```

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod census;
pub mod consistency;
pub mod cost;
mod debug;
pub mod direction;
mod disparity;
mod error;
pub mod extract;
pub mod gradient;
pub mod mask;
pub mod plane;
pub mod sgm;
pub mod smoothing;
#[cfg(feature = "statistics")]
pub mod statistics;
pub mod volume;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use crate::error::{Error, Result};

pub mod prelude {
    pub use crate::debug::CostSlice;
    pub use crate::direction::DirectionCount;
    pub use crate::disparity::{DisparityAlgorithm, DisparityMap, StereoFrame};
    pub use crate::plane::Plane;
    pub use crate::sgm::{DisparityConvention, Params, Sgm};
}
