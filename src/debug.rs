//! # Cost volume inspection
//!
//! Renders the cost volumes of the last [`Sgm`](crate::sgm::Sgm) call as one greyscale image per
//! candidate disparity. Dark pixels are good matches.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::Path;

use image::{GrayImage, Luma};

use crate::error::*;
use crate::sgm::Sgm;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Scale bringing accumulated costs into byte range.
const TOTAL_COST_SCALE: f32 = 0.25;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Which cost volume to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CostSlice {
    /// The appearance cost fed into the smoothing engine.
    Appearance,

    /// The accumulated cost summed over all directions, scaled by 1/4.
    Total,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Sgm {
    /// One image per candidate disparity, in increasing disparity order.
    pub fn cost_slices(&self, kind: CostSlice) -> Result<Vec<GrayImage>> {
        let volumes = self.volumes.as_ref().ok_or(Error::NoCostVolume)?;

        let (w, h, nd) = (
            volumes.total.width() as u32,
            volumes.total.height() as u32,
            volumes.total.num_disparities(),
        );

        let slices = (0..nd)
            .map(|d| {
                GrayImage::from_fn(w, h, |x, y| {
                    let (x, y) = (x as usize, y as usize);

                    let val = match kind {
                        CostSlice::Appearance => volumes.appearance.get(x, y, d),
                        CostSlice::Total => {
                            (TOTAL_COST_SCALE * volumes.total.get(x, y, d) as f32).min(255.0) as u8
                        }
                    };

                    Luma([val])
                })
            })
            .collect();

        Ok(slices)
    }

    /// Write the cost slices into `dir` as `000.png`, `001.png`, ...
    pub fn write_cost_slices<P: AsRef<Path>>(&self, dir: P, kind: CostSlice) -> Result<()> {
        let slices = self.cost_slices(kind)?;

        std::fs::create_dir_all(dir.as_ref())?;

        for (d, slice) in slices.iter().enumerate() {
            slice.save(dir.as_ref().join(format!("{:03}.png", d)))?;
        }

        Ok(())
    }
}
