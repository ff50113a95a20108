//! # Semi-global matching
//!
//! This module provides a semi-global matching disparity estimator in the style of
//! ["Stereo Processing by Semiglobal Matching and Mutual Information"](https://doi.org/10.1109/TPAMI.2007.1166),
//! using census and gradient appearance costs and gradient-adaptive smoothness penalties.
//!
//! One call to [`Sgm::compute`] runs the whole pipeline on one image pair:
//!
//! 1. validity mask of the target image,
//! 2. appearance cost volume (census, x-gradient or their weighted fusion),
//! 3. directional smoothing along 8 or 16 scan directions,
//! 4. winner-takes-all disparity with optional sub-pixel refinement,
//! 5. median despeckling,
//! 6. optional left-right consistency check,
//! 7. sign inversion for the reference-to-target convention.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::time::Instant;

use log::{log, Level};
use serde::Deserialize;

use crate::census;
use crate::consistency;
use crate::cost;
use crate::direction::DirectionCount;
use crate::disparity::{DisparityAlgorithm, DisparityMap, StereoFrame};
use crate::error::*;
use crate::extract;
use crate::gradient::{EdgeStrength, Gradients};
use crate::mask;
use crate::smoothing::{self, Penalties};
use crate::volume::CostVolume;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Semi-global matching disparity estimator.
pub struct Sgm {
    params: Params,
    min_disparity: i32,
    invalid_disp: f32,
    pub(crate) volumes: Option<CostVolumes>,
}

/// Cost volumes kept from the last call for diagnostics.
pub(crate) struct CostVolumes {
    pub appearance: CostVolume<u8>,
    pub total: CostVolume<u16>,
}

/// Sign convention of the disparities supplied and returned by the estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum DisparityConvention {
    /// `d = x_ref - x_target`.
    TargetToReference,

    /// `d = x_target - x_ref`, as used by OpenCV.
    ReferenceToTarget,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Number of candidate disparities, at least 1.
    pub num_disparities: usize,

    /// Smallest candidate disparity, in the chosen convention.
    pub min_disparity: i32,

    pub convention: DisparityConvention,

    /// Weight of the census cost, 0 disables it.
    pub census_weight: f32,

    /// Weight of the x-gradient cost, 0 disables it.
    pub xgrad_weight: f32,

    /// Census window diameter, clamped to an odd value in `3..=7`.
    pub census_diameter: usize,

    /// Intensity difference below which a census comparison is not salient.
    pub census_tolerance: u8,

    /// Scale of the small-jump penalty P1.
    pub p1_scale: f32,

    /// Scale of the large-jump penalty P2.
    pub p2_scale: f32,

    pub directions: DirectionCount,

    /// Lower P2 across strong image edges.
    pub use_gradient_weighted_smoothing: bool,

    /// Gradient magnitude at which P2 reaches its minimum.
    pub max_grad: f32,

    pub perform_quadratic_interp: bool,

    pub perform_consistency_check: bool,

    /// Largest integer disagreement accepted by the consistency check.
    pub consistency_tolerance: i32,

    /// Value filling invalid image borders, negative to disable border masking.
    pub border_value: i32,

    /// Log stage timings at info level instead of debug level.
    pub print_timing: bool,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Default for DisparityConvention {
    fn default() -> Self {
        DisparityConvention::TargetToReference
    }
}

impl Default for Params {
    fn default() -> Self {
        Params {
            num_disparities: 64,
            min_disparity: 0,
            convention: DisparityConvention::default(),
            census_weight: 0.3,
            xgrad_weight: 0.7,
            census_diameter: census::MAX_DIAMETER,
            census_tolerance: 2,
            p1_scale: 1.0,
            p2_scale: 1.0,
            directions: DirectionCount::Eight,
            use_gradient_weighted_smoothing: true,
            max_grad: 32.0,
            perform_quadratic_interp: true,
            perform_consistency_check: true,
            consistency_tolerance: 1,
            border_value: -1,
            print_timing: false,
        }
    }
}

impl Sgm {
    /// Create a new estimator. Out-of-range parameters are clamped.
    pub fn new(mut params: Params) -> Self {
        params.num_disparities = params.num_disparities.max(1);
        params.census_diameter = census::clamp_diameter(params.census_diameter);
        params.consistency_tolerance = params.consistency_tolerance.max(0);

        // Internally disparities are always target-to-reference
        let min_disparity = match params.convention {
            DisparityConvention::TargetToReference => params.min_disparity,
            DisparityConvention::ReferenceToTarget => {
                -(params.min_disparity + params.num_disparities as i32 - 1)
            }
        };

        Self {
            params,
            min_disparity,
            invalid_disp: min_disparity as f32 - 1.0,
            volumes: None,
        }
    }

    /// The resolved parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Value given to pixels without a disparity in the output map.
    pub fn invalid_disparity(&self) -> f32 {
        match self.params.convention {
            DisparityConvention::TargetToReference => self.invalid_disp,
            DisparityConvention::ReferenceToTarget => {
                -(self.min_disparity as f32 + self.params.num_disparities as f32)
            }
        }
    }

    fn lap(&self, stage: &str, timer: &mut Instant) {
        let level = if self.params.print_timing {
            Level::Info
        } else {
            Level::Debug
        };

        log!(level, "{}: {:.3}ms", stage, timer.elapsed().as_secs_f64() * 1000.0);
        *timer = Instant::now();
    }
}

impl DisparityAlgorithm for Sgm {
    /// Compute the disparity map of the target image of `frame`.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap> {
        frame.validate()?;

        let p = self.params.clone();
        let nd = p.num_disparities;
        let min_disparity = self.min_disparity;
        let invalid_disp = self.invalid_disp;

        if p.census_weight <= 0.0 && p.xgrad_weight <= 0.0 {
            return Err(Error::NoAppearanceCost);
        }

        self.volumes = None;

        let mut total_timer = Instant::now();
        let mut timer = Instant::now();

        // ---- VALIDITY MASK ----

        let invalid = mask::compute_invalid_map(
            &frame.target,
            &frame.reference,
            p.border_value,
            min_disparity,
            nd,
        );
        self.lap("Invalid map computation", &mut timer);

        // ---- APPEARANCE COST ----

        let grad_tar = if p.use_gradient_weighted_smoothing || p.xgrad_weight > 0.0 {
            Some(Gradients::sobel(&frame.target))
        } else {
            None
        };
        self.lap("Gradient image computation", &mut timer);

        let census_cost = if p.census_weight > 0.0 {
            let (diameter, tolerance) = (p.census_diameter, p.census_tolerance);
            let tar = census::compute_descriptors(&frame.target, diameter, tolerance);
            let refr = census::compute_descriptors(&frame.reference, diameter, tolerance);

            Some(cost::census_cost(&tar, &refr, &invalid, min_disparity, nd, diameter))
        } else {
            None
        };

        let xgrad_cost = match &grad_tar {
            Some(grad_tar) if p.xgrad_weight > 0.0 => {
                let grad_ref = Gradients::sobel(&frame.reference);

                Some(cost::xgrad_cost(&grad_tar.x, &grad_ref.x, &invalid, min_disparity, nd))
            }
            _ => None,
        };
        self.lap("Appearance cost computation", &mut timer);

        let app_cost = match (census_cost, xgrad_cost) {
            (Some(c), Some(g)) => {
                let fused = cost::fuse(&c, p.census_weight, &g, p.xgrad_weight);
                self.lap("Appearance fusion", &mut timer);
                fused
            }
            (Some(c), None) => c,
            (None, Some(g)) => g,
            (None, None) => return Err(Error::NoAppearanceCost),
        };

        // ---- SMOOTHING ----

        let edges = if p.use_gradient_weighted_smoothing {
            grad_tar.as_ref().map(|g| EdgeStrength::new(g, p.max_grad))
        } else {
            None
        };

        let total_cost = smoothing::aggregate(
            &app_cost,
            &invalid,
            edges.as_ref(),
            p.directions.directions(),
            Penalties::from_scales(p.p1_scale, p.p2_scale),
        );
        self.lap("Dynamic programming", &mut timer);

        // ---- DISPARITY EXTRACTION ----

        let (disp, disp_cost) = extract::best_disparities(
            &total_cost,
            &invalid,
            min_disparity,
            invalid_disp,
            p.perform_quadratic_interp,
        );
        let mut disp = extract::median_despeckle(&disp, &invalid, invalid_disp);
        self.lap("Disparity map extraction", &mut timer);

        // ---- POST FILTER ----

        if p.perform_consistency_check {
            let tolerance = p.consistency_tolerance;
            consistency::flag_nonunique(&mut disp, &disp_cost, invalid_disp, tolerance);
        }

        let max_disparity = (min_disparity + nd as i32 - 1) as f32;

        let map = match p.convention {
            DisparityConvention::TargetToReference => DisparityMap::new(
                disp,
                disp_cost,
                invalid_disp,
                min_disparity as f32,
                max_disparity,
            ),
            DisparityConvention::ReferenceToTarget => {
                let new_invalid = self.invalid_disparity();
                consistency::invert_disparities(&mut disp, invalid_disp, new_invalid);

                DisparityMap::new(
                    disp,
                    disp_cost,
                    new_invalid,
                    -max_disparity,
                    -(min_disparity as f32),
                )
            }
        };
        self.lap("Consistency check", &mut timer);
        self.lap("TOTAL TIME", &mut total_timer);

        self.volumes = Some(CostVolumes {
            appearance: app_cost,
            total: total_cost,
        });

        Ok(map)
    }
}
