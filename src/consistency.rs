//! # Consistency checking
//!
//! A left-right check without a second matching pass. For each row the forward disparities are
//! inverted into a map from reference column to the cheapest target pixel landing on it; target
//! pixels that do not win their reference column (within a tolerance) are occluded or ambiguous
//! and are invalidated.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use rayon::prelude::*;

use crate::extract::INVALID_COST;
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Invalidate disparities without a consistent inverse mapping.
///
/// A pixel at `x` with disparity `d` is kept if the inverse disparity recorded at `x + floor(d)`
/// or at `x + ceil(d)` is within `tolerance` of the corresponding integer disparity. Pixels whose
/// floor or ceil column falls outside the image are kept as they are.
pub fn flag_nonunique(disp: &mut Plane<f32>, cost: &Plane<u16>, invalid_disp: f32, tolerance: i32) {
    let width = disp.width();

    if width == 0 {
        return;
    }

    disp.as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let mut inv_cost = vec![INVALID_COST; width];
            let mut inv_disp: Vec<Option<i32>> = vec![None; width];

            // Inverse disparity map of this row
            for x in 0..width {
                if row[x] == invalid_disp {
                    continue;
                }

                let d = (row[x] + 0.5).floor() as i32;
                let x_ref = x as i32 + d;

                if x_ref < 0 || x_ref >= width as i32 {
                    continue;
                }

                let c = cost.get(x, y);
                if inv_cost[x_ref as usize] > c {
                    inv_cost[x_ref as usize] = c;
                    inv_disp[x_ref as usize] = Some(d);
                }
            }

            let agrees = |x_ref: i32, d: i32| match inv_disp[x_ref as usize] {
                Some(inv) => (inv - d).abs() <= tolerance,
                None => false,
            };

            for x in 0..width {
                if row[x] == invalid_disp {
                    continue;
                }

                let d_floor = row[x].floor() as i32;
                let d_ceil = row[x].ceil() as i32;
                let x_floor = x as i32 + d_floor;
                let x_ceil = x as i32 + d_ceil;

                if x_floor < 0 || x_ceil < 0 || x_floor >= width as i32 || x_ceil >= width as i32 {
                    continue;
                }

                if !agrees(x_floor, d_floor) && !agrees(x_ceil, d_ceil) {
                    row[x] = invalid_disp;
                }
            }
        });
}

/// Negate every valid disparity and move the sentinel to `new_invalid`.
pub fn invert_disparities(disp: &mut Plane<f32>, invalid_disp: f32, new_invalid: f32) {
    for v in disp.as_mut_slice() {
        *v = if *v == invalid_disp { new_invalid } else { -*v };
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
