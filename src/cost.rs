//! # Appearance cost volumes
//!
//! Builds the per-pixel, per-disparity matching cost between the target and reference images.
//! Two cues are available, census hamming distance and x-gradient difference, and each is
//! normalised into a byte so they can be fused by a weighted sum.
//!
//! Disparities follow the target-to-reference convention: target pixel `x` at disparity `d`
//! matches reference pixel `x + d`.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use rayon::prelude::*;

use crate::census::Descriptor;
use crate::plane::Plane;
use crate::volume::CostVolume;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Cost of a typical mismatch; penalties are expressed in multiples of it.
pub const COST_UNIT: f32 = 64.0;

/// Cost of a cell that cannot be compared.
pub const MAX_COST: u8 = 255;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Census cost volume. The hamming distance is scaled so that differing in one eighth of the
/// window comparisons costs one [`COST_UNIT`].
pub fn census_cost(
    tar: &Plane<Descriptor>,
    refr: &Plane<Descriptor>,
    invalid: &Plane<bool>,
    min_disparity: i32,
    num_disparities: usize,
    diameter: usize,
) -> CostVolume<u8> {
    let norm = 8.0 * COST_UNIT / (diameter * diameter) as f32;

    fill_volume(invalid, min_disparity, num_disparities, |x, x2, y| {
        norm * tar.get(x, y).distance(&refr.get(x2, y)) as f32
    })
}

/// Gradient cost volume from the normalised x-gradients of both images.
pub fn xgrad_cost(
    grad_x_tar: &Plane<f32>,
    grad_x_ref: &Plane<f32>,
    invalid: &Plane<bool>,
    min_disparity: i32,
    num_disparities: usize,
) -> CostVolume<u8> {
    let norm = COST_UNIT / 8.0;

    fill_volume(invalid, min_disparity, num_disparities, |x, x2, y| {
        norm * (grad_x_tar.get(x, y) - grad_x_ref.get(x2, y)).abs()
    })
}

/// Weighted sum of two appearance volumes, clamped into a byte.
pub fn fuse(
    a: &CostVolume<u8>,
    weight_a: f32,
    b: &CostVolume<u8>,
    weight_b: f32,
) -> CostVolume<u8> {
    debug_assert!(a.same_shape(b));

    let mut fused = CostVolume::new(a.width(), a.height(), a.num_disparities());

    fused
        .as_mut_slice()
        .par_iter_mut()
        .zip(a.as_slice().par_iter().zip(b.as_slice().par_iter()))
        .for_each(|(out, (&ca, &cb))| {
            *out = to_cost(weight_a * ca as f32 + weight_b * cb as f32);
        });

    fused
}

/// Fill a volume row by row. `cost(x, x2, y)` is called for every valid target pixel `x` and
/// in-range reference column `x2`; everything else gets [`MAX_COST`].
fn fill_volume<F>(
    invalid: &Plane<bool>,
    min_disparity: i32,
    num_disparities: usize,
    cost: F,
) -> CostVolume<u8>
where
    F: Fn(usize, usize, usize) -> f32 + Sync,
{
    let width = invalid.width();
    let mut volume = CostVolume::new(width, invalid.height(), num_disparities);
    let row_len = volume.row_len();

    if row_len == 0 {
        return volume;
    }

    volume
        .as_mut_slice()
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_mut(num_disparities).enumerate() {
                if invalid.get(x, y) {
                    for c in px.iter_mut() {
                        *c = MAX_COST;
                    }
                    continue;
                }

                let mut x2 = x as i32 + min_disparity;
                for c in px.iter_mut() {
                    *c = if x2 < 0 || x2 >= width as i32 {
                        MAX_COST
                    } else {
                        to_cost(cost(x, x2 as usize, y))
                    };
                    x2 += 1;
                }
            }
        });

    volume
}

#[inline]
fn to_cost(v: f32) -> u8 {
    v.min(MAX_COST as f32) as u8
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_and_invalid_cells_are_max() {
        let grad = Plane::<f32>::new(5, 1);
        let mut invalid = Plane::<bool>::new(5, 1);
        invalid.put(2, 0, true);

        let vol = xgrad_cost(&grad, &grad, &invalid, -1, 3);

        // x = 0 cannot look at column -1
        assert_eq!(vol.pixel(0, 0), &[255, 0, 0]);
        // x = 4 cannot look at column 5
        assert_eq!(vol.pixel(4, 0), &[0, 0, 255]);
        assert_eq!(vol.pixel(2, 0), &[255, 255, 255]);
    }

    #[test]
    fn gradient_cost_is_scaled_and_clamped() {
        let tar = Plane::from_vec(3, 1, vec![1.0, 2.0, 100.0]).unwrap();
        let refr = Plane::<f32>::new(3, 1);
        let invalid = Plane::<bool>::new(3, 1);

        let vol = xgrad_cost(&tar, &refr, &invalid, 0, 1);

        assert_eq!(vol.get(0, 0, 0), 8);
        assert_eq!(vol.get(1, 0, 0), 16);
        assert_eq!(vol.get(2, 0, 0), 255);
    }

    #[test]
    fn census_cost_counts_shared_salient_bits() {
        let a = Descriptor {
            bits: 0b0101,
            salient: 0b1111,
        };
        let b = Descriptor {
            bits: 0b1010,
            salient: 0b1111,
        };
        let tar = Plane::from_vec(2, 1, vec![a, a]).unwrap();
        let refr = Plane::from_vec(2, 1, vec![a, b]).unwrap();
        let invalid = Plane::<bool>::new(2, 1);

        let vol = census_cost(&tar, &refr, &invalid, 0, 2, 7);

        assert_eq!(vol.pixel(0, 0), &[0, (4.0 * 512.0 / 49.0) as u8]);
    }

    #[test]
    fn fusion_is_weighted_and_clamped() {
        let mut a = CostVolume::<u8>::new(1, 1, 2);
        let mut b = CostVolume::<u8>::new(1, 1, 2);
        a.pixel_mut(0, 0).copy_from_slice(&[100, 250]);
        b.pixel_mut(0, 0).copy_from_slice(&[50, 250]);

        let fused = fuse(&a, 0.5, &b, 0.25);

        assert_eq!(fused.get(0, 0, 0), 62);
        assert_eq!(fused.get(0, 0, 1), 187);

        let fused = fuse(&a, 1.0, &b, 1.0);
        assert_eq!(fused.get(0, 0, 1), 255);
    }
}
