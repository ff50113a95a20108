//! # Disparity extraction
//!
//! Turns the aggregated cost volume into a disparity image: winner-takes-all selection of the
//! cheapest disparity, optional sub-pixel refinement, then a median filter to remove speckles.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use rayon::prelude::*;

use crate::plane::Plane;
use crate::volume::CostVolume;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Matching cost reported for invalid pixels.
pub const INVALID_COST: u16 = u16::MAX;

/// Radius of the disk used by the despeckling median filter.
pub const MEDIAN_RADIUS: f32 = 1.9;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Pick the cheapest disparity of every pixel.
///
/// Returns the absolute disparity (`min_disparity` added) and its total cost. Ties go to the
/// smaller disparity. With `quadratic` set, the minimum is refined by fitting a parabola through
/// it and its two neighbours; minima at either end of the range are moved half a disparity
/// inward instead, unless the range holds one disparity. Invalid pixels get `invalid_disp` and
/// [`INVALID_COST`].
pub fn best_disparities(
    total_cost: &CostVolume<u16>,
    invalid: &Plane<bool>,
    min_disparity: i32,
    invalid_disp: f32,
    quadratic: bool,
) -> (Plane<f32>, Plane<u16>) {
    let width = total_cost.width();
    let height = total_cost.height();
    let nd = total_cost.num_disparities();

    let mut disp = Plane::<f32>::new(width, height);
    let mut cost = Plane::<u16>::new(width, height);

    if width == 0 {
        return (disp, cost);
    }

    disp.as_mut_slice()
        .par_chunks_mut(width)
        .zip(cost.as_mut_slice().par_chunks_mut(width))
        .enumerate()
        .for_each(|(y, (disp_row, cost_row))| {
            for x in 0..width {
                if invalid.get(x, y) {
                    disp_row[x] = invalid_disp;
                    cost_row[x] = INVALID_COST;
                    continue;
                }

                let costs = total_cost.pixel(x, y);
                let (min_idx, min_cost) = arg_min(costs);

                cost_row[x] = min_cost;

                let mut d = min_idx as f32;

                if quadratic {
                    d = refine(costs, min_idx);
                }

                disp_row[x] = d + min_disparity as f32;
            }
        });

    (disp, cost)
}

/// Index and value of the first minimum.
fn arg_min(costs: &[u16]) -> (usize, u16) {
    let mut min_idx = 0;
    let mut min_cost = costs[0];

    for (d, &c) in costs.iter().enumerate().skip(1) {
        if c < min_cost {
            min_cost = c;
            min_idx = d;
        }
    }

    (min_idx, min_cost)
}

/// Sub-pixel position of the minimum at `idx`.
fn refine(costs: &[u16], idx: usize) -> f32 {
    let n = costs.len();

    if n == 1 {
        return idx as f32;
    }

    // Keep the output range continuous when the minimum sits on an end point
    if idx == 0 {
        return 0.5;
    }
    if idx == n - 1 {
        return n as f32 - 1.5;
    }

    let c1 = costs[idx - 1] as f32;
    let c2 = costs[idx] as f32;
    let c3 = costs[idx + 1] as f32;

    // Vertex of the parabola through the three samples, within 0.5 of idx. A parabola that does
    // not open upward leaves the integer minimum.
    let denom = c1 + c3 - 2.0 * c2;
    if denom > 0.0 {
        idx as f32 + (c1 - c3) / (2.0 * denom)
    } else {
        idx as f32
    }
}

/// Median filter over a disk of radius [`MEDIAN_RADIUS`].
///
/// The median is taken over the disk samples that lie inside the image, so output values are
/// always input values and the invalid sentinel is never blended with real disparities. Pixels
/// flagged in `invalid` keep `invalid_disp`.
pub fn median_despeckle(disp: &Plane<f32>, invalid: &Plane<bool>, invalid_disp: f32) -> Plane<f32> {
    let width = disp.width();
    let height = disp.height();
    let offsets = disk_offsets(MEDIAN_RADIUS);

    let mut out = Plane::<f32>::new(width, height);

    if width == 0 {
        return out;
    }

    out.as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let mut window = Vec::with_capacity(offsets.len());

            for x in 0..width {
                if invalid.get(x, y) {
                    row[x] = invalid_disp;
                    continue;
                }

                window.clear();
                for &(i, j) in &offsets {
                    let xi = x as isize + i;
                    let yj = y as isize + j;

                    if xi >= 0 && yj >= 0 && (xi as usize) < width && (yj as usize) < height {
                        window.push(disp.get(xi as usize, yj as usize));
                    }
                }

                window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                row[x] = window[(window.len() - 1) / 2];
            }
        });

    out
}

/// Pixel offsets within `radius` of the origin.
fn disk_offsets(radius: f32) -> Vec<(isize, isize)> {
    let r = radius as isize;
    let r2 = radius * radius;

    let mut offsets = Vec::new();
    for j in -r..=r {
        for i in -r..=r {
            if ((i * i + j * j) as f32) <= r2 {
                offsets.push((i, j));
            }
        }
    }

    offsets
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
