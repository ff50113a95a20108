//! # Validity mask
//!
//! Rectified or warped images usually carry a border filled with a constant value. Pixels in that
//! border, and target pixels whose whole search range lands in the border of the reference
//! image, cannot be matched and are flagged invalid here. So are target pixels whose search range
//! lies entirely outside the reference image.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::GrayImage;
use rayon::prelude::*;

use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Build the invalid-pixel mask of the target image.
///
/// Borders are found by scanning each row inward from both edges up to the first pixel that is
/// not `border_value`. That first pixel is flagged as well. Target pixels are also flagged when
/// every candidate disparity maps them into the border of the reference row. A negative
/// `border_value` disables the border scans, but pixels without a single in-image candidate are
/// always flagged.
pub fn compute_invalid_map(
    target: &GrayImage,
    reference: &GrayImage,
    border_value: i32,
    min_disparity: i32,
    num_disparities: usize,
) -> Plane<bool> {
    let width = target.width() as usize;
    let height = target.height() as usize;

    let mut invalid = Plane::<bool>::new(width, height);

    if width == 0 {
        return invalid;
    }

    let w = width as i32;
    let max_disparity = min_disparity + num_disparities as i32 - 1;

    // x + max_disparity < 0 or x + min_disparity >= w leaves no candidate inside the image
    let outside_left = (-max_disparity).max(0).min(w) as usize;
    let outside_right = (w - min_disparity).max(0).min(w) as usize;

    let tar = target.as_raw();
    let refr = reference.as_raw();

    invalid
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for px in row.iter_mut().take(outside_left) {
                *px = true;
            }
            for px in row.iter_mut().skip(outside_right) {
                *px = true;
            }

            if border_value < 0 {
                return;
            }

            let tar_row = &tar[y * width..(y + 1) * width];
            let ref_row = &refr[y * width..(y + 1) * width];

            // Target borders
            for x in 0..width {
                row[x] = true;
                if tar_row[x] as i32 != border_value {
                    break;
                }
            }
            for x in (0..width).rev() {
                row[x] = true;
                if tar_row[x] as i32 != border_value {
                    break;
                }
            }

            // Target pixels mapping into the left reference border for every candidate
            let lb = ref_row
                .iter()
                .take_while(|&&v| v as i32 == border_value)
                .count() as i32;
            let left_end = (lb - max_disparity).min(w).max(0);
            for px in row.iter_mut().take(left_end as usize) {
                *px = true;
            }

            // Target pixels mapping into the right reference border for every candidate
            let rb = w
                - 1
                - ref_row
                    .iter()
                    .rev()
                    .take_while(|&&v| v as i32 == border_value)
                    .count() as i32;
            let right_start = (rb - min_disparity + 1).max(0).min(w);
            for px in row.iter_mut().skip(right_start as usize) {
                *px = true;
            }
        });

    invalid
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
