//! Disparity estimation on synthetic stereo pairs with known ground truth

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use cv_sgm::mask::compute_invalid_map;
use cv_sgm::prelude::*;
use image::{GrayImage, Luma};

// -----------------------------------------------------------------------------------------------
// HELPERS
// -----------------------------------------------------------------------------------------------

/// Deterministic noise texture in `1..=255`, so that 0 can serve as a border value.
fn texture(x: i64, y: i64) -> u8 {
    let mut h = (x as u32).wrapping_mul(374_761_393) ^ (y as u32).wrapping_mul(668_265_263);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^= h >> 16;

    1 + (h % 255) as u8
}

fn textured(width: u32, height: u32, seed: i64) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        Luma([texture(x as i64 + seed * 7919, y as i64 - seed * 104_729)])
    })
}

/// Target whose column `x` shows reference column `x + shift(x)`, zero past the reference.
fn shifted<F: Fn(u32) -> u32>(reference: &GrayImage, shift: F) -> GrayImage {
    let (w, h) = reference.dimensions();

    GrayImage::from_fn(w, h, |x, y| {
        let x_ref = x + shift(x);
        if x_ref < w {
            *reference.get_pixel(x_ref, y)
        } else {
            Luma([0])
        }
    })
}

fn exact_params(num_disparities: usize) -> Params {
    Params {
        min_disparity: 0,
        num_disparities,
        perform_quadratic_interp: false,
        ..Params::default()
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[test]
fn uniform_images_give_zero_disparity() -> Result<(), Box<dyn std::error::Error>> {
    let img = GrayImage::from_pixel(32, 24, Luma([128]));
    let frame = StereoFrame::new(img.clone(), img);

    let mut sgm = Sgm::new(exact_params(8));
    let disp = sgm.compute(&frame)?;

    assert!(disp.disparities().as_slice().iter().all(|&d| d == 0.0));

    Ok(())
}

#[test]
fn uniform_images_sit_on_first_disparity() -> Result<(), Box<dyn std::error::Error>> {
    let img = GrayImage::from_pixel(32, 24, Luma([128]));
    let frame = StereoFrame::new(img.clone(), img);

    let mut sgm = Sgm::new(Params::default());
    let disp = sgm.compute(&frame)?;

    // The first disparity is nudged half a pixel inward by the sub-pixel refinement
    assert!(disp.disparities().as_slice().iter().all(|&d| d == 0.5));

    Ok(())
}

#[test]
fn shifted_image_recovers_shift() -> Result<(), Box<dyn std::error::Error>> {
    let (w, h, k) = (64, 40, 5);
    let reference = textured(w, h, 0);
    let target = shifted(&reference, |_| k);
    let frame = StereoFrame::new(target, reference);

    for &directions in [DirectionCount::Eight, DirectionCount::Sixteen].iter() {
        let mut sgm = Sgm::new(Params {
            border_value: 0,
            directions,
            ..exact_params(16)
        });
        let disp = sgm.compute(&frame)?;

        for y in 4..(h as usize - 4) {
            for x in 6..(w as usize - k as usize - 8) {
                assert_eq!(disp.get(x, y), k as f32, "pixel ({}, {}), {:?}", x, y, directions);
            }

            // Columns without a counterpart in the reference are invalid
            for x in (w - k) as usize..w as usize {
                assert_eq!(disp.disparity(x, y), None);
                assert_eq!(disp.cost(x, y), u16::MAX);
            }
        }
    }

    Ok(())
}

#[test]
fn single_cue_costs_recover_shift() -> Result<(), Box<dyn std::error::Error>> {
    let (w, h, k) = (64, 32, 3);
    let reference = textured(w, h, 1);
    let frame = StereoFrame::new(shifted(&reference, |_| k), reference);

    for &(census_weight, xgrad_weight) in [(1.0, 0.0), (0.0, 1.0)].iter() {
        let mut sgm = Sgm::new(Params {
            census_weight,
            xgrad_weight,
            ..exact_params(8)
        });
        let disp = sgm.compute(&frame)?;

        for y in 4..(h as usize - 4) {
            for x in 6..(w as usize - 12) {
                assert_eq!(
                    disp.get(x, y),
                    k as f32,
                    "census {}, xgrad {}",
                    census_weight,
                    xgrad_weight
                );
            }
        }
    }

    Ok(())
}

#[test]
fn subpixel_disparities_stay_in_range() -> Result<(), Box<dyn std::error::Error>> {
    let frame = StereoFrame::new(textured(48, 32, 2), textured(48, 32, 3));

    let mut sgm = Sgm::new(Params {
        min_disparity: -4,
        num_disparities: 12,
        ..Params::default()
    });
    let disp = sgm.compute(&frame)?;

    assert_eq!(disp.invalid_disp, -5.0);
    assert_eq!(disp.min_disp, -4.0);
    assert_eq!(disp.max_disp, 7.0);

    for &d in disp.disparities().as_slice() {
        assert!(d == disp.invalid_disp || (d >= -4.0 && d <= 7.0), "{}", d);
    }

    Ok(())
}

#[test]
fn pixels_without_candidates_are_invalid() -> Result<(), Box<dyn std::error::Error>> {
    let img = textured(32, 16, 9);
    let frame = StereoFrame::new(img.clone(), img);

    let disp = Sgm::new(Params {
        min_disparity: 20,
        num_disparities: 8,
        ..Params::default()
    })
    .compute(&frame)?;

    assert_eq!(disp.invalid_disp, 19.0);

    for y in 0..16 {
        // Every candidate x + 20..=x + 27 is past the right edge from x = 12 onwards
        for x in 12..32 {
            assert_eq!(disp.disparity(x, y), None, "pixel ({}, {})", x, y);
            assert_eq!(disp.cost(x, y), u16::MAX);
        }

        for x in 0..12 {
            let d = disp.get(x, y);
            assert!(d == disp.invalid_disp || (d >= 20.0 && d <= 27.0), "{}", d);
        }
    }

    Ok(())
}

#[test]
fn masked_pixels_are_always_invalid() -> Result<(), Box<dyn std::error::Error>> {
    let (w, h) = (48, 24);
    let reference = textured(w, h, 4);
    let mut target = shifted(&reference, |_| 2);

    // Ragged left border in the target
    for y in 0..h {
        for x in 0..(y % 5) {
            target.put_pixel(x, y, Luma([0]));
        }
    }

    let params = Params {
        border_value: 0,
        min_disparity: -2,
        num_disparities: 8,
        ..Params::default()
    };
    let invalid = compute_invalid_map(&target, &reference, 0, -2, 8);
    let frame = StereoFrame::new(target, reference);

    let disp = Sgm::new(params).compute(&frame)?;

    for y in 0..h as usize {
        for x in 0..w as usize {
            if invalid.get(x, y) {
                assert_eq!(disp.get(x, y), disp.invalid_disp, "pixel ({}, {})", x, y);
            }
        }
    }

    Ok(())
}

#[test]
fn conventions_are_mirror_images() -> Result<(), Box<dyn std::error::Error>> {
    let reference = textured(48, 32, 5);
    let frame = StereoFrame::new(shifted(&reference, |x| 2 + x % 3), reference);

    let mut forward = Sgm::new(Params {
        min_disparity: 0,
        num_disparities: 10,
        ..Params::default()
    });
    let mut inverse = Sgm::new(Params {
        min_disparity: -9,
        num_disparities: 10,
        convention: DisparityConvention::ReferenceToTarget,
        ..Params::default()
    });

    let a = forward.compute(&frame)?;
    let b = inverse.compute(&frame)?;

    assert_eq!(b.invalid_disp, -10.0);
    assert_eq!(inverse.invalid_disparity(), -10.0);
    assert_eq!((b.min_disp, b.max_disp), (-9.0, 0.0));

    for (&da, &db) in a
        .disparities()
        .as_slice()
        .iter()
        .zip(b.disparities().as_slice())
    {
        if da == a.invalid_disp {
            assert_eq!(db, b.invalid_disp);
        } else {
            assert_eq!(db, -da);
        }
    }

    Ok(())
}

#[test]
fn repeated_runs_are_identical() -> Result<(), Box<dyn std::error::Error>> {
    let reference = textured(40, 30, 6);
    let frame = StereoFrame::new(shifted(&reference, |x| x / 10), reference);

    let mut sgm = Sgm::new(Params {
        num_disparities: 6,
        directions: DirectionCount::Sixteen,
        ..Params::default()
    });

    let a = sgm.compute(&frame)?;
    let b = sgm.compute(&frame)?;

    let bits = |m: &DisparityMap| -> Vec<u32> {
        m.disparities().as_slice().iter().map(|d| d.to_bits()).collect()
    };

    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.costs(), b.costs());

    Ok(())
}

#[test]
fn consistency_check_flags_occlusion_boundary() -> Result<(), Box<dyn std::error::Error>> {
    let (w, h, m) = (96, 32, 48);
    let reference = textured(w, h, 7);

    // Left half shifted by 8, right half by 1: reference columns m+1..m+7 are seen twice
    let target = GrayImage::from_fn(w, h, |x, y| {
        let x_ref = if x < m { x + 8 } else { x + 1 };
        Luma([texture(x_ref as i64 + 7 * 7919, y as i64 - 7 * 104_729)])
    });
    let frame = StereoFrame::new(target, reference);

    let band = |disp: &DisparityMap| {
        (4..h as usize - 4)
            .flat_map(|y| ((m - 10) as usize..(m + 10) as usize).map(move |x| (x, y)))
            .filter(|&(x, y)| disp.disparity(x, y).is_none())
            .count()
    };

    let unchecked = Sgm::new(Params {
        perform_consistency_check: false,
        ..exact_params(16)
    })
    .compute(&frame)?;

    let checked = Sgm::new(exact_params(16)).compute(&frame)?;

    assert_eq!(band(&unchecked), 0);
    assert!(band(&checked) > 0);

    // Away from the boundary both halves survive the check
    for y in 4..(h as usize - 4) {
        for x in 8..(m as usize - 12) {
            assert_eq!(checked.get(x, y), 8.0, "pixel ({}, {})", x, y);
        }
        for x in (m as usize + 12)..(w as usize - 8) {
            assert_eq!(checked.get(x, y), 1.0, "pixel ({}, {})", x, y);
        }
    }

    Ok(())
}

#[test]
fn cost_slices_cover_every_disparity() -> Result<(), Box<dyn std::error::Error>> {
    let reference = textured(20, 10, 8);
    let frame = StereoFrame::new(shifted(&reference, |_| 1), reference);

    let mut sgm = Sgm::new(exact_params(4));
    sgm.compute(&frame)?;

    let app = sgm.cost_slices(CostSlice::Appearance)?;
    let total = sgm.cost_slices(CostSlice::Total)?;

    assert_eq!(app.len(), 4);
    assert_eq!(total.len(), 4);
    assert!(app.iter().all(|s| s.dimensions() == (20, 10)));

    // The last column cannot look further right than itself
    assert_eq!(app[3].get_pixel(19, 5)[0], 255);

    Ok(())
}
