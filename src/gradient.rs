//! # Image gradients
//!
//! Sobel gradients feed two stages: the x-gradient is an appearance cue for the cost volume, and
//! the gradient magnitude along each scan axis drives the adaptive large-jump penalty of the
//! smoothing engine.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Scale applied to raw Sobel responses so that a unit intensity step gives a unit gradient.
const SOBEL_NORM: f32 = 0.125;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Normalised Sobel gradients of an image.
pub struct Gradients {
    pub x: Plane<f32>,
    pub y: Plane<f32>,
}

/// Axis along which a scan direction measures edge strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientAxis {
    /// Horizontal gradient `|gx|`.
    X,
    /// Vertical gradient `|gy|`.
    Y,
    /// Gradient along the main diagonal `|gx + gy| / sqrt(2)`.
    Diagonal,
    /// Gradient along the anti-diagonal `|gx - gy| / sqrt(2)`.
    AntiDiagonal,
}

/// Edge strength in `[0, 1]` along each [`GradientAxis`].
pub struct EdgeStrength {
    planes: [Plane<f32>; 4],
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Gradients {
    /// Compute the normalised Sobel gradients of `img`.
    pub fn sobel(img: &GrayImage) -> Self {
        Self {
            x: to_plane(&horizontal_sobel(img)),
            y: to_plane(&vertical_sobel(img)),
        }
    }
}

impl EdgeStrength {
    /// Compute the edge strength planes, saturating at a gradient magnitude of `max_grad`.
    pub fn new(grad: &Gradients, max_grad: f32) -> Self {
        let sqrt2norm = 1.0 / 2.0f32.sqrt();
        let max_grad = max_grad.max(std::f32::EPSILON);

        let saturate = |v: f32| (v.abs() / max_grad).min(1.0);

        Self {
            planes: [
                grad.x.map(saturate),
                grad.y.map(saturate),
                grad.x.zip_map(&grad.y, |gx, gy| saturate(sqrt2norm * (gx + gy))),
                grad.x.zip_map(&grad.y, |gx, gy| saturate(sqrt2norm * (gx - gy))),
            ],
        }
    }

    #[inline]
    pub fn get(&self, axis: GradientAxis, x: usize, y: usize) -> f32 {
        self.planes[axis as usize].get(x, y)
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn to_plane(img: &image::ImageBuffer<image::Luma<i16>, Vec<i16>>) -> Plane<f32> {
    Plane::from_fn(img.width() as usize, img.height() as usize, |x, y| {
        img.get_pixel(x as u32, y as u32)[0] as f32 * SOBEL_NORM
    })
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
