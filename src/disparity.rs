//! # General disparity objects
//!
//! This module provides the stereo input frame, the disparity map output and the trait shared by
//! disparity algorithms.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{DynamicImage, GrayImage};

use crate::error::*;
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A pair of rectified greyscale images.
///
/// Disparities are measured for the pixels of the target image.
#[derive(Clone, Debug)]
pub struct StereoFrame {
    pub target: GrayImage,
    pub reference: GrayImage,
}

/// A floating point disparity map with the matching cost of every pixel.
#[derive(Clone, Debug)]
pub struct DisparityMap {
    data: Plane<f32>,
    cost: Plane<u16>,

    /// Value marking pixels without a disparity.
    pub invalid_disp: f32,

    /// Smallest valid disparity.
    pub min_disp: f32,

    /// Largest valid disparity.
    pub max_disp: f32,
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait DisparityAlgorithm {
    /// Compute the disparity map of the given stereo frame.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap>;
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl StereoFrame {
    pub fn new(target: GrayImage, reference: GrayImage) -> Self {
        Self { target, reference }
    }

    /// Build a frame from two images of any colour type, converting them to greyscale.
    pub fn from_dynamic(target: &DynamicImage, reference: &DynamicImage) -> Self {
        Self {
            target: target.to_luma(),
            reference: reference.to_luma(),
        }
    }

    pub fn width(&self) -> u32 {
        self.target.width()
    }

    pub fn height(&self) -> u32 {
        self.target.height()
    }

    /// Check that both images are non-empty and have the same size.
    pub fn validate(&self) -> Result<()> {
        let (tw, th) = self.target.dimensions();
        let (rw, rh) = self.reference.dimensions();

        if tw == 0 || th == 0 {
            return Err(Error::EmptyImage {
                width: tw,
                height: th,
            });
        }

        if tw != rw || th != rh {
            return Err(Error::DimensionMismatch {
                target_width: tw,
                target_height: th,
                reference_width: rw,
                reference_height: rh,
            });
        }

        Ok(())
    }
}

impl DisparityMap {
    pub(crate) fn new(
        data: Plane<f32>,
        cost: Plane<u16>,
        invalid_disp: f32,
        min_disp: f32,
        max_disp: f32,
    ) -> Self {
        DisparityMap {
            data,
            cost,
            invalid_disp,
            min_disp,
            max_disp,
        }
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    /// Disparity at the given pixel, possibly the invalid value.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data.get(x, y)
    }

    /// Disparity at the given pixel, or `None` if it is invalid.
    pub fn disparity(&self, x: usize, y: usize) -> Option<f32> {
        let d = self.data.get(x, y);

        if d == self.invalid_disp {
            None
        } else {
            Some(d)
        }
    }

    /// Aggregated matching cost of the chosen disparity; `u16::MAX` for masked pixels.
    pub fn cost(&self, x: usize, y: usize) -> u16 {
        self.cost.get(x, y)
    }

    pub fn disparities(&self) -> &Plane<f32> {
        &self.data
    }

    pub fn costs(&self) -> &Plane<u16> {
        &self.cost
    }

    /// Number of pixels holding a valid disparity.
    pub fn num_valid(&self) -> usize {
        self.data
            .as_slice()
            .iter()
            .filter(|&&d| d != self.invalid_disp)
            .count()
    }

    /// Converts the image into a Luma8 image, clamping disparities to `[0, 255]`.
    pub fn to_luma(&self) -> GrayImage {
        let mut new = GrayImage::new(self.width() as u32, self.height() as u32);

        for (x, y, px) in new.enumerate_pixels_mut() {
            let val = match self.disparity(x as usize, y as usize) {
                Some(d) => d.max(0.0).min(255.0),
                None => 0.0,
            };

            *px = image::Luma([val as u8]);
        }

        new
    }

    /// Converts the image to a normalised GrayImage.
    ///
    /// The valid disparity range is stretched over `[1, 255]`, invalid pixels are black.
    pub fn to_luma_normalised(&self) -> GrayImage {
        let mut new = GrayImage::new(self.width() as u32, self.height() as u32);

        let range = (self.max_disp - self.min_disp).max(1.0);
        let mult = 254.0 / range;

        for (x, y, px) in new.enumerate_pixels_mut() {
            let val = match self.disparity(x as usize, y as usize) {
                Some(d) => 1.0 + ((d - self.min_disp) * mult).max(0.0).min(254.0),
                None => 0.0,
            };

            *px = image::Luma([val as u8]);
        }

        new
    }
}
