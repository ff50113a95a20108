//! # Census descriptors
//!
//! Computes a census transform of a greyscale image. Each pixel is described by a bit pattern
//! recording which of its window neighbours are brighter than it, plus a salience mask marking
//! the comparisons that are decisive (the intensity difference exceeds a tolerance). Matching
//! only counts bits salient in both descriptors, so textureless areas produce low costs rather
//! than noise.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::GrayImage;
use rayon::prelude::*;

use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Smallest supported census window diameter.
pub const MIN_DIAMETER: usize = 3;

/// Largest supported census window diameter, 48 comparisons fit in a `u64`.
pub const MAX_DIAMETER: usize = 7;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Descriptor {
    /// Bit `i` is set when neighbour `i` is brighter than the centre.
    pub bits: u64,

    /// Bit `i` is set when `|neighbour - centre|` exceeds the tolerance.
    pub salient: u64,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Descriptor {
    /// Number of salient comparisons.
    pub fn salience(&self) -> u32 {
        self.salient.count_ones()
    }

    /// Hamming distance over the comparisons salient in both descriptors.
    ///
    /// The result never exceeds `min(self.salience(), other.salience())`.
    #[inline]
    pub fn distance(&self, other: &Descriptor) -> u32 {
        ((self.bits ^ other.bits) & self.salient & other.salient).count_ones()
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Clamp a requested window diameter to the nearest supported odd diameter.
pub fn clamp_diameter(diameter: usize) -> usize {
    let d = diameter.max(MIN_DIAMETER).min(MAX_DIAMETER);

    if d % 2 == 0 {
        d - 1
    } else {
        d
    }
}

/// Compute the census descriptor of every pixel of `img`.
///
/// Pixels closer than half a window to the border get the zero descriptor.
pub fn compute_descriptors(img: &GrayImage, diameter: usize, tolerance: u8) -> Plane<Descriptor> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let radius = (clamp_diameter(diameter) / 2) as isize;
    let pixels = img.as_raw();

    let mut descriptors = Plane::<Descriptor>::new(width, height);

    if width == 0 {
        return descriptors;
    }

    descriptors
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as isize;
            if y < radius || y >= height as isize - radius {
                return;
            }

            for x in radius..(width as isize - radius) {
                let centre = pixels[(y as usize) * width + x as usize] as i16;
                let mut desc = Descriptor::default();
                let mut bit = 0;

                for j in -radius..=radius {
                    for i in -radius..=radius {
                        if i == 0 && j == 0 {
                            continue;
                        }

                        let val = pixels[((y + j) as usize) * width + (x + i) as usize] as i16;

                        if val > centre {
                            desc.bits |= 1 << bit;
                        }
                        if (val - centre).abs() > tolerance as i16 {
                            desc.salient |= 1 << bit;
                        }

                        bit += 1;
                    }
                }

                row[x as usize] = desc;
            }
        });

    descriptors
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diameter_is_clamped_to_odd_range() {
        assert_eq!(clamp_diameter(0), 3);
        assert_eq!(clamp_diameter(4), 3);
        assert_eq!(clamp_diameter(5), 5);
        assert_eq!(clamp_diameter(6), 5);
        assert_eq!(clamp_diameter(7), 7);
        assert_eq!(clamp_diameter(31), 7);
    }

    #[test]
    fn flat_image_has_no_salience() {
        let img = GrayImage::from_pixel(12, 12, image::Luma([90]));
        let desc = compute_descriptors(&img, 7, 2);

        assert!(desc.as_slice().iter().all(|d| d.salience() == 0));
    }

    #[test]
    fn bright_centre_sets_all_salient_bits() {
        let mut img = GrayImage::from_pixel(9, 9, image::Luma([10]));
        img.put_pixel(4, 4, image::Luma([200]));

        let desc = compute_descriptors(&img, 7, 2).get(4, 4);

        assert_eq!(desc.bits, 0);
        assert_eq!(desc.salience(), 48);
    }

    #[test]
    fn border_pixels_are_zero() {
        let mut img = GrayImage::new(9, 9);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = image::Luma([((x * 31 + y * 17) % 251) as u8]);
        }

        let desc = compute_descriptors(&img, 7, 0);

        assert_eq!(desc.get(2, 4), Descriptor::default());
        assert_eq!(desc.get(4, 6), Descriptor::default());
        assert_ne!(desc.get(4, 4), Descriptor::default());
    }

    #[test]
    fn distance_is_bounded_by_shared_salience() {
        let a = Descriptor {
            bits: 0b1111,
            salient: 0b0011,
        };
        let b = Descriptor {
            bits: 0b0000,
            salient: 0b1111,
        };

        assert_eq!(a.distance(&b), 2);
        assert!(a.distance(&b) <= a.salience().min(b.salience()));
    }
}
