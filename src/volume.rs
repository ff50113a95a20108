//! # Cost volumes
//!
//! A cost volume holds one cost per (pixel, candidate disparity) pair. All costs live in a single
//! contiguous buffer; the disparities of a pixel are adjacent and pixels are stored row-major.

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct CostVolume<T> {
    width: usize,
    height: usize,
    num_disparities: usize,
    data: Vec<T>,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl<T: Copy + Default> CostVolume<T> {
    /// Allocate a zeroed volume.
    pub fn new(width: usize, height: usize, num_disparities: usize) -> Self {
        Self {
            width,
            height,
            num_disparities,
            data: vec![T::default(); width * height * num_disparities],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_disparities(&self) -> usize {
        self.num_disparities
    }

    /// Number of samples in one image row (`width * num_disparities`).
    pub fn row_len(&self) -> usize {
        self.width * self.num_disparities
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, d: usize) -> usize {
        (y * self.width + x) * self.num_disparities + d
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, d: usize) -> T {
        self.data[self.index(x, y, d)]
    }

    /// All disparity costs of one pixel.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[T] {
        let start = self.index(x, y, 0);
        &self.data[start..start + self.num_disparities]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [T] {
        let start = self.index(x, y, 0);
        &mut self.data[start..start + self.num_disparities]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Check that another volume covers the same cells.
    pub fn same_shape<U>(&self, other: &CostVolume<U>) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.num_disparities == other.num_disparities
    }
}

impl CostVolume<u16> {
    /// Add every cell of `other` into this volume.
    pub fn accumulate(&mut self, other: &CostVolume<u16>) {
        debug_assert!(self.same_shape(other));

        for (acc, &val) in self.data.iter_mut().zip(other.data.iter()) {
            *acc = acc.saturating_add(val);
        }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
