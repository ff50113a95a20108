//! # Image planes
//!
//! A plane is a rectangular grid of scalar samples backed by one row-major buffer. It is the
//! working image type for every intermediate product of the pipeline (masks, gradients,
//! descriptors, disparities and costs).

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Plane<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl<T: Copy> Plane<T> {
    /// Create a new plane with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` if the buffer length does not match.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }

        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Build a plane by evaluating `f(x, y)` at every sample.
    pub fn from_fn<F: FnMut(usize, usize) -> T>(width: usize, height: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }

        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn put(&mut self, x: usize, y: usize, val: T) {
        self.data[y * self.width + x] = val;
    }

    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Apply `f` to every sample, producing a new plane of the same size.
    pub fn map<U: Copy, F: Fn(T) -> U>(&self, f: F) -> Plane<U> {
        Plane {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two planes of the same size sample by sample.
    ///
    /// # Panics
    ///
    /// If the planes differ in size.
    pub fn zip_map<U: Copy, V: Copy, F: Fn(T, U) -> V>(&self, other: &Plane<U>, f: F) -> Plane<V> {
        assert!(
            self.width == other.width && self.height == other.height,
            "planes differ in size"
        );

        Plane {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }
}

impl<T: Copy + Default> Plane<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fn_is_row_major() {
        let plane = Plane::from_fn(3, 2, |x, y| (10 * y + x) as u8);

        assert_eq!(plane.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(plane.get(2, 1), 12);
    }

    #[test]
    fn zip_map_combines_samples() {
        let a = Plane::from_fn(2, 2, |x, _| x as f32);
        let b = Plane::from_fn(2, 2, |_, y| y as f32);

        let sum = a.zip_map(&b, |p, q| p + q);

        assert_eq!(sum.as_slice(), &[0.0, 1.0, 1.0, 2.0]);
    }
}
