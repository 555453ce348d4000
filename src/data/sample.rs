//! Numeric sample types a grid can store.
//!
//! Samples travel between ranks as raw bytes, so they must be plain old data.
//! Real samples report a zero imaginary part.

use bytemuck::Pod;
use num_complex::Complex;
use num_traits::Zero;
use static_assertions::{assert_eq_align, assert_eq_size};
use std::fmt::Debug;

/// A value stored per time level in a field point.
pub trait Sample: Pod + Zero + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Real part, widened to `f64`.
    fn re(&self) -> f64;

    /// Imaginary part, widened to `f64`.
    fn im(&self) -> f64 {
        0.0
    }
}

impl Sample for f32 {
    #[inline]
    fn re(&self) -> f64 {
        f64::from(*self)
    }
}

impl Sample for f64 {
    #[inline]
    fn re(&self) -> f64 {
        *self
    }
}

impl Sample for Complex<f32> {
    #[inline]
    fn re(&self) -> f64 {
        f64::from(self.re)
    }

    #[inline]
    fn im(&self) -> f64 {
        f64::from(self.im)
    }
}

impl Sample for Complex<f64> {
    #[inline]
    fn re(&self) -> f64 {
        self.re
    }

    #[inline]
    fn im(&self) -> f64 {
        self.im
    }
}

// Complex samples go over the wire as two packed components.
assert_eq_size!(Complex<f32>, [f32; 2]);
assert_eq_size!(Complex<f64>, [f64; 2]);
assert_eq_align!(Complex<f64>, f64);
