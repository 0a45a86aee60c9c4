//! Tensor implementation
//!
//! This module provides the `Tensor` type held by checkpoint state: an
//! N-dimensional array stored as flat row-major data plus a shape.

use std::fmt;

use num_traits::Num;
use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, Result};

/// Number of leading values shown by `Display`
const DISPLAY_PREVIEW: usize = 8;

/// Validate a shape and return its element count
///
/// # Errors
///
/// Returns `Err` if the shape is empty, contains zero, or its element count
/// overflows `usize`.
pub fn element_count(shape: &[usize]) -> Result<usize> {
    if shape.is_empty() {
        return Err(FixtureError::InvalidShape {
            reason: "Shape cannot be empty".to_string(),
        });
    }

    if shape.contains(&0) {
        return Err(FixtureError::InvalidShape {
            reason: "Shape dimensions cannot be zero".to_string(),
        });
    }

    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| FixtureError::InvalidShape {
            reason: format!("Element count of shape {shape:?} overflows usize"),
        })
}

/// N-dimensional tensor
///
/// # Examples
///
/// ```
/// use fluxflow_fixtures::Tensor;
///
/// // Create a 2x3 tensor
/// let t = Tensor::from_vec(vec![2, 3], vec![
///     1.0, 2.0, 3.0,
///     4.0, 5.0, 6.0,
/// ]).unwrap();
///
/// assert_eq!(t.shape(), &[2, 3]);
/// assert_eq!(t.ndim(), 2);
/// assert_eq!(t.size(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor<T: Num> {
    /// Flattened data in row-major order
    data: Vec<T>,
    /// Shape of the tensor
    shape: Vec<usize>,
}

impl<T: Num + Clone> Tensor<T> {
    /// Create a new tensor from a vector and shape
    ///
    /// # Arguments
    ///
    /// * `shape` - Dimensions of the tensor
    /// * `data` - Flattened data in row-major order
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - Shape is empty
    /// - Shape contains zero
    /// - Data size doesn't match shape
    ///
    /// # Examples
    ///
    /// ```
    /// use fluxflow_fixtures::Tensor;
    ///
    /// let t = Tensor::from_vec(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(t.shape(), &[2, 2]);
    /// ```
    pub fn from_vec(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let expected_size = element_count(&shape)?;

        if data.len() != expected_size {
            return Err(FixtureError::DataShapeMismatch {
                data_size: data.len(),
                shape,
                expected: expected_size,
            });
        }

        Ok(Self { data, shape })
    }

    /// Get the shape of the tensor
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the number of dimensions
    ///
    /// # Examples
    ///
    /// ```
    /// use fluxflow_fixtures::Tensor;
    ///
    /// let t = Tensor::from_vec(vec![320, 3, 1, 1], vec![0.0f32; 960]).unwrap();
    /// assert_eq!(t.ndim(), 4);
    /// ```
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get the total number of elements
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to the underlying data
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Get a mutable reference to the underlying data
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the tensor, returning shape and data
    #[must_use]
    pub fn into_parts(self) -> (Vec<usize>, Vec<T>) {
        (self.shape, self.data)
    }
}

impl<T: Num + Clone + fmt::Display> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor(shape={:?}, data=[", self.shape)?;
        for (i, val) in self.data.iter().take(DISPLAY_PREVIEW).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{val}")?;
        }
        if self.data.len() > DISPLAY_PREVIEW {
            write!(f, ", ...")?;
        }
        write!(f, "])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tensor() {
        let t = Tensor::from_vec(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.size(), 6);
    }

    #[test]
    fn test_empty_shape_error() {
        let result = Tensor::from_vec(vec![], vec![1.0, 2.0]);
        assert!(matches!(
            result.unwrap_err(),
            FixtureError::InvalidShape { .. }
        ));
    }

    #[test]
    fn test_zero_dimension_error() {
        let result = Tensor::<f32>::from_vec(vec![2, 0], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_size_mismatch_error() {
        let result = Tensor::from_vec(vec![2, 3], vec![1.0, 2.0]);
        assert!(matches!(
            result.unwrap_err(),
            FixtureError::DataShapeMismatch { expected: 6, .. }
        ));
    }

    #[test]
    fn test_element_count_overflow() {
        let result = element_count(&[usize::MAX, 2]);
        assert!(matches!(result, Err(FixtureError::InvalidShape { .. })));
    }

    #[test]
    fn test_element_count_conv_kernel() {
        assert_eq!(element_count(&[128, 64, 3, 3]).unwrap(), 73_728);
    }

    #[test]
    fn test_into_parts() {
        let t = Tensor::from_vec(vec![2], vec![1.0f32, 2.0]).unwrap();
        let (shape, data) = t.into_parts();
        assert_eq!(shape, vec![2]);
        assert_eq!(data, vec![1.0, 2.0]);
    }

    #[test]
    fn test_display_truncates() {
        let t = Tensor::from_vec(vec![2], vec![1.0, 2.0]).unwrap();
        let display = format!("{t}");
        assert!(display.contains("shape=[2]"));
        assert!(!display.contains("..."));

        let long = Tensor::from_vec(vec![16], vec![0.5f32; 16]).unwrap();
        assert!(format!("{long}").ends_with(", ...])"));
    }
}
