//! Error types for fixture construction and checkpoint verification

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for fixture operations
pub type Result<T> = std::result::Result<T, FixtureError>;

/// Error type for all fixture operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FixtureError {
    /// Shape is empty or has a zero dimension
    #[error("Invalid shape: {reason}")]
    InvalidShape {
        /// Reason for the error
        reason: String,
    },

    /// Data length does not match the product of the shape
    #[error("Data size {data_size} does not match shape {shape:?} (expected {expected})")]
    DataShapeMismatch {
        /// Actual data size
        data_size: usize,
        /// Requested shape
        shape: Vec<usize>,
        /// Expected size from shape
        expected: usize,
    },

    /// Hyperparameter set is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A required key is absent from the checkpoint
    #[error("Tensor '{key}' not found in checkpoint")]
    MissingTensor {
        /// Missing key
        key: String,
    },

    /// The checkpoint holds a key the layout does not name
    #[error("Unexpected tensor '{key}' in checkpoint")]
    UnexpectedTensor {
        /// Extra key
        key: String,
    },

    /// A tensor's shape differs from the layout
    #[error("Tensor '{key}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        /// Offending key
        key: String,
        /// Shape found in the checkpoint
        actual: Vec<usize>,
        /// Shape the layout requires
        expected: Vec<usize>,
    },

    /// An indexed family has a gap in its indices
    #[error("Indexed family '{family}' is not contiguous: index {missing} is missing")]
    NonContiguousIndex {
        /// Family key prefix
        family: String,
        /// First missing index
        missing: usize,
    },

    /// Key does not follow the family/role/index scheme
    #[error("Invalid checkpoint key '{key}': {reason}")]
    InvalidKey {
        /// Offending key
        key: String,
        /// Reason for the error
        reason: String,
    },

    /// Tensor buffer could not be reserved
    #[error("Allocation of {elements} elements failed: {reason}")]
    AllocationFailed {
        /// Requested element count
        elements: usize,
        /// Allocator message
        reason: String,
    },

    /// Scoped directory could not be removed
    #[error("Failed to remove scoped directory {}: {message}", .path.display())]
    Cleanup {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O message
        message: String,
    },

    /// I/O failure outside of cleanup
    #[error("I/O error: {message}")]
    IoError {
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FixtureError::MissingTensor {
            key: "flow_processor.text_proj.weight".to_string(),
        };
        assert!(err.to_string().contains("flow_processor.text_proj.weight"));
        assert!(err.to_string().contains("not found"));

        let err = FixtureError::ShapeMismatch {
            key: "compressor.latent_proj.0.0.weight".to_string(),
            actual: vec![300, 3, 1, 1],
            expected: vec![320, 3, 1, 1],
        };
        let msg = err.to_string();
        assert!(msg.contains("[300, 3, 1, 1]"));
        assert!(msg.contains("[320, 3, 1, 1]"));

        let err = FixtureError::NonContiguousIndex {
            family: "compressor.encoder_z".to_string(),
            missing: 1,
        };
        assert!(err.to_string().contains("index 1 is missing"));
    }

    #[test]
    fn test_cleanup_error_names_path() {
        let err = FixtureError::Cleanup {
            path: PathBuf::from("/tmp/fluxflow-abc"),
            message: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/fluxflow-abc"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_data_shape_mismatch_display() {
        let err = FixtureError::DataShapeMismatch {
            data_size: 2,
            shape: vec![2, 3],
            expected: 6,
        };
        assert_eq!(
            err.to_string(),
            "Data size 2 does not match shape [2, 3] (expected 6)"
        );
    }
}
