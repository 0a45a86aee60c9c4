//! Fixture entry points
//!
//! The two call sites handed to checkpoint-loader tests: a working directory
//! and a state dict stand-in.

use crate::checkpoint::{CheckpointBuilder, CheckpointState, FluxFlowDims};
use crate::error::Result;
use crate::temp_dir::ScopedTempDir;

/// Fresh working directory for one test case
///
/// # Errors
///
/// Returns `IoError` if the directory cannot be created.
pub fn temp_dir() -> Result<ScopedTempDir> {
    ScopedTempDir::acquire()
}

/// Mock FluxFlow checkpoint state with the default hyperparameters
///
/// Keys and shapes are fixed; tensor values are random per call.
///
/// # Errors
///
/// Returns `AllocationFailed` if a tensor buffer cannot be reserved.
///
/// # Example
///
/// ```rust
/// use fluxflow_fixtures::mock_checkpoint_state;
///
/// let state = mock_checkpoint_state().unwrap();
/// assert_eq!(state.shape("flow_processor.text_proj.weight").unwrap(), &[128, 256]);
/// ```
pub fn mock_checkpoint_state() -> Result<CheckpointState> {
    CheckpointBuilder::new(FluxFlowDims::default()).build()
}

/// [`mock_checkpoint_state`] with reproducible values
///
/// # Errors
///
/// Returns `AllocationFailed` if a tensor buffer cannot be reserved.
pub fn seeded_checkpoint_state(seed: u64) -> Result<CheckpointState> {
    CheckpointBuilder::new(FluxFlowDims::default())
        .with_seed(seed)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::verify;

    #[test]
    fn test_temp_dir_exists_until_dropped() {
        let dir = temp_dir().unwrap();
        let path = dir.path().to_path_buf();
        assert!(path.is_dir());
        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn test_mock_state_verifies() {
        let state = mock_checkpoint_state().unwrap();
        assert!(verify(&state, &FluxFlowDims::default()).is_ok());
    }

    #[test]
    fn test_mock_state_values_vary() {
        let a = mock_checkpoint_state().unwrap();
        let b = mock_checkpoint_state().unwrap();
        assert_eq!(a.manifest(), b.manifest());
        assert_ne!(a, b);
    }

    #[test]
    fn test_seeded_state_reproducible() {
        assert_eq!(
            seeded_checkpoint_state(9).unwrap(),
            seeded_checkpoint_state(9).unwrap()
        );
    }
}
