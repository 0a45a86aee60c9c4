//! Hyperparameter detection and layout verification
//!
//! Reads a checkpoint the way a loader does: widths come from the shapes of
//! the fixed projection tensors, stage and block counts from the contiguous
//! index groups of each indexed family.

use super::builder::plan_layout;
use super::config::{FluxFlowDims, VAE_CHANNEL_RATIO};
use super::keys::{IndexedFamily, LATENT_PROJ, TEXT_PROJ, VAE_TO_DMODEL};
use super::CheckpointState;
use crate::error::{FixtureError, Result};

/// Derive the hyperparameters a checkpoint encodes
///
/// # Errors
///
/// Returns error if:
/// - A fixed projection tensor is missing
/// - A projection has too few dimensions
/// - `latent_proj` width is not a multiple of [`VAE_CHANNEL_RATIO`]
/// - `vae_to_dmodel` input width disagrees with the `latent_proj` width
/// - An indexed family has a gap
/// - The derived set fails validation (e.g. a family is absent)
pub fn detect_dims(state: &CheckpointState) -> Result<FluxFlowDims> {
    let latent = state.shape(LATENT_PROJ)?;
    let vae_channels = dim(LATENT_PROJ, latent, 0)?;
    if !vae_channels.is_multiple_of(VAE_CHANNEL_RATIO) {
        return Err(FixtureError::InvalidShape {
            reason: format!(
                "'{LATENT_PROJ}' leading dim {vae_channels} is not a multiple of {VAE_CHANNEL_RATIO}"
            ),
        });
    }

    let vae_dim = vae_channels / VAE_CHANNEL_RATIO;

    let vae_to_dmodel = state.shape(VAE_TO_DMODEL)?;
    let flow_dim = dim(VAE_TO_DMODEL, vae_to_dmodel, 0)?;
    if dim(VAE_TO_DMODEL, vae_to_dmodel, 1)? != vae_dim {
        return Err(FixtureError::ShapeMismatch {
            key: VAE_TO_DMODEL.to_string(),
            actual: vae_to_dmodel.to_vec(),
            expected: vec![flow_dim, vae_dim],
        });
    }
    let text_proj = state.shape(TEXT_PROJ)?;

    let dims = FluxFlowDims {
        vae_dim,
        flow_dim,
        text_embed_dim: dim(TEXT_PROJ, text_proj, 1)?,
        downscale_stages: IndexedFamily::EncoderZ.count(state.keys())?,
        upscale_stages: IndexedFamily::UpscaleLayers.count(state.keys())?,
        vae_attn_layers: IndexedFamily::TokenAttn.count(state.keys())?,
        flow_transformer_layers: IndexedFamily::TransformerBlocks.count(state.keys())?,
    };
    dims.validate()?;
    Ok(dims)
}

/// Check that `state` holds exactly the layout of `dims`
///
/// Missing keys are reported before extra keys, extra keys before shape
/// mismatches; each in sorted key order.
///
/// # Errors
///
/// Returns `MissingTensor`, `UnexpectedTensor` or `ShapeMismatch` for the
/// first offending key.
pub fn verify(state: &CheckpointState, dims: &FluxFlowDims) -> Result<()> {
    let layout = plan_layout(dims)?;

    if let Some(key) = layout.keys().find(|key| !state.contains_key(key)) {
        return Err(FixtureError::MissingTensor { key: key.clone() });
    }

    if let Some(key) = state.keys().find(|key| !layout.contains_key(*key)) {
        return Err(FixtureError::UnexpectedTensor {
            key: key.to_string(),
        });
    }

    for (key, expected) in &layout {
        let actual = state.shape(key)?;
        if actual != expected.as_slice() {
            return Err(FixtureError::ShapeMismatch {
                key: key.clone(),
                actual: actual.to_vec(),
                expected: expected.clone(),
            });
        }
    }

    Ok(())
}

fn dim(key: &str, shape: &[usize], axis: usize) -> Result<usize> {
    shape
        .get(axis)
        .copied()
        .ok_or_else(|| FixtureError::InvalidShape {
            reason: format!("'{key}' has {} dims, needs at least {}", shape.len(), axis + 1),
        })
}
