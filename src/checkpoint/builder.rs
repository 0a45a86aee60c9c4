//! Checkpoint layout planning and construction

use tracing::debug;

use super::config::{FluxFlowDims, CONV_KERNEL, IMAGE_CHANNELS};
use super::keys::{IndexedFamily, LATENT_PROJ, TEXT_PROJ, VAE_TO_DMODEL};
use super::{CheckpointState, Manifest};
use crate::error::Result;
use crate::testing::generators::SyntheticWeightGenerator;

/// Keys and shapes of the checkpoint described by `dims`
///
/// Allocates no tensor data.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `dims` fails validation.
///
/// # Examples
///
/// ```
/// use fluxflow_fixtures::checkpoint::{plan_layout, FluxFlowDims};
///
/// let layout = plan_layout(&FluxFlowDims::default()).unwrap();
/// assert_eq!(layout.len(), 11);
/// assert_eq!(layout["flow_processor.vae_to_dmodel.weight"], vec![128, 64]);
/// ```
pub fn plan_layout(dims: &FluxFlowDims) -> Result<Manifest> {
    dims.validate()?;

    let mut layout = Manifest::new();

    layout.insert(
        LATENT_PROJ.to_string(),
        vec![dims.vae_channel_dim()?, IMAGE_CHANNELS, 1, 1],
    );
    layout.insert(VAE_TO_DMODEL.to_string(), vec![dims.flow_dim, dims.vae_dim]);
    layout.insert(TEXT_PROJ.to_string(), vec![dims.flow_dim, dims.text_embed_dim]);

    for stage in 0..dims.downscale_stages {
        let (out, input) = dims.encoder_stage_channels(stage)?;
        layout.insert(
            IndexedFamily::EncoderZ.key(stage),
            vec![out, input, CONV_KERNEL, CONV_KERNEL],
        );
    }

    for stage in 0..dims.upscale_stages {
        let (out, input) = dims.upscale_stage_channels(stage)?;
        layout.insert(
            IndexedFamily::UpscaleLayers.key(stage),
            vec![out, input, CONV_KERNEL, CONV_KERNEL],
        );
    }

    let in_proj = dims.attn_in_proj_dim()?;
    for layer in 0..dims.vae_attn_layers {
        layout.insert(IndexedFamily::TokenAttn.key(layer), vec![in_proj, dims.vae_dim]);
    }

    for block in 0..dims.flow_transformer_layers {
        layout.insert(
            IndexedFamily::TransformerBlocks.key(block),
            vec![dims.flow_dim, dims.flow_dim],
        );
    }

    Ok(layout)
}

/// Builds a [`CheckpointState`] with random tensors
///
/// Structure (keys and shapes) always follows [`plan_layout`]. Values come
/// from OS entropy unless a seed is set.
///
/// # Example
///
/// ```rust
/// use fluxflow_fixtures::checkpoint::{CheckpointBuilder, FluxFlowDims};
///
/// let state = CheckpointBuilder::new(FluxFlowDims::default())
///     .with_seed(42)
///     .build()
///     .unwrap();
/// assert_eq!(
///     state.shape("compressor.latent_proj.0.0.weight").unwrap(),
///     &[320, 3, 1, 1]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct CheckpointBuilder {
    dims: FluxFlowDims,
    seed: Option<u64>,
}

impl CheckpointBuilder {
    /// Builder for the given hyperparameters
    pub fn new(dims: FluxFlowDims) -> Self {
        Self { dims, seed: None }
    }

    /// Make tensor values reproducible
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Hyperparameters this builder targets
    pub fn dims(&self) -> &FluxFlowDims {
        &self.dims
    }

    /// Allocate and fill every tensor of the layout
    ///
    /// # Errors
    ///
    /// Returns error if `dims` is invalid or a tensor buffer cannot be
    /// allocated.
    pub fn build(&self) -> Result<CheckpointState> {
        let layout = plan_layout(&self.dims)?;
        let mut gen = match self.seed {
            Some(seed) => SyntheticWeightGenerator::new(seed),
            None => SyntheticWeightGenerator::from_entropy(),
        };

        let mut state = CheckpointState::new();
        for (key, shape) in layout {
            let tensor = gen.randn(&shape)?;
            state.insert(key, tensor);
        }

        debug!(
            tensors = state.len(),
            elements = state.total_elements(),
            seed = ?self.seed,
            "built synthetic checkpoint"
        );

        Ok(state)
    }
}
