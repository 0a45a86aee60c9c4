//! FluxFlow hyperparameters and the shape derivations tied to them

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, Result};

/// Ratio between the compressor's latent projection width and `vae_dim`.
///
/// Opaque fixture constant: `latent_proj` leads with `vae_dim * 5`.
pub const VAE_CHANNEL_RATIO: usize = 5;

/// Input image channels seen by `compressor.latent_proj`
pub const IMAGE_CHANNELS: usize = 3;

/// Packed query/key/value projections per attention layer
pub const QKV_PACK: usize = 3;

/// Spatial kernel size of the encoder/expander convolutions
pub const CONV_KERNEL: usize = 3;

/// Hyperparameters a FluxFlow checkpoint encodes in its tensor shapes
///
/// Missing fields deserialize to the fixture defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FluxFlowDims {
    /// Compressor latent width
    pub vae_dim: usize,
    /// Flow transformer working width (d_model)
    pub flow_dim: usize,
    /// Width of the external text embeddings
    pub text_embed_dim: usize,
    /// Number of `compressor.encoder_z` stages
    pub downscale_stages: usize,
    /// Number of `expander.upscale.layers` stages
    pub upscale_stages: usize,
    /// Number of `compressor.token_attn` layers
    pub vae_attn_layers: usize,
    /// Number of `flow_processor.transformer_blocks`
    pub flow_transformer_layers: usize,
}

impl Default for FluxFlowDims {
    fn default() -> Self {
        Self {
            vae_dim: 64,
            flow_dim: 128,
            text_embed_dim: 256,
            downscale_stages: 2,
            upscale_stages: 2,
            vae_attn_layers: 2,
            flow_transformer_layers: 2,
        }
    }
}

impl FluxFlowDims {
    /// Parse from a JSON document
    ///
    /// # Errors
    ///
    /// Returns error on malformed JSON or if the result fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dims: Self = serde_json::from_str(json)
            .map_err(|e| FixtureError::InvalidConfiguration(format!("Malformed dims JSON: {e}")))?;
        dims.validate()?;
        Ok(dims)
    }

    /// Load from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| FixtureError::IoError {
            message: format!("Failed to read dims file {}: {e}", path.display()),
        })?;
        Self::from_json_str(&json)
    }

    /// Check every dimension is positive and every derived width fits in `usize`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("vae_dim", self.vae_dim),
            ("flow_dim", self.flow_dim),
            ("text_embed_dim", self.text_embed_dim),
            ("downscale_stages", self.downscale_stages),
            ("upscale_stages", self.upscale_stages),
            ("vae_attn_layers", self.vae_attn_layers),
            ("flow_transformer_layers", self.flow_transformer_layers),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| *value == 0) {
            return Err(FixtureError::InvalidConfiguration(format!(
                "{name} must be greater than zero"
            )));
        }

        self.vae_channel_dim()?;
        self.attn_in_proj_dim()?;
        self.encoder_stage_channels(self.downscale_stages - 1)?;
        self.upscale_stage_channels(0)?;
        Ok(())
    }

    /// Leading dimension of `compressor.latent_proj.0.0.weight`
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn vae_channel_dim(&self) -> Result<usize> {
        checked_mul(self.vae_dim, VAE_CHANNEL_RATIO, "vae_channel_dim")
    }

    /// Leading dimension of `*.attn.in_proj_weight` (packed Q/K/V)
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn attn_in_proj_dim(&self) -> Result<usize> {
        checked_mul(self.vae_dim, QKV_PACK, "attn_in_proj_dim")
    }

    /// `(out, in)` channels of encoder stage `stage`
    ///
    /// Stage `i` doubles width: `out = vae_dim * 2^i`, and takes the previous
    /// stage's output (the first stage takes `vae_dim`).
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn encoder_stage_channels(&self, stage: usize) -> Result<(usize, usize)> {
        let out = scaled(self.vae_dim, stage, "encoder_z out channels")?;
        let input = scaled(self.vae_dim, stage.saturating_sub(1), "encoder_z in channels")?;
        Ok((out, input))
    }

    /// `(out, in)` channels of expander stage `stage`
    ///
    /// Expander stages halve width back down to `vae_dim`:
    /// `in = vae_dim * 2^(upscale_stages - 1 - j)`, `out = vae_dim`.
    ///
    /// # Errors
    ///
    /// Returns error on overflow or if `stage` is out of range.
    pub fn upscale_stage_channels(&self, stage: usize) -> Result<(usize, usize)> {
        if stage >= self.upscale_stages {
            return Err(FixtureError::InvalidConfiguration(format!(
                "Upscale stage {stage} out of range (upscale_stages = {})",
                self.upscale_stages
            )));
        }
        let depth = self.upscale_stages - 1 - stage;
        let input = scaled(self.vae_dim, depth, "upscale in channels")?;
        Ok((self.vae_dim, input))
    }
}

fn checked_mul(a: usize, b: usize, what: &str) -> Result<usize> {
    a.checked_mul(b)
        .ok_or_else(|| FixtureError::InvalidConfiguration(format!("{what} overflows usize")))
}

/// `base * 2^exp`, failing on overflow
fn scaled(base: usize, exp: usize, what: &str) -> Result<usize> {
    u32::try_from(exp)
        .ok()
        .and_then(|e| 1usize.checked_shl(e))
        .and_then(|factor| base.checked_mul(factor))
        .ok_or_else(|| FixtureError::InvalidConfiguration(format!("{what} overflows usize")))
}
