//! Checkpoint key naming scheme
//!
//! Keys are dot-delimited paths. The first group names the component family
//! (`compressor`, `flow_processor`, `expander`). Repeated stages and blocks
//! carry an integer group right after the family's role prefix:
//!
//! ```text
//! compressor.encoder_z.{i}.0.weight
//! expander.upscale.layers.{i}.conv1.0.weight
//! compressor.token_attn.{i}.attn.in_proj_weight
//! flow_processor.transformer_blocks.{i}.self_attn.q_proj.weight
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{FixtureError, Result};

/// Compressor latent projection (leading dim = `vae_dim * 5`)
pub const LATENT_PROJ: &str = "compressor.latent_proj.0.0.weight";

/// Projection from compressor latent space into the flow width
pub const VAE_TO_DMODEL: &str = "flow_processor.vae_to_dmodel.weight";

/// Projection from text embeddings into the flow width
pub const TEXT_PROJ: &str = "flow_processor.text_proj.weight";

/// Top-level model component a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentFamily {
    /// VAE encoder side
    Compressor,
    /// Flow transformer
    FlowProcessor,
    /// VAE decoder side
    Expander,
}

impl ComponentFamily {
    /// All families
    pub const ALL: [Self; 3] = [Self::Compressor, Self::FlowProcessor, Self::Expander];

    /// First dot-group of every key in this family
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Compressor => "compressor",
            Self::FlowProcessor => "flow_processor",
            Self::Expander => "expander",
        }
    }

    /// Family of a key, from its first dot-group
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if the key has no role after the family or the
    /// family is unknown.
    pub fn of_key(key: &str) -> Result<Self> {
        let (head, rest) = key.split_once('.').ok_or_else(|| FixtureError::InvalidKey {
            key: key.to_string(),
            reason: "no role after family prefix".to_string(),
        })?;
        if rest.is_empty() {
            return Err(FixtureError::InvalidKey {
                key: key.to_string(),
                reason: "empty role".to_string(),
            });
        }
        Self::ALL
            .into_iter()
            .find(|family| family.prefix() == head)
            .ok_or_else(|| FixtureError::InvalidKey {
                key: key.to_string(),
                reason: format!("unknown component family '{head}'"),
            })
    }
}

impl fmt::Display for ComponentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Family of repeated, integer-indexed stages or blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexedFamily {
    /// Compressor downscale stages
    EncoderZ,
    /// Expander upscale stages
    UpscaleLayers,
    /// Compressor token attention layers
    TokenAttn,
    /// Flow transformer blocks
    TransformerBlocks,
}

impl IndexedFamily {
    /// All indexed families
    pub const ALL: [Self; 4] = [
        Self::EncoderZ,
        Self::UpscaleLayers,
        Self::TokenAttn,
        Self::TransformerBlocks,
    ];

    /// Key prefix up to (not including) the index group
    pub fn prefix(self) -> &'static str {
        match self {
            Self::EncoderZ => "compressor.encoder_z",
            Self::UpscaleLayers => "expander.upscale.layers",
            Self::TokenAttn => "compressor.token_attn",
            Self::TransformerBlocks => "flow_processor.transformer_blocks",
        }
    }

    /// Key remainder after the index group for the tensor the fixture emits
    pub fn suffix(self) -> &'static str {
        match self {
            Self::EncoderZ => "0.weight",
            Self::UpscaleLayers => "conv1.0.weight",
            Self::TokenAttn => "attn.in_proj_weight",
            Self::TransformerBlocks => "self_attn.q_proj.weight",
        }
    }

    /// Component family the prefix lives in
    pub fn component(self) -> ComponentFamily {
        match self {
            Self::EncoderZ | Self::TokenAttn => ComponentFamily::Compressor,
            Self::UpscaleLayers => ComponentFamily::Expander,
            Self::TransformerBlocks => ComponentFamily::FlowProcessor,
        }
    }

    /// Key of entry `index`
    ///
    /// ```
    /// use fluxflow_fixtures::checkpoint::keys::IndexedFamily;
    ///
    /// assert_eq!(
    ///     IndexedFamily::TokenAttn.key(1),
    ///     "compressor.token_attn.1.attn.in_proj_weight"
    /// );
    /// ```
    pub fn key(self, index: usize) -> String {
        format!("{}.{index}.{}", self.prefix(), self.suffix())
    }

    /// Index group of `key` if it belongs to this family
    ///
    /// Any remainder after the index is accepted, so a consumer can count
    /// stages from whichever tensors a stage carries. Groups with a leading
    /// zero (`01`) are not indices.
    pub fn parse_index(self, key: &str) -> Option<usize> {
        let group = self.index_group(key)?;
        if is_padded(group) {
            return None;
        }
        group.parse().ok()
    }

    /// Raw all-digit group after the family prefix
    fn index_group(self, key: &str) -> Option<&str> {
        let rest = key.strip_prefix(self.prefix())?.strip_prefix('.')?;
        let (index, remainder) = rest.split_once('.')?;
        if remainder.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(index)
    }

    /// Number of entries among `keys`, requiring indices `0..n` with no gap
    ///
    /// Returns 0 if no key belongs to the family.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for a zero-padded index group and
    /// `NonContiguousIndex` with the first missing index.
    pub fn count<'a, I>(self, keys: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut indices = BTreeSet::new();
        for key in keys {
            let Some(group) = self.index_group(key) else {
                continue;
            };
            if is_padded(group) {
                return Err(FixtureError::InvalidKey {
                    key: key.to_string(),
                    reason: format!("index group '{group}' has a leading zero"),
                });
            }
            let index = group.parse::<usize>().map_err(|e| FixtureError::InvalidKey {
                key: key.to_string(),
                reason: format!("index group '{group}': {e}"),
            })?;
            indices.insert(index);
        }

        for (expected, &found) in indices.iter().enumerate() {
            if expected != found {
                return Err(FixtureError::NonContiguousIndex {
                    family: self.prefix().to_string(),
                    missing: expected,
                });
            }
        }

        Ok(indices.len())
    }
}

fn is_padded(group: &str) -> bool {
    group.len() > 1 && group.starts_with('0')
}

impl fmt::Display for IndexedFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_of_fixed_keys() {
        assert_eq!(
            ComponentFamily::of_key(LATENT_PROJ).unwrap(),
            ComponentFamily::Compressor
        );
        assert_eq!(
            ComponentFamily::of_key(VAE_TO_DMODEL).unwrap(),
            ComponentFamily::FlowProcessor
        );
        assert_eq!(
            ComponentFamily::of_key("expander.upscale.layers.0.conv1.0.weight").unwrap(),
            ComponentFamily::Expander
        );
    }

    #[test]
    fn test_family_rejects_bad_keys() {
        assert!(ComponentFamily::of_key("compressor").is_err());
        assert!(ComponentFamily::of_key("compressor.").is_err());
        let err = ComponentFamily::of_key("decoder.conv.weight").unwrap_err();
        assert!(err.to_string().contains("unknown component family 'decoder'"));
    }

    #[test]
    fn test_indexed_keys() {
        assert_eq!(IndexedFamily::EncoderZ.key(0), "compressor.encoder_z.0.0.weight");
        assert_eq!(
            IndexedFamily::UpscaleLayers.key(1),
            "expander.upscale.layers.1.conv1.0.weight"
        );
        assert_eq!(
            IndexedFamily::TransformerBlocks.key(0),
            "flow_processor.transformer_blocks.0.self_attn.q_proj.weight"
        );
    }

    #[test]
    fn test_indexed_key_component_matches_prefix() {
        for family in IndexedFamily::ALL {
            let key = family.key(0);
            assert_eq!(ComponentFamily::of_key(&key).unwrap(), family.component());
        }
    }

    #[test]
    fn test_parse_index() {
        let fam = IndexedFamily::EncoderZ;
        assert_eq!(fam.parse_index("compressor.encoder_z.12.0.weight"), Some(12));
        assert_eq!(fam.parse_index("compressor.encoder_z.3.1.bias"), Some(3));
        assert_eq!(fam.parse_index("compressor.encoder_zz.0.0.weight"), None);
        assert_eq!(fam.parse_index("compressor.encoder_z.x.0.weight"), None);
        assert_eq!(fam.parse_index("compressor.encoder_z.+1.0.weight"), None);
        assert_eq!(fam.parse_index("compressor.encoder_z.0"), None);
        assert_eq!(fam.parse_index("compressor.encoder_z.01.0.weight"), None);
        assert_eq!(fam.parse_index("compressor.encoder_z.10.0.weight"), Some(10));
        assert_eq!(fam.parse_index(LATENT_PROJ), None);
    }

    #[test]
    fn test_count_contiguous() {
        let keys = [
            "compressor.token_attn.0.attn.in_proj_weight",
            "compressor.token_attn.1.attn.in_proj_weight",
            "compressor.token_attn.1.attn.out_proj.weight",
            LATENT_PROJ,
        ];
        assert_eq!(IndexedFamily::TokenAttn.count(keys).unwrap(), 2);
        assert_eq!(IndexedFamily::EncoderZ.count(keys).unwrap(), 0);
    }

    #[test]
    fn test_count_gap() {
        let keys = [
            "compressor.encoder_z.0.0.weight",
            "compressor.encoder_z.2.0.weight",
        ];
        let err = IndexedFamily::EncoderZ.count(keys).unwrap_err();
        assert_eq!(
            err,
            FixtureError::NonContiguousIndex {
                family: "compressor.encoder_z".to_string(),
                missing: 1,
            }
        );
    }

    #[test]
    fn test_count_not_starting_at_zero() {
        let keys = ["flow_processor.transformer_blocks.1.self_attn.q_proj.weight"];
        let err = IndexedFamily::TransformerBlocks.count(keys).unwrap_err();
        assert!(matches!(
            err,
            FixtureError::NonContiguousIndex { missing: 0, .. }
        ));
    }

    #[test]
    fn test_count_rejects_zero_padded_index() {
        let keys = [
            "compressor.encoder_z.0.0.weight",
            "compressor.encoder_z.1.0.weight",
            "compressor.encoder_z.01.0.weight",
        ];
        let err = IndexedFamily::EncoderZ.count(keys).unwrap_err();
        assert!(matches!(
            err,
            FixtureError::InvalidKey { ref key, .. } if key == "compressor.encoder_z.01.0.weight"
        ));
    }

    #[test]
    fn test_count_rejects_overflowing_index() {
        let keys = ["compressor.token_attn.99999999999999999999999.attn.in_proj_weight"];
        assert!(matches!(
            IndexedFamily::TokenAttn.count(keys),
            Err(FixtureError::InvalidKey { .. })
        ));
    }
}
