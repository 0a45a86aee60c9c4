//! Synthetic FluxFlow checkpoint state
//!
//! A checkpoint state is an ordered mapping from dotted keys to tensors, the
//! in-memory counterpart of a `state_dict`. The key names encode the model
//! component path and the tensor shapes encode the hyperparameters in
//! [`FluxFlowDims`].
//!
//! ## Layout
//!
//! ```text
//! compressor.latent_proj.0.0.weight                       [vae_dim*5, 3, 1, 1]
//! compressor.encoder_z.{i}.0.weight                       [vae_dim*2^i, vae_dim*2^(i-1), 3, 3]
//! compressor.token_attn.{i}.attn.in_proj_weight           [3*vae_dim, vae_dim]
//! flow_processor.vae_to_dmodel.weight                     [flow_dim, vae_dim]
//! flow_processor.text_proj.weight                         [flow_dim, text_embed_dim]
//! flow_processor.transformer_blocks.{i}.self_attn.q_proj.weight  [flow_dim, flow_dim]
//! expander.upscale.layers.{i}.conv1.0.weight              [vae_dim, vae_dim*2^(n-1-i), 3, 3]
//! ```

use std::collections::btree_map::{self, BTreeMap};

use crate::error::{FixtureError, Result};
use crate::tensor::Tensor;

pub mod builder;
pub mod config;
pub mod inspect;
pub mod keys;

pub use builder::{plan_layout, CheckpointBuilder};
pub use config::FluxFlowDims;
pub use inspect::{detect_dims, verify};
pub use keys::{ComponentFamily, IndexedFamily};

/// Key to tensor-shape mapping, without tensor data
pub type Manifest = BTreeMap<String, Vec<usize>>;

/// Mapping from dotted keys to F32 tensors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointState {
    tensors: BTreeMap<String, Tensor<f32>>,
}

impl CheckpointState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tensor, returning the one previously stored under `key`
    pub fn insert(&mut self, key: impl Into<String>, tensor: Tensor<f32>) -> Option<Tensor<f32>> {
        self.tensors.insert(key.into(), tensor)
    }

    /// Remove a tensor
    pub fn remove(&mut self, key: &str) -> Option<Tensor<f32>> {
        self.tensors.remove(key)
    }

    /// Tensor stored under `key`
    pub fn get(&self, key: &str) -> Option<&Tensor<f32>> {
        self.tensors.get(key)
    }

    /// Shape of the tensor stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `MissingTensor` if the key is absent.
    pub fn shape(&self, key: &str) -> Result<&[usize]> {
        self.get(key)
            .map(Tensor::shape)
            .ok_or_else(|| FixtureError::MissingTensor {
                key: key.to_string(),
            })
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.tensors.contains_key(key)
    }

    /// Number of tensors
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Whether the state holds no tensors
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }

    /// `(key, tensor)` pairs in sorted key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Tensor<f32>> {
        self.tensors.iter()
    }

    /// Keys whose first dot-group names `family`
    pub fn family_keys(&self, family: ComponentFamily) -> impl Iterator<Item = &str> {
        self.keys()
            .filter(move |key| ComponentFamily::of_key(key).is_ok_and(|f| f == family))
    }

    /// Keys and shapes only
    pub fn manifest(&self) -> Manifest {
        self.tensors
            .iter()
            .map(|(key, tensor)| (key.clone(), tensor.shape().to_vec()))
            .collect()
    }

    /// Total element count across all tensors
    pub fn total_elements(&self) -> usize {
        self.tensors.values().map(Tensor::size).sum()
    }

    /// Bytes held by tensor data
    pub fn memory_bytes(&self) -> usize {
        self.total_elements() * std::mem::size_of::<f32>()
    }

    /// Consume into the underlying map
    pub fn into_inner(self) -> BTreeMap<String, Tensor<f32>> {
        self.tensors
    }
}

impl FromIterator<(String, Tensor<f32>)> for CheckpointState {
    fn from_iter<I: IntoIterator<Item = (String, Tensor<f32>)>>(iter: I) -> Self {
        Self {
            tensors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CheckpointState {
    type Item = (String, Tensor<f32>);
    type IntoIter = btree_map::IntoIter<String, Tensor<f32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tensors.into_iter()
    }
}

impl<'a> IntoIterator for &'a CheckpointState {
    type Item = (&'a String, &'a Tensor<f32>);
    type IntoIter = btree_map::Iter<'a, String, Tensor<f32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tensors.iter()
    }
}
