//! # fluxflow-fixtures
//!
//! Test fixtures for code that loads FluxFlow checkpoints.
//!
//! Two independent helpers:
//!
//! - **Scoped temporary directories**: a fresh, uniquely named directory per
//!   test, removed recursively when the scope ends, on success or failure.
//! - **Synthetic checkpoint state**: a mapping from dotted keys
//!   (`compressor.*`, `flow_processor.*`, `expander.*`) to random tensors
//!   whose shapes encode a consistent set of hyperparameters.
//!
//! ## Example
//!
//! ```rust
//! use fluxflow_fixtures::{mock_checkpoint_state, temp_dir};
//! use fluxflow_fixtures::checkpoint::{detect_dims, FluxFlowDims};
//!
//! let dir = temp_dir().unwrap();
//! assert!(dir.path().is_dir());
//!
//! let state = mock_checkpoint_state().unwrap();
//! assert_eq!(state.shape("compressor.token_attn.0.attn.in_proj_weight").unwrap(), &[192, 64]);
//! assert_eq!(detect_dims(&state).unwrap(), FluxFlowDims::default());
//! ```
//!
//! ## Shape contract
//!
//! | Key | Shape |
//! |-----|-------|
//! | `compressor.latent_proj.0.0.weight` | `[vae_dim * 5, 3, 1, 1]` |
//! | `flow_processor.vae_to_dmodel.weight` | `[flow_dim, vae_dim]` |
//! | `flow_processor.text_proj.weight` | `[flow_dim, text_embed_dim]` |
//! | `compressor.token_attn.{i}.attn.in_proj_weight` | `[3 * vae_dim, vae_dim]` |
//!
//! See [`checkpoint`] for the full layout.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
// Clippy allows (MUST come after deny/warn to override them)
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // usize -> f32 for init scales
#![allow(clippy::must_use_candidate)] // Not all methods need #[must_use]
#![allow(clippy::doc_markdown)] // Allow technical terms without backticks
#![allow(clippy::missing_panics_doc)] // Allow missing Panics doc sections
#![allow(clippy::float_cmp)] // Allow float comparisons in tests

pub mod checkpoint;
pub mod error;
pub mod temp_dir;
pub mod tensor;
/// Fixture entry points and synthetic weight generation
pub mod testing;

pub use checkpoint::{CheckpointBuilder, CheckpointState, FluxFlowDims};
pub use error::{FixtureError, Result};
pub use temp_dir::ScopedTempDir;
pub use tensor::Tensor;
pub use testing::{mock_checkpoint_state, seeded_checkpoint_state, temp_dir};
