//! Checkpoint Fixture Testing Infrastructure
//!
//! Setup helpers for tests of FluxFlow checkpoint consumers.
//!
//! # Design
//!
//! ```text
//! FluxFlowDims → plan_layout → CheckpointBuilder → CheckpointState
//!                                     ↑
//!                      SyntheticWeightGenerator (randn)
//!
//! temp_dir() → ScopedTempDir → removed on close / drop
//! ```
//!
//! Both fixtures are plain factories: every call returns an independent
//! directory or state, nothing is cached between calls.

pub mod fixtures;
pub mod generators;

pub use fixtures::{mock_checkpoint_state, seeded_checkpoint_state, temp_dir};
pub use generators::SyntheticWeightGenerator;
