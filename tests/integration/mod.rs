//! Integration test suite for tmplpack
//!
//! End-to-end tests driving the library through [`tmplpack::service`] and the
//! binary through `assert_cmd`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **tree_shape**: Tree layout for files, blocks, directories and merges
//! - **freshness**: Freshness propagation and block/owner agreement
//! - **artifact_cache**: Reuse versus rebuild in persist and respond modes
//! - **reload**: Reload off versus on after editing a source file
//! - **requests**: URL handling and pass-through
//! - **cli**: The `build`, `get` and `tree` commands

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod artifact_cache;
mod freshness;
mod reload;
mod requests;
mod tree_shape;
