//! Acquisition pipeline for the precomputed simple shapes dataset: resolve a
//! variant source, stream the archive to a staging file, unpack it atomically
//! and hand the result to the migration tool.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod layout;
pub mod migrate;
pub mod output;
