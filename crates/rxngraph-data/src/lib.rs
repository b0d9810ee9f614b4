//! # rxngraph-data
//!
//! Packed reaction-graph storage and indexed datasets for rxngraph.
//!
//! This crate provides:
//! - [`Artifact`] — single-file container of named little-endian arrays
//! - [`PackedGraphStore`] — per-slot concatenated graph arrays with O(1)
//!   per-example slicing through prefix-sum offset tables
//! - [`ReactionDataset`] — random access to reaction examples as owned
//!   [`MolGraph`]s plus a yield label
//! - [`Dataset`] trait — unified indexed interface
//! - [`ArtifactResolver`] — pluggable artifact lookup (filesystem, memory)
//! - Synthetic datasets with seeded, reproducible layouts

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod graph;
pub mod reaction;
pub mod record;
pub mod schema;
pub mod source;
pub mod store;
pub mod synthetic;

pub use artifact::{Artifact, RawArray};
pub use config::DataConfig;
pub use dataset::Dataset;
pub use graph::MolGraph;
pub use reaction::{ReactionDataset, ReactionSample};
pub use record::MoleculeRecord;
pub use source::{ArtifactResolver, DatasetId, FsResolver, MemoryResolver};
pub use store::{PackedArrays, PackedGraphStore, PackedSlot, SlotRole, SlotSlice};
pub use synthetic::{synthetic_dataset, SyntheticConfig};
