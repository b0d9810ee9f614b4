//! # rxngraph
//!
//! Random-access reaction graph datasets for graph learning in Rust.
//!
//! This is the top-level facade crate that re-exports everything you need.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rxngraph::prelude::*;
//!
//! # fn main() -> rxngraph::Result<()> {
//! let config = DataConfig::default().root("./data");
//! let ds = ReactionDataset::load(&config.resolver(), DatasetId::Production1, 0)?;
//! let sample = ds.get(0)?;
//! println!("{} reactants, label {}", sample.reactants.len(), sample.label);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! | Crate | Purpose |
//! |-------|----------|
//! | `rxngraph-core` | Error, DType, Shape, AttrTable |
//! | `rxngraph-data` | Artifact container, PackedGraphStore, ReactionDataset, resolvers |
//!
//! ## Modules
//!
//! - [`summary`] — per-slot statistics and sample descriptions

/// Re-export core types.
pub use rxngraph_core::{AttrTable, AttrView, DType, Error, Result, Shape, WithDType};

/// Re-export the data layer.
pub mod data {
    pub use rxngraph_data::*;
}

/// Summary — dataset statistics for logs and the inspect tool.
pub mod summary;

/// Prelude: import this for the most common types.
pub mod prelude {
    pub use crate::data::{
        synthetic_dataset, Artifact, ArtifactResolver, DataConfig, Dataset, DatasetId,
        FsResolver, MemoryResolver, MolGraph, MoleculeRecord, PackedGraphStore, ReactionDataset,
        ReactionSample, SlotRole, SyntheticConfig,
    };
    pub use crate::summary::{describe_sample, DatasetSummary};
    pub use crate::{AttrTable, DType, Error, Result, Shape};
}
