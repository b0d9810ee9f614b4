// ReactionDataset — indexed access to reaction examples
//
// One example is every reactant slot's molecule, every product slot's
// molecule, and a scalar label (the reaction yield). Graph data lives in two
// PackedGraphStores, one per role; `get` slices each slot once and copies
// the slice into an owned MolGraph, so the cost of an access is
// proportional to the size of that one example.

use rayon::prelude::*;

use rxngraph_core::{Error, Result};

use crate::artifact::Artifact;
use crate::dataset::Dataset;
use crate::graph::MolGraph;
use crate::schema;
use crate::source::{ArtifactResolver, DatasetId};
use crate::store::{PackedGraphStore, SlotRole};

/// One reaction example as handed to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionSample {
    /// One graph per reactant slot, in slot order.
    pub reactants: Vec<MolGraph>,
    /// One graph per product slot, in slot order.
    pub products: Vec<MolGraph>,
    pub label: f64,
}

impl ReactionSample {
    /// Reactant graphs followed by product graphs.
    pub fn graphs(&self) -> impl Iterator<Item = &MolGraph> {
        self.reactants.iter().chain(&self.products)
    }

    /// Flatten into `(reactants ++ products, label)`.
    pub fn into_parts(self) -> (Vec<MolGraph>, f64) {
        let mut graphs = self.reactants;
        graphs.extend(self.products);
        (graphs, self.label)
    }
}

/// Random-access dataset of reaction examples.
///
/// Built once, eagerly, and immutable afterwards. `get` only reads, so a
/// `ReactionDataset` can be shared across threads (e.g. behind an `Arc`)
/// and queried concurrently without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionDataset {
    name: String,
    reactants: PackedGraphStore,
    products: PackedGraphStore,
    labels: Vec<f64>,
    rsmi: Vec<String>,
}

impl ReactionDataset {
    /// Assemble a dataset from its stores and reaction table.
    ///
    /// Every slot of both stores must hold `labels.len()` examples. `rsmi`
    /// is either empty or has one entry per label.
    pub fn new(
        reactants: PackedGraphStore,
        products: PackedGraphStore,
        labels: Vec<f64>,
        rsmi: Vec<String>,
    ) -> Result<Self> {
        if reactants.role() != SlotRole::Reactant || products.role() != SlotRole::Product {
            return Err(Error::msg(format!(
                "stores passed in the wrong order: got {} and {}",
                reactants.role(),
                products.role()
            )));
        }

        if reactants.slot_count() > 0
            && products.slot_count() > 0
            && reactants.example_count() != products.example_count()
        {
            return Err(Error::malformed(
                SlotRole::Product.slot_label(0),
                format!(
                    "{} examples, but reactant slots have {}",
                    products.example_count(),
                    reactants.example_count()
                ),
            ));
        }

        for store in [&reactants, &products] {
            if store.slot_count() > 0 && store.example_count() != labels.len() {
                return Err(Error::malformed(
                    "reaction",
                    format!(
                        "{} labels, but {} slots have {} examples",
                        labels.len(),
                        store.role(),
                        store.example_count()
                    ),
                ));
            }
        }

        if !rsmi.is_empty() && rsmi.len() != labels.len() {
            return Err(Error::malformed(
                "reaction",
                format!("{} rsmi entries for {} labels", rsmi.len(), labels.len()),
            ));
        }

        Ok(Self {
            name: "reactions".to_string(),
            reactants,
            products,
            labels,
            rsmi,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Load a dataset split through `resolver`.
    pub fn load(resolver: &dyn ArtifactResolver, id: DatasetId, split: u32) -> Result<Self> {
        let name = id.artifact_name(split);
        let bytes = resolver.fetch(&name)?;
        let artifact = Artifact::from_bytes(&bytes).map_err(|e| match e {
            Error::Io(io) => Error::Schema(format!(
                "artifact {} is truncated: {io}",
                resolver.describe(&name)
            )),
            other => other,
        })?;
        let ds = Self::from_artifact(&artifact)?.with_name(format!("{id}/split-{split}"));
        tracing::info!(
            dataset = %ds.name,
            examples = ds.len(),
            reactant_slots = ds.reactant_slot_count(),
            product_slots = ds.product_slot_count(),
            "loaded reaction dataset"
        );
        Ok(ds)
    }

    /// Decode a dataset from an in-memory artifact.
    pub fn from_artifact(artifact: &Artifact) -> Result<Self> {
        schema::decode_dataset(artifact)
    }

    /// Encode this dataset back into an artifact.
    pub fn to_artifact(&self) -> Result<Artifact> {
        schema::encode_dataset(self)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reactant_slot_count(&self) -> usize {
        self.reactants.slot_count()
    }

    pub fn product_slot_count(&self) -> usize {
        self.products.slot_count()
    }

    pub fn reactants(&self) -> &PackedGraphStore {
        &self.reactants
    }

    pub fn products(&self) -> &PackedGraphStore {
        &self.products
    }

    /// Store for `role`.
    pub fn store(&self, role: SlotRole) -> &PackedGraphStore {
        match role {
            SlotRole::Reactant => &self.reactants,
            SlotRole::Product => &self.products,
        }
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn label(&self, index: usize) -> Result<f64> {
        self.labels
            .get(index)
            .copied()
            .ok_or_else(|| Error::index_out_of_range(index, self.len()))
    }

    /// Reaction SMILES of example `index`, when the artifact carried them.
    pub fn rsmi(&self, index: usize) -> Option<&str> {
        self.rsmi.get(index).map(String::as_str)
    }

    pub fn rsmi_all(&self) -> &[String] {
        &self.rsmi
    }

    /// Example `index`: reactant graphs, product graphs, label.
    pub fn get(&self, index: usize) -> Result<ReactionSample> {
        if index >= self.len() {
            return Err(Error::index_out_of_range(index, self.len()));
        }
        tracing::trace!(index, "assembling reaction sample");
        Ok(ReactionSample {
            reactants: self.reactants.graphs(index)?,
            products: self.products.graphs(index)?,
            label: self.labels[index],
        })
    }

    /// Like [`get`](Self::get) for a signed index. Negative indices are
    /// rejected, not counted from the end.
    pub fn get_signed(&self, index: i64) -> Result<ReactionSample> {
        match usize::try_from(index) {
            Ok(i) => self.get(i),
            Err(_) => Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            }),
        }
    }

    /// Fetch several examples on the rayon pool, in the order given.
    pub fn fetch_many(&self, indices: &[usize]) -> Result<Vec<ReactionSample>> {
        indices.par_iter().map(|&i| self.get(i)).collect()
    }
}

impl Dataset for ReactionDataset {
    type Item = ReactionSample;

    fn len(&self) -> usize {
        ReactionDataset::len(self)
    }

    fn get(&self, index: usize) -> Result<ReactionSample> {
        ReactionDataset::get(self, index)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
