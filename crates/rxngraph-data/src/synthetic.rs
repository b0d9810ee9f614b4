// Synthetic reaction datasets for tests, benchmarks and demos
//
// Molecules get a random node count in [0, max_nodes] and, when they have
// nodes, a random edge count in [0, max_edges] with endpoints drawn from
// their own nodes. A fraction of molecules is forced empty, to exercise the
// zero-node / zero-edge paths.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rxngraph_core::{AttrTable, Result};

use crate::reaction::ReactionDataset;
use crate::record::MoleculeRecord;
use crate::store::{PackedGraphStore, SlotRole};

/// Shape of a synthetic dataset.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub examples: usize,
    pub reactant_slots: usize,
    pub product_slots: usize,
    pub node_dim: usize,
    pub edge_dim: usize,
    pub max_nodes: usize,
    pub max_edges: usize,
    /// Probability that a molecule is generated with no nodes at all.
    /// Clamped to `[0, 1]`; NaN counts as 0.
    pub empty_prob: f64,
    /// Optional random seed for reproducible datasets.
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            examples: 64,
            reactant_slots: 2,
            product_slots: 1,
            node_dim: 8,
            edge_dim: 4,
            max_nodes: 12,
            max_edges: 24,
            empty_prob: 0.1,
            seed: None,
        }
    }
}

impl SyntheticConfig {
    pub fn examples(mut self, n: usize) -> Self {
        self.examples = n;
        self
    }

    pub fn slots(mut self, reactants: usize, products: usize) -> Self {
        self.reactant_slots = reactants;
        self.product_slots = products;
        self
    }

    pub fn dims(mut self, node_dim: usize, edge_dim: usize) -> Self {
        self.node_dim = node_dim;
        self.edge_dim = edge_dim;
        self
    }

    pub fn max_size(mut self, max_nodes: usize, max_edges: usize) -> Self {
        self.max_nodes = max_nodes;
        self.max_edges = max_edges;
        self
    }

    pub fn empty_prob(mut self, p: f64) -> Self {
        self.empty_prob = p;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }
}

/// One random molecule.
pub fn random_molecule<R: Rng>(rng: &mut R, config: &SyntheticConfig) -> Result<MoleculeRecord> {
    let empty_prob = if config.empty_prob.is_nan() {
        0.0
    } else {
        config.empty_prob.clamp(0.0, 1.0)
    };
    if rng.gen_bool(empty_prob) {
        return Ok(MoleculeRecord::empty(config.node_dim, config.edge_dim));
    }
    let nodes = rng.gen_range(0..=config.max_nodes);
    let edges = if nodes == 0 {
        0
    } else {
        rng.gen_range(0..=config.max_edges)
    };

    let node_vals: Vec<f32> = (0..nodes * config.node_dim).map(|_| rng.gen()).collect();
    let edge_vals: Vec<f32> = (0..edges * config.edge_dim).map(|_| rng.gen()).collect();
    let src: Vec<u32> = (0..edges).map(|_| rng.gen_range(0..nodes as u32)).collect();
    let dst: Vec<u32> = (0..edges).map(|_| rng.gen_range(0..nodes as u32)).collect();

    Ok(MoleculeRecord::new(
        AttrTable::new(node_vals, nodes, config.node_dim)?,
        AttrTable::new(edge_vals, edges, config.edge_dim)?,
        src,
        dst,
    ))
}

/// `slots` slots of `config.examples` random molecules each, as
/// `records[slot][example]`.
pub fn random_slots<R: Rng>(
    rng: &mut R,
    config: &SyntheticConfig,
    slots: usize,
) -> Result<Vec<Vec<MoleculeRecord>>> {
    let mut out = Vec::with_capacity(slots);
    for _ in 0..slots {
        let mut records = Vec::with_capacity(config.examples);
        for _ in 0..config.examples {
            records.push(random_molecule(rng, config)?);
        }
        out.push(records);
    }
    Ok(out)
}

/// Generate a full dataset with labels in `[0, 1)` and placeholder SMILES.
pub fn synthetic_dataset(config: &SyntheticConfig) -> Result<ReactionDataset> {
    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let reactant_records = random_slots(&mut rng, config, config.reactant_slots)?;
    let product_records = random_slots(&mut rng, config, config.product_slots)?;
    let labels: Vec<f64> = (0..config.examples).map(|_| rng.gen()).collect();
    let rsmi: Vec<String> = (0..config.examples).map(|i| format!("R{i}>>P{i}")).collect();

    let reactants = PackedGraphStore::from_records(SlotRole::Reactant, &reactant_records)?;
    let products = PackedGraphStore::from_records(SlotRole::Product, &product_records)?;
    tracing::debug!(examples = config.examples, seed = ?config.seed, "generated synthetic dataset");
    Ok(ReactionDataset::new(reactants, products, labels, rsmi)?.with_name("synthetic"))
}
