// Summary — per-slot statistics of a ReactionDataset
//
// Used by `rxngraph-inspect` and handy in notebooks/logs:
//
//   let summary = DatasetSummary::from_dataset(&ds);
//   println!("{summary}");

use std::fmt;

use rxngraph_data::{MolGraph, PackedSlot, ReactionDataset, ReactionSample};

// ---------------------------------------------------------------------------
// SlotSummary — one packed slot
// ---------------------------------------------------------------------------

/// Statistics for one slot of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSummary {
    /// Slot name, e.g. `reactant[0]`.
    pub slot: String,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_dim: usize,
    pub edge_dim: usize,
    /// Examples whose molecule in this slot has no nodes.
    pub empty_molecules: usize,
    /// Largest molecule in this slot, by node count.
    pub max_nodes: usize,
    /// Bytes held by the attribute pools and endpoint arrays.
    pub pool_bytes: usize,
}

impl SlotSummary {
    pub fn from_slot(slot: String, packed: &PackedSlot) -> Self {
        let counts = packed.node_counts();
        let pool_bytes = (packed.node_attr().as_slice().len()
            + packed.edge_attr().as_slice().len()
            + packed.src().len()
            + packed.dst().len())
            * 4;
        SlotSummary {
            slot,
            total_nodes: packed.total_nodes(),
            total_edges: packed.total_edges(),
            node_dim: packed.node_feature_dim(),
            edge_dim: packed.edge_feature_dim(),
            empty_molecules: counts.iter().filter(|&&c| c == 0).count(),
            max_nodes: counts.iter().copied().max().unwrap_or(0),
            pool_bytes,
        }
    }

    /// Mean nodes per example, 0 for an empty slot.
    pub fn mean_nodes(&self, examples: usize) -> f64 {
        if examples == 0 {
            0.0
        } else {
            self.total_nodes as f64 / examples as f64
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetSummary — every slot of both roles
// ---------------------------------------------------------------------------

/// Summary statistics for a reaction dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub name: String,
    pub examples: usize,
    /// Reactant slots first, then product slots.
    pub slots: Vec<SlotSummary>,
    /// Smallest and largest label, `None` for an empty dataset.
    pub label_range: Option<(f64, f64)>,
}

impl DatasetSummary {
    pub fn from_dataset(ds: &ReactionDataset) -> Self {
        let mut slots = Vec::with_capacity(ds.reactant_slot_count() + ds.product_slot_count());
        for store in [ds.reactants(), ds.products()] {
            for (j, packed) in store.slots().iter().enumerate() {
                slots.push(SlotSummary::from_slot(store.role().slot_label(j), packed));
            }
        }

        let label_range = ds.labels().iter().fold(None, |acc, &y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((f64::min(lo, y), f64::max(hi, y))),
        });

        DatasetSummary {
            name: ds.name().to_string(),
            examples: ds.len(),
            slots,
            label_range,
        }
    }

    /// Total bytes of packed storage across all slots.
    pub fn pool_bytes(&self) -> usize {
        self.slots.iter().map(|s| s.pool_bytes).sum()
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "┌──────────────────────────────────────────────────────────────────┐"
        )?;
        writeln!(
            f,
            "│ {:<40} {:>14} examples │",
            truncate_str(&self.name, 40),
            self.examples
        )?;
        writeln!(
            f,
            "├──────────────────────────────────────────────────────────────────┤"
        )?;
        writeln!(
            f,
            "│ {:<12} {:>10} {:>10} {:>8} {:>6} {:>6} {:>8} │",
            "slot", "nodes", "edges", "avg n", "n_dim", "e_dim", "empty"
        )?;
        for s in &self.slots {
            writeln!(
                f,
                "│ {:<12} {:>10} {:>10} {:>8.2} {:>6} {:>6} {:>8} │",
                truncate_str(&s.slot, 12),
                s.total_nodes,
                s.total_edges,
                s.mean_nodes(self.examples),
                s.node_dim,
                s.edge_dim,
                s.empty_molecules
            )?;
        }
        writeln!(
            f,
            "├──────────────────────────────────────────────────────────────────┤"
        )?;
        let labels = match self.label_range {
            Some((lo, hi)) => format!("{lo:.4} .. {hi:.4}"),
            None => "-".to_string(),
        };
        writeln!(
            f,
            "│ Labels: {:<30} Packed: {:<18} │",
            labels,
            format_bytes(self.pool_bytes())
        )?;
        writeln!(
            f,
            "└──────────────────────────────────────────────────────────────────┘"
        )?;
        Ok(())
    }
}

/// One line per graph of a sample: slot, nodes, edges, attribute shapes.
pub fn describe_sample(sample: &ReactionSample) -> String {
    let mut out = String::new();
    let line = |out: &mut String, slot: String, g: &MolGraph| {
        out.push_str(&format!(
            "{slot:<12} nodes={:<4} edges={:<4} node_attr={} edge_attr={}\n",
            g.num_nodes(),
            g.num_edges(),
            g.node_attr().shape(),
            g.edge_attr().shape()
        ));
    };
    for (j, g) in sample.reactants.iter().enumerate() {
        line(&mut out, format!("reactant[{j}]"), g);
    }
    for (j, g) in sample.products.iter().enumerate() {
        line(&mut out, format!("product[{j}]"), g);
    }
    out.push_str(&format!("label        {}\n", sample.label));
    out
}

/// Format bytes into a human-readable string (B, KB, MB, GB).
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;
    const GB: usize = 1024 * MB;
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
