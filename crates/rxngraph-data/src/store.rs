// PackedGraphStore — variably sized molecule graphs, packed per slot
//
// Every example of a dataset fills the same fixed set of slots (reactant 0,
// reactant 1, ..., product 0, ...). For each slot we keep one pool per
// array, concatenated across all examples in example order:
//
//   node_counts  [2, 1, 3]
//   node_offsets [0, 2, 3, 6]        prefix sum with a leading 0
//   node_attr    rows 0..6           example i owns rows offsets[i]..offsets[i+1]
//
// and the same for edges (edge_counts / edge_offsets / edge_attr / src / dst).
// Endpoints are NOT shifted when packing: src/dst stay local to the owning
// molecule, so a slice can be handed to a graph constructor unchanged.
//
// Looking up example i is two offset reads per table, i.e. O(1), and the
// returned slice borrows the pools without copying.

use std::fmt;

use rayon::prelude::*;

use rxngraph_core::{AttrTable, AttrView, Error, Result};

use crate::graph::MolGraph;
use crate::record::MoleculeRecord;

/// Which side of the reaction a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRole {
    Reactant,
    Product,
}

impl SlotRole {
    /// Prefix of this role's keys in an artifact.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            SlotRole::Reactant => "reactant",
            SlotRole::Product => "product",
        }
    }

    /// Name of slot `index` of this role, e.g. `reactant[0]`.
    pub fn slot_label(&self, index: usize) -> String {
        format!("{}[{index}]", self.key_prefix())
    }
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key_prefix())
    }
}

/// The six packed arrays of one slot, as read from an artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedArrays {
    pub node_counts: Vec<usize>,
    pub edge_counts: Vec<usize>,
    pub node_attr: AttrTable,
    pub edge_attr: AttrTable,
    pub src: Vec<u32>,
    pub dst: Vec<u32>,
}

/// Borrowed view of one molecule inside a [`PackedSlot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotSlice<'a> {
    pub node_count: usize,
    pub node_attr: AttrView<'a>,
    pub edge_attr: AttrView<'a>,
    pub src: &'a [u32],
    pub dst: &'a [u32],
}

impl SlotSlice<'_> {
    pub fn edge_count(&self) -> usize {
        self.src.len()
    }

    /// Copy this molecule out into an owned graph.
    pub fn to_graph(&self) -> MolGraph {
        MolGraph::from_parts(
            self.node_count,
            self.src.to_vec(),
            self.dst.to_vec(),
            self.node_attr.to_table(),
            self.edge_attr.to_table(),
        )
    }
}

/// Packed storage for one slot across all examples.
///
/// Immutable once built; every invariant is checked at construction so
/// slicing never has to.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedSlot {
    node_counts: Vec<usize>,
    edge_counts: Vec<usize>,
    node_offsets: Vec<usize>,
    edge_offsets: Vec<usize>,
    node_attr: AttrTable,
    edge_attr: AttrTable,
    src: Vec<u32>,
    dst: Vec<u32>,
}

/// `[0, c0, c0+c1, ...]`, one entry longer than `counts`.
///
/// Counts come from untrusted artifacts; a running total that does not fit
/// in `usize` is a malformed slot.
fn prefix_sum(slot: &str, what: &str, counts: &[usize]) -> Result<Vec<usize>> {
    let mut offsets = Vec::with_capacity(counts.len() + 1);
    let mut total = 0usize;
    offsets.push(0);
    for (i, &c) in counts.iter().enumerate() {
        total = total.checked_add(c).ok_or_else(|| {
            Error::malformed(slot, format!("example {i}: {what} counts overflow"))
        })?;
        offsets.push(total);
    }
    Ok(offsets)
}

impl PackedSlot {
    /// Adopt already packed arrays, validating them.
    ///
    /// `slot` names the slot for error messages (e.g. `reactant[1]`).
    pub fn from_packed(slot: &str, arrays: PackedArrays) -> Result<Self> {
        let PackedArrays {
            node_counts,
            edge_counts,
            node_attr,
            edge_attr,
            src,
            dst,
        } = arrays;

        if node_counts.len() != edge_counts.len() {
            return Err(Error::malformed(
                slot,
                format!(
                    "n_node has {} examples but n_edge has {}",
                    node_counts.len(),
                    edge_counts.len()
                ),
            ));
        }

        let node_offsets = prefix_sum(slot, "node", &node_counts)?;
        let edge_offsets = prefix_sum(slot, "edge", &edge_counts)?;
        let total_nodes = node_offsets[node_offsets.len() - 1];
        let total_edges = edge_offsets[edge_offsets.len() - 1];

        if node_attr.rows() != total_nodes {
            return Err(Error::malformed(
                slot,
                format!(
                    "node counts sum to {total_nodes} but node_attr has {} rows",
                    node_attr.rows()
                ),
            ));
        }
        if edge_attr.rows() != total_edges || src.len() != total_edges || dst.len() != total_edges
        {
            return Err(Error::malformed(
                slot,
                format!(
                    "edge counts sum to {total_edges} but edge_attr/src/dst have {}/{}/{} entries",
                    edge_attr.rows(),
                    src.len(),
                    dst.len()
                ),
            ));
        }

        let packed = Self {
            node_counts,
            edge_counts,
            node_offsets,
            edge_offsets,
            node_attr,
            edge_attr,
            src,
            dst,
        };
        packed.check_endpoints(slot)?;
        Ok(packed)
    }

    /// Pack per-example records in example order.
    ///
    /// Feature dims are taken from the first record; an empty record list
    /// yields a slot with zero examples and zero-width pools.
    pub fn from_records(slot: &str, records: &[MoleculeRecord]) -> Result<Self> {
        let node_dim = records.first().map_or(0, |r| r.node_attr.cols());
        let edge_dim = records.first().map_or(0, |r| r.edge_attr.cols());

        let mut node_counts = Vec::with_capacity(records.len());
        let mut edge_counts = Vec::with_capacity(records.len());
        let mut node_pool = Vec::new();
        let mut edge_pool = Vec::new();
        let mut src = Vec::new();
        let mut dst = Vec::new();

        for (i, r) in records.iter().enumerate() {
            r.validate(slot, i)?;
            if r.node_attr.cols() != node_dim || r.edge_attr.cols() != edge_dim {
                return Err(Error::malformed(
                    slot,
                    format!(
                        "example {i}: feature dims {}x{} differ from {node_dim}x{edge_dim}",
                        r.node_attr.cols(),
                        r.edge_attr.cols()
                    ),
                ));
            }
            node_counts.push(r.node_count);
            edge_counts.push(r.edge_count);
            node_pool.extend_from_slice(r.node_attr.as_slice());
            edge_pool.extend_from_slice(r.edge_attr.as_slice());
            src.extend_from_slice(&r.src);
            dst.extend_from_slice(&r.dst);
        }

        let total_nodes = prefix_sum(slot, "node", &node_counts)?[records.len()];
        let total_edges = prefix_sum(slot, "edge", &edge_counts)?[records.len()];
        Self::from_packed(
            slot,
            PackedArrays {
                node_counts,
                edge_counts,
                node_attr: AttrTable::new(node_pool, total_nodes, node_dim)?,
                edge_attr: AttrTable::new(edge_pool, total_edges, edge_dim)?,
                src,
                dst,
            },
        )
    }

    /// Every endpoint of example i must lie in `[0, node_counts[i])`.
    fn check_endpoints(&self, slot: &str) -> Result<()> {
        (0..self.example_count())
            .into_par_iter()
            .try_for_each(|i| {
                let (lo, hi) = (self.edge_offsets[i], self.edge_offsets[i + 1]);
                let n = self.node_counts[i];
                let bad = self.src[lo..hi]
                    .iter()
                    .chain(&self.dst[lo..hi])
                    .find(|&&v| v as usize >= n);
                match bad {
                    Some(v) => Err(Error::malformed(
                        slot,
                        format!("example {i}: endpoint {v} out of range for {n} nodes"),
                    )),
                    None => Ok(()),
                }
            })
    }

    pub fn example_count(&self) -> usize {
        self.node_counts.len()
    }

    pub fn node_counts(&self) -> &[usize] {
        &self.node_counts
    }

    pub fn edge_counts(&self) -> &[usize] {
        &self.edge_counts
    }

    pub fn node_offsets(&self) -> &[usize] {
        &self.node_offsets
    }

    pub fn edge_offsets(&self) -> &[usize] {
        &self.edge_offsets
    }

    pub fn node_attr(&self) -> &AttrTable {
        &self.node_attr
    }

    pub fn edge_attr(&self) -> &AttrTable {
        &self.edge_attr
    }

    pub fn src(&self) -> &[u32] {
        &self.src
    }

    pub fn dst(&self) -> &[u32] {
        &self.dst
    }

    pub fn total_nodes(&self) -> usize {
        self.node_attr.rows()
    }

    pub fn total_edges(&self) -> usize {
        self.src.len()
    }

    pub fn node_feature_dim(&self) -> usize {
        self.node_attr.cols()
    }

    pub fn edge_feature_dim(&self) -> usize {
        self.edge_attr.cols()
    }

    /// The molecule of example `index`, borrowed from the pools.
    pub fn slice(&self, index: usize) -> Result<SlotSlice<'_>> {
        if index >= self.example_count() {
            return Err(Error::index_out_of_range(index, self.example_count()));
        }
        let (node_lo, node_hi) = (self.node_offsets[index], self.node_offsets[index + 1]);
        let (edge_lo, edge_hi) = (self.edge_offsets[index], self.edge_offsets[index + 1]);
        Ok(SlotSlice {
            node_count: self.node_counts[index],
            node_attr: self.node_attr.rows_range(node_lo, node_hi)?,
            edge_attr: self.edge_attr.rows_range(edge_lo, edge_hi)?,
            src: &self.src[edge_lo..edge_hi],
            dst: &self.dst[edge_lo..edge_hi],
        })
    }
}

/// All slots of one role.
///
/// Every slot holds the same number of examples; this is checked when the
/// store is built. A store with no slots is allowed and holds no examples.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedGraphStore {
    role: SlotRole,
    slots: Vec<PackedSlot>,
}

impl PackedGraphStore {
    pub fn new(role: SlotRole, slots: Vec<PackedSlot>) -> Result<Self> {
        if let Some(first) = slots.first() {
            let expected = first.example_count();
            for (j, slot) in slots.iter().enumerate().skip(1) {
                if slot.example_count() != expected {
                    return Err(Error::malformed(
                        role.slot_label(j),
                        format!(
                            "{} examples, but {} has {expected}",
                            slot.example_count(),
                            role.slot_label(0)
                        ),
                    ));
                }
            }
        }
        Ok(Self { role, slots })
    }

    /// Pack records given as `records[slot][example]`.
    pub fn from_records(role: SlotRole, records: &[Vec<MoleculeRecord>]) -> Result<Self> {
        let slots = records
            .iter()
            .enumerate()
            .map(|(j, rs)| PackedSlot::from_records(&role.slot_label(j), rs))
            .collect::<Result<Vec<_>>>()?;
        Self::new(role, slots)
    }

    pub fn role(&self) -> SlotRole {
        self.role
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Examples per slot; 0 for a store without slots.
    pub fn example_count(&self) -> usize {
        self.slots.first().map_or(0, PackedSlot::example_count)
    }

    pub fn slots(&self) -> &[PackedSlot] {
        &self.slots
    }

    pub fn slot(&self, slot: usize) -> Result<&PackedSlot> {
        self.slots.get(slot).ok_or(Error::SlotOutOfRange {
            slot,
            slot_count: self.slots.len(),
        })
    }

    /// Molecule of `slot` for example `index`.
    pub fn slice(&self, slot: usize, index: usize) -> Result<SlotSlice<'_>> {
        self.slot(slot)?.slice(index)
    }

    /// One owned graph per slot, in slot order, for example `index`.
    pub fn graphs(&self, index: usize) -> Result<Vec<MolGraph>> {
        self.slots
            .iter()
            .map(|s| s.slice(index).map(|view| view.to_graph()))
            .collect()
    }
}
