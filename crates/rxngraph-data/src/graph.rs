// MolGraph — one molecule as a directed graph with attribute tables

use rxngraph_core::{AttrTable, Error, Result};

/// A directed graph of `num_nodes` nodes with edges `(src[k], dst[k])`.
///
/// Node attributes have one row per node and edge attributes one row per
/// edge. Both tables always exist: a graph without edges carries a
/// `0 × edge_dim` edge table, and a graph built without attributes carries
/// zero-width tables.
///
/// Graphs are owned by whoever requested them and hold no reference back
/// into the dataset they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MolGraph {
    num_nodes: usize,
    src: Vec<u32>,
    dst: Vec<u32>,
    node_attr: AttrTable,
    edge_attr: AttrTable,
}

impl MolGraph {
    /// Build a graph from an edge list, checking every endpoint.
    pub fn new(num_nodes: usize, src: Vec<u32>, dst: Vec<u32>) -> Result<Self> {
        if src.len() != dst.len() {
            return Err(Error::msg(format!(
                "edge list mismatch: {} sources vs {} destinations",
                src.len(),
                dst.len()
            )));
        }
        if let Some(&v) = src.iter().chain(&dst).find(|&&v| v as usize >= num_nodes) {
            return Err(Error::msg(format!(
                "endpoint {v} out of range for graph with {num_nodes} nodes"
            )));
        }
        let num_edges = src.len();
        Ok(Self::from_parts(
            num_nodes,
            src,
            dst,
            AttrTable::new(Vec::new(), num_nodes, 0)?,
            AttrTable::new(Vec::new(), num_edges, 0)?,
        ))
    }

    /// Assemble from parts that the caller has already validated.
    pub(crate) fn from_parts(
        num_nodes: usize,
        src: Vec<u32>,
        dst: Vec<u32>,
        node_attr: AttrTable,
        edge_attr: AttrTable,
    ) -> Self {
        debug_assert_eq!(src.len(), dst.len());
        debug_assert_eq!(node_attr.rows(), num_nodes);
        debug_assert_eq!(edge_attr.rows(), src.len());
        Self {
            num_nodes,
            src,
            dst,
            node_attr,
            edge_attr,
        }
    }

    /// Attach node attributes; the table needs one row per node.
    pub fn with_node_attr(mut self, table: AttrTable) -> Result<Self> {
        if table.rows() != self.num_nodes {
            return Err(Error::msg(format!(
                "node attribute table has {} rows for {} nodes",
                table.rows(),
                self.num_nodes
            )));
        }
        self.node_attr = table;
        Ok(self)
    }

    /// Attach edge attributes; the table needs one row per edge.
    pub fn with_edge_attr(mut self, table: AttrTable) -> Result<Self> {
        if table.rows() != self.num_edges() {
            return Err(Error::msg(format!(
                "edge attribute table has {} rows for {} edges",
                table.rows(),
                self.num_edges()
            )));
        }
        self.edge_attr = table;
        Ok(self)
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    pub fn src(&self) -> &[u32] {
        &self.src
    }

    pub fn dst(&self) -> &[u32] {
        &self.dst
    }

    /// Edges as `(src, dst)` pairs in storage order.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    pub fn node_attr(&self) -> &AttrTable {
        &self.node_attr
    }

    pub fn edge_attr(&self) -> &AttrTable {
        &self.edge_attr
    }

    /// Number of incoming edges per node.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut deg = vec![0usize; self.num_nodes];
        for &d in &self.dst {
            deg[d as usize] += 1;
        }
        deg
    }

    /// Number of outgoing edges per node.
    pub fn out_degrees(&self) -> Vec<usize> {
        let mut deg = vec![0usize; self.num_nodes];
        for &s in &self.src {
            deg[s as usize] += 1;
        }
        deg
    }
}
