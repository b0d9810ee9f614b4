// MoleculeRecord — one molecule of one example, before packing

use rxngraph_core::{AttrTable, Error, Result};

/// A single molecule graph in unpacked form.
///
/// `src`/`dst` are local endpoint indices into this molecule's own nodes.
/// Records are the input to [`PackedSlot::from_records`](crate::store::PackedSlot::from_records)
/// and are never kept around after packing.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeRecord {
    pub node_count: usize,
    pub edge_count: usize,
    pub node_attr: AttrTable,
    pub edge_attr: AttrTable,
    pub src: Vec<u32>,
    pub dst: Vec<u32>,
}

impl MoleculeRecord {
    /// Build a record whose counts are taken from the arrays themselves.
    pub fn new(node_attr: AttrTable, edge_attr: AttrTable, src: Vec<u32>, dst: Vec<u32>) -> Self {
        Self {
            node_count: node_attr.rows(),
            edge_count: src.len(),
            node_attr,
            edge_attr,
            src,
            dst,
        }
    }

    /// A molecule with no nodes and no edges.
    pub fn empty(node_dim: usize, edge_dim: usize) -> Self {
        Self::new(
            AttrTable::empty(node_dim),
            AttrTable::empty(edge_dim),
            Vec::new(),
            Vec::new(),
        )
    }

    /// Check the declared counts against the array lengths.
    ///
    /// `slot` names the slot the record belongs to, for the error message.
    pub fn validate(&self, slot: &str, example: usize) -> Result<()> {
        let bad = |reason: String| Err(Error::malformed(slot, format!("example {example}: {reason}")));
        if self.node_attr.rows() != self.node_count {
            return bad(format!(
                "node_count is {} but node_attr has {} rows",
                self.node_count,
                self.node_attr.rows()
            ));
        }
        if self.edge_attr.rows() != self.edge_count {
            return bad(format!(
                "edge_count is {} but edge_attr has {} rows",
                self.edge_count,
                self.edge_attr.rows()
            ));
        }
        if self.src.len() != self.edge_count || self.dst.len() != self.edge_count {
            return bad(format!(
                "edge_count is {} but src/dst have {}/{} entries",
                self.edge_count,
                self.src.len(),
                self.dst.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_counts() {
        let r = MoleculeRecord::new(
            AttrTable::new(vec![0.0; 6], 3, 2).unwrap(),
            AttrTable::new(vec![1.0; 2], 2, 1).unwrap(),
            vec![0, 1],
            vec![1, 2],
        );
        assert_eq!(r.node_count, 3);
        assert_eq!(r.edge_count, 2);
        assert!(r.validate("reactant[0]", 0).is_ok());
    }

    #[test]
    fn test_declared_count_disagrees() {
        let mut r = MoleculeRecord::empty(4, 2);
        r.node_count = 1;
        let err = r.validate("product[1]", 3).unwrap_err();
        assert!(matches!(err, Error::MalformedSlot { ref slot, .. } if slot == "product[1]"));
        assert!(err.to_string().contains("example 3"));
    }

    #[test]
    fn test_endpoint_length_disagrees() {
        let mut r = MoleculeRecord::new(
            AttrTable::new(vec![0.0; 2], 2, 1).unwrap(),
            AttrTable::new(vec![0.0; 1], 1, 1).unwrap(),
            vec![0],
            vec![1],
        );
        r.dst.push(0);
        assert!(r.validate("reactant[0]", 0).is_err());
    }
}
