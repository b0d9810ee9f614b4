//! Logical schema of a reaction artifact.
//!
//! An artifact holds, for each role (`reactant`, `product`) and each slot
//! `j` of that role, six arrays:
//!
//! | key                      | shape              | dtype   |
//! |--------------------------|--------------------|---------|
//! | `{role}.{j}.n_node`      | `[examples]`       | integer |
//! | `{role}.{j}.n_edge`      | `[examples]`       | integer |
//! | `{role}.{j}.node_attr`   | `[Σ n_node, dim]`  | float   |
//! | `{role}.{j}.edge_attr`   | `[Σ n_edge, dim]`  | float   |
//! | `{role}.{j}.src`         | `[Σ n_edge]`       | integer |
//! | `{role}.{j}.dst`         | `[Σ n_edge]`       | integer |
//!
//! plus the reaction table: `reaction.yld` (`[examples]`, float labels)
//! and the reaction SMILES as a JSON string array in the `rsmi` metadata
//! entry. Slot indices must run contiguously from 0.

use std::collections::BTreeSet;

use rxngraph_core::{AttrTable, DType, Error, Result};

use crate::artifact::{Artifact, RawArray};
use crate::reaction::ReactionDataset;
use crate::store::{PackedArrays, PackedGraphStore, PackedSlot, SlotRole};

pub const LABEL_KEY: &str = "reaction.yld";
pub const RSMI_METADATA_KEY: &str = "rsmi";
pub const FORMAT_METADATA_KEY: &str = "format";
pub const FORMAT_NAME: &str = "rxngraph";

/// Key of `field` for slot `slot` of `role`, e.g. `reactant.0.n_node`.
pub fn slot_key(role: SlotRole, slot: usize, field: &str) -> String {
    format!("{}.{slot}.{field}", role.key_prefix())
}

/// Number of slots of `role` present in the artifact.
pub fn slot_count(artifact: &Artifact, role: SlotRole) -> Result<usize> {
    let prefix = format!("{}.", role.key_prefix());
    let mut seen = BTreeSet::new();
    for name in artifact.names() {
        let Some(rest) = name.strip_prefix(&prefix) else {
            continue;
        };
        let index = rest
            .split('.')
            .next()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| Error::Schema(format!("key '{name}' has no slot index")))?;
        seen.insert(index);
    }
    // BTreeSet is sorted, so contiguity from 0 means the last index is len - 1.
    if let Some(&last) = seen.iter().next_back() {
        if last + 1 != seen.len() {
            return Err(Error::Schema(format!(
                "{role} slots are not contiguous from 0: found {seen:?}"
            )));
        }
    }
    Ok(seen.len())
}

fn expect_rank1(name: &str, array: &RawArray) -> Result<()> {
    if array.shape().rank() != 1 {
        return Err(Error::Schema(format!(
            "'{name}' must be 1-D, found shape {}",
            array.shape()
        )));
    }
    Ok(())
}

fn decode_indices(artifact: &Artifact, name: &str) -> Result<Vec<usize>> {
    let array = artifact.get(name)?;
    expect_rank1(name, array)?;
    array
        .to_index_vec()
        .map_err(|e| Error::Schema(format!("'{name}': {e}")))
}

fn decode_endpoints(artifact: &Artifact, name: &str) -> Result<Vec<u32>> {
    decode_indices(artifact, name)?
        .into_iter()
        .map(|v| {
            u32::try_from(v)
                .map_err(|_| Error::Schema(format!("'{name}': endpoint {v} does not fit in u32")))
        })
        .collect()
}

/// Read an attribute pool, casting to f32. A 1-D pool is one feature column.
fn decode_table(artifact: &Artifact, name: &str) -> Result<AttrTable> {
    let array = artifact.get(name)?;
    let (rows, cols) = match array.shape().dims() {
        &[rows] => (rows, 1),
        &[rows, cols] => (rows, cols),
        _ => {
            return Err(Error::Schema(format!(
                "'{name}' must be 1-D or 2-D, found shape {}",
                array.shape()
            )))
        }
    };
    AttrTable::new(array.to_vec::<f32>(), rows, cols)
}

/// Decode slot `slot` of `role`.
pub fn decode_slot(artifact: &Artifact, role: SlotRole, slot: usize) -> Result<PackedSlot> {
    let key = |field: &str| slot_key(role, slot, field);
    let arrays = PackedArrays {
        node_counts: decode_indices(artifact, &key("n_node"))?,
        edge_counts: decode_indices(artifact, &key("n_edge"))?,
        node_attr: decode_table(artifact, &key("node_attr"))?,
        edge_attr: decode_table(artifact, &key("edge_attr"))?,
        src: decode_endpoints(artifact, &key("src"))?,
        dst: decode_endpoints(artifact, &key("dst"))?,
    };
    let packed = PackedSlot::from_packed(&role.slot_label(slot), arrays)?;
    tracing::debug!(
        slot = %role.slot_label(slot),
        examples = packed.example_count(),
        nodes = packed.total_nodes(),
        edges = packed.total_edges(),
        node_dim = packed.node_feature_dim(),
        edge_dim = packed.edge_feature_dim(),
        "decoded slot"
    );
    Ok(packed)
}

/// Decode every slot of `role` into a store.
pub fn decode_store(artifact: &Artifact, role: SlotRole) -> Result<PackedGraphStore> {
    let count = slot_count(artifact, role)?;
    let slots = (0..count)
        .map(|j| decode_slot(artifact, role, j))
        .collect::<Result<Vec<_>>>()?;
    PackedGraphStore::new(role, slots)
}

/// Decode a full dataset: both stores plus labels and reaction SMILES.
pub fn decode_dataset(artifact: &Artifact) -> Result<ReactionDataset> {
    match artifact.metadata(FORMAT_METADATA_KEY) {
        Some(FORMAT_NAME) | None => {}
        Some(other) => tracing::warn!(format = other, "artifact written by a different producer"),
    }

    let reactants = decode_store(artifact, SlotRole::Reactant)?;
    let products = decode_store(artifact, SlotRole::Product)?;

    let yld = artifact.get(LABEL_KEY)?;
    expect_rank1(LABEL_KEY, yld)?;
    if !yld.dtype().is_float() {
        return Err(Error::DTypeMismatch {
            expected: DType::F64,
            got: yld.dtype(),
        });
    }
    let labels = yld.to_vec::<f64>();

    let rsmi = match artifact.metadata(RSMI_METADATA_KEY) {
        Some(json) => serde_json::from_str::<Vec<String>>(json)
            .map_err(|e| Error::Schema(format!("'{RSMI_METADATA_KEY}' metadata: {e}")))?,
        None => Vec::new(),
    };

    ReactionDataset::new(reactants, products, labels, rsmi)
}

/// Write `ds` in the layout [`decode_dataset`] reads.
///
/// Counts and endpoints are written as I64, pools as F32 and labels as F64.
pub fn encode_dataset(ds: &ReactionDataset) -> Result<Artifact> {
    let mut artifact = Artifact::new();
    artifact.set_metadata(FORMAT_METADATA_KEY, FORMAT_NAME);

    for store in [ds.reactants(), ds.products()] {
        let role = store.role();
        for (j, slot) in store.slots().iter().enumerate() {
            let key = |field: &str| slot_key(role, j, field);
            let as_i64 = |v: &[usize]| v.iter().map(|&x| x as i64).collect::<Vec<_>>();
            let ep_i64 = |v: &[u32]| v.iter().map(|&x| x as i64).collect::<Vec<_>>();

            artifact.insert(key("n_node"), &as_i64(slot.node_counts()), slot.example_count())?;
            artifact.insert(key("n_edge"), &as_i64(slot.edge_counts()), slot.example_count())?;
            artifact.insert(key("node_attr"), slot.node_attr().as_slice(), slot.node_attr().shape())?;
            artifact.insert(key("edge_attr"), slot.edge_attr().as_slice(), slot.edge_attr().shape())?;
            artifact.insert(key("src"), &ep_i64(slot.src()), slot.total_edges())?;
            artifact.insert(key("dst"), &ep_i64(slot.dst()), slot.total_edges())?;
        }
    }

    artifact.insert(LABEL_KEY, ds.labels(), ds.len())?;
    if !ds.rsmi_all().is_empty() {
        let json = serde_json::to_string(ds.rsmi_all())
            .map_err(|e| Error::Schema(format!("cannot encode rsmi: {e}")))?;
        artifact.set_metadata(RSMI_METADATA_KEY, json);
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3 examples, 1 reactant slot (node counts [2,1,3], edge counts [1,0,2])
    /// and 1 product slot with one single-node molecule per example.
    fn scenario_artifact() -> Artifact {
        let mut a = Artifact::new();
        a.insert("reactant.0.n_node", &[2i64, 1, 3], 3).unwrap();
        a.insert("reactant.0.n_edge", &[1i64, 0, 2], 3).unwrap();
        let pool: Vec<f64> = (0..12).map(|v| v as f64).collect();
        a.insert("reactant.0.node_attr", &pool, (6, 2)).unwrap();
        a.insert("reactant.0.edge_attr", &[1.0f64, 2.0, 3.0], (3, 1)).unwrap();
        a.insert("reactant.0.src", &[0i64, 0, 2], 3).unwrap();
        a.insert("reactant.0.dst", &[1i64, 1, 0], 3).unwrap();

        a.insert("product.0.n_node", &[1i64, 1, 1], 3).unwrap();
        a.insert("product.0.n_edge", &[0i64, 0, 0], 3).unwrap();
        a.insert("product.0.node_attr", &[7.0f32, 8.0, 9.0], 3).unwrap();
        a.insert::<f32>("product.0.edge_attr", &[], (0, 4)).unwrap();
        a.insert::<i64>("product.0.src", &[], 0).unwrap();
        a.insert::<i64>("product.0.dst", &[], 0).unwrap();

        a.insert(LABEL_KEY, &[0.1f64, 0.5, 0.9], 3).unwrap();
        a.set_metadata(RSMI_METADATA_KEY, r#"["A>>B","C>>D","E>>F"]"#);
        a
    }

    #[test]
    fn test_decode_scenario() {
        let ds = decode_dataset(&scenario_artifact()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.reactant_slot_count(), 1);
        assert_eq!(ds.product_slot_count(), 1);

        let r = ds.reactants().slot(0).unwrap();
        assert_eq!(r.node_offsets(), &[0, 2, 3, 6]);
        assert_eq!(r.edge_offsets(), &[0, 1, 1, 3]);

        let p = ds.products().slot(0).unwrap();
        assert_eq!(p.node_feature_dim(), 1);
        assert_eq!(p.edge_feature_dim(), 4);
        assert_eq!(ds.rsmi(1), Some("C>>D"));
    }

    #[test]
    fn test_slot_count_requires_contiguity() {
        let mut a = Artifact::new();
        a.insert("reactant.0.n_node", &[1i64], 1).unwrap();
        a.insert("reactant.2.n_node", &[1i64], 1).unwrap();
        assert!(matches!(
            slot_count(&a, SlotRole::Reactant),
            Err(Error::Schema(_))
        ));
        assert_eq!(slot_count(&a, SlotRole::Product).unwrap(), 0);
    }

    #[test]
    fn test_missing_field_is_schema_error() {
        let mut a = scenario_artifact();
        let mut stripped = Artifact::new();
        for name in a.names().filter(|n| *n != "product.0.dst").map(str::to_string).collect::<Vec<_>>() {
            stripped.insert_raw(name.clone(), a.get(&name).unwrap().clone());
        }
        a = stripped;
        assert!(matches!(decode_dataset(&a), Err(Error::Schema(_))));
    }

    #[test]
    fn test_missing_labels() {
        let mut a = Artifact::new();
        a.insert("reactant.0.n_node", &[0i64], 1).unwrap();
        let err = decode_dataset(&a).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_float_counts_rejected() {
        let mut a = scenario_artifact();
        a.insert("reactant.0.n_node", &[2.0f32, 1.0, 3.0], 3).unwrap();
        assert!(matches!(decode_dataset(&a), Err(Error::Schema(_))));
    }

    #[test]
    fn test_mismatched_examples_between_roles() {
        let mut a = scenario_artifact();
        a.insert("product.0.n_node", &[1i64, 1], 2).unwrap();
        a.insert("product.0.n_edge", &[0i64, 0], 2).unwrap();
        a.insert("product.0.node_attr", &[7.0f32, 8.0], 2).unwrap();
        assert!(matches!(
            decode_dataset(&a),
            Err(Error::MalformedSlot { .. })
        ));
    }

    #[test]
    fn test_integer_labels_rejected() {
        let mut a = scenario_artifact();
        a.insert(LABEL_KEY, &[0i64, 1, 1], 3).unwrap();
        assert!(matches!(
            decode_dataset(&a),
            Err(Error::DTypeMismatch { got: DType::I64, .. })
        ));
    }

    #[test]
    fn test_bad_rsmi_metadata() {
        let mut a = scenario_artifact();
        a.set_metadata(RSMI_METADATA_KEY, "not json");
        assert!(matches!(decode_dataset(&a), Err(Error::Schema(_))));
    }

    #[test]
    fn test_encode_then_decode_is_identity() {
        let ds = decode_dataset(&scenario_artifact()).unwrap();
        let again = decode_dataset(&encode_dataset(&ds).unwrap()).unwrap();
        assert_eq!(again, ds);
    }
}
