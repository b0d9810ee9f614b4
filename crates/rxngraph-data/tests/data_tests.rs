// Tests for rxngraph-data: loading, indexing and slicing reaction datasets

use std::sync::Arc;

use rxngraph_core::{AttrTable, DType, Error, Shape};
use rxngraph_data::schema::{slot_key, LABEL_KEY};
use rxngraph_data::{
    synthetic_dataset, Artifact, ArtifactResolver, DataConfig, Dataset, DatasetId, FsResolver,
    MemoryResolver, MoleculeRecord, PackedGraphStore, RawArray, ReactionDataset, ReactionSample,
    SlotRole, SyntheticConfig,
};

// Fixtures

fn molecule(nodes: usize, edges: &[(u32, u32)], node_dim: usize, edge_dim: usize) -> MoleculeRecord {
    let node_vals = (0..nodes * node_dim).map(|v| v as f32 + 0.5).collect();
    let edge_vals = (0..edges.len() * edge_dim).map(|v| -(v as f32)).collect();
    MoleculeRecord::new(
        AttrTable::new(node_vals, nodes, node_dim).unwrap(),
        AttrTable::new(edge_vals, edges.len(), edge_dim).unwrap(),
        edges.iter().map(|e| e.0).collect(),
        edges.iter().map(|e| e.1).collect(),
    )
}

/// 3 examples, one reactant slot with node counts [2, 1, 3] and edge counts
/// [1, 0, 2], one product slot of single-atom molecules.
fn scenario_dataset() -> ReactionDataset {
    let reactants = vec![vec![
        molecule(2, &[(0, 1)], 3, 2),
        molecule(1, &[], 3, 2),
        molecule(3, &[(0, 2), (2, 1)], 3, 2),
    ]];
    let products = vec![vec![
        molecule(1, &[], 3, 2),
        molecule(1, &[], 3, 2),
        molecule(1, &[], 3, 2),
    ]];
    ReactionDataset::new(
        PackedGraphStore::from_records(SlotRole::Reactant, &reactants).unwrap(),
        PackedGraphStore::from_records(SlotRole::Product, &products).unwrap(),
        vec![0.25, 0.5, 0.75],
        vec!["CC>>C".into(), "C>>C".into(), "CCC>>C".into()],
    )
    .unwrap()
}

fn scenario_bytes() -> Vec<u8> {
    scenario_dataset().to_artifact().unwrap().to_bytes().unwrap()
}

// Packed store layout

#[test]
fn test_scenario_offsets_and_slice() {
    let ds = scenario_dataset();
    let slot = ds.reactants().slot(0).unwrap();
    assert_eq!(slot.node_offsets(), &[0, 2, 3, 6]);
    assert_eq!(slot.edge_offsets(), &[0, 1, 1, 3]);

    let s = ds.reactants().slice(0, 1).unwrap();
    assert_eq!(s.node_count, 1);
    assert_eq!(s.edge_count(), 0);
    assert!(s.src.is_empty() && s.dst.is_empty());
    assert_eq!(s.edge_attr.rows(), 0);
    assert_eq!(s.edge_attr.cols(), 2);
    assert_eq!(s.node_attr.as_slice(), slot.node_attr().rows_range(2, 3).unwrap().as_slice());
}

#[test]
fn test_slot_out_of_range() {
    let ds = scenario_dataset();
    assert!(matches!(
        ds.reactants().slice(1, 0),
        Err(Error::SlotOutOfRange { slot: 1, slot_count: 1 })
    ));
}

// Loading through resolvers

#[test]
fn test_load_from_memory() {
    let resolver = MemoryResolver::new().with_split(DatasetId::Production1, 0, scenario_bytes());
    let ds = ReactionDataset::load(&resolver, DatasetId::Production1, 0).unwrap();
    assert_eq!(ds, scenario_dataset().with_name(ds.name()));
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.rsmi(2), Some("CCC>>C"));
    assert_eq!(ds.label(1).unwrap(), 0.5);
}

#[test]
fn test_load_from_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let config = DataConfig::default().root(dir.path());
    let resolver = config.resolver();
    scenario_dataset()
        .to_artifact()
        .unwrap()
        .save(resolver.path_for(&DatasetId::HeldOutTest.artifact_name(4)))
        .unwrap();

    let ds = ReactionDataset::load(&resolver, DatasetId::HeldOutTest, 4).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.name(), "test/split-4");

    let sample = ds.get(2).unwrap();
    assert_eq!(sample.reactants[0].num_nodes(), 3);
    assert_eq!(sample.reactants[0].edges().collect::<Vec<_>>(), vec![(0, 2), (2, 1)]);
    assert_eq!(sample.label, 0.75);
}

#[test]
fn test_missing_artifact_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = FsResolver::new(dir.path(), "safetensors");
    let err = ReactionDataset::load(&resolver, DatasetId::Production2, 7).unwrap_err();
    match err {
        Error::DatasetNotFound { artifact, .. } => assert!(artifact.ends_with("dataset_2_7.safetensors")),
        other => panic!("expected DatasetNotFound, got {other:?}"),
    }

    let err = ReactionDataset::load(&MemoryResolver::new(), DatasetId::Production1, 0).unwrap_err();
    assert!(matches!(err, Error::DatasetNotFound { .. }));
}

#[test]
fn test_truncated_artifact_is_schema_error() {
    let mut bytes = scenario_bytes();
    bytes.truncate(bytes.len() / 2);
    let resolver = MemoryResolver::new().with_split(DatasetId::Production1, 1, bytes);
    assert!(matches!(
        ReactionDataset::load(&resolver, DatasetId::Production1, 1),
        Err(Error::Schema(_))
    ));
}

#[test]
fn test_fetch_split_uses_artifact_names() {
    let resolver = MemoryResolver::new()
        .with_split(DatasetId::Production2, 3, vec![1, 2, 3])
        .with_split(DatasetId::HeldOutTest, 0, vec![9]);
    assert_eq!(resolver.fetch("dataset_2_3").unwrap(), vec![1, 2, 3]);
    assert_eq!(resolver.fetch_split(DatasetId::HeldOutTest, 0).unwrap(), vec![9]);
}

// Malformed inputs

#[test]
fn test_five_reactant_examples_four_product_examples() {
    let mut artifact = scenario_dataset().to_artifact().unwrap();
    let five = [1i64; 5];
    let four = [1i64; 4];
    artifact.insert(slot_key(SlotRole::Reactant, 0, "n_node"), &five, 5).unwrap();
    artifact.insert(slot_key(SlotRole::Reactant, 0, "n_edge"), &[0i64; 5], 5).unwrap();
    artifact.insert(slot_key(SlotRole::Reactant, 0, "node_attr"), &[0f32; 15], (5, 3)).unwrap();
    artifact.insert(slot_key(SlotRole::Reactant, 0, "edge_attr"), &[0f32; 0], (0, 2)).unwrap();
    artifact.insert(slot_key(SlotRole::Reactant, 0, "src"), &[0i64; 0], 0).unwrap();
    artifact.insert(slot_key(SlotRole::Reactant, 0, "dst"), &[0i64; 0], 0).unwrap();
    artifact.insert(slot_key(SlotRole::Product, 0, "n_node"), &four, 4).unwrap();
    artifact.insert(slot_key(SlotRole::Product, 0, "n_edge"), &[0i64; 4], 4).unwrap();
    artifact.insert(slot_key(SlotRole::Product, 0, "node_attr"), &[0f32; 12], (4, 3)).unwrap();
    artifact.insert(LABEL_KEY, &[0f64; 5], 5).unwrap();

    let err = ReactionDataset::from_artifact(&artifact).unwrap_err();
    assert!(matches!(err, Error::MalformedSlot { .. }), "{err:?}");
}

#[test]
fn test_declared_size_disagrees_with_arrays() {
    let mut artifact = scenario_dataset().to_artifact().unwrap();
    // node counts now sum to 7 but the pool still has 6 rows
    artifact.insert(slot_key(SlotRole::Reactant, 0, "n_node"), &[2i64, 2, 3], 3).unwrap();
    match ReactionDataset::from_artifact(&artifact) {
        Err(Error::MalformedSlot { slot, .. }) => assert_eq!(slot, "reactant[0]"),
        other => panic!("expected MalformedSlot, got {other:?}"),
    }
}

#[test]
fn test_endpoint_outside_molecule() {
    let mut artifact = scenario_dataset().to_artifact().unwrap();
    // example 0 has 2 nodes; endpoint 2 would leak into example 1
    artifact.insert(slot_key(SlotRole::Reactant, 0, "dst"), &[2i64, 2, 1], 3).unwrap();
    assert!(matches!(
        ReactionDataset::from_artifact(&artifact),
        Err(Error::MalformedSlot { .. })
    ));
}

#[test]
fn test_overflowing_node_counts_rejected() {
    let mut artifact = scenario_dataset().to_artifact().unwrap();
    let counts: Vec<u8> = [i64::MAX, i64::MAX, 4]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    artifact.insert_raw(
        slot_key(SlotRole::Reactant, 0, "n_node"),
        RawArray::from_raw(DType::I64, Shape::from(3), counts).unwrap(),
    );
    artifact.insert(slot_key(SlotRole::Reactant, 0, "n_edge"), &[0i64; 3], 3).unwrap();
    artifact.insert(slot_key(SlotRole::Reactant, 0, "node_attr"), &[0f32; 0], (0, 3)).unwrap();
    artifact.insert(slot_key(SlotRole::Reactant, 0, "edge_attr"), &[0f32; 0], (0, 2)).unwrap();
    artifact.insert(slot_key(SlotRole::Reactant, 0, "src"), &[0i64; 0], 0).unwrap();
    artifact.insert(slot_key(SlotRole::Reactant, 0, "dst"), &[0i64; 0], 0).unwrap();

    match ReactionDataset::from_artifact(&artifact) {
        Err(Error::MalformedSlot { slot, .. }) => assert_eq!(slot, "reactant[0]"),
        other => panic!("expected MalformedSlot, got {other:?}"),
    }
}

#[test]
fn test_overflowing_shape_rejected() {
    let header = br#"{"x":{"dtype":"F32","shape":[4294967296,4294967296],"data_offsets":[0,0]}}"#;
    let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
    bytes.extend_from_slice(header);
    assert!(matches!(Artifact::from_bytes(&bytes), Err(Error::Schema(_))));
}

// Indexed access

#[test]
fn test_out_of_range_indices() {
    let ds = scenario_dataset();
    assert!(matches!(ds.get(ds.len()), Err(Error::IndexOutOfRange { index: 3, len: 3 })));
    assert!(matches!(ds.get_signed(-1), Err(Error::IndexOutOfRange { index: -1, len: 3 })));
    assert!(matches!(ds.fetch_many(&[0, 3]), Err(Error::IndexOutOfRange { .. })));
}

#[test]
fn test_zero_edge_example_yields_empty_edge_table() {
    let ds = scenario_dataset();
    let g = &ds.get(1).unwrap().reactants[0];
    assert_eq!(g.num_nodes(), 1);
    assert_eq!(g.num_edges(), 0);
    assert_eq!(g.edge_attr().rows(), 0);
    assert_eq!(g.edge_attr().cols(), 2);
    assert_eq!(g.node_attr().row(0), Some(&[0.5f32, 1.5, 2.5][..]));
}

#[test]
fn test_get_returns_independent_graphs() {
    let ds = scenario_dataset();
    let mut a = ds.get(0).unwrap();
    a.reactants.clear();
    let b = ds.get(0).unwrap();
    assert_eq!(b.reactants.len(), 1);
    assert_eq!(b.reactants[0].src(), &[0]);
}

#[test]
fn test_concurrent_readers() {
    let ds = Arc::new(
        synthetic_dataset(&SyntheticConfig::default().examples(200).seed(11)).unwrap(),
    );
    let expected: Vec<_> = (0..ds.len()).map(|i| ds.get(i).unwrap()).collect();

    std::thread::scope(|scope| {
        for t in 0..4 {
            let ds = Arc::clone(&ds);
            let expected = &expected;
            scope.spawn(move || {
                for i in (t..ds.len()).step_by(3) {
                    assert_eq!(&ds.get(i).unwrap(), &expected[i]);
                }
            });
        }
    });

    let fetched = ds.fetch_many(&[199, 0, 42]).unwrap();
    assert_eq!(fetched[0], expected[199]);
    assert_eq!(fetched[2], expected[42]);
}

#[test]
fn test_dataset_trait_object() {
    let ds = scenario_dataset().with_name("scenario");
    let boxed: Box<dyn Dataset<Item = ReactionSample>> = Box::new(ds);
    assert_eq!(boxed.len(), 3);
    assert_eq!(boxed.name(), "scenario");
    assert_eq!(boxed.get(0).unwrap().products.len(), 1);
}

#[test]
fn test_synthetic_survives_save_and_load() {
    let ds = synthetic_dataset(&SyntheticConfig::default().examples(25).slots(3, 2).seed(5)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("synthetic.safetensors");
    ds.to_artifact().unwrap().save(&path).unwrap();

    let back = ReactionDataset::from_artifact(&Artifact::load(&path).unwrap()).unwrap();
    assert_eq!(back.with_name("synthetic"), ds);
}
