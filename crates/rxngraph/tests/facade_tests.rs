// End-to-end tests through the facade crate's prelude

use rxngraph::prelude::*;

#[test]
fn test_write_then_load_split() {
    let dir = tempfile::tempdir().unwrap();
    let config = DataConfig::default().root(dir.path());
    let resolver = config.resolver();

    let ds = synthetic_dataset(&SyntheticConfig::default().examples(12).seed(17)).unwrap();
    let path = resolver.path_for(&DatasetId::Production2.artifact_name(1));
    ds.to_artifact().unwrap().save(&path).unwrap();

    let loaded = ReactionDataset::load(&resolver, DatasetId::Production2, 1).unwrap();
    assert_eq!(loaded.name(), "dataset-2/split-1");
    assert_eq!(loaded.len(), 12);
    assert_eq!(loaded.get(11).unwrap(), ds.get(11).unwrap());

    let summary = DatasetSummary::from_dataset(&loaded);
    assert_eq!(summary.slots.len(), 3);
    assert_eq!(summary.examples, 12);
}

#[test]
fn test_wrong_split_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = DataConfig::default().root(dir.path()).resolver();
    assert!(matches!(
        ReactionDataset::load(&resolver, DatasetId::HeldOutTest, 0),
        Err(Error::DatasetNotFound { .. })
    ));
}

#[test]
fn test_unknown_dataset_id() {
    assert!(matches!(DatasetId::from_code(4), Err(Error::UnknownDatasetId(4))));
    assert_eq!(DatasetId::from_code(3).unwrap(), DatasetId::HeldOutTest);
}

#[test]
fn test_samples_feed_graph_consumers() {
    let ds = synthetic_dataset(
        &SyntheticConfig::default()
            .examples(5)
            .slots(2, 1)
            .empty_prob(0.0)
            .seed(23),
    )
    .unwrap();
    for i in 0..ds.len() {
        let sample = ds.get(i).unwrap();
        assert_eq!(sample.graphs().count(), 3);
        for g in sample.graphs() {
            assert_eq!(g.out_degrees().iter().sum::<usize>(), g.num_edges());
            assert_eq!(g.in_degrees().len(), g.num_nodes());
            assert_eq!(g.node_attr().rows(), g.num_nodes());
            assert_eq!(g.edge_attr().rows(), g.num_edges());
        }
    }
}
