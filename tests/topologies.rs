use geonet::optimization::orient_forward;
use geonet::prelude::*;
use geonet::utils::{load_json, save_json};
use std::collections::{BTreeMap, BTreeSet};

fn terminals(n: u32) -> BTreeMap<u32, Position> {
    (1..=n).map(|i| (i, (i as f64, 0.0))).collect()
}

#[test]
fn every_topology_has_one_label() {
    let trees = enumerate_full_trees(&terminals(6)).unwrap();
    assert_eq!(trees.len(), 105);

    let labels: BTreeSet<Label<u32>> = trees.values().map(|t| label_fst(t).unwrap()).collect();
    assert_eq!(labels.len(), trees.len());
    assert!(trees.values().all(|t| t.is_full_steiner_topology()));
}

#[test]
fn topologies_group_by_skeleton_shape() {
    let positions = terminals(7);
    let trees = enumerate_full_trees(&positions).unwrap();
    let table = enumerate_skeletons(5).unwrap();

    // every tree has a Steiner skeleton isomorphic to exactly one representative
    for tree in trees.values() {
        let steiner: Vec<u32> = tree.steiner_nodes().copied().collect();
        let arcs: Vec<(u32, u32)> = tree
            .arcs()
            .iter()
            .filter(|a| tree.is_steiner(&a.tail) && tree.is_steiner(&a.head))
            .map(|a| (a.tail, a.head))
            .collect();
        let skeleton = Net::new(steiner, arcs).unwrap();
        let matches = table
            .representatives(5)
            .iter()
            .filter(|r| are_isomorphic(*r, &skeleton))
            .count();
        assert_eq!(matches, 1);
    }
}

#[test]
fn enumeration_survives_json() {
    let trees = enumerate_full_trees(&terminals(5)).unwrap();
    let listed: Vec<(Label<u32>, SteinerTree<u32>)> = trees.into_iter().collect();

    let path = std::env::temp_dir().join("geonet_topologies_5.json");
    save_json(&listed, &path).unwrap();
    let loaded: Vec<(Label<u32>, SteinerTree<u32>)> = load_json(&path).unwrap();
    assert_eq!(loaded, listed);
    std::fs::remove_file(&path).ok();
}

#[test]
fn orientation_keeps_the_label() {
    let trees = enumerate_full_trees(&terminals(5)).unwrap();
    for (label, tree) in &trees {
        let flows = tree
            .arcs()
            .iter()
            .map(|a| (a.clone(), if a.tail % 2 == 0 { -1.0 } else { 1.0 }))
            .collect();
        let (oriented, _) = orient_forward(tree, &flows).unwrap();
        assert_eq!(&label_fst(&oriented).unwrap(), label);
        assert!(oriented.is_isomorphic(tree));
    }
}

#[test]
#[ignore = "enumerates 2.2 million candidates"]
fn nine_terminal_reference_label() {
    let trees = enumerate_full_trees(&terminals(9)).unwrap();
    assert_eq!(trees.len(), 135_135);

    let label = trees
        .keys()
        .find(|l| l.to_string() == "((2, (3, 4)), ((5, (8, 9)), (6, 7)))");
    assert!(label.is_some());
}
