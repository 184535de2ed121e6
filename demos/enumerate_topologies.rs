//! Enumerate skeletons and full Steiner topologies for a small terminal set

use geonet::prelude::*;
use geonet::utils::timing::Timer;
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Skeleton Classes ===\n");
    {
        let _timer = Timer::new("Skeleton enumeration");
        let table = enumerate_skeletons(10)?;
        for (size, count) in table.class_counts() {
            println!("  {:2} nodes: {:3} classes", size, count);
        }
    }

    println!("\n=== Full Topologies ===\n");
    let terminals: BTreeMap<String, Position> = [
        ("a", (0.0, 0.0)),
        ("b", (4.0, 0.0)),
        ("c", (4.0, 3.0)),
        ("d", (0.0, 3.0)),
        ("e", (2.0, 5.0)),
    ]
    .into_iter()
    .map(|(name, pos)| (name.to_string(), pos))
    .collect();

    let mut enumerator = TopologyEnumerator::new(EnumerationConfig::default())?;
    let trees = {
        let _timer = Timer::new("Topology enumeration");
        enumerator.enumerate(&terminals)?
    };

    println!("{} terminals give {} full topologies:", terminals.len(), trees.len());
    for (label, tree) in &trees {
        println!("  {}  ({} Steiner nodes)", label, tree.steiner_count());
    }

    // Same terminals, explicit Steiner names
    let ids: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
    let named = enumerator.enumerate_with_ids(&terminals, &ids)?;
    if let Some((label, tree)) = named.iter().next() {
        println!("\nFirst topology with named Steiner nodes {}:", label);
        for arc in tree.arcs() {
            println!("  {:?}", arc);
        }
    }

    Ok(())
}
