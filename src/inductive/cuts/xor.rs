use std::collections::BTreeMap;

use petgraph::unionfind::UnionFind;

use crate::inductive::dfg_projection::DfgProjection;

/// Detect an exclusive-choice cut: a partition of the alphabet such that no
/// directly-follows edge crosses group boundaries in either direction.
///
/// The groups are the connected components of the undirected closure of the edge
/// set, ordered by their smallest activity. Returns `None` if the graph is a single
/// component.
pub fn detect(dfg: &DfgProjection) -> Option<Vec<Vec<usize>>> {
    let n = dfg.alphabet.len();
    if n < 2 {
        return None;
    }

    let mut components: UnionFind<usize> = UnionFind::new(n);
    for &(a, b) in dfg.edges.keys() {
        components.union(dfg.dense_index(a), dfg.dense_index(b));
    }

    let mut groups_by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &act) in dfg.alphabet.iter().enumerate() {
        groups_by_root
            .entry(components.find(i))
            .or_default()
            .push(act);
    }

    let mut groups: Vec<Vec<usize>> = groups_by_root.into_values().collect();
    groups.sort_by_key(|g| g[0]);
    if groups.len() > 1 {
        Some(groups)
    } else {
        None
    }
}
