use std::collections::BTreeMap;

use petgraph::unionfind::UnionFind;

use crate::inductive::dfg_projection::DfgProjection;

/// Detect a parallel cut: a partition of the alphabet such that every pair of
/// activities from different groups is connected by directly-follows edges in both
/// directions, and every group holds at least one log start and one log end
/// activity.
///
/// Every pair lacking bidirectional edges is merged into the same group, so the
/// surviving partition is bidirectionally complete across all group boundaries by
/// construction. Groups are ordered by (size, smallest activity). Groups missing
/// start/end coverage are folded into a neighboring group; the cut is rejected when
/// fewer than two covered groups remain.
pub fn detect(dfg: &DfgProjection) -> Option<Vec<Vec<usize>>> {
    let n = dfg.alphabet.len();
    if n < 2 {
        return None;
    }

    let mut components: UnionFind<usize> = UnionFind::new(n);
    for (i, &a) in dfg.alphabet.iter().enumerate() {
        for (j, &b) in dfg.alphabet.iter().enumerate().skip(i + 1) {
            if !(dfg.contains_edge(a, b) && dfg.contains_edge(b, a)) {
                components.union(i, j);
            }
        }
    }

    let mut groups_by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &act) in dfg.alphabet.iter().enumerate() {
        groups_by_root
            .entry(components.find(i))
            .or_default()
            .push(act);
    }
    let mut groups: Vec<Vec<usize>> = groups_by_root.into_values().collect();
    groups.sort_by_key(|g| (g.len(), g[0]));
    if groups.len() < 2 {
        return None;
    }

    // every group must span from a log start to a log end; fold uncovered groups
    // into a neighbor
    let covered = |g: &[usize]| {
        g.iter().any(|&a| dfg.is_start_activity(a)) && g.iter().any(|&a| dfg.is_end_activity(a))
    };
    let mut i = 0;
    while i < groups.len() && groups.len() > 1 {
        if covered(&groups[i]) {
            i += 1;
            continue;
        }
        let group = groups.remove(i);
        let target = if i == 0 { 0 } else { i - 1 };
        groups[target].extend(group);
        groups[target].sort_unstable();
    }

    if groups.len() > 1 {
        Some(groups)
    } else {
        None
    }
}
