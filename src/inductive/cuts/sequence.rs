use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::iproduct;
use petgraph::unionfind::UnionFind;

use crate::inductive::dfg_projection::DfgProjection;
use crate::inductive::transitive_closure::TransitiveClosure;

/// Detect a sequence cut: an ordered partition of the alphabet such that all
/// directly-follows edges point strictly forward between groups.
///
/// Two activities land in the same group when they are mutually reachable (a loop)
/// or mutually unreachable (parallel or exclusive behavior that a sequence cannot
/// separate). The remaining groups admit exactly one direction of reachability per
/// pair and are ordered by `|trp| + (|alphabet| - |trs|)` of their smallest member.
///
/// With `strict` enabled (used by the noise-tolerant variant) groups that can be
/// skipped together are merged, trading group granularity for skip precision; see
/// [`merge_skippable_groups`].
pub fn detect(
    dfg: &DfgProjection,
    closure: &TransitiveClosure,
    strict: bool,
) -> Option<Vec<Vec<usize>>> {
    let groups = detect_loose(dfg, closure)?;
    if !strict {
        return Some(groups);
    }
    let merged = merge_skippable_groups(dfg, groups);
    if merged.len() > 1 {
        Some(merged)
    } else {
        None
    }
}

fn detect_loose(dfg: &DfgProjection, closure: &TransitiveClosure) -> Option<Vec<Vec<usize>>> {
    let n = dfg.alphabet.len();
    if n < 2 {
        return None;
    }

    let mut components: UnionFind<usize> = UnionFind::new(n);
    for (i, &a) in dfg.alphabet.iter().enumerate() {
        for (j, &b) in dfg.alphabet.iter().enumerate().skip(i + 1) {
            if closure.reaches(a, b) == closure.reaches(b, a) {
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
    if groups_by_root.len() < 2 {
        return None;
    }

    let mut groups: Vec<Vec<usize>> = groups_by_root.into_values().collect();
    groups.sort_by_key(|g| {
        let rep = g[0];
        (
            closure.predecessors_of(rep).len() + (n - closure.successors_of(rep).len()),
            rep,
        )
    });
    Some(groups)
}

/// Merge skippable groups of a sequence cut, as done by the strict sequence cut of
/// the noise-tolerant miner.
///
/// `mf[i]` is the minimal group index with a direct edge into group `i` (unbounded
/// below when the group holds a log start activity); `mt[i]` is the maximal group
/// index directly reached from group `i` (unbounded above when the group holds a
/// log end activity). Both are fixed before merging. For every position `p` that is
/// skippable, consecutive earlier groups `q` with `mt[q] <= p` and consecutive
/// later groups `q` with `mf[q] >= p` are folded into group `p`; emptied groups are
/// dropped at the end. The bound directions and the merge order are load-bearing
/// for reproducible output and must not be changed.
pub fn merge_skippable_groups(dfg: &DfgProjection, groups: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let k = groups.len();
    let mut cluster_of: HashMap<usize, usize> = HashMap::new();
    for (i, g) in groups.iter().enumerate() {
        for &a in g {
            cluster_of.insert(a, i);
        }
    }

    let mut mf = vec![i64::MAX; k];
    let mut mt = vec![i64::MIN; k];
    for (i, g) in groups.iter().enumerate() {
        for &a in g {
            if dfg.is_start_activity(a) {
                mf[i] = i64::MIN;
            }
            if dfg.is_end_activity(a) {
                mt[i] = i64::MAX;
            }
        }
    }
    for ((a, b), _) in dfg.sorted_edges() {
        let ca = cluster_of[&a];
        let cb = cluster_of[&b];
        mf[cb] = mf[cb].min(ca as i64);
        mt[ca] = mt[ca].max(cb as i64);
    }

    let mut clusters: Vec<BTreeSet<usize>> = groups
        .into_iter()
        .map(|g| g.into_iter().collect())
        .collect();
    for p in 0..k {
        if !skippable(&clusters, dfg, p) {
            continue;
        }
        let mut q = p as i64 - 1;
        while q >= 0 && mt[q as usize] <= p as i64 {
            let moved = std::mem::take(&mut clusters[q as usize]);
            clusters[p].extend(moved);
            q -= 1;
        }
        let mut q = p + 1;
        while q < k && mf[q] >= p as i64 {
            let moved = std::mem::take(&mut clusters[q]);
            clusters[p].extend(moved);
            q += 1;
        }
    }

    clusters
        .into_iter()
        .filter(|g| !g.is_empty())
        .map(|g| g.into_iter().collect())
        .collect()
}

/// A position `p` is skippable when a direct edge jumps over it, a later group
/// holds a log start activity, or an earlier group holds a log end activity.
fn skippable(clusters: &[BTreeSet<usize>], dfg: &DfgProjection, p: usize) -> bool {
    for (i, j) in iproduct!(0..p, p + 1..clusters.len()) {
        for (&a, &b) in iproduct!(clusters[i].iter(), clusters[j].iter()) {
            if dfg.contains_edge(a, b) {
                return true;
            }
        }
    }
    clusters[p + 1..]
        .iter()
        .any(|g| g.iter().any(|&a| dfg.is_start_activity(a)))
        || clusters[..p]
            .iter()
            .any(|g| g.iter().any(|&a| dfg.is_end_activity(a)))
}
