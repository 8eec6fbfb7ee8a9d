use std::collections::{BTreeMap, BTreeSet};

use petgraph::unionfind::UnionFind;

use crate::inductive::dfg_projection::DfgProjection;

/// Detect a loop cut: a do-group holding all log start and end activities, plus one
/// or more redo-groups.
///
/// The do-group candidate is seeded with the start and end activities; the
/// remainder splits into undirected components. A component stays a redo-group only
/// if every edge it receives comes from an end activity, every edge it emits lands
/// on a start activity, each of its entry activities is reached by **every** end
/// activity and each of its exit activities reaches **every** start activity
/// (otherwise loop replay could not re-enter or leave it consistently). Components
/// failing these conditions fold into the do-group. Returns `[do, redo..]` with
/// redo-groups ordered by smallest activity, or `None` when no redo-group survives.
pub fn detect(dfg: &DfgProjection) -> Option<Vec<Vec<usize>>> {
    if dfg.alphabet.len() < 2 {
        return None;
    }

    let start_set: BTreeSet<usize> = dfg.start_activities.keys().copied().collect();
    let end_set: BTreeSet<usize> = dfg.end_activities.keys().copied().collect();
    let mut do_group: BTreeSet<usize> = start_set.union(&end_set).copied().collect();

    let remainder: Vec<usize> = dfg
        .alphabet
        .iter()
        .copied()
        .filter(|a| !do_group.contains(a))
        .collect();
    if remainder.is_empty() {
        return None;
    }

    // undirected components of the graph restricted to the remainder
    let mut components: UnionFind<usize> = UnionFind::new(remainder.len());
    let position: BTreeMap<usize, usize> = remainder
        .iter()
        .enumerate()
        .map(|(i, &a)| (a, i))
        .collect();
    for &(a, b) in dfg.edges.keys() {
        if let (Some(&pa), Some(&pb)) = (position.get(&a), position.get(&b)) {
            components.union(pa, pb);
        }
    }
    let mut comps_by_root: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    for (i, &act) in remainder.iter().enumerate() {
        comps_by_root
            .entry(components.find(i))
            .or_default()
            .insert(act);
    }
    let mut comps: Vec<BTreeSet<usize>> = comps_by_root.into_values().collect();
    comps.sort_by_key(|c| *c.iter().next().unwrap());

    let mut redo_groups: Vec<BTreeSet<usize>> = Vec::new();
    for comp in comps {
        if component_is_redo(&comp, dfg, &start_set, &end_set) {
            redo_groups.push(comp);
        } else {
            do_group.extend(comp);
        }
    }
    if redo_groups.is_empty() {
        return None;
    }

    let mut groups: Vec<Vec<usize>> = Vec::with_capacity(1 + redo_groups.len());
    groups.push(do_group.into_iter().collect());
    groups.extend(redo_groups.into_iter().map(|c| c.into_iter().collect()));
    Some(groups)
}

fn component_is_redo(
    comp: &BTreeSet<usize>,
    dfg: &DfgProjection,
    start_set: &BTreeSet<usize>,
    end_set: &BTreeSet<usize>,
) -> bool {
    // edges crossing the component boundary must connect end activities into the
    // component and the component back into start activities
    for &a in comp {
        for b in dfg.outgoing_of(a) {
            if !comp.contains(&b) && !start_set.contains(&b) {
                return false;
            }
        }
        for p in dfg.ingoing_of(a) {
            if !comp.contains(&p) && !end_set.contains(&p) {
                return false;
            }
        }
    }
    // the redo part must be executable after any loop body completion and before
    // any loop body restart
    for &a in comp {
        let is_entry = dfg.ingoing_of(a).iter().any(|p| !comp.contains(p));
        if is_entry && end_set.iter().any(|&e| !dfg.contains_edge(e, a)) {
            return false;
        }
        let is_exit = dfg.outgoing_of(a).iter().any(|s| !comp.contains(s));
        if is_exit && start_set.iter().any(|&s| !dfg.contains_edge(a, s)) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inductive::dfg_projection::Uvcl;

    #[test]
    fn redo_part_between_body_runs_is_detected() {
        // <a,b> or <a,b,c,a,b>: c sends the loop back to the start
        let variants: Uvcl = vec![(vec![0, 1], 1), (vec![0, 1, 2, 0, 1], 1)];
        let dfg = DfgProjection::from_variants(&variants);
        assert_eq!(detect(&dfg), Some(vec![vec![0, 1], vec![2]]));
    }

    #[test]
    fn all_activities_starting_or_ending_prevents_the_cut() {
        let variants: Uvcl = vec![(vec![0, 1], 1), (vec![1, 0], 1)];
        let dfg = DfgProjection::from_variants(&variants);
        assert_eq!(detect(&dfg), None);
    }

    #[test]
    fn component_entered_from_a_non_end_activity_is_folded() {
        // b -> c happens mid-body (b is not an end activity), so c cannot redo
        let variants: Uvcl = vec![(vec![0, 1, 2, 1, 3], 1), (vec![0, 1, 3], 1)];
        let dfg = DfgProjection::from_variants(&variants);
        assert_eq!(detect(&dfg), None);
    }

    #[test]
    fn multiple_redo_components_stay_separate() {
        // two independent redo parts c and d
        let variants: Uvcl = vec![
            (vec![0, 1], 1),
            (vec![0, 1, 2, 0, 1], 1),
            (vec![0, 1, 3, 0, 1], 1),
        ];
        let dfg = DfgProjection::from_variants(&variants);
        assert_eq!(detect(&dfg), Some(vec![vec![0, 1], vec![2], vec![3]]));
    }

    #[test]
    fn redo_entry_must_be_reached_from_every_end() {
        // ends are b and d, but the redo part c is only ever entered from b
        let variants: Uvcl = vec![
            (vec![0, 1], 1),
            (vec![0, 3], 1),
            (vec![0, 1, 2, 0, 3], 1),
        ];
        let dfg = DfgProjection::from_variants(&variants);
        assert_eq!(detect(&dfg), None);
    }
}
