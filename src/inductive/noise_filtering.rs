use super::dfg_projection::DfgProjection;

/// Filter infrequent directly-follows edges from the working DFG (IMf variant)
///
/// Each edge is measured against its source activity's strongest outgoing
/// behavior: the heaviest outgoing edge or the activity's end frequency,
/// whichever is larger. Edges below `noise_threshold` times that maximum are
/// removed, in ascending frequency order with ties broken by (source, target)
/// activity order, so the result does not depend on map iteration order. The last
/// outgoing edge of a non-end activity is never removed, since that would leave a
/// reachable activity without any way forward and cut detection would degenerate
/// into spurious components.
///
/// Start and end activity entries are filtered the same way against the largest
/// start/end frequency; an activity keeps its start (end) status while it has no
/// other way to be reached (left).
///
/// The caller keeps the unfiltered DFG and variants; only cut detection sees the
/// filtered graph.
pub fn filter_dfg(dfg: &DfgProjection, noise_threshold: f32) -> DfgProjection {
    let mut filtered = dfg.clone();

    let mut candidates: Vec<(u64, usize, usize)> = Vec::new();
    for &a in &dfg.alphabet {
        let strongest = dfg
            .outgoing_of(a)
            .iter()
            .map(|&b| dfg.df_between(a, b))
            .max()
            .unwrap_or(0)
            .max(*dfg.end_activities.get(&a).unwrap_or(&0));
        let threshold = noise_threshold * strongest as f32;
        for b in dfg.outgoing_of(a) {
            let w = dfg.df_between(a, b);
            if (w as f32) < threshold {
                candidates.push((w, a, b));
            }
        }
    }
    candidates.sort_unstable();
    for (_, a, b) in candidates {
        let out_degree = filtered.edges.keys().filter(|&&(x, _)| x == a).count();
        if out_degree <= 1 && !filtered.is_end_activity(a) {
            continue;
        }
        filtered.edges.remove(&(a, b));
    }

    let max_start = dfg.start_activities.values().max().copied().unwrap_or(0);
    let start_threshold = noise_threshold * max_start as f32;
    let mut weak_starts: Vec<(u64, usize)> = dfg
        .start_activities
        .iter()
        .filter(|(_, &w)| (w as f32) < start_threshold)
        .map(|(&a, &w)| (w, a))
        .collect();
    weak_starts.sort_unstable();
    for (_, a) in weak_starts {
        if filtered.start_activities.len() <= 1 {
            break;
        }
        if filtered.edges.keys().all(|&(_, y)| y != a) {
            continue;
        }
        filtered.start_activities.remove(&a);
    }

    let max_end = dfg.end_activities.values().max().copied().unwrap_or(0);
    let end_threshold = noise_threshold * max_end as f32;
    let mut weak_ends: Vec<(u64, usize)> = dfg
        .end_activities
        .iter()
        .filter(|(_, &w)| (w as f32) < end_threshold)
        .map(|(&a, &w)| (w, a))
        .collect();
    weak_ends.sort_unstable();
    for (_, a) in weak_ends {
        if filtered.end_activities.len() <= 1 {
            break;
        }
        if filtered.edges.keys().all(|&(x, _)| x != a) {
            continue;
        }
        filtered.end_activities.remove(&a);
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inductive::dfg_projection::Uvcl;

    #[test]
    fn rare_back_edge_is_removed() {
        let variants: Uvcl = vec![(vec![0, 1], 95), (vec![1, 0], 5)];
        let dfg = DfgProjection::from_variants(&variants);
        let filtered = filter_dfg(&dfg, 0.2);

        assert!(filtered.contains_edge(0, 1));
        assert!(!filtered.contains_edge(1, 0));
        assert!(!filtered.is_start_activity(1));
        assert!(!filtered.is_end_activity(0));
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        let variants: Uvcl = vec![(vec![0, 1], 95), (vec![1, 0], 5)];
        let dfg = DfgProjection::from_variants(&variants);
        let filtered = filter_dfg(&dfg, 0.0);
        assert_eq!(filtered.edges, dfg.edges);
        assert_eq!(filtered.start_activities, dfg.start_activities);
    }

    #[test]
    fn end_exit_outweighs_rare_continuation() {
        // b almost always ends the trace; its rare continuation to c is noise
        let variants: Uvcl = vec![(vec![0, 1], 90), (vec![0, 1, 2], 10)];
        let dfg = DfgProjection::from_variants(&variants);
        let filtered = filter_dfg(&dfg, 0.5);
        assert!(!filtered.contains_edge(1, 2));
        assert!(filtered.contains_edge(0, 1));
    }

    #[test]
    fn non_end_activities_always_keep_a_way_forward() {
        let variants: Uvcl = vec![(vec![0, 1, 3], 80), (vec![0, 2, 3], 3), (vec![0, 1, 1, 3], 17)];
        let dfg = DfgProjection::from_variants(&variants);
        let filtered = filter_dfg(&dfg, 0.4);
        for &a in &dfg.alphabet {
            if !dfg.is_end_activity(a) && !dfg.outgoing_of(a).is_empty() {
                assert!(
                    !filtered.outgoing_of(a).is_empty(),
                    "activity {a} lost all outgoing edges"
                );
            }
        }
    }

    #[test]
    fn original_graph_is_untouched() {
        let variants: Uvcl = vec![(vec![0, 1], 95), (vec![1, 0], 5)];
        let dfg = DfgProjection::from_variants(&variants);
        let _ = filter_dfg(&dfg, 0.9);
        assert!(dfg.contains_edge(1, 0));
        assert!(dfg.is_start_activity(1));
    }
}
