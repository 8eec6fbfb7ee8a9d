use std::collections::{BTreeMap, HashSet};

use super::dfg_projection::{DfgProjection, Uvcl};

/// Find an activity occurring exactly once in every variant and split the log
/// around it
///
/// Returns the activity together with the prefix sub-log (everything before its
/// occurrence, per variant) and the suffix sub-log (everything after). The driver
/// models this as `Sequence(before, activity, after)`. Candidates are probed in
/// ascending activity order, so the result is deterministic.
pub fn activity_once_per_trace(
    uvcl: &[(Vec<usize>, u64)],
    alphabet: &[usize],
) -> Option<(usize, Uvcl, Uvcl)> {
    let candidate = alphabet.iter().copied().find(|&a| {
        uvcl.iter()
            .all(|(variant, _)| variant.iter().filter(|&&e| e == a).count() == 1)
    })?;

    let mut prefixes: BTreeMap<Vec<usize>, u64> = BTreeMap::new();
    let mut suffixes: BTreeMap<Vec<usize>, u64> = BTreeMap::new();
    for (variant, count) in uvcl {
        let pos = variant.iter().position(|&e| e == candidate).unwrap();
        *prefixes.entry(variant[..pos].to_vec()).or_insert(0) += count;
        *suffixes.entry(variant[pos + 1..].to_vec()).or_insert(0) += count;
    }
    Some((
        candidate,
        prefixes.into_iter().collect(),
        suffixes.into_iter().collect(),
    ))
}

/// Find an activity whose position carries no information: removing it leaves the
/// directly-follows relation over all other activities unchanged
///
/// Returns the activity's own projection sub-log (its occurrences per variant) and
/// the remainder sub-log. The driver models this as
/// `Concurrency(recursion-on-activity, recursion-on-remainder)`. Candidates are
/// probed in ascending activity order.
pub fn activity_concurrent(
    uvcl: &[(Vec<usize>, u64)],
    dfg: &DfgProjection,
) -> Option<(usize, Uvcl, Uvcl)> {
    if dfg.alphabet.len() < 2 {
        return None;
    }
    for &candidate in &dfg.alphabet {
        let mut projected_edges: HashSet<(usize, usize)> = HashSet::new();
        for (variant, _) in uvcl {
            let mut prev: Option<usize> = None;
            for &e in variant {
                if e == candidate {
                    continue;
                }
                if let Some(p) = prev {
                    projected_edges.insert((p, e));
                }
                prev = Some(e);
            }
        }
        let original_without: HashSet<(usize, usize)> = dfg
            .edges
            .keys()
            .filter(|&&(a, b)| a != candidate && b != candidate)
            .copied()
            .collect();
        if projected_edges != original_without {
            continue;
        }

        let mut own: BTreeMap<Vec<usize>, u64> = BTreeMap::new();
        let mut rest: BTreeMap<Vec<usize>, u64> = BTreeMap::new();
        for (variant, count) in uvcl {
            let own_part: Vec<usize> =
                variant.iter().copied().filter(|&e| e == candidate).collect();
            let rest_part: Vec<usize> =
                variant.iter().copied().filter(|&e| e != candidate).collect();
            *own.entry(own_part).or_insert(0) += count;
            *rest.entry(rest_part).or_insert(0) += count;
        }
        return Some((
            candidate,
            own.into_iter().collect(),
            rest.into_iter().collect(),
        ));
    }
    None
}

/// Cut every variant at positions where an end activity is directly followed by a
/// start activity, exposing hidden loop repetitions
///
/// Returns the projected sub-log when at least one variant was cut; the driver
/// wraps its discovery result as `Loop(body, Tau)`.
pub fn strict_tau_loop(uvcl: &[(Vec<usize>, u64)], dfg: &DfgProjection) -> Option<Uvcl> {
    cut_variants(uvcl, |prev, next| {
        dfg.is_end_activity(prev) && dfg.is_start_activity(next)
    })
}

/// Like [`strict_tau_loop`], but cuts in front of every start activity
pub fn tau_loop(uvcl: &[(Vec<usize>, u64)], dfg: &DfgProjection) -> Option<Uvcl> {
    cut_variants(uvcl, |_, next| dfg.is_start_activity(next))
}

fn cut_variants<F>(uvcl: &[(Vec<usize>, u64)], is_boundary: F) -> Option<Uvcl>
where
    F: Fn(usize, usize) -> bool,
{
    let mut projected: BTreeMap<Vec<usize>, u64> = BTreeMap::new();
    let mut cut_happened = false;
    for (variant, count) in uvcl {
        let mut segment: Vec<usize> = Vec::new();
        for (i, &e) in variant.iter().enumerate() {
            segment.push(e);
            if i + 1 < variant.len() && is_boundary(e, variant[i + 1]) {
                *projected.entry(std::mem::take(&mut segment)).or_insert(0) += count;
                cut_happened = true;
            }
        }
        if !segment.is_empty() {
            *projected.entry(segment).or_insert(0) += count;
        }
    }
    if cut_happened {
        Some(projected.into_iter().collect())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn once_per_trace_finds_the_anchor() {
        let uvcl: Uvcl = vec![(vec![0, 1, 2, 1], 1), (vec![0, 1, 2, 0], 1)];
        // only activity 2 occurs exactly once in both variants
        let (act, prefixes, suffixes) =
            activity_once_per_trace(&uvcl, &[0, 1, 2]).unwrap();
        assert_eq!(act, 2);
        assert_eq!(prefixes, vec![(vec![0, 1], 2)]);
        assert_eq!(suffixes, vec![(vec![0], 1), (vec![1], 1)]);
    }

    #[test]
    fn once_per_trace_rejects_repeats_and_absences() {
        let uvcl: Uvcl = vec![(vec![0, 0], 1), (vec![1], 1)];
        assert!(activity_once_per_trace(&uvcl, &[0, 1]).is_none());
    }

    #[test]
    fn concurrent_candidate_detected_by_indifference() {
        // b floats freely inside runs of a
        let uvcl: Uvcl = vec![(vec![0, 1, 1, 0], 1), (vec![1, 0], 1)];
        let dfg = DfgProjection::from_variants(&uvcl);
        let (act, own, rest) = activity_concurrent(&uvcl, &dfg).unwrap();
        assert_eq!(act, 0);
        assert_eq!(own, vec![(vec![0], 1), (vec![0, 0], 1)]);
        assert_eq!(rest, vec![(vec![1], 1), (vec![1, 1], 1)]);
    }

    #[test]
    fn concurrent_rejected_when_removal_creates_new_adjacency() {
        // every activity occurs between two others that never follow each other
        let uvcl: Uvcl = vec![
            (vec![0, 1, 2], 1),
            (vec![2, 1, 0], 1),
            (vec![1, 0, 1], 1),
            (vec![1, 2, 1], 1),
        ];
        let dfg = DfgProjection::from_variants(&uvcl);
        assert!(activity_concurrent(&uvcl, &dfg).is_none());
    }

    #[test]
    fn strict_tau_loop_cuts_at_end_start_boundaries() {
        let uvcl: Uvcl = vec![(vec![0, 1, 0, 1], 1), (vec![0, 1], 1)];
        let dfg = DfgProjection::from_variants(&uvcl);
        let projected = strict_tau_loop(&uvcl, &dfg).unwrap();
        assert_eq!(projected, vec![(vec![0, 1], 3)]);
    }

    #[test]
    fn tau_loop_needs_only_a_start_boundary() {
        // second 0 follows a non-end activity, strict finds nothing
        let uvcl: Uvcl = vec![(vec![0, 1, 0, 2], 1)];
        let dfg = DfgProjection::from_variants(&uvcl);
        assert!(strict_tau_loop(&uvcl, &dfg).is_none());
        let projected = tau_loop(&uvcl, &dfg).unwrap();
        assert_eq!(projected, vec![(vec![0, 1], 1), (vec![0, 2], 1)]);
    }

    #[test]
    fn uncut_variants_return_none() {
        let uvcl: Uvcl = vec![(vec![0, 1], 1)];
        let dfg = DfgProjection::from_variants(&uvcl);
        assert!(strict_tau_loop(&uvcl, &dfg).is_none());
        assert!(tau_loop(&uvcl, &dfg).is_none());
    }
}
