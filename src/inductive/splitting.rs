use std::collections::{BTreeMap, HashMap};

use super::dfg_projection::Uvcl;

/// Split a variant log along an exclusive-choice cut
///
/// Every variant is assigned to the group with which it shares the most activity
/// occurrences (ties go to the earliest group) and is projected onto that group.
/// With a noise-free log every variant fits one group completely; under noise
/// filtering the projection drops the stray occurrences.
pub fn split_xor(uvcl: &[(Vec<usize>, u64)], groups: &[Vec<usize>]) -> Vec<Uvcl> {
    let membership = group_membership(groups);
    let mut sub_logs: Vec<BTreeMap<Vec<usize>, u64>> = vec![BTreeMap::new(); groups.len()];
    for (variant, count) in uvcl {
        let mut overlap = vec![0_usize; groups.len()];
        for e in variant {
            if let Some(&g) = membership.get(e) {
                overlap[g] += 1;
            }
        }
        let mut best = 0;
        for (g, &o) in overlap.iter().enumerate() {
            if o > overlap[best] {
                best = g;
            }
        }
        let projected: Vec<usize> = variant
            .iter()
            .copied()
            .filter(|e| membership.get(e) == Some(&best))
            .collect();
        *sub_logs[best].entry(projected).or_insert(0) += count;
    }
    sub_logs.into_iter().map(|m| m.into_iter().collect()).collect()
}

/// Split a variant log along a sequence or parallel cut by projecting every
/// variant onto every group
///
/// A variant not touching a group projects to the empty variant there; the driver
/// models the resulting sub-log with a skip. For sequence cuts this is exactly how
/// skippable groups stay replayable.
pub fn split_projection(uvcl: &[(Vec<usize>, u64)], groups: &[Vec<usize>]) -> Vec<Uvcl> {
    groups
        .iter()
        .map(|group| {
            let mut sub_log: BTreeMap<Vec<usize>, u64> = BTreeMap::new();
            for (variant, count) in uvcl {
                let projected: Vec<usize> = variant
                    .iter()
                    .copied()
                    .filter(|e| group.binary_search(e).is_ok())
                    .collect();
                *sub_log.entry(projected).or_insert(0) += count;
            }
            sub_log.into_iter().collect()
        })
        .collect()
}

/// Split a variant log along a loop cut into body and redo sub-logs
///
/// Every variant is walked left to right and cut into maximal segments of
/// activities belonging to the same group; each segment is emitted to its group's
/// sub-log with the variant's count. For a valid loop cut the segments alternate
/// between the do-group (first group) and redo-groups, starting and ending in the
/// do-group.
pub fn split_loop(uvcl: &[(Vec<usize>, u64)], groups: &[Vec<usize>]) -> Vec<Uvcl> {
    let membership = group_membership(groups);
    let mut sub_logs: Vec<BTreeMap<Vec<usize>, u64>> = vec![BTreeMap::new(); groups.len()];
    for (variant, count) in uvcl {
        if variant.is_empty() {
            *sub_logs[0].entry(Vec::new()).or_insert(0) += count;
            continue;
        }
        let mut current_group = membership[&variant[0]];
        let mut segment: Vec<usize> = Vec::new();
        for &e in variant {
            let group = membership[&e];
            if group != current_group {
                *sub_logs[current_group]
                    .entry(std::mem::take(&mut segment))
                    .or_insert(0) += count;
                current_group = group;
            }
            segment.push(e);
        }
        *sub_logs[current_group].entry(segment).or_insert(0) += count;
    }
    sub_logs.into_iter().map(|m| m.into_iter().collect()).collect()
}

fn group_membership(groups: &[Vec<usize>]) -> HashMap<usize, usize> {
    let mut membership: HashMap<usize, usize> = HashMap::new();
    for (i, group) in groups.iter().enumerate() {
        for &act in group {
            membership.insert(act, i);
        }
    }
    membership
}
