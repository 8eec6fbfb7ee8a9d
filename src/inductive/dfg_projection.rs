use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;

/// A variant log slice: distinct interned activity sequences with occurrence counts
pub type Uvcl = Vec<(Vec<usize>, u64)>;

/// Working directly-follows graph over interned activities
///
/// This is the graph the cut detectors and the noise filter operate on. It is derived
/// from the variants of the current recursion instance and owned exclusively by it.
#[derive(Debug, Default, Clone)]
pub struct DfgProjection {
    /// Interned activities occurring in the variants, sorted ascending
    pub alphabet: Vec<usize>,
    /// Directly-follows edges with frequencies
    pub edges: HashMap<(usize, usize), u64>,
    /// Start activities with frequencies
    pub start_activities: HashMap<usize, u64>,
    /// End activities with frequencies
    pub end_activities: HashMap<usize, u64>,
}

impl DfgProjection {
    /// Derive the working DFG from a list of weighted variants by adjacent-pair counting
    pub fn from_variants(variants: &[(Vec<usize>, u64)]) -> Self {
        let edges = variants
            .par_iter()
            .map(|(t, w)| {
                let mut trace_dfs: Vec<((usize, usize), u64)> = Vec::new();
                let mut prev_act: Option<usize> = None;
                for &e in t {
                    if let Some(prev) = prev_act {
                        trace_dfs.push(((prev, e), *w));
                    }
                    prev_act = Some(e);
                }
                trace_dfs
            })
            .flatten()
            .fold(
                HashMap::<(usize, usize), u64>::new,
                |mut map, (df_pair, w)| {
                    *map.entry(df_pair).or_insert(0) += w;
                    map
                },
            )
            .reduce(HashMap::new, |mut m1, m2| {
                for (k, v) in m2 {
                    *m1.entry(k).or_default() += v;
                }
                m1
            });

        let mut alphabet: BTreeSet<usize> = BTreeSet::new();
        let mut start_activities: HashMap<usize, u64> = HashMap::new();
        let mut end_activities: HashMap<usize, u64> = HashMap::new();
        for (t, w) in variants {
            alphabet.extend(t.iter().copied());
            if let Some(&first) = t.first() {
                *start_activities.entry(first).or_insert(0) += w;
            }
            if let Some(&last) = t.last() {
                *end_activities.entry(last).or_insert(0) += w;
            }
        }

        Self {
            alphabet: alphabet.into_iter().collect(),
            edges,
            start_activities,
            end_activities,
        }
    }

    /// Directly-follows frequency between two activities (0 if no edge exists)
    pub fn df_between(&self, a: usize, b: usize) -> u64 {
        *self.edges.get(&(a, b)).unwrap_or(&0)
    }

    /// Checks if a directly-follows edge exists
    pub fn contains_edge(&self, a: usize, b: usize) -> bool {
        self.edges.contains_key(&(a, b))
    }

    /// Checks if an activity is a start activity
    pub fn is_start_activity(&self, act: usize) -> bool {
        self.start_activities.contains_key(&act)
    }

    /// Checks if an activity is an end activity
    pub fn is_end_activity(&self, act: usize) -> bool {
        self.end_activities.contains_key(&act)
    }

    /// All edges sorted by (source, target), for deterministic iteration
    pub fn sorted_edges(&self) -> Vec<((usize, usize), u64)> {
        let mut edges: Vec<((usize, usize), u64)> =
            self.edges.iter().map(|(&pair, &w)| (pair, w)).collect();
        edges.sort_unstable();
        edges
    }

    /// Direct successors of an activity, sorted ascending
    pub fn outgoing_of(&self, act: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .edges
            .keys()
            .filter_map(|&(a, b)| if a == act { Some(b) } else { None })
            .collect();
        out.sort_unstable();
        out
    }

    /// Direct predecessors of an activity, sorted ascending
    pub fn ingoing_of(&self, act: usize) -> Vec<usize> {
        let mut ingoing: Vec<usize> = self
            .edges
            .keys()
            .filter_map(|&(a, b)| if b == act { Some(a) } else { None })
            .collect();
        ingoing.sort_unstable();
        ingoing
    }

    /// Position of an activity in the sorted alphabet
    pub fn dense_index(&self, act: usize) -> usize {
        self.alphabet.binary_search(&act).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_edges_starts_and_ends() {
        // 0: <a,b,c> x2, 1: <a,c> x1 over acts a=0, b=1, c=2
        let variants: Uvcl = vec![(vec![0, 1, 2], 2), (vec![0, 2], 1)];
        let dfg = DfgProjection::from_variants(&variants);

        assert_eq!(dfg.alphabet, vec![0, 1, 2]);
        assert_eq!(dfg.df_between(0, 1), 2);
        assert_eq!(dfg.df_between(0, 2), 1);
        assert_eq!(dfg.df_between(1, 2), 2);
        assert_eq!(dfg.df_between(2, 1), 0);
        assert_eq!(dfg.start_activities[&0], 3);
        assert_eq!(dfg.end_activities[&2], 3);
        assert!(dfg.is_start_activity(0));
        assert!(!dfg.is_start_activity(1));
    }

    #[test]
    fn empty_variants_contribute_nothing() {
        let variants: Uvcl = vec![(vec![], 5)];
        let dfg = DfgProjection::from_variants(&variants);
        assert!(dfg.alphabet.is_empty());
        assert!(dfg.edges.is_empty());
        assert!(dfg.start_activities.is_empty());
    }

    #[test]
    fn neighbor_views_are_sorted() {
        let variants: Uvcl = vec![(vec![0, 2], 1), (vec![0, 1], 1), (vec![1, 0], 1)];
        let dfg = DfgProjection::from_variants(&variants);
        assert_eq!(dfg.outgoing_of(0), vec![1, 2]);
        assert_eq!(dfg.ingoing_of(0), vec![1]);
        let sorted = dfg.sorted_edges();
        assert!(sorted.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
