use std::collections::{HashMap, HashSet};

use super::dfg_projection::DfgProjection;

/// Transitive predecessors and successors of every activity under the
/// directly-follows relation (reachability, not just adjacency)
#[derive(Debug, Clone)]
pub struct TransitiveClosure {
    successors: HashMap<usize, HashSet<usize>>,
    predecessors: HashMap<usize, HashSet<usize>>,
}

impl TransitiveClosure {
    /// Compute the closure via frontier expansion over the DFG adjacency
    pub fn compute(dfg: &DfgProjection) -> Self {
        let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
        for &(a, b) in dfg.edges.keys() {
            adjacency.entry(a).or_default().push(b);
        }

        let mut successors: HashMap<usize, HashSet<usize>> = HashMap::new();
        for &act in &dfg.alphabet {
            let mut reached: HashSet<usize> = HashSet::new();
            let mut frontier: Vec<usize> = adjacency.get(&act).cloned().unwrap_or_default();
            while let Some(x) = frontier.pop() {
                if reached.insert(x) {
                    if let Some(next) = adjacency.get(&x) {
                        frontier.extend(next.iter().filter(|n| !reached.contains(n)));
                    }
                }
            }
            successors.insert(act, reached);
        }

        let mut predecessors: HashMap<usize, HashSet<usize>> = dfg
            .alphabet
            .iter()
            .map(|&act| (act, HashSet::new()))
            .collect();
        for (&a, reachable) in &successors {
            for &b in reachable {
                predecessors.entry(b).or_default().insert(a);
            }
        }

        Self {
            successors,
            predecessors,
        }
    }

    /// Checks whether `b` is transitively reachable from `a`
    pub fn reaches(&self, a: usize, b: usize) -> bool {
        self.successors
            .get(&a)
            .is_some_and(|set| set.contains(&b))
    }

    /// Transitive successors of an activity
    pub fn successors_of(&self, act: usize) -> &HashSet<usize> {
        &self.successors[&act]
    }

    /// Transitive predecessors of an activity
    pub fn predecessors_of(&self, act: usize) -> &HashSet<usize> {
        &self.predecessors[&act]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inductive::dfg_projection::Uvcl;

    #[test]
    fn closure_of_a_chain() {
        let variants: Uvcl = vec![(vec![0, 1, 2], 1)];
        let dfg = DfgProjection::from_variants(&variants);
        let closure = TransitiveClosure::compute(&dfg);

        assert!(closure.reaches(0, 2));
        assert!(!closure.reaches(2, 0));
        assert_eq!(closure.successors_of(0).len(), 2);
        assert_eq!(closure.predecessors_of(2).len(), 2);
        assert!(closure.predecessors_of(0).is_empty());
    }

    #[test]
    fn cycles_reach_themselves() {
        // a -> b -> a
        let variants: Uvcl = vec![(vec![0, 1, 0], 1)];
        let dfg = DfgProjection::from_variants(&variants);
        let closure = TransitiveClosure::compute(&dfg);

        assert!(closure.reaches(0, 0));
        assert!(closure.reaches(1, 1));
        assert!(closure.reaches(1, 0));
    }

    #[test]
    fn disconnected_activities_do_not_reach_each_other() {
        let variants: Uvcl = vec![(vec![0], 1), (vec![1], 1)];
        let dfg = DfgProjection::from_variants(&variants);
        let closure = TransitiveClosure::compute(&dfg);

        assert!(!closure.reaches(0, 1));
        assert!(!closure.reaches(1, 0));
    }
}
