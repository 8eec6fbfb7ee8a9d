use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Log of distinct trace variants with occurrence counts, projected on
/// interned activity labels
///
/// Activity labels are interned to `usize` indices into [`VariantLog::activities`].
/// The label table is sorted lexicographically, so ascending index order equals
/// lexicographic label order; all deterministic tie-breaks of the discovery
/// algorithm rely on this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantLog {
    /// Activity labels, sorted lexicographically; indices are the interned activity IDs
    pub activities: Vec<String>,
    /// Mapping of activity label to interned index
    pub act_to_index: HashMap<String, usize>,
    /// Distinct variants (sequences of interned activities) with their occurrence count,
    /// sorted by sequence
    pub variants: Vec<(Vec<usize>, u64)>,
}

impl VariantLog {
    /// Build a [`VariantLog`] from raw traces of activity labels
    ///
    /// Traces with identical activity sequences collapse into a single variant
    /// whose count is the number of occurrences.
    pub fn from_traces<I, T, S>(traces: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let traces: Vec<Vec<String>> = traces
            .into_iter()
            .map(|t| t.into_iter().map(|a| a.as_ref().to_string()).collect())
            .collect();

        let labels: BTreeSet<&String> = traces.iter().flatten().collect();
        let activities: Vec<String> = labels.into_iter().cloned().collect();
        let act_to_index: HashMap<String, usize> = activities
            .iter()
            .enumerate()
            .map(|(i, act)| (act.clone(), i))
            .collect();

        let mut counts: BTreeMap<Vec<usize>, u64> = BTreeMap::new();
        for t in &traces {
            let variant: Vec<usize> = t.iter().map(|act| act_to_index[act]).collect();
            *counts.entry(variant).or_insert(0) += 1;
        }

        Self {
            activities,
            act_to_index,
            variants: counts.into_iter().collect(),
        }
    }

    /// Label of an interned activity
    pub fn activity_name(&self, act: usize) -> &str {
        &self.activities[act]
    }

    /// Map interned activities back to their (sorted) labels
    pub fn acts_to_names(&self, acts: &[usize]) -> Vec<String> {
        let mut ret: Vec<String> = acts
            .iter()
            .map(|act| self.activities[*act].clone())
            .collect();
        ret.sort();
        ret
    }

    /// Total number of recorded traces (sum of all variant counts)
    pub fn total_traces(&self) -> u64 {
        self.variants.iter().map(|(_, count)| count).sum()
    }
}
