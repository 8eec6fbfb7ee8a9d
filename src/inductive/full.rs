use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dfg::dfg_struct::DirectlyFollowsGraph;
use crate::process_tree::process_tree_struct::{OperatorType, ProcessTree};
use crate::variant_log::variant_log_struct::VariantLog;

use super::cuts::{concurrency, loop_cut, sequence, xor};
use super::dfg_projection::{DfgProjection, Uvcl};
use super::fall_through;
use super::noise_filtering;
use super::splitting;
use super::transitive_closure::TransitiveClosure;

///
/// Error encountered while validating process discovery input
///
/// Validation failures abort the whole discovery call; partial trees are never
/// returned.
///
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    /// Noise threshold outside of `[0, 1]`
    InvalidNoiseThreshold(f32),
    /// A directly-follows relation references an activity absent from the DFG alphabet
    RelationActivityMissing(String),
    /// A start activity is absent from the DFG alphabet
    StartActivityMissing(String),
    /// An end activity is absent from the DFG alphabet
    EndActivityMissing(String),
    /// A variant references an activity absent from the paired DFG alphabet
    VariantActivityMissing(String),
    /// A variant references an activity index outside the log's label table
    VariantActivityOutOfRange(usize),
    /// A variant with an occurrence count of zero
    ZeroVariantCount,
    /// The same variant sequence appears twice in the log
    DuplicateVariant,
    /// An empty DFG paired with a log that records behavior
    EmptyDfgNonEmptyLog,
    /// The DFG is not the one derivable from the paired variant log
    InconsistentDfg,
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to discover process tree: {:?}", self)
    }
}

impl std::error::Error for DiscoveryError {}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
/// Algorithm parameters for the Inductive Miner
pub struct InductiveMinerConfig {
    /// Noise threshold in `[0, 1]`
    ///
    /// Zero runs the precise variant (IM): no filtering and the loose sequence
    /// cut. A positive threshold runs the noise-tolerant variant (IMf): the
    /// working DFG is filtered on every recursion level and the strict sequence
    /// cut is used.
    pub noise_threshold: f32,
}

impl Default for InductiveMinerConfig {
    fn default() -> Self {
        Self {
            noise_threshold: 0.0,
        }
    }
}

impl InductiveMinerConfig {
    /// Serialize Inductive Miner parameters to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
    /// Deserialize Inductive Miner parameters from JSON string
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap()
    }
}

///
/// Discover a [`ProcessTree`] from a [`DirectlyFollowsGraph`] and the
/// [`VariantLog`] it was derived from
///
/// Both inputs are validated against each other before discovery starts: the DFG
/// must be exactly the graph derivable from the variants (including start/end and
/// edge frequencies). Identical inputs always produce structurally identical
/// trees.
///
pub fn discover_process_tree(
    dfg: &DirectlyFollowsGraph,
    log: &VariantLog,
    config: InductiveMinerConfig,
) -> Result<ProcessTree, DiscoveryError> {
    validate_config(&config)?;
    validate_dfg(dfg)?;
    validate_variant_log(log)?;

    let has_behavior = log.variants.iter().any(|(v, _)| !v.is_empty());
    if dfg.is_empty() && has_behavior {
        return Err(DiscoveryError::EmptyDfgNonEmptyLog);
    }
    for (variant, _) in &log.variants {
        for &act in variant {
            if !dfg.contains_activity(&log.activities[act]) {
                return Err(DiscoveryError::VariantActivityMissing(
                    log.activities[act].clone(),
                ));
            }
        }
    }
    if DirectlyFollowsGraph::create_from_variant_log(log) != *dfg {
        return Err(DiscoveryError::InconsistentDfg);
    }

    Ok(discover_tree_recursive(
        &log.variants,
        &log.activities,
        &config,
    ))
}

///
/// Discover a [`ProcessTree`] from a [`VariantLog`] alone
///
/// The directly-follows graph is derived internally by adjacent-pair counting.
///
pub fn discover_process_tree_from_log(
    log: &VariantLog,
    config: InductiveMinerConfig,
) -> Result<ProcessTree, DiscoveryError> {
    validate_config(&config)?;
    validate_variant_log(log)?;
    Ok(discover_tree_recursive(
        &log.variants,
        &log.activities,
        &config,
    ))
}

fn validate_config(config: &InductiveMinerConfig) -> Result<(), DiscoveryError> {
    if !(0.0..=1.0).contains(&config.noise_threshold) {
        return Err(DiscoveryError::InvalidNoiseThreshold(
            config.noise_threshold,
        ));
    }
    Ok(())
}

fn validate_dfg(dfg: &DirectlyFollowsGraph) -> Result<(), DiscoveryError> {
    for (from, to) in dfg.directly_follows_relations.keys() {
        if !dfg.contains_activity(from) {
            return Err(DiscoveryError::RelationActivityMissing(from.clone()));
        }
        if !dfg.contains_activity(to) {
            return Err(DiscoveryError::RelationActivityMissing(to.clone()));
        }
    }
    for act in dfg.start_activities.keys() {
        if !dfg.contains_activity(act) {
            return Err(DiscoveryError::StartActivityMissing(act.clone()));
        }
    }
    for act in dfg.end_activities.keys() {
        if !dfg.contains_activity(act) {
            return Err(DiscoveryError::EndActivityMissing(act.clone()));
        }
    }
    Ok(())
}

fn validate_variant_log(log: &VariantLog) -> Result<(), DiscoveryError> {
    let mut seen: HashSet<&[usize]> = HashSet::new();
    for (variant, count) in &log.variants {
        if *count == 0 {
            return Err(DiscoveryError::ZeroVariantCount);
        }
        if !seen.insert(variant.as_slice()) {
            return Err(DiscoveryError::DuplicateVariant);
        }
        for &act in variant {
            if act >= log.activities.len() {
                return Err(DiscoveryError::VariantActivityOutOfRange(act));
            }
        }
    }
    Ok(())
}

/// Recursive Inductive Miner driver
///
/// A pure function of its variants: derives the working DFG, handles the terminal
/// and base cases, tries the cuts in their fixed priority order, and falls through
/// to the heuristics, bottoming out in the flower model.
fn discover_tree_recursive(
    uvcl: &[(Vec<usize>, u64)],
    activities: &[String],
    config: &InductiveMinerConfig,
) -> ProcessTree {
    let dfg = DfgProjection::from_variants(uvcl);

    // no recorded behavior at all
    if dfg.alphabet.is_empty() {
        return ProcessTree::new_tau();
    }

    // the empty variant means the whole sub-behavior is optional: skip branch
    let non_empty: Uvcl = uvcl
        .iter()
        .filter(|(v, _)| !v.is_empty())
        .cloned()
        .collect();
    if non_empty.len() < uvcl.len() {
        let rest = discover_tree_recursive(&non_empty, activities, config);
        return ProcessTree::new_operator(
            OperatorType::ExclusiveChoice,
            vec![ProcessTree::new_tau(), rest],
        );
    }

    if let [single] = dfg.alphabet[..] {
        let leaf = ProcessTree::new_leaf(activities[single].clone());
        return if dfg.df_between(single, single) > 0 {
            ProcessTree::new_operator(OperatorType::Loop, vec![leaf, ProcessTree::new_tau()])
        } else {
            leaf
        };
    }

    // cut detection runs on the (possibly filtered) working graph; splitting
    // always uses the unfiltered variants
    let imf = config.noise_threshold > 0.0;
    let working = if imf {
        noise_filtering::filter_dfg(&dfg, config.noise_threshold)
    } else {
        dfg.clone()
    };

    if let Some(groups) = xor::detect(&working) {
        let sub_logs = splitting::split_xor(uvcl, &groups);
        return recurse_on(OperatorType::ExclusiveChoice, sub_logs, activities, config);
    }
    let closure = TransitiveClosure::compute(&working);
    if let Some(groups) = sequence::detect(&working, &closure, imf) {
        let sub_logs = splitting::split_projection(uvcl, &groups);
        return recurse_on(OperatorType::Sequence, sub_logs, activities, config);
    }
    if let Some(groups) = concurrency::detect(&working) {
        let sub_logs = splitting::split_projection(uvcl, &groups);
        return recurse_on(OperatorType::Concurrency, sub_logs, activities, config);
    }
    if let Some(groups) = loop_cut::detect(&working) {
        let sub_logs = splitting::split_loop(uvcl, &groups);
        return recurse_on(OperatorType::Loop, sub_logs, activities, config);
    }

    if let Some((anchor, prefixes, suffixes)) =
        fall_through::activity_once_per_trace(uvcl, &dfg.alphabet)
    {
        let (before, after) = rayon::join(
            || discover_tree_recursive(&prefixes, activities, config),
            || discover_tree_recursive(&suffixes, activities, config),
        );
        return ProcessTree::new_operator(
            OperatorType::Sequence,
            vec![
                before,
                ProcessTree::new_leaf(activities[anchor].clone()),
                after,
            ],
        );
    }
    if let Some((_, own, rest)) = fall_through::activity_concurrent(uvcl, &dfg) {
        let (own_tree, rest_tree) = rayon::join(
            || discover_tree_recursive(&own, activities, config),
            || discover_tree_recursive(&rest, activities, config),
        );
        return ProcessTree::new_operator(OperatorType::Concurrency, vec![own_tree, rest_tree]);
    }
    if let Some(projected) = fall_through::strict_tau_loop(uvcl, &dfg)
        .or_else(|| fall_through::tau_loop(uvcl, &dfg))
    {
        let body = discover_tree_recursive(&projected, activities, config);
        return ProcessTree::new_operator(
            OperatorType::Loop,
            vec![body, ProcessTree::new_tau()],
        );
    }

    flower_model(&dfg.alphabet, activities)
}

/// Recurse on all sub-logs of a cut concurrently and assemble the operator node
///
/// Sibling sub-instances share nothing; the parent joins on all children before
/// assembling, preserving group order.
fn recurse_on(
    operator: OperatorType,
    sub_logs: Vec<Uvcl>,
    activities: &[String],
    config: &InductiveMinerConfig,
) -> ProcessTree {
    let children: Vec<ProcessTree> = sub_logs
        .par_iter()
        .map(|sub| discover_tree_recursive(sub, activities, config))
        .collect();
    ProcessTree::new_operator(operator, children)
}

/// The terminal fall-through: any remaining activity, any number of times, in any
/// order
fn flower_model(alphabet: &[usize], activities: &[String]) -> ProcessTree {
    let leaves: Vec<ProcessTree> = alphabet
        .iter()
        .map(|&a| ProcessTree::new_leaf(activities[a].clone()))
        .collect();
    ProcessTree::new_operator(
        OperatorType::Loop,
        vec![
            ProcessTree::new_operator(OperatorType::ExclusiveChoice, leaves),
            ProcessTree::new_tau(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discover(traces: Vec<Vec<&str>>) -> ProcessTree {
        let log = VariantLog::from_traces(traces);
        discover_process_tree_from_log(&log, InductiveMinerConfig::default()).unwrap()
    }

    #[test]
    fn discovers_sequence_of_parallel() {
        let tree = discover(vec![vec!["A", "B", "C"], vec!["A", "C", "B"]]);
        assert_eq!(tree.to_string(), "->( 'A', +( 'B', 'C' ) )");
        assert!(tree.is_valid());
    }

    #[test]
    fn discovers_sequence_of_choice() {
        let tree = discover(vec![vec!["A", "B"], vec!["A", "C"]]);
        assert_eq!(tree.to_string(), "->( 'A', X( 'B', 'C' ) )");
    }

    #[test]
    fn discovers_self_loop() {
        let tree = discover(vec![vec!["A", "A"], vec!["A"]]);
        assert_eq!(tree.to_string(), "*( 'A', tau )");
    }

    #[test]
    fn single_empty_trace_gives_tau() {
        let empty: Vec<&str> = Vec::new();
        let tree = discover(vec![empty]);
        assert_eq!(tree.to_string(), "tau");
    }

    #[test]
    fn empty_log_gives_tau() {
        let tree = discover(Vec::new());
        assert_eq!(tree.to_string(), "tau");
    }

    #[test]
    fn optional_activity_gets_skip_branch() {
        let empty: Vec<&str> = Vec::new();
        let tree = discover(vec![vec!["A"], empty]);
        assert_eq!(tree.to_string(), "X( tau, 'A' )");
    }

    #[test]
    fn discovers_loop_with_redo_part() {
        let tree = discover(vec![vec!["A", "B"], vec!["A", "B", "C", "A", "B"]]);
        assert_eq!(tree.to_string(), "*( ->( 'A', 'B' ), 'C' )");
    }

    #[test]
    fn once_per_trace_fall_through_splits_around_anchor() {
        let tree = discover(vec![
            vec!["A", "B", "C", "B"],
            vec!["A", "B", "C", "A"],
        ]);
        assert_eq!(tree.to_string(), "->( ->( 'A', 'B' ), 'C', X( 'A', 'B' ) )");
    }

    #[test]
    fn concurrent_fall_through_pulls_activity_out() {
        let tree = discover(vec![vec!["A", "B", "B", "A"], vec!["B", "A"]]);
        assert_eq!(tree.to_string(), "+( *( 'A', tau ), *( 'B', tau ) )");
    }

    #[test]
    fn adversarial_cycle_terminates_with_bounded_tree() {
        let tree = discover(vec![
            vec!["A", "B", "C", "A", "B", "C"],
            vec!["B", "C", "A", "B", "C", "A"],
            vec!["C", "A", "B", "C", "A", "B"],
        ]);
        assert_eq!(tree.to_string(), "*( X( 'A', 'B', 'C' ), tau )");
        assert!(tree.is_valid());
    }

    #[test]
    fn leaf_labels_cover_the_alphabet() {
        let tree = discover(vec![vec!["A", "B", "C"], vec!["A", "C", "B"]]);
        let mut labels = tree.find_all_leaf_labels();
        labels.sort_unstable();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn discovery_is_deterministic() {
        let traces = vec![
            vec!["r", "x", "p"],
            vec!["r", "p", "x"],
            vec!["r", "q"],
        ];
        let log = VariantLog::from_traces(traces.clone());
        let first = discover_process_tree_from_log(&log, InductiveMinerConfig::default()).unwrap();
        let second = discover(traces);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "->( 'r', X( +( 'p', 'x' ), 'q' ) )");
    }

    #[test]
    fn strict_sequence_merges_skippable_groups_under_imf() {
        let traces: Vec<Vec<&str>> = (0..10)
            .flat_map(|_| [vec!["A", "B", "C", "D"], vec!["A", "D"]])
            .collect();
        let log = VariantLog::from_traces(traces);

        let precise =
            discover_process_tree_from_log(&log, InductiveMinerConfig::default()).unwrap();
        assert_eq!(
            precise.to_string(),
            "->( 'A', X( tau, 'B' ), X( tau, 'C' ), 'D' )"
        );

        let tolerant = discover_process_tree_from_log(
            &log,
            InductiveMinerConfig {
                noise_threshold: 0.05,
            },
        )
        .unwrap();
        assert_eq!(
            tolerant.to_string(),
            "->( 'A', X( tau, ->( 'B', 'C' ) ), 'D' )"
        );
    }

    #[test]
    fn noise_filtering_straightens_a_rare_back_edge() {
        let mut traces: Vec<Vec<&str>> = Vec::new();
        traces.extend((0..95).map(|_| vec!["A", "B"]));
        traces.extend((0..5).map(|_| vec!["B", "A"]));
        let log = VariantLog::from_traces(traces);

        let precise =
            discover_process_tree_from_log(&log, InductiveMinerConfig::default()).unwrap();
        assert_eq!(precise.to_string(), "+( 'A', 'B' )");

        let tolerant = discover_process_tree_from_log(
            &log,
            InductiveMinerConfig {
                noise_threshold: 0.2,
            },
        )
        .unwrap();
        assert_eq!(tolerant.to_string(), "->( 'A', 'B' )");
    }

    #[test]
    fn matching_dfg_and_log_are_accepted() {
        let log = VariantLog::from_traces([vec!["A", "B", "C"], vec!["A", "C", "B"]]);
        let dfg = DirectlyFollowsGraph::create_from_variant_log(&log);
        let tree = discover_process_tree(&dfg, &log, InductiveMinerConfig::default()).unwrap();
        assert_eq!(tree.to_string(), "->( 'A', +( 'B', 'C' ) )");
    }

    #[test]
    fn inconsistent_dfg_is_rejected() {
        let log = VariantLog::from_traces([vec!["A", "B"]]);
        let mut dfg = DirectlyFollowsGraph::create_from_variant_log(&log);
        dfg.add_df_relation("B".into(), "A".into(), 1);
        assert_eq!(
            discover_process_tree(&dfg, &log, InductiveMinerConfig::default()),
            Err(DiscoveryError::InconsistentDfg)
        );
    }

    #[test]
    fn relation_outside_alphabet_is_rejected() {
        let log = VariantLog::from_traces([vec!["A"]]);
        let mut dfg = DirectlyFollowsGraph::create_from_variant_log(&log);
        dfg.directly_follows_relations
            .insert(("A".to_string(), "GHOST".to_string()), 1);
        assert_eq!(
            discover_process_tree(&dfg, &log, InductiveMinerConfig::default()),
            Err(DiscoveryError::RelationActivityMissing("GHOST".to_string()))
        );
    }

    #[test]
    fn empty_dfg_with_recorded_behavior_is_rejected() {
        let log = VariantLog::from_traces([vec!["A"]]);
        let dfg = DirectlyFollowsGraph::new();
        assert_eq!(
            discover_process_tree(&dfg, &log, InductiveMinerConfig::default()),
            Err(DiscoveryError::EmptyDfgNonEmptyLog)
        );
    }

    #[test]
    fn zero_variant_count_is_rejected() {
        let mut log = VariantLog::from_traces([vec!["A"]]);
        log.variants[0].1 = 0;
        assert_eq!(
            discover_process_tree_from_log(&log, InductiveMinerConfig::default()),
            Err(DiscoveryError::ZeroVariantCount)
        );
    }

    #[test]
    fn out_of_range_noise_threshold_is_rejected() {
        let log = VariantLog::from_traces([vec!["A"]]);
        let config = InductiveMinerConfig {
            noise_threshold: 1.5,
        };
        assert_eq!(
            discover_process_tree_from_log(&log, config),
            Err(DiscoveryError::InvalidNoiseThreshold(1.5))
        );
    }

    #[test]
    fn config_json_roundtrip() {
        let config = InductiveMinerConfig {
            noise_threshold: 0.25,
        };
        assert_eq!(InductiveMinerConfig::from_json(&config.to_json()), config);
    }
}
