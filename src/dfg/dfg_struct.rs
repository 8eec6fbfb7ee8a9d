use crate::variant_log::variant_log_struct::VariantLog;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::HashMap;

/// Activity in a directly-follows graph.
type Activity = String;

/// A directly-follows graph of [`Activity`]s.
/// Graph containing a set of activities, a set of directly-follows relations, a map of start
/// activities, and a map of end activities.
/// Activities, directly-follows relations, start activities, and end activities are all
/// annotated with their frequency.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectlyFollowsGraph {
    /// Activities
    pub activities: HashMap<Activity, u64>,
    /// Directly-follows relations
    #[serde_as(as = "Vec<(_, _)>")]
    pub directly_follows_relations: HashMap<(Activity, Activity), u64>,
    /// Start activities
    pub start_activities: HashMap<Activity, u64>,
    /// End activities
    pub end_activities: HashMap<Activity, u64>,
}

impl Default for DirectlyFollowsGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectlyFollowsGraph {
    /// Create new [`DirectlyFollowsGraph`] with no activities and directly-follows relations.
    pub fn new() -> Self {
        Self {
            activities: HashMap::new(),
            directly_follows_relations: HashMap::new(),
            start_activities: HashMap::new(),
            end_activities: HashMap::new(),
        }
    }

    /// Construct a [`DirectlyFollowsGraph`] from a [`VariantLog`] by adjacent-pair counting
    ///
    /// The first and last activity of every variant contribute to the start and end
    /// activity frequencies with the variant's count.
    pub fn create_from_variant_log(log: &VariantLog) -> Self {
        let mut result = Self::new();
        for (variant, count) in &log.variants {
            let mut last_act: Option<usize> = None;
            for &act in variant {
                result.add_activity(log.activities[act].clone(), *count);

                if let Some(last) = last_act.take() {
                    result.add_df_relation(
                        log.activities[last].clone(),
                        log.activities[act].clone(),
                        *count,
                    );
                } else {
                    result.add_start_activity(log.activities[act].clone(), *count);
                }

                last_act = Some(act);
            }
            if let Some(last) = last_act.take() {
                result.add_end_activity(log.activities[last].clone(), *count);
            }
        }
        result
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    /// Add an activity with a frequency.
    ///
    /// If the activity already exists, the frequency count is added to the existing activity.
    pub fn add_activity(&mut self, activity: Activity, frequency: u64) {
        *self.activities.entry(activity).or_default() += frequency;
    }

    /// Add an activity to the start activities with a frequency.
    pub fn add_start_activity(&mut self, activity: Activity, frequency: u64) {
        *self.start_activities.entry(activity).or_default() += frequency;
    }

    /// Add an activity to the end activities with a frequency.
    pub fn add_end_activity(&mut self, activity: Activity, frequency: u64) {
        *self.end_activities.entry(activity).or_default() += frequency;
    }

    /// Add a directly-follows relation with a frequency.
    ///
    /// If the directly-follows relation already exists, the frequency count is added to the
    /// existing directly-follows relation.
    pub fn add_df_relation(&mut self, from: Activity, to: Activity, frequency: u64) {
        *self
            .directly_follows_relations
            .entry((from, to))
            .or_default() += frequency;
    }

    /// Checks if an activity is already contained in the directly-follows graph.
    pub fn contains_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.activities.contains_key(activity.as_ref())
    }

    /// Checks if an activity is a start activity in the directly-follows graph.
    pub fn is_start_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.start_activities.contains_key(activity.as_ref())
    }

    /// Checks if an activity is an end activity in the directly-follows graph.
    pub fn is_end_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.end_activities.contains_key(activity.as_ref())
    }

    /// Checks if a directly-follows relation is already contained in the directly-follows graph.
    pub fn contains_df_relation<S: Into<Activity>>(&self, (a, b): (S, S)) -> bool {
        self.directly_follows_relations
            .contains_key(&(a.into(), b.into()))
    }

    /// Returns `true` if the graph holds no activities at all.
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// The alphabet of the graph: all activity labels, sorted.
    pub fn alphabet(&self) -> Vec<&Activity> {
        let mut acts: Vec<&Activity> = self.activities.keys().collect();
        acts.sort();
        acts
    }
}
