// goal.rs: The closed health-goal vocabulary and the unordered GoalSet.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GoalsError;

/// A named health goal from the fixed vocabulary offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthGoal {
    LoseWeight,
    GainMuscle,
    MaintainWeight,
    ImproveEndurance,
    /// Offered in the goal picker but carries no calorie or split adjustment.
    EatHealthier,
}

impl HealthGoal {
    pub const ALL: [HealthGoal; 5] = [
        HealthGoal::LoseWeight,
        HealthGoal::GainMuscle,
        HealthGoal::MaintainWeight,
        HealthGoal::ImproveEndurance,
        HealthGoal::EatHealthier,
    ];

    /// Display label, also the persisted form.
    pub fn label(self) -> &'static str {
        match self {
            HealthGoal::LoseWeight => "Lose Weight",
            HealthGoal::GainMuscle => "Gain Muscle",
            HealthGoal::MaintainWeight => "Maintain Weight",
            HealthGoal::ImproveEndurance => "Improve Endurance",
            HealthGoal::EatHealthier => "Eat Healthier",
        }
    }
}

impl fmt::Display for HealthGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HealthGoal {
    type Err = GoalsError;

    /// Accepts the display label in any case, or its snake_case form
    /// (`lose_weight`), so CLI flags and stored labels both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        HealthGoal::ALL
            .into_iter()
            .find(|goal| goal.label().to_ascii_lowercase() == normalized)
            .ok_or_else(|| GoalsError::UnknownValue {
                kind: "health goal",
                value: s.to_string(),
            })
    }
}

/// An unordered, duplicate-free set of health goals.
///
/// Persisted as a list of labels. Unrecognized labels are dropped on load
/// rather than failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct GoalSet {
    goals: BTreeSet<HealthGoal>,
}

impl GoalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from free-form labels, ignoring any that are not in the vocabulary.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for label in labels {
            match label.as_ref().parse::<HealthGoal>() {
                Ok(goal) => {
                    set.insert(goal);
                }
                Err(_) => {
                    tracing::debug!(label = label.as_ref(), "ignoring unrecognized health goal");
                }
            }
        }
        set
    }

    pub fn insert(&mut self, goal: HealthGoal) -> bool {
        self.goals.insert(goal)
    }

    pub fn remove(&mut self, goal: HealthGoal) -> bool {
        self.goals.remove(&goal)
    }

    pub fn contains(&self, goal: HealthGoal) -> bool {
        self.goals.contains(&goal)
    }

    /// True when every goal in `required` is present.
    pub fn contains_all(&self, required: &[HealthGoal]) -> bool {
        required.iter().all(|goal| self.goals.contains(goal))
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = HealthGoal> + '_ {
        self.goals.iter().copied()
    }
}

impl FromIterator<HealthGoal> for GoalSet {
    fn from_iter<T: IntoIterator<Item = HealthGoal>>(iter: T) -> Self {
        Self {
            goals: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<String>> for GoalSet {
    fn from(labels: Vec<String>) -> Self {
        Self::from_labels(labels)
    }
}

impl From<GoalSet> for Vec<String> {
    fn from(set: GoalSet) -> Self {
        set.iter().map(|goal| goal.label().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_snake_case() {
        assert_eq!(
            "Lose Weight".parse::<HealthGoal>().unwrap(),
            HealthGoal::LoseWeight
        );
        assert_eq!(
            "improve_endurance".parse::<HealthGoal>().unwrap(),
            HealthGoal::ImproveEndurance
        );
        assert_eq!(
            "gain-muscle".parse::<HealthGoal>().unwrap(),
            HealthGoal::GainMuscle
        );
        assert!("Run A Marathon".parse::<HealthGoal>().is_err());
    }

    #[test]
    fn duplicates_collapse() {
        let set = GoalSet::from_labels(["Gain Muscle", "gain muscle", "Gain Muscle"]);
        assert_eq!(set.len(), 1);
        assert!(set.contains(HealthGoal::GainMuscle));
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let set = GoalSet::from_labels(["Sleep More", "Lose Weight"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![HealthGoal::LoseWeight]);
    }

    #[test]
    fn contains_all_requires_every_goal() {
        let set: GoalSet = [HealthGoal::LoseWeight, HealthGoal::GainMuscle]
            .into_iter()
            .collect();
        assert!(set.contains_all(&[HealthGoal::LoseWeight, HealthGoal::GainMuscle]));
        assert!(!set.contains_all(&[HealthGoal::GainMuscle, HealthGoal::ImproveEndurance]));
        assert!(set.contains_all(&[]));
    }

    #[test]
    fn serializes_as_label_list() {
        let set: GoalSet = [HealthGoal::ImproveEndurance].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[\"Improve Endurance\"]");

        let restored: GoalSet =
            serde_json::from_str("[\"Improve Endurance\", \"Unknown\"]").unwrap();
        assert_eq!(restored, set);
    }
}
