//! Rhythm state labels, display metadata, and the cluster-index mapping

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five behavioral rhythm states a cluster can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RhythmState {
    Burnout,
    Flow,
    Balanced,
    Fatigue,
    DigitalDrift,
}

/// All states, for iteration and validation.
pub const ALL_STATES: [RhythmState; 5] = [
    RhythmState::Burnout,
    RhythmState::Flow,
    RhythmState::Balanced,
    RhythmState::Fatigue,
    RhythmState::DigitalDrift,
];

impl RhythmState {
    /// Human-readable label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            RhythmState::Burnout => "Burnout State",
            RhythmState::Flow => "Flow State",
            RhythmState::Balanced => "Balanced State",
            RhythmState::Fatigue => "Fatigue State",
            RhythmState::DigitalDrift => "Digital Drift State",
        }
    }

    /// Qualitative profile as (productivity, screen time, sleep), used by the
    /// UI and by the insight prompt.
    pub fn profile(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            RhythmState::Burnout => ("Low", "High", "Low"),
            RhythmState::Flow => ("High", "Low", "High"),
            RhythmState::Balanced => ("Medium", "Medium", "Medium"),
            RhythmState::Fatigue => ("Medium", "Medium", "Low"),
            RhythmState::DigitalDrift => ("Medium", "High", "Medium"),
        }
    }

    /// Display color (hex) for the state card.
    pub fn color(&self) -> &'static str {
        match self {
            RhythmState::Burnout => "#C44E52",
            RhythmState::Flow => "#00A39C",
            RhythmState::Balanced => "#306DCC",
            RhythmState::Fatigue => "#FF8C00",
            RhythmState::DigitalDrift => "#8058A5",
        }
    }

    /// Display icon for the state card.
    pub fn icon(&self) -> &'static str {
        match self {
            RhythmState::Burnout => "🔥",
            RhythmState::Flow => "⚡",
            RhythmState::Balanced => "⚖️",
            RhythmState::Fatigue => "😴",
            RhythmState::DigitalDrift => "🌀",
        }
    }
}

impl fmt::Display for RhythmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RhythmState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let state = match normalized.as_str() {
            "burnout" | "burnout state" => RhythmState::Burnout,
            "flow" | "flow state" => RhythmState::Flow,
            "balanced" | "balanced state" => RhythmState::Balanced,
            "fatigue" | "fatigue state" => RhythmState::Fatigue,
            "digital drift" | "digital drift state" | "digitaldrift" => RhythmState::DigitalDrift,
            _ => anyhow::bail!("unknown rhythm state '{}'", s),
        };
        Ok(state)
    }
}

/// Cluster index to rhythm state mapping.
///
/// K-Means indices are arbitrary and unstable across retraining runs, so this
/// mapping is authored by a human inspecting the cluster summary and is
/// persisted inside the model artifact, never derived from the model itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStates(Vec<RhythmState>);

impl ClusterStates {
    /// Build a mapping, enforcing exactly one state per cluster index and all
    /// five states used exactly once.
    pub fn new(states: Vec<RhythmState>) -> crate::Result<Self> {
        if states.len() != ALL_STATES.len() {
            anyhow::bail!(
                "cluster mapping must assign exactly {} states, got {}",
                ALL_STATES.len(),
                states.len()
            );
        }
        for (i, state) in states.iter().enumerate() {
            if states[i + 1..].contains(state) {
                anyhow::bail!("state '{}' is assigned to more than one cluster", state);
            }
        }
        Ok(Self(states))
    }

    /// Parse a comma-separated list of five state names in cluster-index order.
    pub fn parse(list: &str) -> crate::Result<Self> {
        let states = list
            .split(',')
            .map(RhythmState::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(states)
    }

    /// State for a cluster index, if the index is mapped.
    pub fn get(&self, cluster: usize) -> Option<RhythmState> {
        self.0.get(cluster).copied()
    }

    pub fn as_slice(&self) -> &[RhythmState] {
        &self.0
    }
}

impl Default for ClusterStates {
    /// The mapping authored for the current trained artifact.
    fn default() -> Self {
        Self(vec![
            RhythmState::Burnout,
            RhythmState::Flow,
            RhythmState::Balanced,
            RhythmState::Fatigue,
            RhythmState::DigitalDrift,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels_are_distinct_and_nonempty() {
        let labels: HashSet<&str> = ALL_STATES.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), 5);
        assert!(labels.iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn test_default_mapping_covers_all_indices() {
        let mapping = ClusterStates::default();
        let states: HashSet<RhythmState> = (0..5).map(|i| mapping.get(i).unwrap()).collect();
        assert_eq!(states.len(), 5);
        assert_eq!(mapping.get(5), None);
    }

    #[test]
    fn test_parse_mapping() {
        let mapping = ClusterStates::parse("Burnout,Flow,Balanced,Fatigue,Digital Drift").unwrap();
        assert_eq!(mapping, ClusterStates::default());

        let reordered = ClusterStates::parse("flow,burnout,fatigue,digital drift,balanced").unwrap();
        assert_eq!(reordered.get(0), Some(RhythmState::Flow));
        assert_eq!(reordered.get(4), Some(RhythmState::Balanced));
    }

    #[test]
    fn test_mapping_rejects_duplicates_and_wrong_arity() {
        assert!(ClusterStates::parse("Burnout,Flow,Balanced,Fatigue").is_err());
        assert!(ClusterStates::parse("Burnout,Burnout,Balanced,Fatigue,Flow").is_err());
        assert!(ClusterStates::parse("Burnout,Flow,Balanced,Fatigue,Nap").is_err());
    }

    #[test]
    fn test_state_round_trips_through_display_and_parse() {
        for state in ALL_STATES {
            let parsed: RhythmState = state.label().parse().unwrap();
            assert_eq!(parsed, state);
        }
    }
}
