//! Online classification: load artifacts once, classify per-request
//!
//! The classifier is constructed explicitly at process start and holds its
//! loaded scaler and model for its whole lifetime. There are exactly two load
//! states, ready or failed, with no transitions back and no retry per call.

use crate::artifacts::{self, ModelArtifact};
use crate::data::{RhythmMetrics, StandardScaler};
use crate::model::nearest_centroid;
use crate::states::RhythmState;
use std::fmt;
use std::path::Path;

/// Outcome of a classification request.
///
/// Failure modes are sentinel variants, never panics or escaped errors; the
/// UI layer renders sentinels with a neutral style distinct from the five
/// legitimate states.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    State(RhythmState),
    /// Artifacts were absent or unreadable when the classifier was built.
    Unavailable,
    /// Artifacts loaded but do not describe a fitted scaler/model.
    NotFitted,
    /// The predicted cluster index has no entry in the persisted mapping.
    UnknownState,
    /// Transform or prediction failed; carries the underlying cause.
    Error(String),
}

impl Classification {
    /// Display color and icon; all sentinels share the neutral style.
    pub fn style(&self) -> (&'static str, &'static str) {
        match self {
            Classification::State(state) => (state.color(), state.icon()),
            _ => ("gray", "❓"),
        }
    }

    pub fn state(&self) -> Option<RhythmState> {
        match self {
            Classification::State(state) => Some(*state),
            _ => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::State(state) => f.write_str(state.label()),
            Classification::Unavailable => f.write_str("Classification Unavailable"),
            Classification::NotFitted => f.write_str("Model Not Fitted"),
            Classification::UnknownState => f.write_str("Unknown State"),
            Classification::Error(cause) => write!(f, "Classification Error: {}", cause),
        }
    }
}

#[derive(Debug)]
enum LoadState {
    Ready {
        scaler: StandardScaler,
        model: ModelArtifact,
    },
    Failed(String),
}

/// Rhythm-state classifier over persisted artifacts.
#[derive(Debug)]
pub struct RhythmClassifier {
    state: LoadState,
}

impl RhythmClassifier {
    /// Load artifacts from `dir`. Never fails: a failed load yields a
    /// classifier whose every call returns [`Classification::Unavailable`].
    pub fn load(dir: &Path) -> Self {
        let state = match (artifacts::load_scaler(dir), artifacts::load_model(dir)) {
            (Ok(scaler), Ok(model)) => LoadState::Ready { scaler, model },
            (Err(e), _) | (_, Err(e)) => LoadState::Failed(format!("{:#}", e)),
        };
        Self { state }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready { .. })
    }

    /// The load failure message, if artifacts could not be loaded.
    pub fn load_error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(reason) => Some(reason),
            LoadState::Ready { .. } => None,
        }
    }

    /// Classify one user's metrics into a rhythm state.
    ///
    /// Deterministic and free of I/O; all faults map to sentinel variants.
    pub fn classify(
        &self,
        sleep_hours: f64,
        screen_time: f64,
        productivity_score: f64,
    ) -> Classification {
        let (scaler, model) = match &self.state {
            LoadState::Ready { scaler, model } => (scaler, model),
            LoadState::Failed(_) => return Classification::Unavailable,
        };

        if !scaler.is_fitted() || !model.is_fitted() {
            return Classification::NotFitted;
        }

        let metrics = RhythmMetrics {
            screen_time_hours: screen_time,
            sleep_hours,
            productivity_0_100: productivity_score,
        };
        let row = metrics.to_row();
        if row.iter().any(|v| !v.is_finite()) {
            return Classification::Error("metrics must be finite numbers".to_string());
        }

        let scaled = match scaler.transform_row(&row) {
            Ok(scaled) => scaled,
            Err(e) => return Classification::Error(format!("{:#}", e)),
        };

        match nearest_centroid(&model.centroids, &scaled.view()) {
            Some(cluster) => match model.cluster_states.get(cluster) {
                Some(state) => Classification::State(state),
                None => Classification::UnknownState,
            },
            None => Classification::Error("model has no centroids".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{save_artifacts, MODEL_FILE};
    use crate::states::ClusterStates;
    use ndarray::{array, Array2};
    use tempfile::tempdir;

    fn fixture_scaler() -> StandardScaler {
        StandardScaler {
            mean: array![6.0, 7.0, 50.0],
            std: array![3.0, 2.0, 20.0],
        }
    }

    fn fixture_centroids() -> Array2<f64> {
        // Standardized (screen, sleep, productivity) profiles, index order
        // matching the default mapping: Burnout, Flow, Balanced, Fatigue,
        // Digital Drift.
        Array2::from_shape_vec(
            (5, 3),
            vec![
                1.5, -1.5, -1.5, //
                -1.2, 0.8, 1.5, //
                0.0, 0.0, 0.0, //
                0.2, -1.2, -0.3, //
                1.5, 0.0, 0.0, //
            ],
        )
        .unwrap()
    }

    fn fixture_classifier(dir: &Path) -> RhythmClassifier {
        let model = ModelArtifact {
            centroids: fixture_centroids(),
            cluster_states: ClusterStates::default(),
        };
        save_artifacts(dir, &fixture_scaler(), &model).unwrap();
        RhythmClassifier::load(dir)
    }

    #[test]
    fn test_unavailable_when_artifacts_missing() {
        let dir = tempdir().unwrap();
        let classifier = RhythmClassifier::load(dir.path());

        assert!(!classifier.is_ready());
        assert!(classifier.load_error().is_some());
        assert_eq!(
            classifier.classify(0.0, 0.0, 0.0),
            Classification::Unavailable
        );
        assert_eq!(
            classifier.classify(24.0, 24.0, 100.0),
            Classification::Unavailable
        );
    }

    #[test]
    fn test_unavailable_when_artifact_malformed() {
        let dir = tempdir().unwrap();
        fixture_classifier(dir.path());
        std::fs::write(dir.path().join(MODEL_FILE), "not json").unwrap();

        let classifier = RhythmClassifier::load(dir.path());
        assert_eq!(
            classifier.classify(8.0, 2.0, 85.0),
            Classification::Unavailable
        );
    }

    #[test]
    fn test_not_fitted_sentinel_for_empty_centroids() {
        let dir = tempdir().unwrap();
        let model = ModelArtifact {
            centroids: Array2::zeros((0, 3)),
            cluster_states: ClusterStates::default(),
        };
        save_artifacts(dir.path(), &fixture_scaler(), &model).unwrap();

        let classifier = RhythmClassifier::load(dir.path());
        assert!(classifier.is_ready());
        assert_eq!(classifier.classify(8.0, 2.0, 85.0), Classification::NotFitted);
    }

    #[test]
    fn test_flow_scenario_with_fixture_mapping() {
        let dir = tempdir().unwrap();
        let classifier = fixture_classifier(dir.path());

        // High sleep, low screen time, high productivity
        assert_eq!(
            classifier.classify(8.0, 2.0, 85.0),
            Classification::State(RhythmState::Flow)
        );
    }

    #[test]
    fn test_non_finite_input_is_a_classification_error() {
        let dir = tempdir().unwrap();
        let classifier = fixture_classifier(dir.path());

        assert!(matches!(
            classifier.classify(f64::NAN, 2.0, 85.0),
            Classification::Error(_)
        ));
        assert!(matches!(
            classifier.classify(8.0, f64::INFINITY, 85.0),
            Classification::Error(_)
        ));
    }

    #[test]
    fn test_unmapped_cluster_index_yields_unknown_state() {
        let dir = tempdir().unwrap();
        let model = ModelArtifact {
            centroids: fixture_centroids(),
            cluster_states: ClusterStates::default(),
        };
        save_artifacts(dir.path(), &fixture_scaler(), &model).unwrap();

        // Truncate the persisted mapping to three entries by hand
        let mut value: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(MODEL_FILE)).unwrap(),
        )
        .unwrap();
        value["cluster_states"] = serde_json::json!(["Burnout", "Flow", "Balanced"]);
        std::fs::write(dir.path().join(MODEL_FILE), value.to_string()).unwrap();

        let classifier = RhythmClassifier::load(dir.path());
        assert!(classifier.is_ready());
        // High screen time with average sleep/productivity lands on index 4
        assert_eq!(
            classifier.classify(7.0, 10.5, 50.0),
            Classification::UnknownState
        );
    }

    #[test]
    fn test_sentinels_render_with_neutral_style() {
        let (color, icon) = Classification::Unavailable.style();
        assert_eq!(color, "gray");
        assert!(!icon.is_empty());

        let (flow_color, _) = Classification::State(RhythmState::Flow).style();
        assert_ne!(flow_color, color);
    }
}
