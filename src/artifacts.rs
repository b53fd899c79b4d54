//! Artifact persistence for the fitted scaler and model
//!
//! Both artifacts are JSON files overwritten wholesale by each training run.
//! The cluster-to-state mapping travels inside the model artifact so a retrain
//! cannot leave the mapping describing centroids that no longer exist.

use crate::data::{StandardScaler, FEATURE_COLUMNS};
use crate::model::{KMeansModel, N_CLUSTERS};
use crate::states::ClusterStates;
use anyhow::Context;
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

/// Filename of the persisted standardization parameters.
pub const SCALER_FILE: &str = "rhythm_scaler.json";

/// Filename of the persisted cluster model and its state mapping.
pub const MODEL_FILE: &str = "rhythm_kmeans_model.json";

/// Persisted cluster model: centroids in standardized feature space plus the
/// human-authored cluster-to-state mapping for this exact training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub centroids: Array2<f64>,
    pub cluster_states: ClusterStates,
}

impl ModelArtifact {
    pub fn from_model(model: &KMeansModel, cluster_states: ClusterStates) -> Self {
        Self {
            centroids: model.centroids.clone(),
            cluster_states,
        }
    }

    /// Whether the stored centroids describe a usable fitted model.
    pub fn is_fitted(&self) -> bool {
        self.centroids.nrows() == N_CLUSTERS
            && self.centroids.ncols() == FEATURE_COLUMNS.len()
            && self.centroids.iter().all(|v| v.is_finite())
    }
}

/// Persist both artifacts into `dir`, overwriting any prior versions.
pub fn save_artifacts(
    dir: &Path,
    scaler: &StandardScaler,
    model: &ModelArtifact,
) -> crate::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create artifact directory '{}'", dir.display()))?;
    write_json(&dir.join(SCALER_FILE), scaler)?;
    write_json(&dir.join(MODEL_FILE), model)?;
    Ok(())
}

/// Load the persisted scaler from `dir`.
pub fn load_scaler(dir: &Path) -> crate::Result<StandardScaler> {
    read_json(&dir.join(SCALER_FILE))
}

/// Load the persisted model and its state mapping from `dir`.
pub fn load_model(dir: &Path) -> crate::Result<ModelArtifact> {
    read_json(&dir.join(MODEL_FILE))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> crate::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create artifact '{}'", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("failed to serialize artifact '{}'", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> crate::Result<T> {
    let file = File::open(path)
        .with_context(|| format!("artifact '{}' not found", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("artifact '{}' is malformed", path.display()))
}
