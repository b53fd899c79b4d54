//! RhythmForge: rhythm-state classification from daily behavioral metrics
//!
//! This library trains a K-Means model over three standardized features
//! (screen time, sleep, self-rated productivity), persists the fitted scaler
//! and model as artifacts, and classifies a single user's metrics into one of
//! five semantic rhythm states at serving time.

pub mod artifacts;
pub mod classify;
pub mod cli;
pub mod data;
pub mod insight;
pub mod model;
pub mod states;
pub mod viz;

// Re-export public items for easier access
pub use artifacts::{load_model, load_scaler, save_artifacts, ModelArtifact};
pub use classify::{Classification, RhythmClassifier};
pub use cli::Args;
pub use data::{load_and_prepare, RhythmData, RhythmMetrics, StandardScaler, FEATURE_COLUMNS};
pub use insight::{generate_insight, Insight};
pub use model::{fit_kmeans, KMeansModel, N_CLUSTERS, RANDOM_SEED};
pub use states::{ClusterStates, RhythmState};
pub use viz::create_cluster_visualization;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
