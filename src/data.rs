//! Dataset loading, mean imputation, and standardization using Polars

use anyhow::Context;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column names of the three clustering features, in training order.
///
/// This order is a binding contract between the trainer and the classifier;
/// both sides go through [`RhythmMetrics::to_row`] so the order is spelled
/// out in exactly one place.
pub const FEATURE_COLUMNS: [&str; 3] = ["screen_time_hours", "sleep_hours", "productivity_0_100"];

/// A single user's daily metrics, by name rather than position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhythmMetrics {
    pub screen_time_hours: f64,
    pub sleep_hours: f64,
    pub productivity_0_100: f64,
}

impl RhythmMetrics {
    /// Feature row in [`FEATURE_COLUMNS`] order.
    pub fn to_row(&self) -> [f64; 3] {
        [
            self.screen_time_hours,
            self.sleep_hours,
            self.productivity_0_100,
        ]
    }
}

/// Per-feature standardization: subtract the mean, divide by the standard
/// deviation, with parameters fit once on training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl StandardScaler {
    /// Fit scaling parameters on a feature matrix. A constant column gets a
    /// stored std of 1.0 so transforms never divide by zero.
    pub fn fit(data: &Array2<f64>) -> crate::Result<Self> {
        if data.nrows() == 0 {
            anyhow::bail!("cannot fit scaler on an empty feature matrix");
        }

        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| anyhow::anyhow!("feature matrix has no rows"))?;
        let mut std = data.std_axis(Axis(0), 0.0);
        std.mapv_inplace(|s| if s.is_finite() && s > 0.0 { s } else { 1.0 });

        Ok(Self { mean, std })
    }

    /// Standardize a feature matrix with the fitted parameters.
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        (data - &self.mean) / &self.std
    }

    /// Standardize a single feature row.
    pub fn transform_row(&self, row: &[f64; 3]) -> crate::Result<Array1<f64>> {
        let input = Array2::from_shape_vec((1, 3), row.to_vec())?;
        Ok(self.transform(&input).row(0).to_owned())
    }

    /// Whether the stored parameters describe a usable fitted transform.
    pub fn is_fitted(&self) -> bool {
        self.mean.len() == FEATURE_COLUMNS.len()
            && self.std.len() == FEATURE_COLUMNS.len()
            && self.mean.iter().all(|v| v.is_finite())
            && self.std.iter().all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Prepared training data: standardized features plus the fitted scaler.
#[derive(Debug)]
pub struct RhythmData {
    /// Standardized features (n_samples, 3)
    pub features: Array2<f64>,
    /// Raw feature values before standardization
    pub raw_features: Array2<f64>,
    /// Fitted scaler for standardizing new inputs
    pub scaler: StandardScaler,
    /// Number of imputed values per feature column
    pub imputed_counts: [usize; 3],
}

/// Load the wellness CSV, select the three feature columns, mean-impute
/// missing values, and fit the standardization transform.
///
/// A missing file or missing feature column is fatal with a message naming
/// the expected file/column; this is an offline maintenance path.
pub fn load_and_prepare(file_path: &str) -> crate::Result<RhythmData> {
    let df = CsvReader::from_path(file_path)
        .with_context(|| format!("could not find dataset file '{}'", file_path))?
        .has_header(true)
        .finish()
        .with_context(|| format!("failed to read dataset '{}'", file_path))?;

    if df.height() == 0 {
        anyhow::bail!("dataset '{}' contains no rows", file_path);
    }

    let n_samples = df.height();
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(FEATURE_COLUMNS.len());
    let mut imputed_counts = [0usize; 3];

    for (idx, name) in FEATURE_COLUMNS.iter().enumerate() {
        let (values, imputed) = extract_feature_column(&df, name)?;
        imputed_counts[idx] = imputed;
        columns.push(values);
    }

    // Interleave columns into a row-major (n_samples, 3) matrix
    let mut raw = Vec::with_capacity(n_samples * FEATURE_COLUMNS.len());
    for i in 0..n_samples {
        for column in &columns {
            raw.push(column[i]);
        }
    }
    let raw_features = Array2::from_shape_vec((n_samples, FEATURE_COLUMNS.len()), raw)?;

    let scaler = StandardScaler::fit(&raw_features)?;
    let features = scaler.transform(&raw_features);

    Ok(RhythmData {
        features,
        raw_features,
        scaler,
        imputed_counts,
    })
}

/// Extract one feature column as f64, replacing nulls and non-finite entries
/// with the mean of the column's remaining finite values.
fn extract_feature_column(df: &DataFrame, name: &str) -> crate::Result<(Vec<f64>, usize)> {
    let series = df
        .column(name)
        .with_context(|| format!("dataset is missing required column '{}'", name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("column '{}' is not numeric", name))?;
    let values = series.f64()?;

    let finite: Vec<f64> = values.into_iter().flatten().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        anyhow::bail!("column '{}' has no usable values", name);
    }
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;

    let mut imputed = 0usize;
    let filled = values
        .into_iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => x,
            _ => {
                imputed += 1;
                mean
            }
        })
        .collect();

    Ok((filled, imputed))
}
