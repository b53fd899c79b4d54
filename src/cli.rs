//! Command-line interface definitions and argument parsing

use clap::Parser;

/// Rhythm-state classification using K-Means clustering on daily metrics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input wellness CSV file
    #[arg(short, long, default_value = "ScreenTime vs MentalWellness.csv")]
    pub input: String,

    /// Directory holding the persisted scaler and model artifacts
    #[arg(short, long, default_value = "artifacts")]
    pub artifacts_dir: String,

    /// Classification mode: provide metrics as a comma-separated string
    /// Example: --classify "8.0,2.0,85" for sleep=8.0h, screen=2.0h, productivity=85
    #[arg(short, long)]
    pub classify: Option<String>,

    /// Today's goal, forwarded to the insight service in classification mode
    #[arg(short, long)]
    pub goal: Option<String>,

    /// Cluster-index to state mapping persisted with the model: five
    /// comma-separated state names in cluster-index order
    #[arg(long, default_value = "Burnout,Flow,Balanced,Fatigue,Digital Drift")]
    pub state_map: String,

    /// Output path for the cluster scatter plot
    #[arg(short, long, default_value = "rhythm_clusters.png")]
    pub output: String,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: usize,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse metric values from the classify string.
    /// Expected format: "sleep_hours,screen_time,productivity_score"
    pub fn parse_classify_values(&self) -> crate::Result<Option<(f64, f64, f64)>> {
        if let Some(ref classify_str) = self.classify {
            let parts: Vec<&str> = classify_str.split(',').collect();
            if parts.len() != 3 {
                anyhow::bail!(
                    "Classify values must be in format 'sleep_hours,screen_time,productivity'"
                );
            }

            let sleep_hours: f64 = parts[0]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid sleep hours value: {}", parts[0]))?;
            let screen_time: f64 = parts[1]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid screen time value: {}", parts[1]))?;
            let productivity: f64 = parts[2]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid productivity value: {}", parts[2]))?;

            Ok(Some((sleep_hours, screen_time, productivity)))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_args() -> Args {
        Args {
            input: "test.csv".to_string(),
            artifacts_dir: "artifacts".to_string(),
            classify: Some("8.0,2.0,85".to_string()),
            goal: None,
            state_map: "Burnout,Flow,Balanced,Fatigue,Digital Drift".to_string(),
            output: "test.png".to_string(),
            max_iters: 300,
            tolerance: 1e-4,
            verbose: false,
        }
    }

    #[test]
    fn test_parse_classify_values() {
        let mut args = test_args();

        let result = args.parse_classify_values().unwrap();
        assert_eq!(result, Some((8.0, 2.0, 85.0)));

        args.classify = None;
        let result = args.parse_classify_values().unwrap();
        assert_eq!(result, None);

        args.classify = Some("invalid".to_string());
        assert!(args.parse_classify_values().is_err());

        args.classify = Some("8.0,two,85".to_string());
        assert!(args.parse_classify_values().is_err());
    }
}
