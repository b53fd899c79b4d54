//! RhythmForge: rhythm-state classification pipeline
//!
//! This is the main entrypoint orchestrating the offline training pipeline
//! (data loading, imputation, scaling, K-Means fit, artifact persistence,
//! diagnostics) and the online classification mode.

use anyhow::Result;
use clap::Parser;
use rhythmforge::{
    create_cluster_visualization, fit_kmeans, insight, load_and_prepare, save_artifacts, Args,
    ClusterStates, ModelArtifact, RhythmClassifier, RhythmMetrics, FEATURE_COLUMNS,
};
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        println!("RhythmForge - Rhythm State Classification");
        println!("=========================================\n");
    }

    if let Some(metrics) = args.parse_classify_values()? {
        run_classification_mode(&args, metrics)?;
    } else {
        run_training_pipeline(&args)?;
    }

    Ok(())
}

/// Run classification mode for a single user's metrics
fn run_classification_mode(args: &Args, (sleep, screen, productivity): (f64, f64, f64)) -> Result<()> {
    println!("=== Classification Mode ===");
    println!(
        "Input metrics: sleep={}h, screen={}h, productivity={}%",
        sleep, screen, productivity
    );

    let classifier = RhythmClassifier::load(Path::new(&args.artifacts_dir));
    if let Some(reason) = classifier.load_error() {
        eprintln!("\nArtifacts unavailable: {}", reason);
        eprintln!("Run the training pipeline first (invoke without --classify).");
    }

    let result = classifier.classify(sleep, screen, productivity);
    let (color, icon) = result.style();
    println!("\n{} {}", icon, result);
    if args.verbose {
        println!("  Display color: {}", color);
    }

    if let (Some(state), Some(goal)) = (result.state(), args.goal.as_deref()) {
        let metrics = RhythmMetrics {
            screen_time_hours: screen,
            sleep_hours: sleep,
            productivity_0_100: productivity,
        };
        match insight::generate_insight(state, &metrics, goal) {
            Ok(insight) => {
                println!("\nInsight: {}", insight.insight);
                println!("Microbreak: {}", insight.microbreak);
            }
            // The classification above stands even when the collaborator fails
            Err(e) => eprintln!("\n⚠ Insight service unavailable: {:#}", e),
        }
    }

    Ok(())
}

/// Run the full offline training pipeline
fn run_training_pipeline(args: &Args) -> Result<()> {
    println!("=== Training Pipeline ===\n");

    let start_time = Instant::now();

    // Validate the human-authored mapping before any heavy work
    let cluster_states = ClusterStates::parse(&args.state_map)?;

    // Step 1: Load, impute, and standardize the dataset
    if args.verbose {
        println!("Step 1: Loading and preparing data");
        println!("  Input file: {}", args.input);
        println!("  Features: {:?}", FEATURE_COLUMNS);
    }

    let data_start = Instant::now();
    let data = load_and_prepare(&args.input)?;
    let data_time = data_start.elapsed();

    println!("✓ Data loaded: {} rows", data.features.nrows());
    let total_imputed: usize = data.imputed_counts.iter().sum();
    if total_imputed > 0 {
        println!(
            "  Missing values handled by mean imputation ({} values)",
            total_imputed
        );
    }
    if args.verbose {
        println!("  Processing time: {:.2}s", data_time.as_secs_f64());
    }

    // Step 2: Fit K-Means
    if args.verbose {
        println!("\nStep 2: Fitting K-Means model");
        println!("  Max iterations: {}", args.max_iters);
        println!("  Tolerance: {}", args.tolerance);
    }

    let model_start = Instant::now();
    let model = fit_kmeans(&data, args.max_iters, args.tolerance)?;
    let model_time = model_start.elapsed();

    println!("✓ Model fitted successfully");
    if args.verbose {
        println!("  Fitting time: {:.2}s", model_time.as_secs_f64());
    }

    // Step 3: Cluster summary for authoring/verifying the state mapping
    println!("\n=== Cluster Summary (average raw feature values) ===");
    let n_rows = data.features.nrows();
    for row in model.cluster_summary(&data.raw_features) {
        let percentage = (row.size as f64 / n_rows as f64) * 100.0;
        let state = cluster_states
            .get(row.cluster)
            .map(|s| s.label())
            .unwrap_or("(unmapped)");
        println!(
            "Cluster {} -> {}: {} rows ({:.1}%)  screen_time={:.2}  sleep={:.2}  productivity={:.2}",
            row.cluster,
            state,
            row.size,
            percentage,
            row.feature_means[0],
            row.feature_means[1],
            row.feature_means[2]
        );
    }

    let silhouette = model.compute_silhouette_sample(&data.features, 100.min(n_rows));
    println!("\nSilhouette score (sample): {:.3}", silhouette);
    println!("Within-cluster sum of squares: {:.2}", model.inertia);

    // Step 4: Persist artifacts (mapping travels with the model)
    let artifacts_dir = Path::new(&args.artifacts_dir);
    let artifact = ModelArtifact::from_model(&model, cluster_states);
    save_artifacts(artifacts_dir, &data.scaler, &artifact)?;
    println!(
        "\n✓ Scaler and model artifacts saved to: {}",
        artifacts_dir.display()
    );

    // Step 5: Visualization
    create_cluster_visualization(&data, &model, &args.output)?;
    println!("✓ Cluster plot saved to: {}", args.output);

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}
