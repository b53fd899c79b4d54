//! Cluster visualization using Plotters

use crate::data::RhythmData;
use crate::model::KMeansModel;
use plotters::prelude::*;

/// Color palette for the five clusters
const CLUSTER_COLORS: [RGBColor; 5] = [RED, BLUE, GREEN, MAGENTA, CYAN];

/// Scatter plot of standardized screen time versus productivity, colored by
/// cluster assignment, with centroid markers.
///
/// # Arguments
/// * `data` - Prepared rhythm data (standardized features)
/// * `model` - Fitted K-Means model with cluster assignments
/// * `output_path` - Path to save the PNG plot
pub fn create_cluster_visualization(
    data: &RhythmData,
    model: &KMeansModel,
    output_path: &str,
) -> crate::Result<()> {
    let features = &data.features;

    // Screen time is feature 0, productivity is feature 2
    let screen_values: Vec<f64> = features.column(0).to_vec();
    let productivity_values: Vec<f64> = features.column(2).to_vec();

    let x_min = screen_values.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 0.5;
    let x_max = screen_values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 0.5;
    let y_min = productivity_values.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 0.5;
    let y_max = productivity_values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 0.5;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Rhythm Clusters: Screen Time vs Productivity (standardized)",
            ("sans-serif", 26),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Screen time (standardized)")
        .y_desc("Productivity (standardized)")
        .draw()?;

    for cluster in 0..model.centroids.nrows() {
        let color = CLUSTER_COLORS[cluster % CLUSTER_COLORS.len()];
        let points = screen_values
            .iter()
            .zip(productivity_values.iter())
            .zip(model.labels.iter())
            .filter(move |&(_, &label)| label == cluster)
            .map(move |((&x, &y), _)| Circle::new((x, y), 4, color.filled()));

        chart
            .draw_series(points)?
            .label(format!("Cluster {}", cluster))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    // Centroid markers
    chart.draw_series(
        model
            .centroids
            .outer_iter()
            .map(|centroid| Cross::new((centroid[0], centroid[2]), 8, BLACK.stroke_width(3))),
    )?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
