use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot};

use crate::data_handling::{FeatureVector, FEATURES};

/// Bar chart of one patient's measurements.
pub fn plot_measurements(features: &FeatureVector, title: &str) -> Plot {
    let (names, values): (Vec<String>, Vec<f64>) = features
        .named()
        .map(|(feature, value)| (feature.display_name().to_string(), value))
        .unzip();

    let trace = Bar::new(names, values).name("Patient");
    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Measurement"))
        .y_axis(Axis::new().title("Value"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Bar chart of dataset rows per outcome class.
pub fn plot_class_distribution(distribution: &[(i64, usize)], title: &str) -> Plot {
    let labels: Vec<String> = distribution
        .iter()
        .map(|(code, _)| format!("Class {}", code))
        .collect();
    let counts: Vec<usize> = distribution.iter().map(|(_, n)| *n).collect();

    let trace = Bar::new(labels, counts).name("Records");
    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Outcome"))
        .y_axis(Axis::new().title("Count"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Bar chart of normalised feature importances, in feature order.
pub fn plot_feature_importances(importances: &[f64], title: &str) -> Plot {
    let names: Vec<String> = FEATURES
        .iter()
        .take(importances.len())
        .map(|f| f.display_name().to_string())
        .collect();

    let trace = Bar::new(names, importances.to_vec()).name("Importance");
    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Measurement"))
        .y_axis(Axis::new().title("Share of impurity decrease"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}
