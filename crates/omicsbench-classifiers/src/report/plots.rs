use anyhow::{ensure, Result};
use plotly::layout::{Axis, Layout};
use plotly::{BoxPlot, Plot};

use crate::stats::FoldResult;

/// Metrics shown in the report, as `(column, axis title)`.
pub const METRICS: [(&str, &str); 3] = [("acc", "Accuracy"), ("f1", "Macro F1"), ("roc_auc", "ROC AUC (OvO)")];

pub fn metric_values(results: &[FoldResult], metric: &str) -> Vec<f64> {
    results
        .iter()
        .map(|r| match metric {
            "acc" => r.acc,
            "f1" => r.f1,
            _ => r.roc_auc,
        })
        .collect()
}

/// One box per named run showing the spread of `metric` across its folds.
pub fn plot_metric_boxes(runs: &[(String, Vec<FoldResult>)], metric: &str, title: &str) -> Result<Plot> {
    ensure!(!runs.is_empty(), "No runs to plot");
    ensure!(
        METRICS.iter().any(|(m, _)| *m == metric),
        "Unknown metric: {}",
        metric
    );

    let mut plot = Plot::new();
    for (name, results) in runs {
        let trace = BoxPlot::<f64, f64>::new(metric_values(results, metric)).name(name);
        plot.add_trace(trace);
    }

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Run"))
        .y_axis(Axis::new().title(title));
    plot.set_layout(layout);

    Ok(plot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(run: &str, acc: f64) -> FoldResult {
        FoldResult {
            run: run.to_string(),
            acc,
            f1: acc / 2.0,
            roc_auc: 0.5,
        }
    }

    #[test]
    fn extracts_metric_columns() {
        let results = vec![fold("cv_0", 0.8), fold("cv_1", 0.6)];
        assert_eq!(metric_values(&results, "acc"), vec![0.8, 0.6]);
        assert_eq!(metric_values(&results, "f1"), vec![0.4, 0.3]);
    }

    #[test]
    fn rejects_unknown_metric() {
        let runs = vec![("rf".to_string(), vec![fold("cv_0", 0.8)])];
        assert!(plot_metric_boxes(&runs, "mcc", "MCC").is_err());
        assert!(plot_metric_boxes(&runs, "acc", "Accuracy").is_ok());
    }
}
