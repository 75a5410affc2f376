use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

use crate::report::plots::{plot_metric_boxes, METRICS};
use crate::stats::{summarize, FoldResult};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// A titled block of HTML content and plots.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.content.push(content);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let id = format!(
            "plot-{}-{}",
            self.title.to_lowercase().replace(' ', "-"),
            self.content.len()
        );
        self.content.push(PreEscaped(plot.to_inline_html(Some(id.as_str()))));
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    div class="block" { (block) }
                }
            }
        }
    }
}

/// Self-contained HTML report.
pub struct Report {
    software: String,
    version: String,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(software: &str, version: &str, title: &str) -> Self {
        Report {
            software: software.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> Markup {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em; }
                        table { border-collapse: collapse; }
                        th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
                        th:first-child, td:first-child { text-align: left; }"
                    }
                }
                body {
                    h1 { (self.title) }
                    p class="meta" {
                        (self.software) " " (self.version) " | generated " (generated)
                    }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        fs::write(path, self.render().into_string())
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }
}

fn summary_table(runs: &[(String, Vec<FoldResult>)]) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "Run" }
                    th { "Folds" }
                    th { "Accuracy" }
                    th { "Macro F1" }
                    th { "ROC AUC" }
                }
            }
            tbody {
                @for (name, results) in runs {
                    @let s = summarize(results);
                    tr {
                        td { (name) }
                        td { (s.n_folds) }
                        td { (format!("{:.4} ± {:.4}", s.acc_mean, s.acc_std)) }
                        td { (format!("{:.4} ± {:.4}", s.f1_mean, s.f1_std)) }
                        td { (format!("{:.4} ± {:.4}", s.roc_auc_mean, s.roc_auc_std)) }
                    }
                }
            }
        }
    }
}

/// Build and save the benchmark report for the given named runs.
pub fn write_report<P: AsRef<Path>>(path: P, runs: &[(String, Vec<FoldResult>)]) -> Result<()> {
    let mut report = Report::new(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        "Cancer Subtype Classifier Benchmark",
    );

    let mut summary = ReportSection::new("Summary");
    summary.add_content(html! {
        p { "Mean ± standard deviation of each metric across all cross-validation folds." }
    });
    summary.add_content(summary_table(runs));
    report.add_section(summary);

    if !runs.is_empty() {
        let mut distributions = ReportSection::new("Fold Distributions");
        for (metric, title) in METRICS {
            distributions.add_plot(plot_metric_boxes(runs, metric, title)?);
        }
        report.add_section(distributions);
    }

    report.save_to_file(path.as_ref())?;
    log::info!("Report written to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_contains_runs_and_plots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.html");
        let runs = vec![(
            "rf_dr".to_string(),
            vec![
                FoldResult {
                    run: "cv_0".to_string(),
                    acc: 0.8,
                    f1: 0.75,
                    roc_auc: 0.9,
                },
                FoldResult {
                    run: "cv_1".to_string(),
                    acc: 0.6,
                    f1: 0.55,
                    roc_auc: 0.7,
                },
            ],
        )];
        write_report(&path, &runs).unwrap();

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("rf_dr"));
        assert!(html.contains("0.7000 ± "));
        assert!(html.contains("plot-fold-distributions-0"));
    }
}
