//! Presentation-ready data: table previews and the parity chart.
//!
//! Nothing here draws. The binary renders previews as text; the chart is
//! handed over as JSON for whatever plotting front end is attached.

use serde::{Deserialize, Serialize};

use pic50_common::{ChartConfig, FeatureTable, Result};

use crate::dataset::LabeledTable;

// ── Preview ──────────────────────────────────────────────────────────────────

/// The first rows of a table, already formatted as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePreview {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the full table.
    pub total_rows: usize,
}

impl TablePreview {
    pub fn new(
        title: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        total_rows: usize,
    ) -> Self {
        Self { title: title.into(), headers, rows, total_rows }
    }

    pub fn of_features(title: impl Into<String>, table: &FeatureTable, n_rows: usize) -> Self {
        let rows = table
            .rows()
            .iter()
            .take(n_rows)
            .map(|row| row.iter().map(|v| format_value(*v)).collect())
            .collect();
        Self::new(title, table.schema().columns().to_vec(), rows, table.n_rows())
    }

    /// Features followed by the label column.
    pub fn of_labeled(title: impl Into<String>, table: &LabeledTable, n_rows: usize) -> Self {
        let mut preview = Self::of_features(title, &table.features, n_rows);
        preview.headers.push(table.label_column.clone());
        for (row, label) in preview.rows.iter_mut().zip(&table.labels) {
            row.push(format_value(*label));
        }
        preview
    }

    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_rows
    }
}

pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.4}")
    }
}

// ── Parity chart ─────────────────────────────────────────────────────────────

pub const CHART_TITLE: &str = "Actual vs Predicted pIC50";
pub const X_LABEL: &str = "Experimental pIC50";
pub const Y_LABEL: &str = "Predicted pIC50";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParityPoint {
    pub actual: f64,
    pub predicted: f64,
}

/// Least-squares line `predicted = slope * actual + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// `None` when fewer than two points or every actual value is equal.
    pub fn fit(points: &[ParityPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.actual).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.predicted).sum::<f64>() / n;
        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), p| {
            let dx = p.actual - mean_x;
            (sxy + dx * (p.predicted - mean_y), sxx + dx * dx)
        });
        if sxx == 0.0 {
            return None;
        }
        let slope = sxy / sxx;
        Some(Self { slope, intercept: mean_y - slope * mean_x })
    }

    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Shared range of both axes.
    pub axis_range: (f64, f64),
    pub points: Vec<ParityPoint>,
    pub trend: Option<TrendLine>,
}

impl ParityChart {
    pub fn new(actual: &[f64], predicted: &[f64], config: &ChartConfig) -> Self {
        let points: Vec<ParityPoint> = actual
            .iter()
            .zip(predicted)
            .map(|(&actual, &predicted)| ParityPoint { actual, predicted })
            .collect();
        let trend = TrendLine::fit(&points);
        Self {
            title: CHART_TITLE.to_string(),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            axis_range: (config.axis_min, config.axis_max),
            points,
            trend,
        }
    }

    /// Points falling outside the axis range on either axis.
    pub fn clipped(&self) -> usize {
        let (lo, hi) = self.axis_range;
        let inside = |v: f64| (lo..=hi).contains(&v);
        self.points
            .iter()
            .filter(|p| !inside(p.actual) || !inside(p.predicted))
            .count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pic50_common::FeatureSchema;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trend_line_recovers_exact_line() {
        let actual = [2.0, 4.0, 6.0, 8.0];
        let predicted: Vec<f64> = actual.iter().map(|x| 0.5 * x + 3.0).collect();
        let chart = ParityChart::new(&actual, &predicted, &ChartConfig::default());
        let trend = chart.trend.unwrap();
        assert!((trend.slope - 0.5).abs() < 1e-12);
        assert!((trend.intercept - 3.0).abs() < 1e-12);
        assert!((trend.at(10.0) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_trend_is_absent() {
        assert!(TrendLine::fit(&[ParityPoint { actual: 5.0, predicted: 6.0 }]).is_none());
        let same_x = [
            ParityPoint { actual: 5.0, predicted: 6.0 },
            ParityPoint { actual: 5.0, predicted: 7.0 },
        ];
        assert!(TrendLine::fit(&same_x).is_none());
    }

    #[test]
    fn test_chart_labels_and_range() {
        let chart = ParityChart::new(&[1.0, 6.0], &[5.0, 12.0], &ChartConfig::default());
        assert_eq!(chart.title, "Actual vs Predicted pIC50");
        assert_eq!(chart.x_label, "Experimental pIC50");
        assert_eq!(chart.y_label, "Predicted pIC50");
        assert_eq!(chart.axis_range, (2.0, 11.5));
        assert_eq!(chart.clipped(), 2);

        let json: serde_json::Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();
        assert_eq!(json["points"].as_array().unwrap().len(), 2);
        assert_eq!(json["axis_range"][1], 11.5);
    }

    #[test]
    fn test_labeled_preview_appends_label() {
        let schema = FeatureSchema::new(["MolWt", "TPSA"]).unwrap();
        let rows = (0..8).map(|i| vec![100.0 + i as f64, 20.25]).collect();
        let features = FeatureTable::from_rows(schema, rows).unwrap();
        let table = LabeledTable::new(features, vec![6.5; 8], "pIC50").unwrap();

        let preview = TablePreview::of_labeled("Data Preview:", &table, 5);
        assert_eq!(preview.headers, vec!["MolWt", "TPSA", "pIC50"]);
        assert_eq!(preview.rows.len(), 5);
        assert_eq!(preview.rows[0], vec!["100", "20.2500", "6.5000"]);
        assert_eq!(preview.total_rows, 8);
        assert!(preview.is_truncated());
    }
}
