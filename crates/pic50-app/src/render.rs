//! Plain-text rendering of previews, metrics and importances.

use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use pic50_model::{Evaluation, TablePreview};
use pic50_molecules::ParseFailure;

const MIN_COLUMN_WIDTH: u16 = 3;
const PADDING: u16 = 1;
/// Cells longer than this are cut with an ellipsis.
const MAX_CELL_CHARS: usize = 40;

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_CELL_CHARS {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(MAX_CELL_CHARS - 1).collect();
        out.push('…');
        out
    }
}

fn finish(table: &mut Table, alignment: CellAlignment) {
    table.column_iter_mut().for_each(|c| {
        c.set_padding((PADDING, PADDING))
            .set_constraint(ColumnConstraint::LowerBoundary(Width::Fixed(MIN_COLUMN_WIDTH)))
            .set_cell_alignment(alignment);
    });
}

/// Render a preview, showing at most `max_columns` columns. Hidden columns
/// collapse into a trailing `…` column.
pub fn preview(p: &TablePreview, max_columns: usize) -> String {
    let shown = p.headers.len().min(max_columns.max(1));
    let hidden = p.headers.len() - shown;

    let mut table = Table::new();
    table.load_preset("||--+-++|    ++++++");

    let mut header: Vec<Cell> = p.headers[..shown].iter().map(|h| Cell::new(truncate(h))).collect();
    if hidden > 0 {
        header.push(Cell::new(format!("… +{hidden}")));
    }
    table.set_header(header);

    for row in &p.rows {
        let mut cells: Vec<String> = row.iter().take(shown).map(|v| truncate(v)).collect();
        if hidden > 0 {
            cells.push("…".to_string());
        }
        table.add_row(cells);
    }
    finish(&mut table, CellAlignment::Right);

    let footer = if p.is_truncated() {
        format!("only showing top {} of {} rows", p.rows.len(), p.total_rows)
    } else {
        format!("{} rows", p.total_rows)
    };
    format!("{}\n{}\n{}", p.title, table, footer)
}

pub fn metrics(e: &Evaluation) -> String {
    let mut table = Table::new();
    table.load_preset("        |          ");
    for (name, value) in e.as_pairs() {
        table.add_row(vec![format!("{name}:"), format!("{value}")]);
    }
    finish(&mut table, CellAlignment::Left);
    format!("Evaluation on {} held-out compounds\n{}", e.n_samples, table)
}

pub fn importances(ranked: &[(String, f64)]) -> String {
    let mut table = Table::new();
    table.load_preset("||--+-++|    ++++++");
    table.set_header(vec!["rank", "feature", "importance"]);
    for (i, (name, value)) in ranked.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), name.clone(), format!("{value:.4}")]);
    }
    finish(&mut table, CellAlignment::Left);
    format!("Top features\n{table}")
}

pub fn failures(list: &[ParseFailure]) -> String {
    let mut table = Table::new();
    table.load_preset("||--+-++|    ++++++");
    table.set_header(vec!["row", "SMILES", "reason"]);
    for f in list {
        table.add_row(vec![f.index.to_string(), truncate(&f.smiles), f.reason.clone()]);
    }
    finish(&mut table, CellAlignment::Left);
    format!("{} compounds could not be parsed\n{}", list.len(), table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_preview() -> TablePreview {
        TablePreview::new(
            "Data Preview:",
            vec!["MolWt".into(), "TPSA".into(), "LogP".into(), "pIC50".into()],
            vec![vec!["180.1590".into(), "63.6000".into(), "1.3101".into(), "6.5000".into()]],
            12,
        )
    }

    #[test]
    fn test_preview_collapses_extra_columns() {
        let text = preview(&sample_preview(), 2);
        assert!(text.starts_with("Data Preview:"));
        assert!(text.contains("MolWt"));
        assert!(text.contains("TPSA"));
        assert!(!text.contains("LogP"));
        assert!(text.contains("… +2"));
        assert!(text.ends_with("only showing top 1 of 12 rows"));
    }

    #[test]
    fn test_metrics_lists_all_four() {
        let e = Evaluation::compute(&[1.0, 2.0, 3.0], &[1.5, 2.0, 2.5]).unwrap();
        let text = metrics(&e);
        for label in ["Mean Absolute Error", "Mean Squared Error", "Root Mean Squared Error", "R-squared (R2) Score"] {
            assert!(text.contains(label), "{label} missing");
        }
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let long = "C".repeat(100);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), MAX_CELL_CHARS);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_failures_table() {
        let text = failures(&[ParseFailure {
            index: 3,
            smiles: "C1CC".to_string(),
            reason: "ring bond 1 was opened but never closed".to_string(),
        }]);
        assert!(text.starts_with("1 compounds could not be parsed"));
        assert!(text.contains("C1CC"));
    }
}
