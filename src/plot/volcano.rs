use serde_json::{json, Value};

use super::{add_hline, add_vline, base_layout, figure, marker_trace, with_labels, AxisLimits};
use crate::analysis::volcano::{VolcanoRow, VolcanoTable};
use crate::analysis::Direction;
use crate::io::Field;

const HOVER: &str = "<b>%{text}</b><br>log2FC: %{x:.3f}<br>-log10(p): %{y:.3f}<extra></extra>";

fn columns<'a>(rows: impl Iterator<Item = &'a VolcanoRow>) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<String>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut text = Vec::new();
    for row in rows {
        x.push(row.record.log2_fold_change);
        y.push(row.neg_log10_p);
        text.push(row.record.gene_id.clone());
    }
    (x, y, text)
}

/// Volcano plot: fold change against -log10(p), coloured by regulation call
pub fn volcano_figure(table: &VolcanoTable, name: &str, limits: &AxisLimits) -> Value {
    let mut data = Vec::new();

    let groups = [
        (Direction::NotSignificant, "grey", 3, 0.5),
        (Direction::Up, "red", 5, 0.7),
        (Direction::Down, "blue", 5, 0.7),
    ];
    for (direction, color, size, opacity) in groups {
        let mut rows = table.rows.iter().filter(|r| r.direction == direction).peekable();
        if rows.peek().is_none() {
            continue;
        }
        let (x, y, text) = columns(rows);
        data.push(marker_trace(
            &direction.to_string(),
            x,
            y,
            text,
            json!({ "color": color, "size": size, "opacity": opacity }),
            HOVER,
        ));
    }

    let top_up: Vec<&VolcanoRow> = table
        .rows
        .iter()
        .filter(|r| r.labeled && r.record.log2_fold_change.map_or(false, |l| l > 0.0))
        .collect();
    let top_down: Vec<&VolcanoRow> = table
        .rows
        .iter()
        .filter(|r| r.labeled && r.record.log2_fold_change.map_or(false, |l| l < 0.0))
        .collect();

    let split = !top_up.is_empty() && !top_down.is_empty();
    let labelled = [
        (top_up, "up", "darkred", "top center"),
        (top_down, "down", "darkblue", "bottom center"),
    ];
    for (rows, suffix, color, position) in labelled {
        if rows.is_empty() {
            continue;
        }
        let name = if split {
            format!("Top {} genes ({})", table.n_labels, suffix)
        } else {
            format!("Top {} genes", table.n_labels)
        };
        let (x, y, text) = columns(rows.into_iter());
        let trace = marker_trace(
            &name,
            x,
            y,
            text,
            json!({ "color": color, "size": 8, "line": { "width": 1, "color": "black" } }),
            HOVER,
        );
        data.push(with_labels(
            trace,
            position,
            Some(json!({ "size": 10, "color": color })),
        ));
    }

    let y_title = match table.p_field {
        Some(Field::PValue) => "-log10(p-value)",
        _ => "-log10(adjusted p-value)",
    };
    let mut layout = base_layout(
        &format!("Volcano Plot: {}", name),
        "log2 Fold Change",
        y_title,
        limits,
    );

    if table.fdr > 0.0 {
        add_hline(
            &mut layout,
            -table.fdr.log10(),
            "orange",
            1.0,
            Some(format!("FDR = {}", table.fdr)),
        );
    }
    add_vline(&mut layout, table.lfc, "orange", 1.0, Some(format!("log2FC = {}", table.lfc)));
    add_vline(&mut layout, -table.lfc, "orange", 1.0, Some(format!("log2FC = -{}", table.lfc)));

    figure(data, layout)
}
