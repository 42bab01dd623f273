use serde_json::{json, Value};

use super::{add_hline, add_vline, base_layout, figure, marker_trace, with_labels, AxisLimits};
use crate::analysis::scatter::{ScatterRow, ScatterTable};
use crate::stats::range_present;

fn columns<'a>(rows: impl Iterator<Item = &'a ScatterRow>) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<String>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut text = Vec::new();
    for row in rows {
        x.push(row.merged.first.log2_fold_change);
        y.push(row.merged.second.log2_fold_change);
        text.push(row.merged.gene_id.clone());
    }
    (x, y, text)
}

/// Fold change of one comparison plotted against another
pub fn scatter_figure(table: &ScatterTable, first: &str, second: &str, limits: &AxisLimits) -> Value {
    let hover = format!(
        "<b>%{{text}}</b><br>{}: %{{x:.3f}}<br>{}: %{{y:.3f}}<extra></extra>",
        first, second
    );
    let mut data = Vec::new();

    let (x, y, text) = columns(table.rows.iter());
    data.push(marker_trace(
        "All genes",
        x,
        y,
        text,
        json!({ "color": "grey", "size": 4, "opacity": 0.5 }),
        &hover,
    ));

    let top: Vec<&ScatterRow> = table.rows.iter().filter(|r| r.labeled).collect();
    if !top.is_empty() {
        let (x, y, text) = columns(top.into_iter());
        let trace = marker_trace(
            "Top genes",
            x,
            y,
            text,
            json!({ "color": "red", "size": 8, "line": { "width": 1, "color": "black" } }),
            &hover,
        );
        data.push(with_labels(trace, "top center", Some(json!({ "size": 9 }))));
    }

    // y = x across the span of the first comparison's fold changes
    if let Some((lo, hi)) = range_present(table.rows.iter().map(|r| r.merged.first.log2_fold_change)) {
        data.push(json!({
            "type": "scatter",
            "mode": "lines",
            "x": [lo, hi],
            "y": [lo, hi],
            "line": { "color": "blue", "dash": "dot", "width": 1 },
            "showlegend": false,
            "hoverinfo": "skip",
        }));
    }

    let title = match table.correlation {
        Some(r) => format!("Fold Change Comparison<br><sub>Correlation: {:.3}</sub>", r),
        None => "Fold Change Comparison".to_string(),
    };
    let mut layout = base_layout(
        &title,
        &format!("log2FC: {}", first),
        &format!("log2FC: {}", second),
        limits,
    );
    add_hline(&mut layout, 0.0, "black", 0.3, None);
    add_vline(&mut layout, 0.0, "black", 0.3, None);

    figure(data, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compare, merge_tables, ScatterParams};
    use crate::io::{ComparisonTable, Field, ResultRecord};

    fn table(source: &str, values: &[(&str, f64)]) -> ComparisonTable {
        let records = values
            .iter()
            .map(|(g, l)| {
                let mut r = ResultRecord::new(*g);
                r.log2_fold_change = Some(*l);
                r
            })
            .collect();
        ComparisonTable::new(source, vec![Field::Log2FoldChange], records)
    }

    #[test]
    fn test_scatter_figure_layout() {
        let a = table("a.tsv", &[("g1", -1.0), ("g2", 2.0), ("g3", 4.0)]);
        let b = table("b.tsv", &[("g1", -2.0), ("g2", 4.0), ("g3", 8.0)]);
        let s = compare(
            merge_tables(&a, &b),
            &ScatterParams {
                n_labels: 1,
                ..ScatterParams::default()
            },
        );
        let fig = scatter_figure(&s, "a", "b", &AxisLimits::default());

        assert_eq!(
            fig["layout"]["title"]["text"],
            "Fold Change Comparison<br><sub>Correlation: 1.000</sub>"
        );
        assert_eq!(fig["layout"]["xaxis"]["title"]["text"], "log2FC: a");
        assert_eq!(fig["data"][1]["text"], json!(["g3"]));
        assert_eq!(fig["data"][2]["x"], json!([-1.0, 4.0]));
    }
}
