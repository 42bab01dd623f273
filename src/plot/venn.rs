use serde_json::{json, Value};

use super::{figure, FIGURE_HEIGHT};
use crate::analysis::VennSummary;

const SET_COLORS: [&str; 3] = ["#3498db", "#e74c3c", "#2ecc71"];
const PAIR_COLOR: &str = "#95a5a6";
const TRIPLE_COLOR: &str = "#f39c12";

/// Circle centre and radius in paper coordinates
struct Circle {
    x: f64,
    y: f64,
    r: f64,
}

fn circles(n: usize) -> Vec<Circle> {
    if n == 2 {
        vec![
            Circle { x: 0.36, y: 0.5, r: 0.25 },
            Circle { x: 0.64, y: 0.5, r: 0.25 },
        ]
    } else {
        vec![
            Circle { x: 0.38, y: 0.6, r: 0.22 },
            Circle { x: 0.62, y: 0.6, r: 0.22 },
            Circle { x: 0.5, y: 0.4, r: 0.22 },
        ]
    }
}

/// Where each region's count is written, keyed by its member sets
fn count_position(n: usize, members: &[usize]) -> (f64, f64) {
    match (n, members) {
        (2, [0]) => (0.22, 0.5),
        (2, [1]) => (0.78, 0.5),
        (2, _) => (0.5, 0.5),
        (_, [0]) => (0.27, 0.68),
        (_, [1]) => (0.73, 0.68),
        (_, [2]) => (0.5, 0.27),
        (_, [0, 1]) => (0.5, 0.72),
        (_, [0, 2]) => (0.37, 0.44),
        (_, [1, 2]) => (0.63, 0.44),
        _ => (0.5, 0.54),
    }
}

fn label_position(n: usize, set: usize) -> (f64, f64, &'static str) {
    match (n, set) {
        (2, 0) => (0.22, 0.2, "center"),
        (2, _) => (0.78, 0.2, "center"),
        (_, 0) => (0.2, 0.88, "right"),
        (_, 1) => (0.8, 0.88, "left"),
        _ => (0.5, 0.1, "center"),
    }
}

/// Venn diagram of DEG overlaps drawn with circle shapes and count annotations
pub fn venn_figure(summary: &VennSummary) -> Value {
    let n = summary.partition.n_sets();
    let mut shapes = Vec::new();
    let mut annotations = Vec::new();

    for (i, c) in circles(n).iter().enumerate() {
        shapes.push(json!({
            "type": "circle",
            "xref": "x", "yref": "y",
            "x0": c.x - c.r, "x1": c.x + c.r,
            "y0": c.y - c.r, "y1": c.y + c.r,
            "fillcolor": SET_COLORS[i],
            "opacity": 0.5,
            "line": { "color": "black", "width": 2 },
        }));

        let (x, y, align) = label_position(n, i);
        let name = summary.names.get(i).map(String::as_str).unwrap_or("");
        let count = summary.deg_counts.get(i).copied().unwrap_or(0);
        annotations.push(json!({
            "text": format!("<b>{}</b><br>({} DEGs)", name, count),
            "x": x, "y": y, "xref": "x", "yref": "y",
            "xanchor": align,
            "showarrow": false,
            "font": { "size": 13, "color": SET_COLORS[i] },
        }));
    }

    for region in summary.partition.regions() {
        let (x, y) = count_position(n, &region.members);
        let color = match region.members.len() {
            1 => "black",
            2 => PAIR_COLOR,
            _ => TRIPLE_COLOR,
        };
        let size = if region.members.len() == 1 { 18 } else { 16 };
        annotations.push(json!({
            "text": format!("<b>{}</b>", region.genes.len()),
            "x": x, "y": y, "xref": "x", "yref": "y",
            "showarrow": false,
            "font": { "size": size, "color": color },
        }));
    }

    let hidden = json!({
        "range": [0, 1],
        "visible": false,
        "fixedrange": true,
    });
    let mut yaxis = hidden.clone();
    yaxis["scaleanchor"] = json!("x");

    let layout = json!({
        "title": {
            "text": format!(
                "Venn Diagram of DEGs<br><sub>(FDR < {}, |log2FC| > {})</sub>",
                summary.fdr, summary.lfc
            ),
        },
        "xaxis": hidden,
        "yaxis": yaxis,
        "height": FIGURE_HEIGHT,
        "showlegend": false,
        "plot_bgcolor": "white",
        "paper_bgcolor": "white",
        "shapes": shapes,
        "annotations": annotations,
    });

    figure(Vec::new(), layout)
}
