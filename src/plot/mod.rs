//! Plotly figure specifications for the dashboard views
//!
//! Figures are built as `serde_json::Value` in Plotly's JSON schema and
//! rendered client-side by plotly.js.

mod scatter;
mod venn;
mod volcano;

pub use scatter::scatter_figure;
pub use venn::venn_figure;
pub use volcano::volcano_figure;

use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Figure height in pixels
pub const FIGURE_HEIGHT: u32 = 600;

/// Optional manual axis ranges
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AxisLimits {
    #[serde(default)]
    pub enabled: bool,
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
}

impl AxisLimits {
    /// Range for one axis; None unless enabled and at least one bound is set.
    /// An unset bound stays `null` so plotly autoscales that end.
    fn range(&self, lo: Option<f64>, hi: Option<f64>) -> Option<Value> {
        if self.enabled && (lo.is_some() || hi.is_some()) {
            Some(json!([lo, hi]))
        } else {
            None
        }
    }

    pub fn x_range(&self) -> Option<Value> {
        self.range(self.xmin, self.xmax)
    }

    pub fn y_range(&self) -> Option<Value> {
        self.range(self.ymin, self.ymax)
    }
}

/// Shared layout: white background, closest-point hover, fixed height
fn base_layout(title: &str, x_title: &str, y_title: &str, limits: &AxisLimits) -> Value {
    let mut xaxis = axis(x_title);
    let mut yaxis = axis(y_title);
    if let Some(range) = limits.x_range() {
        xaxis["range"] = range;
    }
    if let Some(range) = limits.y_range() {
        yaxis["range"] = range;
    }

    json!({
        "title": { "text": title },
        "xaxis": xaxis,
        "yaxis": yaxis,
        "hovermode": "closest",
        "height": FIGURE_HEIGHT,
        "plot_bgcolor": "white",
        "paper_bgcolor": "white",
        "shapes": [],
        "annotations": [],
    })
}

fn axis(title: &str) -> Value {
    json!({
        "title": { "text": title },
        "gridcolor": "#ebf0f8",
        "zerolinecolor": "#ebf0f8",
    })
}

/// Append to one of the layout's list entries
fn push(layout: &mut Value, key: &str, item: Value) {
    if let Some(list) = layout.get_mut(key).and_then(Value::as_array_mut) {
        list.push(item);
    }
}

/// Full-width horizontal reference line with an optional annotation
fn add_hline(layout: &mut Value, y: f64, color: &str, opacity: f64, label: Option<String>) {
    push(
        layout,
        "shapes",
        json!({
            "type": "line", "xref": "paper", "x0": 0, "x1": 1,
            "yref": "y", "y0": y, "y1": y,
            "opacity": opacity,
            "line": { "color": color, "dash": "dash" },
        }),
    );
    if let Some(text) = label {
        push(
            layout,
            "annotations",
            json!({
                "text": text, "xref": "paper", "x": 1, "yref": "y", "y": y,
                "xanchor": "right", "yanchor": "bottom", "showarrow": false,
            }),
        );
    }
}

/// Full-height vertical reference line with an optional annotation
fn add_vline(layout: &mut Value, x: f64, color: &str, opacity: f64, label: Option<String>) {
    push(
        layout,
        "shapes",
        json!({
            "type": "line", "yref": "paper", "y0": 0, "y1": 1,
            "xref": "x", "x0": x, "x1": x,
            "opacity": opacity,
            "line": { "color": color, "dash": "dash" },
        }),
    );
    if let Some(text) = label {
        push(
            layout,
            "annotations",
            json!({
                "text": text, "yref": "paper", "y": 1, "xref": "x", "x": x,
                "xanchor": "left", "yanchor": "top", "showarrow": false,
            }),
        );
    }
}

/// Marker trace over parallel x / y / label columns
fn marker_trace(
    name: &str,
    x: Vec<Option<f64>>,
    y: Vec<Option<f64>>,
    text: Vec<String>,
    marker: Value,
    hovertemplate: &str,
) -> Value {
    json!({
        "type": "scattergl",
        "mode": "markers",
        "name": name,
        "x": x,
        "y": y,
        "text": text,
        "marker": marker,
        "hovertemplate": hovertemplate,
    })
}

/// Turn a marker trace into a labelled one
fn with_labels(mut trace: Value, position: &str, font: Option<Value>) -> Value {
    if let Some(obj) = trace.as_object_mut() {
        obj.insert("type".into(), json!("scatter"));
        obj.insert("mode".into(), json!("markers+text"));
        obj.insert("textposition".into(), json!(position));
        if let Some(font) = font {
            obj.insert("textfont".into(), font);
        }
    }
    trace
}

fn figure(data: Vec<Value>, layout: Value) -> Value {
    let mut fig = Map::new();
    fig.insert("data".into(), Value::Array(data));
    fig.insert("layout".into(), layout);
    Value::Object(fig)
}
