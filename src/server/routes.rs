//! Request handlers for the page and JSON API

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::{page, AppState};
use crate::analysis::volcano::TABLE_ROW_LIMIT;
use crate::analysis::{
    annotate, compare, merge, summarize, validate_selection, Direction, ScatterParams, ScatterTable,
    VennSummary, VolcanoParams, VolcanoTable,
};
use crate::catalog::{option_label, short_name};
use crate::error::{DashboardError, Result};
use crate::filter::{DEFAULT_FDR, DEFAULT_LFC};
use crate::plot::{scatter_figure, venn_figure, volcano_figure, AxisLimits};

const VOLCANO_EXPORT: &str = "deseq2_volcano_export.csv";
const SCATTER_EXPORT: &str = "deseq2_scatter_export.csv";
const VENN_EXPORT: &str = "venn_diagram_overlaps.csv";

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(page::index))
        .route("/static/dashboard.js", web::get().to(page::script))
        .route("/api/files", web::get().to(files))
        .route("/api/volcano", web::get().to(volcano))
        .route("/api/volcano/export", web::get().to(volcano_export))
        .route("/api/scatter", web::get().to(scatter))
        .route("/api/scatter/export", web::get().to(scatter_export))
        .route("/api/venn", web::get().to(venn))
        .route("/api/venn/export", web::get().to(venn_export))
        .route("/api/cache/clear", web::post().to(clear_cache));
}

fn default_fdr() -> f64 {
    DEFAULT_FDR
}

fn default_lfc() -> f64 {
    DEFAULT_LFC
}

fn default_n_comparisons() -> usize {
    2
}

/// Thresholds must be finite, with 0 < fdr <= 1 and lfc >= 0
fn check_thresholds(fdr: f64, lfc: f64) -> Result<()> {
    if !fdr.is_finite() || fdr <= 0.0 || fdr > 1.0 {
        return Err(DashboardError::validation(format!(
            "FDR threshold must be in (0, 1], got {}",
            fdr
        )));
    }
    if !lfc.is_finite() || lfc < 0.0 {
        return Err(DashboardError::validation(format!(
            "log2FC threshold must be non-negative, got {}",
            lfc
        )));
    }
    Ok(())
}

/// Label count from the query: absent means the default, negative means none
fn label_count(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(n) if n <= 0 => 0,
        Some(n) => usize::try_from(n).unwrap_or(default),
        None => default,
    }
}

/// Non-empty selection or a validation error with `message`
fn selected<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DashboardError::validation(message))
}

fn showing_note(shown: usize, total: usize) -> String {
    format!(
        "Showing {} of {} genes. Click column headers to sort. Use gene search to filter results.",
        shown, total
    )
}

fn csv_download(filename: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}

#[derive(Debug, Deserialize)]
pub(super) struct VolcanoQuery {
    file: Option<String>,
    #[serde(default = "default_fdr")]
    fdr: f64,
    #[serde(default = "default_lfc")]
    lfc: f64,
    search: Option<String>,
    n_labels: Option<i64>,
    #[serde(default)]
    custom_axes: bool,
    xmin: Option<f64>,
    xmax: Option<f64>,
    ymin: Option<f64>,
    ymax: Option<f64>,
}

impl VolcanoQuery {
    fn params(&self) -> VolcanoParams {
        let defaults = VolcanoParams::default();
        VolcanoParams {
            fdr: self.fdr,
            lfc: self.lfc,
            search: self.search.clone(),
            n_labels: label_count(self.n_labels, defaults.n_labels),
        }
    }

    fn limits(&self) -> AxisLimits {
        AxisLimits {
            enabled: self.custom_axes,
            xmin: self.xmin,
            xmax: self.xmax,
            ymin: self.ymin,
            ymax: self.ymax,
        }
    }
}

/// Load and annotate the selected comparison
fn build_volcano(state: &AppState, query: &VolcanoQuery) -> Result<(String, VolcanoTable)> {
    let file = selected(&query.file, "Please select a comparison file")?;
    check_thresholds(query.fdr, query.lfc)?;
    let entry = state.entry(file)?;
    let table = state.loader.load(&entry.path)?;
    Ok((short_name(&entry.path), annotate(table, &query.params())))
}

#[derive(Debug, Deserialize)]
pub(super) struct ScatterQuery {
    file1: Option<String>,
    file2: Option<String>,
    #[serde(default)]
    sig_only: bool,
    search: Option<String>,
    n_labels: Option<i64>,
    #[serde(default)]
    custom_axes: bool,
    xmin: Option<f64>,
    xmax: Option<f64>,
    ymin: Option<f64>,
    ymax: Option<f64>,
}

impl ScatterQuery {
    fn params(&self) -> ScatterParams {
        let defaults = ScatterParams::default();
        ScatterParams {
            significant_only: self.sig_only,
            search: self.search.clone(),
            n_labels: label_count(self.n_labels, defaults.n_labels),
        }
    }

    fn limits(&self) -> AxisLimits {
        AxisLimits {
            enabled: self.custom_axes,
            xmin: self.xmin,
            xmax: self.xmax,
            ymin: self.ymin,
            ymax: self.ymax,
        }
    }
}

/// Merge the two selected comparisons and score them
fn build_scatter(state: &AppState, query: &ScatterQuery) -> Result<(String, String, ScatterTable)> {
    let message = "Please select two comparison files";
    let file1 = selected(&query.file1, message)?;
    let file2 = selected(&query.file2, message)?;
    if file1 == file2 {
        return Err(DashboardError::validation("Please select two different comparisons"));
    }
    let first = state.entry(file1)?;
    let second = state.entry(file2)?;

    let merged = merge(&state.loader, &first.path, &second.path)?;
    Ok((
        short_name(&first.path),
        short_name(&second.path),
        compare(merged, &query.params()),
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct VennQuery {
    #[serde(default = "default_n_comparisons")]
    n_comparisons: usize,
    file1: Option<String>,
    file2: Option<String>,
    file3: Option<String>,
    #[serde(default = "default_fdr")]
    fdr: f64,
    #[serde(default = "default_lfc")]
    lfc: f64,
}

fn build_venn(state: &AppState, query: &VennQuery) -> Result<VennSummary> {
    let chosen = validate_selection(
        query.n_comparisons,
        &[query.file1.clone(), query.file2.clone(), query.file3.clone()],
    )?;
    check_thresholds(query.fdr, query.lfc)?;
    let paths: Vec<String> = chosen
        .iter()
        .map(|key| state.entry(key).map(|e| e.key()))
        .collect::<Result<_>>()?;
    summarize(&state.loader, &paths, query.fdr, query.lfc)
}

async fn files(state: web::Data<AppState>) -> HttpResponse {
    let entries: Vec<_> = state
        .catalog
        .iter()
        .map(|e| {
            json!({
                "path": e.key(),
                "category": e.category,
                "display_name": e.display_name,
                "label": option_label(e),
            })
        })
        .collect();
    HttpResponse::Ok().json(entries)
}

async fn volcano(
    state: web::Data<AppState>,
    query: web::Query<VolcanoQuery>,
) -> Result<HttpResponse> {
    let (name, table) = build_volcano(&state, &query)?;
    let figure = volcano_figure(&table, &name, &query.limits());
    let rows = table.table_rows(TABLE_ROW_LIMIT);
    let up = table.count(Direction::Up);
    let down = table.count(Direction::Down);

    Ok(HttpResponse::Ok().json(json!({
        "name": name,
        "figure": figure,
        "stats": {
            "total": table.n_genes(),
            "up": up,
            "down": down,
            "significant": up + down,
        },
        "note": showing_note(rows.len(), table.n_genes()),
        "table": rows,
    })))
}

async fn volcano_export(
    state: web::Data<AppState>,
    query: web::Query<VolcanoQuery>,
) -> Result<HttpResponse> {
    let (_, table) = build_volcano(&state, &query)?;
    Ok(csv_download(VOLCANO_EXPORT, table.to_csv()?))
}

async fn scatter(
    state: web::Data<AppState>,
    query: web::Query<ScatterQuery>,
) -> Result<HttpResponse> {
    let (first, second, table) = build_scatter(&state, &query)?;
    let figure = scatter_figure(&table, &first, &second, &query.limits());
    let rows = table.table_rows(TABLE_ROW_LIMIT);

    Ok(HttpResponse::Ok().json(json!({
        "names": [first, second],
        "figure": figure,
        "correlation": table.correlation,
        "stats": { "total": table.n_genes() },
        "note": showing_note(rows.len(), table.n_genes()),
        "table": rows,
    })))
}

async fn scatter_export(
    state: web::Data<AppState>,
    query: web::Query<ScatterQuery>,
) -> Result<HttpResponse> {
    let (_, _, table) = build_scatter(&state, &query)?;
    Ok(csv_download(SCATTER_EXPORT, table.to_csv()?))
}

async fn venn(state: web::Data<AppState>, query: web::Query<VennQuery>) -> Result<HttpResponse> {
    let summary = build_venn(&state, &query)?;
    Ok(HttpResponse::Ok().json(json!({
        "names": summary.names,
        "deg_counts": summary.deg_counts,
        "counts_line": summary.counts_line(),
        "figure": venn_figure(&summary),
        "gene_lists": summary.gene_lists(),
    })))
}

async fn venn_export(state: web::Data<AppState>, query: web::Query<VennQuery>) -> Result<HttpResponse> {
    let summary = build_venn(&state, &query)?;
    Ok(csv_download(VENN_EXPORT, summary.to_csv()?))
}

async fn clear_cache(state: web::Data<AppState>) -> HttpResponse {
    let cleared = state.loader.cached_len();
    state.loader.clear_cache();
    HttpResponse::Ok().json(json!({ "cleared": cleared }))
}

pub(super) async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
