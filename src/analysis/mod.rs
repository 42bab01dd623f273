//! Derived statistics over loaded result tables
//!
//! `merge`, `degs` and `overlap` are the core operations; `volcano`,
//! `scatter` and `venn` shape their output for the dashboard views.

mod degs;
mod merge;
mod overlap;
pub mod scatter;
pub mod venn;
pub mod volcano;

pub use degs::{degs_from_table, extract_degs, DegSet};
pub use merge::{merge, merge_tables, MergedRecord, MergedTable};
pub use overlap::{overlap, OverlapPartition, Region};
pub use scatter::{compare, ScatterParams, ScatterTable};
pub use venn::{summarize, validate_selection, VennSummary};
pub use volcano::{annotate, Direction, VolcanoParams, VolcanoTable};
