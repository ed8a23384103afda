//! Chart stage - static HTML charts from the cleaned tables
//!
//! Each table has its own chart set. Files land in
//! `<figures_dir>/table_<id>/` under the names defined in [`naming`].

mod demand;
pub mod figure;
mod mineral_demand;
pub mod naming;
mod supply;
mod tech_demand;
mod technology;

pub use figure::{escape_html, Figure, PLOTLY_CDN};
pub use naming::{page_figures, slug, FigureRef};

use crate::config::OutlookConfig;
use crate::error::OutlookResult;
use crate::tables::{Dataset, TableId};
use crate::types::Projection;
use std::path::PathBuf;
use tracing::info;

/// Colours cycled through for non-scenario series
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub fn palette(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

/// Chart files keyed by file name
pub type ChartSet = Vec<(String, Figure)>;

/// Build every chart of a dataset without writing anything
pub fn build(dataset: &Dataset, target_year: u16) -> ChartSet {
    match dataset {
        Dataset::Demand(t) => demand::figures(t, target_year),
        Dataset::Supply(t) => supply::figures(t),
        Dataset::TechDemand(t) => tech_demand::figures(t, target_year),
        Dataset::MineralDemand(t) => mineral_demand::figures(t, target_year),
        Dataset::Technology(t) => technology::figures(t, target_year),
    }
}

/// Write a table's charts into its figures directory
pub fn render(
    table: TableId,
    dataset: &Dataset,
    config: &OutlookConfig,
) -> OutlookResult<Vec<PathBuf>> {
    let dir = config.figures_dir.join(table.figures_subdir());
    std::fs::create_dir_all(&dir)?;

    let mut written = Vec::new();
    for (file, figure) in build(dataset, config.target_year) {
        let path = dir.join(&file);
        figure.write(&path)?;
        written.push(path);
    }
    info!(table = table.id(), charts = written.len(), dir = %dir.display(), "wrote charts");
    Ok(written)
}

/// Largest finite value across the given series, for shared axis ranges
pub(crate) fn series_max<'a>(series: impl IntoIterator<Item = &'a [(u16, f64)]>) -> f64 {
    series
        .into_iter()
        .flat_map(|s| s.iter().map(|(_, v)| *v))
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}

/// Axis range from zero with 10% headroom
pub(crate) fn padded_range(max: f64) -> Option<(f64, f64)> {
    (max > 0.0).then(|| (0.0, max * 1.1))
}

/// Projections whose label is not a total or share row
pub(crate) fn without_totals(projections: &[Projection]) -> Vec<&Projection> {
    projections
        .iter()
        .filter(|p| {
            let label = p.label.to_lowercase();
            !label.starts_with("total") && !label.contains("share")
        })
        .collect()
}
