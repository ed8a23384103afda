//! Table 1 - total demand for key minerals
//!
//! The sheet stacks one block per mineral: a header row carrying only the
//! mineral name, followed by its demand categories. Columns are the shared
//! 2023 value and one block of projection years per scenario.

use super::scenario_years;
use crate::analysis::{demand_summary, DemandSummary};
use crate::error::{OutlookError, OutlookResult};
use crate::excel::{round_to, ExcelExporter, ScenarioColumns, SheetGrid};
use crate::types::{Cell, Projection, Scenario, SheetTable, BASE_YEAR};
use tracing::debug;

pub const SHEET: &str = "1 Total demand for key minerals";
pub const OUTPUT_FILE: &str = "organized_mineral_demand.xlsx";

/// Categories of one mineral
#[derive(Debug, Clone, PartialEq)]
pub struct MineralBlock {
    pub mineral: String,
    pub categories: Vec<Projection>,
}

impl MineralBlock {
    pub fn new(mineral: impl Into<String>) -> Self {
        Self {
            mineral: mineral.into(),
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemandTable {
    pub columns: ScenarioColumns,
    pub minerals: Vec<MineralBlock>,
}

/// Parse the demand sheet
pub fn parse(grid: SheetGrid) -> OutlookResult<DemandTable> {
    let grid = grid.drop_empty();

    let scenario_row = (0..grid.height())
        .find(|&r| {
            grid.text(r, 2)
                .map(|t| t.to_lowercase().contains("scenario"))
                .unwrap_or(false)
        })
        .ok_or_else(|| OutlookError::Layout(format!("{}: no scenario label row", SHEET)))?;
    let year_row = grid
        .find_row_with(1, BASE_YEAR)
        .ok_or_else(|| {
            OutlookError::Layout(format!("{}: no row with {} in column 1", SHEET, BASE_YEAR))
        })?;
    debug!(scenario_row, year_row, "demand header rows");

    let columns = ScenarioColumns::locate(&grid, year_row);

    let mut minerals: Vec<MineralBlock> = Vec::new();
    for row in year_row + 1..grid.height() {
        let Some(label) = grid.label(row) else {
            continue;
        };
        if !grid.row_has_numbers(row) {
            debug!(mineral = label, "mineral header");
            minerals.push(MineralBlock::new(label));
        } else if let Some(block) = minerals.last_mut() {
            block.categories.push(columns.read(&grid, row, label));
        } else {
            debug!(row, label, "skipping row before first mineral");
        }
    }
    minerals.retain(|m| !m.categories.is_empty());

    if minerals.is_empty() {
        return Err(OutlookError::NoData(format!("{}: no mineral blocks", SHEET)));
    }
    Ok(DemandTable { columns, minerals })
}

impl DemandTable {
    pub fn mineral(&self, name: &str) -> Option<&MineralBlock> {
        self.minerals.iter().find(|m| m.mineral == name)
    }

    pub fn mineral_names(&self) -> Vec<&str> {
        self.minerals.iter().map(|m| m.mineral.as_str()).collect()
    }

    /// Per-mineral totals, growth and CAGR for one scenario
    pub fn summary(&self, scenario: Scenario, target_year: u16) -> Vec<DemandSummary> {
        let minerals: Vec<(String, Vec<Projection>)> = self
            .minerals
            .iter()
            .map(|m| (m.mineral.clone(), m.categories.clone()))
            .collect();
        demand_summary(&minerals, scenario, BASE_YEAR, target_year)
    }

    /// `Summary_<scenario>` sheet
    pub fn summary_table(&self, scenario: Scenario, target_year: u16) -> SheetTable {
        let mut table = SheetTable::new(
            format!("Summary_{}", scenario.label()),
            vec![
                "Mineral".to_string(),
                format!("Total_{}", BASE_YEAR),
                format!("Total_{}", target_year),
                "Growth_Rate_%".to_string(),
                "CAGR_%".to_string(),
            ],
        )
        .with_precision(None);
        for row in self.summary(scenario, target_year) {
            table.push_row(vec![
                Cell::from(row.mineral),
                Cell::Number(round_to(row.total_base, 2)),
                Cell::Number(round_to(row.total_target, 2)),
                Cell::Number(round_to(row.growth_pct, 1)),
                Cell::from(row.cagr_pct.map(|c| round_to(c, 1))),
            ]);
        }
        table
    }

    /// One mineral's sheet: `Category` then every scenario's year columns
    pub fn mineral_table(&self, block: &MineralBlock) -> SheetTable {
        let mut headers = vec!["Category".to_string()];
        let mut layout: Vec<(Scenario, u16)> = Vec::new();
        for scenario in Scenario::ALL {
            for year in scenario_years(&self.columns, scenario) {
                headers.push(format!("{}_{}", scenario.sheet_label(), year));
                layout.push((scenario, year));
            }
        }

        let mut table = SheetTable::new(block.mineral.clone(), headers);
        for category in &block.categories {
            let mut row = vec![Cell::from(category.label.as_str())];
            row.extend(layout.iter().map(|(s, y)| Cell::from(category.value(*s, *y))));
            table.push_row(row);
        }
        table
    }

    pub fn workbook(&self, target_year: u16) -> OutlookResult<ExcelExporter> {
        let mut exporter = ExcelExporter::new();
        exporter.add_note_sheet(
            "Overview",
            vec![
                "Mineral Analysis Results".to_string(),
                format!("Source sheet: {}", SHEET),
                format!("Minerals: {}", self.minerals.len()),
            ],
        )?;
        for scenario in Scenario::ALL {
            let summary = self.summary_table(scenario, target_year);
            if !summary.is_empty() {
                exporter.add_table(summary)?;
            }
        }
        for block in &self.minerals {
            exporter.add_table(self.mineral_table(block))?;
        }
        Ok(exporter)
    }
}
