//! Table 3.2 - clean technology demand by mineral

use super::{has_scenario_values, projection_row, scenario_years};
use crate::error::{OutlookError, OutlookResult};
use crate::excel::{ExcelExporter, ScenarioColumns, SheetGrid};
use crate::types::{Projection, Scenario, SheetTable, BASE_YEAR};
use tracing::debug;

pub const SHEET: &str = "3.2 Cleantech demand by mineral";
pub const OUTPUT_FILE: &str = "cleantech_demand_by_mineral.xlsx";

#[derive(Debug, Clone, PartialEq)]
pub struct MineralDemandTable {
    pub columns: ScenarioColumns,
    pub metals: Vec<Projection>,
}

pub fn parse(grid: SheetGrid) -> OutlookResult<MineralDemandTable> {
    let grid = grid.drop_empty();
    let year_row = grid
        .find_row_containing(BASE_YEAR)
        .ok_or_else(|| {
            OutlookError::Layout(format!("{}: no row containing {}", SHEET, BASE_YEAR))
        })?;
    let columns = ScenarioColumns::locate(&grid, year_row);

    let metals: Vec<Projection> = (year_row + 1..grid.height())
        .filter_map(|row| {
            let label = grid.label(row)?;
            if label.starts_with("Total") || !grid.row_has_numbers(row) {
                debug!(row, label, "skipping row");
                return None;
            }
            Some(columns.read(&grid, row, label))
        })
        .collect();

    if metals.is_empty() {
        return Err(OutlookError::NoData(format!("{}: no metal rows", SHEET)));
    }
    Ok(MineralDemandTable { columns, metals })
}

impl MineralDemandTable {
    pub fn metal(&self, name: &str) -> Option<&Projection> {
        self.metals.iter().find(|m| m.label == name)
    }

    /// One scenario's sheet: `Metal`, then the base year and projection years
    pub fn scenario_table(&self, scenario: Scenario) -> SheetTable {
        let years = scenario_years(&self.columns, scenario);
        let mut headers = vec!["Metal".to_string()];
        headers.extend(years.iter().map(|y| y.to_string()));

        let mut table = SheetTable::new(scenario.label(), headers);
        for metal in &self.metals {
            if has_scenario_values(metal, scenario, &years) {
                table.push_row(projection_row(metal, scenario, &years));
            }
        }
        table
    }

    pub fn workbook(&self) -> OutlookResult<ExcelExporter> {
        let mut exporter = ExcelExporter::new();
        for scenario in Scenario::ALL {
            let table = self.scenario_table(scenario);
            if !table.is_empty() {
                exporter.add_table(table)?;
            }
        }
        Ok(exporter)
    }
}
