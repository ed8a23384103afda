//! Table 3.1 - clean technology demand by technology
//!
//! One block per metal; the block header names the metal and the rows below
//! it are technologies.

use super::{has_scenario_values, projection_row, scenario_years};
use crate::error::{OutlookError, OutlookResult};
use crate::excel::{scenario_sheet_name, ExcelExporter, ScenarioColumns, SheetGrid};
use crate::types::{Projection, Scenario, SheetTable, BASE_YEAR};
use tracing::debug;

pub const SHEET: &str = "3.1 Cleantech demand by tech";
pub const OUTPUT_FILE: &str = "demand_scenarios.xlsx";

/// Metals recognised as block headers, in output order
pub const METALS: [&str; 13] = [
    "Chromium",
    "Copper",
    "Cobalt",
    "Battery-grade graphite",
    "Lithium",
    "Manganese",
    "Molybdenum",
    "Nickel",
    "PGMs",
    "Silicon",
    "Silver",
    "Zinc",
    "Neodymium",
];

const NON_TECHNOLOGY_MARKERS: [&str; 3] = ["Total", "Notes:", "Base case"];

#[derive(Debug, Clone, PartialEq)]
pub struct MetalTechnologies {
    pub metal: String,
    pub technologies: Vec<Projection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TechDemandTable {
    pub columns: ScenarioColumns,
    pub metals: Vec<MetalTechnologies>,
}

/// Known metal named by a block header, if any
fn header_metal(label: &str) -> Option<&'static str> {
    if label.starts_with("Total") {
        return None;
    }
    METALS.iter().copied().find(|m| label.contains(m))
}

/// Parse the technology demand sheet
pub fn parse(grid: SheetGrid) -> OutlookResult<TechDemandTable> {
    let grid = grid.drop_empty();
    let year_row = grid
        .find_row_containing(BASE_YEAR)
        .ok_or_else(|| {
            OutlookError::Layout(format!("{}: no row containing {}", SHEET, BASE_YEAR))
        })?;
    let columns = ScenarioColumns::locate(&grid, year_row);

    let mut metals: Vec<MetalTechnologies> = Vec::new();
    // Index into `metals` of the block being filled
    let mut current: Option<usize> = None;

    for row in year_row + 1..grid.height() {
        let Some(label) = grid.label(row) else {
            continue;
        };

        if let Some(metal) = header_metal(label) {
            debug!(metal, "metal block");
            // A repeated header continues the existing block
            current = Some(match metals.iter().position(|m| m.metal == metal) {
                Some(i) => i,
                None => {
                    metals.push(MetalTechnologies {
                        metal: metal.to_string(),
                        technologies: Vec::new(),
                    });
                    metals.len() - 1
                }
            });
            continue;
        }

        if NON_TECHNOLOGY_MARKERS.iter().any(|m| label.contains(m)) {
            continue;
        }
        let Some(index) = current else {
            continue;
        };
        if grid.row_has_numbers(row) {
            metals[index].technologies.push(columns.read(&grid, row, label));
        }
    }

    metals.retain(|m| !m.technologies.is_empty());
    if metals.is_empty() {
        return Err(OutlookError::NoData(format!("{}: no metal blocks", SHEET)));
    }
    metals.sort_by_key(|m| METALS.iter().position(|n| *n == m.metal));

    Ok(TechDemandTable { columns, metals })
}

impl TechDemandTable {
    pub fn metal(&self, name: &str) -> Option<&MetalTechnologies> {
        self.metals.iter().find(|m| m.metal == name)
    }

    /// `<metal>_<scenario>` sheet; `None` when no technology has values
    pub fn scenario_table(
        &self,
        metal: &MetalTechnologies,
        scenario: Scenario,
    ) -> OutlookResult<Option<SheetTable>> {
        let years = scenario_years(&self.columns, scenario);
        let mut headers = vec!["Technology".to_string()];
        headers.extend(years.iter().map(|y| y.to_string()));

        let mut table = SheetTable::new(scenario_sheet_name(&metal.metal, scenario)?, headers);
        for tech in &metal.technologies {
            if has_scenario_values(tech, scenario, &years) {
                table.push_row(projection_row(tech, scenario, &years));
            }
        }
        Ok((!table.is_empty()).then_some(table))
    }

    pub fn workbook(&self) -> OutlookResult<ExcelExporter> {
        let mut exporter = ExcelExporter::new();
        for metal in &self.metals {
            for scenario in Scenario::ALL {
                if let Some(table) = self.scenario_table(metal, scenario)? {
                    exporter.add_table(table)?;
                }
            }
        }
        Ok(exporter)
    }
}
