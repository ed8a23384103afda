//! Table passes - one parser per explorer sheet
//!
//! Every pass reads its own sheet, reshapes it into per-entity tables and
//! writes one or two cleaned workbooks. Passes share the grid helpers in
//! [`crate::excel`] but never call each other.

pub mod demand;
pub mod mineral_demand;
pub mod supply;
pub mod tech_demand;
pub mod technology;

use crate::config::OutlookConfig;
use crate::error::{OutlookError, OutlookResult};
use crate::excel::{ExcelExporter, ScenarioColumns, SourceWorkbook};
use crate::types::{Cell, Projection, Scenario, BASE_YEAR};
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

pub use demand::DemandTable;
pub use mineral_demand::MineralDemandTable;
pub use supply::SupplyTable;
pub use tech_demand::TechDemandTable;
pub use technology::{TechnologyPreset, TechnologyTable};

//==============================================================================
// Table identifiers
//==============================================================================

/// One sheet of the data explorer, by its table number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum TableId {
    #[value(name = "1")]
    Demand,
    #[value(name = "2")]
    Supply,
    #[value(name = "3.1")]
    TechDemand,
    #[value(name = "3.2")]
    MineralDemand,
    #[value(name = "4.1")]
    SolarPv,
    #[value(name = "4.2")]
    Wind,
    #[value(name = "4.3")]
    ElectricVehicles,
    #[value(name = "4.4")]
    GridStorage,
    #[value(name = "4.5")]
    ElectricityNetworks,
    #[value(name = "4.6")]
    Hydrogen,
}

impl TableId {
    pub const ALL: [TableId; 10] = [
        TableId::Demand,
        TableId::Supply,
        TableId::TechDemand,
        TableId::MineralDemand,
        TableId::SolarPv,
        TableId::Wind,
        TableId::ElectricVehicles,
        TableId::GridStorage,
        TableId::ElectricityNetworks,
        TableId::Hydrogen,
    ];

    /// Table number as printed in the workbook ("3.2")
    pub fn id(&self) -> &'static str {
        match self {
            TableId::Demand => "1",
            TableId::Supply => "2",
            TableId::TechDemand => "3.1",
            TableId::MineralDemand => "3.2",
            TableId::SolarPv => "4.1",
            TableId::Wind => "4.2",
            TableId::ElectricVehicles => "4.3",
            TableId::GridStorage => "4.4",
            TableId::ElectricityNetworks => "4.5",
            TableId::Hydrogen => "4.6",
        }
    }

    pub fn from_id(id: &str) -> Option<TableId> {
        Self::ALL.iter().copied().find(|t| t.id() == id.trim())
    }

    pub fn title(&self) -> &'static str {
        match self {
            TableId::Demand => "Total demand for key minerals",
            TableId::Supply => "Total supply for key minerals",
            TableId::TechDemand => "Cleantech demand by technology",
            TableId::MineralDemand => "Cleantech demand by mineral",
            other => other
                .technology_preset()
                .map(|p| p.name)
                .unwrap_or_default(),
        }
    }

    /// Sheet read when the config has no override
    pub fn default_sheet(&self) -> &'static str {
        match self {
            TableId::Demand => demand::SHEET,
            TableId::Supply => supply::SHEET,
            TableId::TechDemand => tech_demand::SHEET,
            TableId::MineralDemand => mineral_demand::SHEET,
            other => other
                .technology_preset()
                .map(|p| p.sheet)
                .unwrap_or_default(),
        }
    }

    /// Cleaned workbooks written by this table's pass
    pub fn output_files(&self) -> Vec<&'static str> {
        match self {
            TableId::Demand => vec![demand::OUTPUT_FILE],
            TableId::Supply => vec![supply::MINING_FILE, supply::REFINING_FILE],
            TableId::TechDemand => vec![tech_demand::OUTPUT_FILE],
            TableId::MineralDemand => vec![mineral_demand::OUTPUT_FILE],
            other => other
                .technology_preset()
                .map(|p| vec![p.output_file])
                .unwrap_or_default(),
        }
    }

    /// Preset for the 4.x technology sheets
    pub fn technology_preset(&self) -> Option<&'static TechnologyPreset> {
        match self {
            TableId::SolarPv => Some(&technology::SOLAR_PV),
            TableId::Wind => Some(&technology::WIND),
            TableId::ElectricVehicles => Some(&technology::ELECTRIC_VEHICLES),
            TableId::GridStorage => Some(&technology::GRID_STORAGE),
            TableId::ElectricityNetworks => Some(&technology::ELECTRICITY_NETWORKS),
            TableId::Hydrogen => Some(&technology::HYDROGEN),
            _ => None,
        }
    }

    /// Directory under the figures root holding this table's charts
    pub fn figures_subdir(&self) -> String {
        format!("table_{}", self.id().replace('.', "_"))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Table {}", self.id())
    }
}

//==============================================================================
// Parsed datasets
//==============================================================================

/// The parsed content of one table
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Demand(DemandTable),
    Supply(SupplyTable),
    TechDemand(TechDemandTable),
    MineralDemand(MineralDemandTable),
    Technology(TechnologyTable),
}

impl Dataset {
    /// Cleaned workbooks as (file name, sheets)
    pub fn workbooks(
        &self,
        config: &OutlookConfig,
    ) -> OutlookResult<Vec<(&'static str, ExcelExporter)>> {
        match self {
            Dataset::Demand(t) => Ok(vec![(demand::OUTPUT_FILE, t.workbook(config.target_year)?)]),
            Dataset::Supply(t) => t.workbooks(),
            Dataset::TechDemand(t) => Ok(vec![(tech_demand::OUTPUT_FILE, t.workbook()?)]),
            Dataset::MineralDemand(t) => Ok(vec![(mineral_demand::OUTPUT_FILE, t.workbook()?)]),
            Dataset::Technology(t) => Ok(vec![(t.preset.output_file, t.workbook()?)]),
        }
    }

    /// Write every cleaned workbook into the output directory
    pub fn save(&self, config: &OutlookConfig) -> OutlookResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (file, exporter) in self.workbooks(config)? {
            let path = config.output_path(file);
            exporter.export(&path)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Read and parse one table from an opened workbook
pub fn parse_table(
    table: TableId,
    workbook: &mut SourceWorkbook,
    config: &OutlookConfig,
) -> OutlookResult<Dataset> {
    let sheet = config.sheet_for(table.id(), table.default_sheet()).to_string();
    let grid = workbook.grid(&sheet)?;
    let dataset = match (table, table.technology_preset()) {
        (_, Some(preset)) => Dataset::Technology(technology::parse(grid, preset)?),
        (TableId::Demand, None) => Dataset::Demand(demand::parse(grid)?),
        (TableId::Supply, None) => Dataset::Supply(supply::parse(grid)?),
        (TableId::TechDemand, None) => Dataset::TechDemand(tech_demand::parse(grid)?),
        (TableId::MineralDemand, None) => Dataset::MineralDemand(mineral_demand::parse(grid)?),
        (other, None) => {
            return Err(OutlookError::Config(format!(
                "No parser registered for table {}",
                other.id()
            )))
        }
    };
    Ok(dataset)
}

//==============================================================================
// Cleaning pipeline
//==============================================================================

/// A table that was parsed and written
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub dataset: Dataset,
    pub outputs: Vec<PathBuf>,
}

/// Result of one table's pass; a failure does not stop the others
#[derive(Debug)]
pub struct TableOutcome {
    pub table: TableId,
    pub result: OutlookResult<CleanedTable>,
}

impl TableOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Parse and write each requested table. Opening the workbook is the only
/// fatal step; per-table errors are collected in the outcomes.
pub fn clean_tables(
    tables: &[TableId],
    config: &OutlookConfig,
) -> OutlookResult<Vec<TableOutcome>> {
    let mut workbook = SourceWorkbook::open(&config.input)?;
    let mut outcomes = Vec::with_capacity(tables.len());
    for table in tables {
        let result = clean_table(*table, &mut workbook, config);
        match &result {
            Ok(cleaned) => {
                info!(table = table.id(), files = cleaned.outputs.len(), "table cleaned")
            }
            Err(e) => warn!(table = table.id(), error = %e, "table failed"),
        }
        outcomes.push(TableOutcome {
            table: *table,
            result,
        });
    }
    Ok(outcomes)
}

fn clean_table(
    table: TableId,
    workbook: &mut SourceWorkbook,
    config: &OutlookConfig,
) -> OutlookResult<CleanedTable> {
    let dataset = parse_table(table, workbook, config)?;
    let outputs = dataset.save(config)?;
    Ok(CleanedTable { dataset, outputs })
}

//==============================================================================
// Shared row helpers
//==============================================================================

/// Years written for a scenario: the shared base year, then its projections
pub(crate) fn scenario_years(columns: &ScenarioColumns, scenario: Scenario) -> Vec<u16> {
    std::iter::once(BASE_YEAR)
        .chain(columns.columns(scenario).iter().map(|(year, _)| *year))
        .collect()
}

/// Label followed by the projection's values for `years` (blanks kept)
pub(crate) fn projection_row(p: &Projection, scenario: Scenario, years: &[u16]) -> Vec<Cell> {
    let mut row = vec![Cell::from(p.label.as_str())];
    row.extend(years.iter().map(|y| Cell::from(p.value(scenario, *y))));
    row
}

/// True when the projection has any value for the scenario's years
pub(crate) fn has_scenario_values(p: &Projection, scenario: Scenario, years: &[u16]) -> bool {
    years.iter().any(|y| p.value(scenario, *y).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ids_round_trip() {
        for table in TableId::ALL {
            assert_eq!(TableId::from_id(table.id()), Some(table));
        }
        assert_eq!(TableId::from_id("5"), None);
    }

    #[test]
    fn test_table_metadata() {
        assert_eq!(TableId::Supply.output_files().len(), 2);
        assert_eq!(TableId::GridStorage.default_sheet(), "4.4 Grid battery storage");
        assert_eq!(TableId::MineralDemand.figures_subdir(), "table_3_2");
        assert_eq!(TableId::Wind.to_string(), "Table 4.2");
        for table in TableId::ALL {
            assert!(!table.title().is_empty());
            assert!(!table.default_sheet().is_empty());
            assert!(!table.output_files().is_empty());
        }
    }

    #[test]
    fn test_value_enum_names() {
        let parsed = TableId::from_str("3.1", false).unwrap();
        assert_eq!(parsed, TableId::TechDemand);
    }

    #[test]
    fn test_projection_row_keeps_blanks() {
        let mut p = Projection::new("Lithium");
        p.base = Some(1.0);
        p.set(Scenario::NetZero, 2050, 3.0);
        let row = projection_row(&p, Scenario::NetZero, &[2023, 2030, 2050]);
        assert_eq!(
            row,
            vec![Cell::from("Lithium"), Cell::Number(1.0), Cell::Empty, Cell::Number(3.0)]
        );
        assert!(has_scenario_values(&p, Scenario::StatedPolicies, &[2023]));
        assert!(!has_scenario_values(&p, Scenario::StatedPolicies, &[2030]));
    }
}
