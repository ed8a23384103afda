//! Excel import/export
//!
//! - Import: explorer workbook (.xlsx) → `SheetGrid` for the table parsers
//! - Layout: scenario column location inside a grid
//! - Export: cleaned `SheetTable`s → new workbooks (.xlsx)

mod exporter;
mod importer;
mod layout;

pub use exporter::{
    clean_sheet_name, round_to, scenario_sheet_name, split_scenario_sheet_name, ExcelExporter,
};
pub use importer::{read_table, SheetGrid, SourceWorkbook};
pub use layout::ScenarioColumns;
