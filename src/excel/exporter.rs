//! Excel exporter - cleaned tables → .xlsx

use crate::error::{OutlookError, OutlookResult};
use crate::types::{Cell, Scenario, SheetTable};
use regex::Regex;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Excel's limit on worksheet names
const MAX_SHEET_NAME: usize = 31;

/// Make a name acceptable as an Excel worksheet name
pub fn clean_sheet_name(name: &str) -> OutlookResult<String> {
    let invalid = Regex::new(r"[\\/*?:\[\]()]")
        .map_err(|e| OutlookError::Export(format!("Regex error: {}", e)))?;
    let cleaned = invalid.replace_all(name, "");
    let cleaned = cleaned.trim().trim_matches('\'').trim();
    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME).collect();
    let truncated = truncated.trim_end().to_string();
    if truncated.is_empty() {
        Ok("Sheet".to_string())
    } else {
        Ok(truncated)
    }
}

/// Sheet name for one scenario of an entity: `<stem>_<label>` when all three
/// labels fit, else a shortened stem with the scenario code (`_APS`), so the
/// names of one stem never collide after truncation
pub fn scenario_sheet_name(stem: &str, scenario: Scenario) -> OutlookResult<String> {
    let stem = clean_sheet_name(stem)?;
    let longest_label = Scenario::ALL.iter().map(|s| s.label().len()).max().unwrap_or(0);
    if stem.chars().count() + 1 + longest_label <= MAX_SHEET_NAME {
        return Ok(format!("{}_{}", stem, scenario.label()));
    }
    let longest_code = Scenario::ALL.iter().map(|s| s.code().len()).max().unwrap_or(0);
    let short: String = stem.chars().take(MAX_SHEET_NAME - 1 - longest_code).collect();
    Ok(format!("{}_{}", short.trim_end(), scenario.code()))
}

/// Inverse of [`scenario_sheet_name`]: the stem and scenario of a sheet name
pub fn split_scenario_sheet_name(name: &str) -> Option<(&str, Scenario)> {
    Scenario::ALL.iter().find_map(|s| {
        name.strip_suffix(&format!("_{}", s.label()))
            .or_else(|| name.strip_suffix(&format!("_{}", s.code())))
            .map(|stem| (stem, *s))
    })
}

/// Sheet waiting to be written
#[derive(Debug, Clone)]
enum PendingSheet {
    Table(SheetTable),
    Note { name: String, lines: Vec<String> },
}

/// Collects sheets and writes them as one workbook
#[derive(Debug, Default)]
pub struct ExcelExporter {
    sheets: Vec<PendingSheet>,
    names: HashSet<String>,
}

impl ExcelExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique, valid sheet name
    fn claim_name(&mut self, requested: &str) -> OutlookResult<String> {
        let base = clean_sheet_name(requested)?;
        let mut name = base.clone();
        let mut n = 2;
        while self.names.contains(&name.to_lowercase()) {
            let suffix = format!("_{}", n);
            let keep = MAX_SHEET_NAME - suffix.len();
            let stem: String = base.chars().take(keep).collect();
            name = format!("{}{}", stem.trim_end(), suffix);
            n += 1;
        }
        self.names.insert(name.to_lowercase());
        Ok(name)
    }

    /// Queue a table; returns the sheet name it will be written under
    pub fn add_table(&mut self, mut table: SheetTable) -> OutlookResult<String> {
        let name = self.claim_name(&table.name)?;
        table.name = name.clone();
        self.sheets.push(PendingSheet::Table(table));
        Ok(name)
    }

    /// Queue a single-column text sheet such as "Overview"
    pub fn add_note_sheet(&mut self, name: &str, lines: Vec<String>) -> OutlookResult<String> {
        let name = self.claim_name(name)?;
        self.sheets.push(PendingSheet::Note {
            name: name.clone(),
            lines,
        });
        Ok(name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets
            .iter()
            .map(|s| match s {
                PendingSheet::Table(t) => t.name.as_str(),
                PendingSheet::Note { name, .. } => name.as_str(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Write every queued sheet to `output_path`
    pub fn export(&self, output_path: &Path) -> OutlookResult<()> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            match sheet {
                PendingSheet::Table(table) => {
                    worksheet.set_name(&table.name).map_err(|e| {
                        OutlookError::Export(format!("Failed to set worksheet name: {}", e))
                    })?;
                    Self::export_table(worksheet, table, &header)?;
                }
                PendingSheet::Note { name, lines } => {
                    worksheet.set_name(name).map_err(|e| {
                        OutlookError::Export(format!("Failed to set worksheet name: {}", e))
                    })?;
                    for (row, line) in lines.iter().enumerate() {
                        let format = if row == 0 { Some(&header) } else { None };
                        write_text(worksheet, row as u32, 0, line, format)?;
                    }
                    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(10);
                    worksheet
                        .set_column_width(0, (width + 2) as f64)
                        .map_err(|e| OutlookError::Export(format!("Failed to set width: {}", e)))?;
                }
            }
        }

        workbook
            .save(output_path)
            .map_err(|e| OutlookError::Export(format!("Failed to save Excel file: {}", e)))?;
        info!(path = %output_path.display(), sheets = self.sheets.len(), "wrote workbook");
        Ok(())
    }

    fn export_table(
        worksheet: &mut Worksheet,
        table: &SheetTable,
        header: &Format,
    ) -> OutlookResult<()> {
        let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();

        for (col, name) in table.headers.iter().enumerate() {
            write_text(worksheet, 0, col as u16, name, Some(header))?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let excel_row = (r + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let cell = round_cell(cell, table.precision);
                match &cell {
                    Cell::Empty => {}
                    Cell::Text(s) => write_text(worksheet, excel_row, col as u16, s, None)?,
                    Cell::Number(n) if n.is_finite() => {
                        worksheet.write_number(excel_row, col as u16, *n).map_err(|e| {
                            OutlookError::Export(format!("Failed to write number: {}", e))
                        })?;
                    }
                    // Infinite and NaN values are left blank
                    Cell::Number(_) => {}
                }
                let len = cell.render().chars().count();
                if col >= widths.len() {
                    widths.resize(col + 1, 0);
                }
                widths[col] = widths[col].max(len);
            }
        }

        for (col, width) in widths.iter().enumerate() {
            worksheet
                .set_column_width(col as u16, (*width + 2) as f64)
                .map_err(|e| OutlookError::Export(format!("Failed to set width: {}", e)))?;
        }
        Ok(())
    }
}

fn write_text(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    format: Option<&Format>,
) -> OutlookResult<()> {
    let result = match format {
        Some(f) => worksheet.write_string_with_format(row, col, text, f),
        None => worksheet.write_string(row, col, text),
    };
    result
        .map(|_| ())
        .map_err(|e| OutlookError::Export(format!("Failed to write text: {}", e)))
}

/// Round a number to `precision` decimals
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

fn round_cell(cell: &Cell, precision: Option<u32>) -> Cell {
    match (cell, precision) {
        (Cell::Number(n), Some(p)) if n.is_finite() => Cell::Number(round_to(*n, p)),
        _ => cell.clone(),
    }
}
