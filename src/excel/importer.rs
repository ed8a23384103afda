//! Workbook import - source explorer sheets and cleaned output sheets

use crate::error::{OutlookError, OutlookResult};
use crate::types::{Cell, SheetTable};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An opened workbook (xlsx, xls or ods)
pub struct SourceWorkbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl SourceWorkbook {
    /// Open a workbook; a missing file is reported as `NotFound`
    pub fn open<P: AsRef<Path>>(path: P) -> OutlookResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OutlookError::NotFound(path.display().to_string()));
        }
        let sheets = open_workbook_auto(path).map_err(|e| {
            OutlookError::Workbook(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Read a named sheet into a grid
    pub fn grid(&mut self, sheet: &str) -> OutlookResult<SheetGrid> {
        if !self.sheet_names().iter().any(|s| s == sheet) {
            return Err(OutlookError::Workbook(format!(
                "Sheet '{}' not found in {}",
                sheet,
                self.path.display()
            )));
        }
        let range = self
            .sheets
            .worksheet_range(sheet)
            .map_err(|e| {
                OutlookError::Workbook(format!("Failed to read sheet '{}': {}", sheet, e))
            })?;
        let grid = SheetGrid::from_range(&range);
        debug!(sheet, rows = grid.height(), cols = grid.width(), "read sheet");
        Ok(grid)
    }

    /// Read a cleaned sheet: first row as headers, blank rows dropped
    pub fn table(&mut self, sheet: &str) -> OutlookResult<SheetTable> {
        let grid = self.grid(sheet)?;
        let mut rows = grid.rows.into_iter();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(Cell::render).collect(),
            None => Vec::new(),
        };
        let mut table = SheetTable::new(sheet, headers).with_precision(None);
        for row in rows {
            if !row.iter().all(Cell::is_empty) {
                table.push_row(row);
            }
        }
        Ok(table)
    }
}

/// Convert a calamine cell; errors such as `#N/A` become blanks
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// A rectangular block of cells read from one sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Vec<Cell>>,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, Cell::Empty);
                r
            })
            .collect();
        Self { rows }
    }

    pub fn from_range(range: &Range<Data>) -> Self {
        Self::new(
            range
                .rows()
                .map(|row| row.iter().map(convert_cell).collect())
                .collect(),
        )
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    /// Trimmed text at (row, col)
    pub fn text(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).as_text()
    }

    /// Numeric value at (row, col)
    pub fn number(&self, row: usize, col: usize) -> Option<f64> {
        self.cell(row, col).as_number()
    }

    /// Whole year (1900-2200) at (row, col)
    pub fn year(&self, row: usize, col: usize) -> Option<u16> {
        let v = self.number(row, col)?;
        if v.fract() == 0.0 && (1900.0..=2200.0).contains(&v) {
            Some(v as u16)
        } else {
            None
        }
    }

    /// Row label in column 0
    pub fn label(&self, row: usize) -> Option<&str> {
        self.text(row, 0)
    }

    pub fn row_is_blank(&self, row: usize) -> bool {
        self.row(row)
            .map(|r| r.iter().all(Cell::is_empty))
            .unwrap_or(true)
    }

    /// True when any cell after the label column is numeric
    pub fn row_has_numbers(&self, row: usize) -> bool {
        self.row(row)
            .map(|r| r.iter().skip(1).any(|c| c.as_number().is_some()))
            .unwrap_or(false)
    }

    /// Remove rows and columns that carry no value at all
    pub fn drop_empty(self) -> Self {
        let rows: Vec<Vec<Cell>> = self
            .rows
            .into_iter()
            .filter(|r| !r.iter().all(Cell::is_empty))
            .collect();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let keep: Vec<bool> = (0..width)
            .map(|c| rows.iter().any(|r| !r[c].is_empty()))
            .collect();
        let rows = rows
            .into_iter()
            .map(|r| {
                r.into_iter()
                    .zip(keep.iter())
                    .filter_map(|(cell, keep)| keep.then_some(cell))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// First row holding `year` in any column
    pub fn find_row_containing(&self, year: u16) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.iter().any(|c| c.is_year(year)))
    }

    /// First row whose cell in `col` is `year`
    pub fn find_row_with(&self, col: usize, year: u16) -> Option<usize> {
        (0..self.height()).find(|&r| self.cell(r, col).is_year(year))
    }

    /// Same as `find_row_with`, restricted to rows `start..end`
    pub fn find_row_with_in(
        &self,
        col: usize,
        year: u16,
        start: usize,
        end: usize,
    ) -> Option<usize> {
        (start..end.min(self.height())).find(|&r| self.cell(r, col).is_year(year))
    }
}

/// Read a cleaned sheet (header row, then data rows) back into a table
pub fn read_table<P: AsRef<Path>>(path: P, sheet: &str) -> OutlookResult<SheetTable> {
    SourceWorkbook::open(path)?.table(sheet)
}
