//! Scenario column location for explorer sheets
//!
//! Explorer tables carry one base-year column followed by one block of
//! projection years per scenario. The blocks are either headed by a scenario
//! label row above the year row, or simply repeat the same years in scenario
//! order.

use super::importer::SheetGrid;
use crate::types::{Projection, Scenario, BASE_YEAR, PROJECTION_YEARS};
use std::collections::BTreeMap;
use tracing::debug;

/// Where each scenario's values sit in a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioColumns {
    /// Column of the shared base-year value
    pub base: Option<usize>,
    /// (year, column) pairs per scenario, in column order
    pub scenarios: BTreeMap<Scenario, Vec<(u16, usize)>>,
}

impl ScenarioColumns {
    /// Column layout of the explorer when no year row can be found:
    /// base in column 1, then five years per scenario
    pub fn canonical() -> Self {
        let mut scenarios = BTreeMap::new();
        for (i, scenario) in Scenario::ALL.iter().enumerate() {
            let start = 2 + i * PROJECTION_YEARS.len();
            scenarios.insert(
                *scenario,
                PROJECTION_YEARS
                    .iter()
                    .enumerate()
                    .map(|(j, year)| (*year, start + j))
                    .collect(),
            );
        }
        Self {
            base: Some(1),
            scenarios,
        }
    }

    /// Locate scenario columns from the year row at `year_row`
    pub fn locate(grid: &SheetGrid, year_row: usize) -> Self {
        let years: Vec<(usize, u16)> = (1..grid.width())
            .filter_map(|c| grid.year(year_row, c).map(|y| (c, y)))
            .collect();

        let base = years.iter().find(|(_, y)| *y == BASE_YEAR).map(|(c, _)| *c);
        let projection: Vec<(usize, u16)> = years
            .iter()
            .copied()
            .filter(|(c, _)| Some(*c) != base)
            .collect();

        let scenarios = match find_label_row(grid, year_row) {
            Some(label_row) => {
                debug!(label_row, "assigning scenario columns from labels");
                by_label(grid, label_row, &projection)
            }
            None => by_occurrence(&projection),
        };

        Self { base, scenarios }
    }

    /// Locate from the first row carrying the base year in column 1, falling
    /// back to the canonical layout
    pub fn locate_or_canonical(grid: &SheetGrid) -> Self {
        match grid.find_row_with(1, BASE_YEAR) {
            Some(row) => Self::locate(grid, row),
            None => Self::canonical(),
        }
    }

    /// Columns of one scenario
    pub fn columns(&self, scenario: Scenario) -> &[(u16, usize)] {
        self.scenarios
            .get(&scenario)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All projection years, sorted and unique
    pub fn years(&self) -> Vec<u16> {
        let mut years: Vec<u16> = self
            .scenarios
            .values()
            .flat_map(|cols| cols.iter().map(|(y, _)| *y))
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Build a projection from one data row
    pub fn read(&self, grid: &SheetGrid, row: usize, label: &str) -> Projection {
        let mut projection = Projection::new(label);
        projection.base = self.base.and_then(|c| grid.number(row, c));
        for (scenario, cols) in &self.scenarios {
            for (year, col) in cols {
                if let Some(value) = grid.number(row, *col) {
                    projection.set(*scenario, *year, value);
                }
            }
        }
        projection
    }
}

/// Nearest row above the year row that names at least one scenario
fn find_label_row(grid: &SheetGrid, year_row: usize) -> Option<usize> {
    (0..year_row).rev().find(|&r| {
        (1..grid.width()).any(|c| {
            grid.text(r, c)
                .map(|t| t.to_lowercase().contains("scenario") && Scenario::from_label(t).is_some())
                .unwrap_or(false)
        })
    })
}

fn by_label(
    grid: &SheetGrid,
    label_row: usize,
    projection: &[(usize, u16)],
) -> BTreeMap<Scenario, Vec<(u16, usize)>> {
    let mut scenarios: BTreeMap<Scenario, Vec<(u16, usize)>> = BTreeMap::new();
    let mut current = None;
    let mut next = projection.iter().peekable();
    for col in 1..grid.width() {
        if let Some(scenario) = grid.text(label_row, col).and_then(Scenario::from_label) {
            current = Some(scenario);
        }
        if let Some(&&(c, year)) = next.peek() {
            if c == col {
                next.next();
                if let Some(scenario) = current {
                    scenarios.entry(scenario).or_default().push((year, c));
                }
            }
        }
    }
    scenarios
}

fn by_occurrence(projection: &[(usize, u16)]) -> BTreeMap<Scenario, Vec<(u16, usize)>> {
    let mut seen: BTreeMap<u16, usize> = BTreeMap::new();
    let mut scenarios: BTreeMap<Scenario, Vec<(u16, usize)>> = BTreeMap::new();
    for (col, year) in projection {
        let k = seen.entry(*year).or_insert(0);
        if let Some(scenario) = Scenario::ALL.get(*k) {
            scenarios.entry(*scenario).or_default().push((*year, *col));
        }
        *k += 1;
    }
    scenarios
}
