//! Table 2 - total supply for key minerals
//!
//! Each mineral opens with a `<Mineral> - Mining` row and later switches to a
//! `<Mineral> - Refining` section; country rows follow. Every year appears
//! twice in the year row: the first column holds mining output, the second
//! refining output.

use crate::error::{OutlookError, OutlookResult};
use crate::excel::{ExcelExporter, SheetGrid};
use crate::types::{Activity, Cell, SheetTable, SupplySeries, BASE_YEAR};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const SHEET: &str = "2 Total supply for key minerals";
pub const MINING_FILE: &str = "mineral_supply_mining.xlsx";
pub const REFINING_FILE: &str = "mineral_supply_refining.xlsx";

/// Labels that never name a country
const NON_COUNTRY_MARKERS: [&str; 4] = ["- Mining", "- Refining", "Notes:", "Base case"];

/// Country series of one mineral, in first-seen order
#[derive(Debug, Clone, PartialEq)]
pub struct MineralSupply {
    pub mineral: String,
    pub countries: Vec<SupplySeries>,
}

impl MineralSupply {
    pub fn new(mineral: impl Into<String>) -> Self {
        Self {
            mineral: mineral.into(),
            countries: Vec::new(),
        }
    }

    pub fn country(&self, name: &str) -> Option<&SupplySeries> {
        self.countries.iter().find(|c| c.country == name)
    }

    fn country_mut(&mut self, name: &str) -> &mut SupplySeries {
        let index = match self.countries.iter().position(|c| c.country == name) {
            Some(i) => i,
            None => {
                self.countries.push(SupplySeries::new(name));
                self.countries.len() - 1
            }
        };
        &mut self.countries[index]
    }

    /// Countries with data for an activity, "Total" rows included
    pub fn with_activity(&self, activity: Activity) -> impl Iterator<Item = &SupplySeries> {
        self.countries
            .iter()
            .filter(move |c| !c.activity(activity).is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplyTable {
    pub years: Vec<u16>,
    pub minerals: Vec<MineralSupply>,
}

/// Parse the supply sheet
pub fn parse(grid: SheetGrid) -> OutlookResult<SupplyTable> {
    let grid = grid.drop_empty();
    let year_row = grid
        .find_row_containing(BASE_YEAR)
        .ok_or_else(|| {
            OutlookError::Layout(format!("{}: no row containing {}", SHEET, BASE_YEAR))
        })?;

    // year -> columns, in column order
    let mut year_columns: BTreeMap<u16, Vec<usize>> = BTreeMap::new();
    for col in 0..grid.width() {
        if let Some(year) = grid.year(year_row, col) {
            year_columns.entry(year).or_default().push(col);
        }
    }
    debug!(?year_columns, "supply year columns");

    let mut minerals: Vec<MineralSupply> = Vec::new();
    let mut section = Activity::Mining;

    for row in year_row + 1..grid.height() {
        let Some(label) = grid.label(row) else {
            continue;
        };

        if label.contains(" - Mining") {
            let name = label.split(" - ").next().unwrap_or(label).trim();
            debug!(mineral = name, "mineral block");
            minerals.push(MineralSupply::new(name));
            section = Activity::Mining;
            continue;
        }
        if label.contains(" - Refining") {
            section = Activity::Refining;
            continue;
        }

        let Some(current) = minerals.last_mut() else {
            continue;
        };
        if label == current.mineral || NON_COUNTRY_MARKERS.iter().any(|m| label.contains(m)) {
            continue;
        }

        let mining = activity_values(&grid, row, &year_columns, 0);
        let refining = activity_values(&grid, row, &year_columns, 1);
        debug!(country = label, section = section.label(), "country row");

        let series = current.country_mut(label);
        if series.mining.is_empty() && !mining.is_empty() {
            series.mining = mining;
        }
        if series.refining.is_empty() && !refining.is_empty() {
            series.refining = refining;
        }
    }

    for mineral in &mut minerals {
        mineral
            .countries
            .retain(|c| !c.mining.is_empty() || !c.refining.is_empty());
    }
    minerals.retain(|m| {
        let keep = !m.countries.is_empty();
        if !keep {
            warn!(mineral = %m.mineral, "no country data, skipping");
        }
        keep
    });

    if minerals.is_empty() {
        return Err(OutlookError::NoData(format!("{}: no mineral blocks", SHEET)));
    }

    Ok(SupplyTable {
        years: year_columns.keys().copied().collect(),
        minerals,
    })
}

/// Values from the n-th occurrence of each year
fn activity_values(
    grid: &SheetGrid,
    row: usize,
    year_columns: &BTreeMap<u16, Vec<usize>>,
    occurrence: usize,
) -> BTreeMap<u16, f64> {
    year_columns
        .iter()
        .filter_map(|(year, cols)| {
            let col = *cols.get(occurrence)?;
            grid.number(row, col).map(|v| (*year, v))
        })
        .collect()
}

impl SupplyTable {
    pub fn mineral(&self, name: &str) -> Option<&MineralSupply> {
        self.minerals.iter().find(|m| m.mineral == name)
    }

    pub fn mineral_names(&self) -> Vec<&str> {
        self.minerals.iter().map(|m| m.mineral.as_str()).collect()
    }

    /// (mineral, countries) pairs for the summary helpers
    pub fn series(&self) -> Vec<(String, Vec<SupplySeries>)> {
        self.minerals
            .iter()
            .map(|m| (m.mineral.clone(), m.countries.clone()))
            .collect()
    }

    /// One mineral's sheet for an activity; `None` when no country has data
    pub fn activity_table(
        &self,
        mineral: &MineralSupply,
        activity: Activity,
    ) -> Option<SheetTable> {
        let mut headers = vec!["Country".to_string()];
        headers.extend(self.years.iter().map(|y| format!("{}_{}", activity.label(), y)));

        let mut table = SheetTable::new(mineral.mineral.clone(), headers);
        for series in mineral.with_activity(activity) {
            let mut row = vec![Cell::from(series.country.as_str())];
            row.extend(self.years.iter().map(|y| Cell::from(series.value(activity, *y))));
            table.push_row(row);
        }
        (!table.is_empty()).then_some(table)
    }

    pub fn workbook(&self, activity: Activity) -> OutlookResult<ExcelExporter> {
        let mut exporter = ExcelExporter::new();
        for mineral in &self.minerals {
            if let Some(table) = self.activity_table(mineral, activity) {
                exporter.add_table(table)?;
            }
        }
        if exporter.is_empty() {
            exporter.add_note_sheet(
                "Overview",
                vec![format!("No {} data", activity.slug())],
            )?;
        }
        Ok(exporter)
    }

    /// Mining and refining workbooks
    pub fn workbooks(&self) -> OutlookResult<Vec<(&'static str, ExcelExporter)>> {
        Ok(vec![
            (MINING_FILE, self.workbook(Activity::Mining)?),
            (REFINING_FILE, self.workbook(Activity::Refining)?),
        ])
    }
}
