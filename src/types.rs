use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// First year of every series, shared by all scenarios
pub const BASE_YEAR: u16 = 2023;

/// Last projection year
pub const TARGET_YEAR: u16 = 2050;

/// Projection years of the explorer tables (after the base year)
pub const PROJECTION_YEARS: [u16; 5] = [2030, 2035, 2040, 2045, 2050];

//==============================================================================
// Scenarios
//==============================================================================

/// Demand-projection pathway
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scenario {
    StatedPolicies,
    AnnouncedPledges,
    NetZero,
}

impl Scenario {
    /// All scenarios in the order the explorer lays them out
    pub const ALL: [Scenario; 3] = [
        Scenario::StatedPolicies,
        Scenario::AnnouncedPledges,
        Scenario::NetZero,
    ];

    /// Short display label ("Net Zero")
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::StatedPolicies => "Stated Policies",
            Scenario::AnnouncedPledges => "Announced Pledges",
            Scenario::NetZero => "Net Zero",
        }
    }

    /// IEA abbreviation, used where the full label does not fit
    pub fn code(&self) -> &'static str {
        match self {
            Scenario::StatedPolicies => "STEPS",
            Scenario::AnnouncedPledges => "APS",
            Scenario::NetZero => "NZE",
        }
    }

    /// Label as printed in the source workbook
    pub fn sheet_label(&self) -> &'static str {
        match self {
            Scenario::StatedPolicies => "Stated Policies scenario",
            Scenario::AnnouncedPledges => "Announced Pledges scenario",
            Scenario::NetZero => "Net Zero Emissions by 2050 scenario",
        }
    }

    /// One-line description shown on the dashboard
    pub fn description(&self) -> &'static str {
        match self {
            Scenario::StatedPolicies => "Base scenario reflecting current policies and trends",
            Scenario::AnnouncedPledges => "Scenario based on announced climate commitments",
            Scenario::NetZero => "Scenario targeting net zero emissions by 2050",
        }
    }

    /// Line colour used by every chart
    pub fn color(&self) -> &'static str {
        match self {
            Scenario::StatedPolicies => "#1f77b4",
            Scenario::AnnouncedPledges => "#d62728",
            Scenario::NetZero => "#2ca02c",
        }
    }

    /// Recognise a scenario in free text ("Net Zero Emissions by 2050 scenario")
    pub fn from_label(text: &str) -> Option<Scenario> {
        let lower = text.to_lowercase();
        if lower.contains("stated") {
            Some(Scenario::StatedPolicies)
        } else if lower.contains("announced") {
            Some(Scenario::AnnouncedPledges)
        } else if lower.contains("net zero") {
            Some(Scenario::NetZero)
        } else {
            None
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//==============================================================================
// Cells and sheet-ready tables
//==============================================================================

/// A single spreadsheet value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
        }
    }

    /// Numeric value; numeric text counts
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Trimmed text of a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    /// True when the cell is the given whole year
    pub fn is_year(&self, year: u16) -> bool {
        matches!(self, Cell::Number(n) if *n == f64::from(year))
    }

    /// Rendered form, used for column widths and previews
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => format!("{n}"),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<Option<f64>> for Cell {
    fn from(n: Option<f64>) -> Self {
        n.map(Cell::Number).unwrap_or(Cell::Empty)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// A table ready to be written to (or read back from) one worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Decimal places numbers are rounded to on export
    pub precision: Option<u32>,
}

impl SheetTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
            precision: Some(3),
        }
    }

    pub fn with_precision(mut self, precision: Option<u32>) -> Self {
        self.precision = precision;
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at (row, header)
    pub fn get(&self, row: usize, header: &str) -> Option<&Cell> {
        let col = self.column_index(header)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// First row whose first column carries `label`
    pub fn find_row(&self, label: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.first().and_then(Cell::as_text) == Some(label))
    }
}

//==============================================================================
// Projections
//==============================================================================

/// One labelled record (category, material, technology or metal) with its
/// base-year value and per-scenario projections in kilotons
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    pub label: String,
    pub base: Option<f64>,
    pub values: BTreeMap<Scenario, BTreeMap<u16, f64>>,
}

impl Projection {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn set(&mut self, scenario: Scenario, year: u16, value: f64) {
        self.values.entry(scenario).or_default().insert(year, value);
    }

    /// Value for a scenario and year; the base year resolves to the shared base
    pub fn value(&self, scenario: Scenario, year: u16) -> Option<f64> {
        if year == BASE_YEAR {
            return self.base;
        }
        self.values.get(&scenario).and_then(|s| s.get(&year)).copied()
    }

    /// Base year followed by the scenario's projection years
    pub fn series(&self, scenario: Scenario) -> Vec<(u16, f64)> {
        let mut points = Vec::new();
        if let Some(base) = self.base {
            points.push((BASE_YEAR, base));
        }
        if let Some(years) = self.values.get(&scenario) {
            points.extend(years.iter().map(|(y, v)| (*y, *v)));
        }
        points
    }

    pub fn has_values(&self) -> bool {
        self.base.is_some() || self.values.values().any(|s| !s.is_empty())
    }

    /// Years present for a scenario, base year included when known
    pub fn years(&self, scenario: Scenario) -> Vec<u16> {
        self.series(scenario).into_iter().map(|(y, _)| y).collect()
    }
}

//==============================================================================
// Supply
//==============================================================================

/// Mining or refining activity in the supply table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    Mining,
    Refining,
}

impl Activity {
    pub const ALL: [Activity; 2] = [Activity::Mining, Activity::Refining];

    pub fn label(&self) -> &'static str {
        match self {
            Activity::Mining => "Mining",
            Activity::Refining => "Refining",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Activity::Mining => "mining",
            Activity::Refining => "refining",
        }
    }
}

/// Production of one country for one mineral
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SupplySeries {
    pub country: String,
    pub mining: BTreeMap<u16, f64>,
    pub refining: BTreeMap<u16, f64>,
}

impl SupplySeries {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            ..Default::default()
        }
    }

    pub fn activity(&self, activity: Activity) -> &BTreeMap<u16, f64> {
        match activity {
            Activity::Mining => &self.mining,
            Activity::Refining => &self.refining,
        }
    }

    pub fn value(&self, activity: Activity, year: u16) -> Option<f64> {
        self.activity(activity).get(&year).copied()
    }

    /// The "Total" row of a mineral block
    pub fn is_total(&self) -> bool {
        self.country.eq_ignore_ascii_case("total")
    }
}
