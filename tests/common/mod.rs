//! Shared fixture: a small workbook laid out like the data explorer

#![allow(dead_code)]

use mineral_outlook::config::OutlookConfig;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A fixture cell; `None` is left blank
pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Number(f64),
}

pub fn t(s: &str) -> Option<Value> {
    Some(Value::Text(s.to_string()))
}

pub fn n(v: f64) -> Option<Value> {
    Some(Value::Number(v))
}

/// Blank label cell followed by 2023 and three scenario blocks of 2030-2050
pub fn year_row() -> Row {
    let mut years = vec![None, n(2023.0)];
    for _ in 0..3 {
        years.extend([2030.0, 2035.0, 2040.0, 2045.0, 2050.0].map(n));
    }
    years
}

/// Label, base value, then 15 projections `base + step * i`
pub fn projection(label: &str, base: f64, step: f64) -> Row {
    let mut row = vec![t(label), n(base)];
    row.extend((1..=15).map(|i| n(base + step * i as f64)));
    row
}

pub fn demand_sheet() -> Vec<Row> {
    let mut labels: Row = vec![None; 17];
    labels[2] = t("Stated Policies scenario");
    labels[7] = t("Announced Pledges scenario");
    labels[12] = t("Net Zero Emissions by 2050 scenario");
    vec![
        vec![t("Total demand for key minerals (kt)")],
        vec![],
        labels,
        year_row(),
        vec![t("Copper")],
        projection("Clean technologies", 10.0, 2.0),
        projection("Other uses", 20.0, 1.0),
        vec![t("Lithium")],
        projection("Clean technologies", 5.0, 10.0),
        projection("Other uses", 1.0, 0.5),
    ]
}

pub fn supply_sheet() -> Vec<Row> {
    let row = |label: &str, mining: [f64; 2], refining: [f64; 2]| {
        vec![t(label), n(mining[0]), n(mining[1]), None, n(refining[0]), n(refining[1])]
    };
    vec![
        vec![t("Total supply for key minerals (kt)")],
        vec![None, n(2023.0), n(2040.0), None, n(2023.0), n(2040.0)],
        vec![t("Copper - Mining")],
        row("Chile", [5.0, 6.0], [2.0, 1.0]),
        row("Peru", [2.0, 3.0], [1.0, 1.5]),
        row("China", [1.0, 1.5], [10.0, 14.0]),
        row("Total", [8.0, 10.5], [13.0, 16.5]),
        vec![t("Lithium - Mining")],
        row("Australia", [4.0, 6.0], [0.5, 1.0]),
        row("Chile", [2.0, 3.0], [3.0, 4.0]),
    ]
}

pub fn tech_demand_sheet() -> Vec<Row> {
    vec![
        vec![t("Cleantech demand by technology (kt)")],
        year_row(),
        vec![t("Copper")],
        projection("Solar PV", 1.0, 0.5),
        projection("Wind", 2.0, 0.25),
        vec![t("Lithium")],
        projection("EV", 100.0, 20.0),
        projection("Grid storage", 10.0, 5.0),
        projection("Total Lithium", 110.0, 25.0),
    ]
}

pub fn mineral_demand_sheet() -> Vec<Row> {
    let metal = |label: &str, base: f64| {
        let mut row = vec![t(label), n(base)];
        row.extend((1..=15).map(|i| n(base * i as f64)));
        row
    };
    vec![
        vec![t("Cleantech demand by mineral (kt)")],
        year_row(),
        metal("Boron", 1.0),
        metal("Copper", 4.0),
        metal("Lithium", 2.0),
        metal("Total", 7.0),
    ]
}

pub fn hydrogen_sheet() -> Vec<Row> {
    vec![
        vec![t("Hydrogen (kt)")],
        year_row(),
        projection("Iridium", 0.01, 0.01),
        projection("Nickel", 2.0, 1.0),
        projection("Total hydrogen technologies", 3.0, 1.5),
    ]
}

/// Solar PV with a section name too long for a full scenario suffix
pub fn solar_pv_sheet() -> Vec<Row> {
    vec![
        vec![t("Solar PV (kt)")],
        vec![t("Base case")],
        year_row(),
        projection("Cadmium", 1.0, 1.0),
        projection("Silver", 20.0, 2.0),
        vec![t("Comeback of high Cd-Te technology")],
        year_row(),
        projection("Cadmium", 2.0, 0.5),
        projection("Silver", 18.0, 1.0),
    ]
}

/// Sheets for tables 1, 2, 3.1, 3.2 and 4.6; the other 4.x sheets are missing
pub fn explorer_sheets() -> Vec<(&'static str, Vec<Row>)> {
    vec![
        ("Cover", vec![vec![t("Critical Minerals Data Explorer")]]),
        ("1 Total demand for key minerals", demand_sheet()),
        ("2 Total supply for key minerals", supply_sheet()),
        ("3.1 Cleantech demand by tech", tech_demand_sheet()),
        ("3.2 Cleantech demand by mineral", mineral_demand_sheet()),
        ("4.6 Hydrogen", hydrogen_sheet()),
    ]
}

pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Row>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Some(Value::Text(s)) => {
                        worksheet.write_string(r as u32, c as u16, s).unwrap();
                    }
                    Some(Value::Number(v)) => {
                        worksheet.write_number(r as u32, c as u16, *v).unwrap();
                    }
                    None => {}
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

/// Temp directory holding `explorer.xlsx`, with output and figure dirs
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write_workbook(&dir.path().join("explorer.xlsx"), &explorer_sheets());
        Self { dir }
    }

    pub fn input(&self) -> PathBuf {
        self.dir.path().join("explorer.xlsx")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn figures_dir(&self) -> PathBuf {
        self.dir.path().join("figures")
    }

    pub fn config(&self) -> OutlookConfig {
        OutlookConfig {
            input: self.input(),
            output_dir: self.output_dir(),
            figures_dir: self.figures_dir(),
            ..Default::default()
        }
    }
}
