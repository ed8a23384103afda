//! Tables 4.1-4.6 - material intensity by clean technology
//!
//! The six sheets share one shape: a stack of sections (technology variants
//! such as "Base case"), each with a year row and one row per material. A
//! preset names the sheet, its sections and the materials to keep.

use super::{projection_row, scenario_years};
use crate::error::{OutlookError, OutlookResult};
use crate::excel::{scenario_sheet_name, ExcelExporter, ScenarioColumns, SheetGrid};
use crate::types::{Cell, Projection, Scenario, SheetTable, BASE_YEAR};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Section assumed when a sheet has no section headers
pub const BASE_CASE: &str = "Base case";

/// How the cleaned workbook is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// One sheet per (section, scenario)
    SectionScenario,
    /// Combined data sheet, one sheet per section and one per scenario
    Combined,
}

/// Sheet-specific knowledge for one technology table
#[derive(Debug, PartialEq, Eq)]
pub struct TechnologyPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub sheet: &'static str,
    /// First line of the `Overview` sheet
    pub title: &'static str,
    pub sections: &'static [&'static str],
    pub materials: &'static [&'static str],
    pub output_file: &'static str,
    pub layout: OutputLayout,
}

pub static SOLAR_PV: TechnologyPreset = TechnologyPreset {
    id: "4.1",
    name: "Solar PV",
    sheet: "4.1 Solar PV",
    title: "Solar PV Technology Analysis by Scenario",
    sections: &[
        "Base case",
        "Comeback of high Cd-Te technology",
        "Wider adoption of Ga-As technology",
        "Wider adoption of perovskite solar cells",
    ],
    materials: &[
        "Cadmium",
        "Copper",
        "Gallium",
        "Germanium",
        "Indium",
        "Lead",
        "Molybdenum",
        "Nickel",
        "Selenium",
        "Silicon",
        "Silver",
        "Tellurium",
        "Tin",
        "Zinc",
        "Arsenic",
    ],
    output_file: "4_1_solar_pv_scenarios.xlsx",
    layout: OutputLayout::SectionScenario,
};

pub static WIND: TechnologyPreset = TechnologyPreset {
    id: "4.2",
    name: "Wind",
    sheet: "4.2 Wind",
    title: "Wind Technology Analysis by Scenario",
    sections: &["Base case", "Constrained rare earth elements supply"],
    materials: &[
        "Boron",
        "Chromium",
        "Copper",
        "Manganese",
        "Molybdenum",
        "Nickel",
        "Zinc",
        "Neodymium",
        "Dysprosium",
        "Praseodymium",
        "Terbium",
        "Total wind",
    ],
    output_file: "4_2_wind_scenarios.xlsx",
    layout: OutputLayout::Combined,
};

pub static ELECTRIC_VEHICLES: TechnologyPreset = TechnologyPreset {
    id: "4.3",
    name: "Electric vehicles",
    sheet: "4.3 EV",
    title: "EV Technology Analysis by Scenario",
    sections: &[
        "Base case",
        "High material prices",
        "Wider use of silicon-rich anodes",
        "Faster uptake of solid state batteries",
        "Lower battery sizes",
        "Limited battery size reduction",
    ],
    materials: &[
        "Copper",
        "Cobalt",
        "Battery-grade graphite",
        "Lithium",
        "Manganese",
        "Nickel",
        "Silicon",
        "Neodymium",
        "Dysprosium",
        "Praseodymium",
        "Terbium",
        "Total EV",
    ],
    output_file: "4_3_ev_scenarios.xlsx",
    layout: OutputLayout::SectionScenario,
};

pub static GRID_STORAGE: TechnologyPreset = TechnologyPreset {
    id: "4.4",
    name: "Grid battery storage",
    sheet: "4.4 Grid battery storage",
    title: "Grid Battery Storage Analysis by Scenario",
    sections: &["Base case"],
    materials: &[
        "Copper",
        "Cobalt",
        "Battery-grade graphite",
        "Lithium",
        "Manganese",
        "Nickel",
        "Silicon",
        "Vanadium",
    ],
    output_file: "4_4_grid_storage_scenarios.xlsx",
    layout: OutputLayout::SectionScenario,
};

pub static ELECTRICITY_NETWORKS: TechnologyPreset = TechnologyPreset {
    id: "4.5",
    name: "Electricity networks",
    sheet: "4.5 Electricity networks",
    title: "Electricity Networks Analysis by Scenario",
    sections: &["Base case", "Wider direct current (DC) technology development"],
    materials: &["Copper"],
    output_file: "4_5_electricity_networks_scenarios.xlsx",
    layout: OutputLayout::SectionScenario,
};

pub static HYDROGEN: TechnologyPreset = TechnologyPreset {
    id: "4.6",
    name: "Hydrogen",
    sheet: "4.6 Hydrogen",
    title: "Hydrogen Technology Analysis by Scenario",
    sections: &["Base case"],
    materials: &[
        "Copper",
        "Cobalt",
        "Iridium",
        "Nickel",
        "PGMs (other than iridium)",
        "Zirconium",
        "Yttrium",
        "Total hydrogen technologies",
    ],
    output_file: "4_6_hydrogen_scenarios.xlsx",
    layout: OutputLayout::SectionScenario,
};

/// Materials of one technology variant
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub columns: ScenarioColumns,
    pub materials: Vec<Projection>,
}

impl Section {
    pub fn material(&self, name: &str) -> Option<&Projection> {
        self.materials.iter().find(|m| m.label == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TechnologyTable {
    pub preset: &'static TechnologyPreset,
    pub sections: Vec<Section>,
}

/// Row span of each section found in the sheet, in row order
fn section_spans(grid: &SheetGrid, preset: &TechnologyPreset) -> Vec<(String, usize, usize)> {
    let mut starts: Vec<(usize, &str)> = preset
        .sections
        .iter()
        .filter_map(|name| {
            (0..grid.height())
                .find(|&r| grid.label(r).map(|l| l.contains(name)).unwrap_or(false))
                .map(|r| (r, *name))
        })
        .collect();
    starts.sort_by_key(|(row, _)| *row);

    if starts.is_empty() {
        debug!(sheet = preset.sheet, "no section headers, using whole sheet");
        return vec![(BASE_CASE.to_string(), 0, grid.height())];
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, (start, name))| {
            let end = starts.get(i + 1).map(|(r, _)| *r).unwrap_or(grid.height());
            (name.to_string(), *start, end)
        })
        .collect()
}

/// Parse one technology sheet with its preset
pub fn parse(grid: SheetGrid, preset: &'static TechnologyPreset) -> OutlookResult<TechnologyTable> {
    let grid = grid.drop_empty();
    let sheet_year_row = grid.find_row_with(1, BASE_YEAR);

    let mut sections = Vec::new();
    for (name, start, end) in section_spans(&grid, preset) {
        let section_year_row = grid.find_row_with_in(1, BASE_YEAR, start, end);
        let columns = match section_year_row.or(sheet_year_row) {
            Some(row) => ScenarioColumns::locate(&grid, row),
            None => {
                debug!(section = %name, "no year row, using canonical columns");
                ScenarioColumns::canonical()
            }
        };
        let first_data_row = section_year_row.map(|r| r + 1).unwrap_or(start);

        let materials: Vec<Projection> = (first_data_row..end)
            .filter_map(|row| {
                let label = grid.label(row)?;
                preset
                    .materials
                    .contains(&label)
                    .then(|| columns.read(&grid, row, label))
            })
            .collect();

        if materials.is_empty() {
            warn!(sheet = preset.sheet, section = %name, "section has no materials");
            continue;
        }
        debug!(section = %name, materials = materials.len(), "parsed section");
        sections.push(Section {
            name,
            columns,
            materials,
        });
    }

    if sections.is_empty() {
        return Err(OutlookError::NoData(format!("{}: no material rows", preset.sheet)));
    }
    Ok(TechnologyTable { preset, sections })
}

impl TechnologyTable {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    /// Material names in preset order, as found in any section
    pub fn material_names(&self) -> Vec<&'static str> {
        self.preset
            .materials
            .iter()
            .copied()
            .filter(|m| self.sections.iter().any(|s| s.material(m).is_some()))
            .collect()
    }

    /// Projection years of a scenario across all sections
    fn projection_years(&self, scenario: Scenario) -> Vec<u16> {
        let years: BTreeSet<u16> = self
            .sections
            .iter()
            .flat_map(|s| s.columns.columns(scenario).iter().map(|(y, _)| *y))
            .collect();
        years.into_iter().collect()
    }

    /// `<section>_<scenario>` sheet: `Material`, `2023`, `<Scenario>_<year>`
    pub fn section_scenario_table(
        &self,
        section: &Section,
        scenario: Scenario,
    ) -> OutlookResult<SheetTable> {
        let years = scenario_years(&section.columns, scenario);
        let mut headers = vec!["Material".to_string(), BASE_YEAR.to_string()];
        headers.extend(years.iter().skip(1).map(|y| format!("{}_{}", scenario.label(), y)));

        let mut table = SheetTable::new(scenario_sheet_name(&section.name, scenario)?, headers);
        for material in &section.materials {
            table.push_row(projection_row(material, scenario, &years));
        }
        Ok(table)
    }

    /// Rows with `Section`, `Material`, `2023` and the given scenarios' years
    fn combined_table(
        &self,
        name: &str,
        sections: &[&Section],
        scenarios: &[Scenario],
    ) -> SheetTable {
        let layout: Vec<(Scenario, u16)> = scenarios
            .iter()
            .flat_map(|s| self.projection_years(*s).into_iter().map(move |y| (*s, y)))
            .collect();

        let mut headers = vec![
            "Section".to_string(),
            "Material".to_string(),
            BASE_YEAR.to_string(),
        ];
        headers.extend(layout.iter().map(|(s, y)| format!("{}_{}", s.label(), y)));

        let mut table = SheetTable::new(name, headers);
        for section in sections {
            for material in &section.materials {
                let mut row = vec![
                    Cell::from(section.name.as_str()),
                    Cell::from(material.label.as_str()),
                    Cell::from(material.base),
                ];
                row.extend(layout.iter().map(|(s, y)| Cell::from(material.value(*s, *y))));
                table.push_row(row);
            }
        }
        table
    }

    pub fn workbook(&self) -> OutlookResult<ExcelExporter> {
        let mut exporter = ExcelExporter::new();
        exporter.add_note_sheet(
            "Overview",
            vec![
                self.preset.title.to_string(),
                format!("Source sheet: {}", self.preset.sheet),
                format!("Sections: {}", self.section_names().join(", ")),
            ],
        )?;

        match self.preset.layout {
            OutputLayout::SectionScenario => {
                for section in &self.sections {
                    for scenario in Scenario::ALL {
                        exporter.add_table(self.section_scenario_table(section, scenario)?)?;
                    }
                }
            }
            OutputLayout::Combined => {
                let all: Vec<&Section> = self.sections.iter().collect();
                let data_sheet = format!("{}_Data", self.preset.name);
                exporter.add_table(self.combined_table(&data_sheet, &all, &Scenario::ALL))?;
                for section in &self.sections {
                    let sheet = self.combined_table(&section.name, &[section], &Scenario::ALL);
                    exporter.add_table(sheet)?;
                }
                for scenario in Scenario::ALL {
                    exporter.add_table(self.combined_table(scenario.label(), &all, &[scenario]))?;
                }
            }
        }
        Ok(exporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn year_row() -> Vec<Cell> {
        let mut years = vec![Cell::Empty, Cell::Number(2023.0)];
        for _ in 0..3 {
            years.extend([2030.0, 2035.0, 2040.0, 2045.0, 2050.0].map(Cell::Number));
        }
        years
    }

    /// Base value in column 1, then 1..=15 times `scale`
    fn material(label: &str, base: f64, scale: f64) -> Vec<Cell> {
        let mut row = vec![t(label), Cell::Number(base)];
        row.extend((1..=15).map(|i| Cell::Number(i as f64 * scale)));
        row
    }

    fn wind_grid() -> SheetGrid {
        SheetGrid::new(vec![
            vec![t("Wind (kt)")],
            vec![t("Base case")],
            year_row(),
            material("Copper", 100.0, 10.0),
            material("Neodymium", 5.0, 1.0),
            material("Wind turbines", 1.0, 1.0),
            vec![t("Constrained rare earth elements supply")],
            year_row(),
            material("Neodymium", 5.0, 0.5),
            material("Total wind", 200.0, 20.0),
        ])
    }

    #[test]
    fn test_sections_split_at_next_header() {
        let table = parse(wind_grid(), &WIND).unwrap();
        assert_eq!(
            table.section_names(),
            vec!["Base case", "Constrained rare earth elements supply"]
        );
        let base = table.section("Base case").unwrap();
        let labels: Vec<&str> = base.materials.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Copper", "Neodymium"]);

        let constrained = table.section("Constrained rare earth elements supply").unwrap();
        let nd = constrained.material("Neodymium").unwrap();
        assert_eq!(nd.value(Scenario::NetZero, 2050), Some(7.5));
        assert_eq!(nd.base, Some(5.0));
    }

    #[test]
    fn test_material_names_follow_preset_order() {
        let table = parse(wind_grid(), &WIND).unwrap();
        assert_eq!(table.material_names(), vec!["Copper", "Neodymium", "Total wind"]);
    }

    #[test]
    fn test_wind_combined_layout() {
        let table = parse(wind_grid(), &WIND).unwrap();
        let exporter = table.workbook().unwrap();
        assert_eq!(
            exporter.sheet_names(),
            vec![
                "Overview",
                "Wind_Data",
                "Base case",
                "Constrained rare earth elements",
                "Stated Policies",
                "Announced Pledges",
                "Net Zero"
            ]
        );

        let all: Vec<&Section> = table.sections.iter().collect();
        let data = table.combined_table("Wind_Data", &all, &Scenario::ALL);
        assert_eq!(data.headers.len(), 3 + 15);
        assert_eq!(data.headers[3], "Stated Policies_2030");
        assert_eq!(data.rows.len(), 4);

        let nz = table.combined_table("Net Zero", &all, &[Scenario::NetZero]);
        assert_eq!(nz.headers[3], "Net Zero_2030");
        assert_eq!(nz.get(0, "Net Zero_2050"), Some(&Cell::Number(150.0)));
    }

    #[test]
    fn test_section_scenario_sheets() {
        let grid = SheetGrid::new(vec![
            year_row(),
            material("Copper", 4143.5, 100.0),
            vec![t("Wider direct current (DC) technology development")],
            material("Copper", 4118.4, 90.0),
        ]);
        let table = parse(grid, &ELECTRICITY_NETWORKS).unwrap();
        // The second section has no year row of its own
        let dc = table
            .section("Wider direct current (DC) technology development")
            .unwrap();
        let copper = dc.material("Copper").unwrap();
        assert_eq!(copper.value(Scenario::StatedPolicies, 2030), Some(90.0));

        // Rows before the first header form no section
        assert_eq!(table.sections.len(), 1);

        let sheet = table.section_scenario_table(dc, Scenario::AnnouncedPledges).unwrap();
        assert_eq!(
            sheet.headers,
            vec![
                "Material",
                "2023",
                "Announced Pledges_2030",
                "Announced Pledges_2035",
                "Announced Pledges_2040",
                "Announced Pledges_2045",
                "Announced Pledges_2050"
            ]
        );
        assert_eq!(sheet.get(0, "2023"), Some(&Cell::Number(4118.4)));
    }

    #[test]
    fn test_section_scenario_names_never_collide() {
        let presets = [
            &SOLAR_PV,
            &ELECTRIC_VEHICLES,
            &GRID_STORAGE,
            &ELECTRICITY_NETWORKS,
            &HYDROGEN,
        ];
        for preset in presets {
            let mut seen = BTreeSet::new();
            for section in preset.sections {
                for scenario in Scenario::ALL {
                    let name = scenario_sheet_name(section, scenario).unwrap();
                    assert!(name.chars().count() <= 31, "{} is too long", name);
                    assert!(seen.insert(name.to_lowercase()), "{} repeats in {}", name, preset.id);
                }
            }
        }
    }

    #[test]
    fn test_long_section_exports_every_scenario() {
        let section = "Comeback of high Cd-Te technology";
        let grid = SheetGrid::new(vec![
            vec![t("Base case")],
            year_row(),
            material("Cadmium", 1.0, 1.0),
            vec![t(section)],
            year_row(),
            material("Cadmium", 2.0, 2.0),
        ]);
        let table = parse(grid, &SOLAR_PV).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(SOLAR_PV.output_file);
        table.workbook().unwrap().export(&path).unwrap();

        for (scenario, end) in [
            (Scenario::StatedPolicies, 10.0),
            (Scenario::AnnouncedPledges, 20.0),
            (Scenario::NetZero, 30.0),
        ] {
            let sheet = scenario_sheet_name(section, scenario).unwrap();
            let cleaned = crate::excel::read_table(&path, &sheet).unwrap();
            let header = format!("{}_2050", scenario.label());
            assert_eq!(cleaned.get(0, &header), Some(&Cell::Number(end)), "{}", sheet);
        }
    }

    #[test]
    fn test_sheet_without_sections_is_base_case() {
        let grid = SheetGrid::new(vec![
            vec![t("Hydrogen (kt)")],
            year_row(),
            material("Iridium", 0.01, 0.01),
            material("Platinum", 1.0, 1.0),
        ]);
        let table = parse(grid, &HYDROGEN).unwrap();
        assert_eq!(table.section_names(), vec![BASE_CASE]);
        assert_eq!(table.material_names(), vec!["Iridium"]);
        let exporter = table.workbook().unwrap();
        assert_eq!(exporter.sheet_names().len(), 1 + 3);
    }

    #[test]
    fn test_canonical_columns_without_year_row() {
        let grid = SheetGrid::new(vec![
            vec![t("Base case")],
            material("Vanadium", 1.0, 2.0),
        ]);
        let table = parse(grid, &GRID_STORAGE).unwrap();
        let v = table.section(BASE_CASE).unwrap().material("Vanadium").unwrap();
        assert_eq!(v.value(Scenario::AnnouncedPledges, 2030), Some(12.0));
    }

    #[test]
    fn test_no_materials_is_no_data() {
        let grid = SheetGrid::new(vec![year_row(), material("Unobtainium", 1.0, 1.0)]);
        assert!(matches!(parse(grid, &SOLAR_PV), Err(OutlookError::NoData(_))));
    }
}
