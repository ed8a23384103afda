//! Growth figures recomputed from the cleaned workbooks
//!
//! Each table page can ask for the start and end values of its selected
//! entity and the growth between them. Values are read back from the
//! workbooks the clean stage wrote, never from the source explorer.

use crate::analysis::growth_pct;
use crate::charts::naming::SUPPLY_YEARS;
use crate::config::OutlookConfig;
use crate::error::{OutlookError, OutlookResult};
use crate::excel::{clean_sheet_name, scenario_sheet_name, SourceWorkbook};
use crate::tables::technology::OutputLayout;
use crate::tables::{demand, mineral_demand, supply, tech_demand, TableId};
use crate::types::{Activity, Cell, Scenario, BASE_YEAR};
use serde::Serialize;
use tracing::debug;

/// Start, end and growth of one row under one scenario or activity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightRow {
    pub label: String,
    /// Scenario or activity label
    pub group: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub growth_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub table: String,
    pub select: String,
    pub start_year: u16,
    pub end_year: u16,
    pub rows: Vec<InsightRow>,
}

/// A cleaned sheet and the two columns compared in it
#[derive(Debug, Clone, PartialEq)]
struct Probe {
    file: &'static str,
    sheet: String,
    group: String,
    start: String,
    end: String,
}

impl Probe {
    fn new(file: &'static str, sheet: String, group: &str, start: String, end: String) -> Self {
        Self {
            file,
            sheet,
            group: group.to_string(),
            start,
            end,
        }
    }
}

/// Years compared on a table's insights
pub fn insight_years(table: TableId, config: &OutlookConfig) -> (u16, u16) {
    match table {
        TableId::Supply => (SUPPLY_YEARS[0], SUPPLY_YEARS[1]),
        _ => (BASE_YEAR, config.target_year),
    }
}

fn probes(table: TableId, select: &str, config: &OutlookConfig) -> OutlookResult<Vec<Probe>> {
    let (start, end) = insight_years(table, config);
    let probes = match table {
        TableId::Demand => Scenario::ALL
            .iter()
            .map(|s| {
                Probe::new(
                    demand::OUTPUT_FILE,
                    select.to_string(),
                    s.label(),
                    format!("{}_{}", s.sheet_label(), start),
                    format!("{}_{}", s.sheet_label(), end),
                )
            })
            .collect(),
        TableId::Supply => Activity::ALL
            .iter()
            .map(|a| {
                let file = match a {
                    Activity::Mining => supply::MINING_FILE,
                    Activity::Refining => supply::REFINING_FILE,
                };
                Probe::new(
                    file,
                    select.to_string(),
                    a.label(),
                    format!("{}_{}", a.label(), start),
                    format!("{}_{}", a.label(), end),
                )
            })
            .collect(),
        TableId::TechDemand => Scenario::ALL
            .iter()
            .map(|s| {
                Ok(Probe::new(
                    tech_demand::OUTPUT_FILE,
                    scenario_sheet_name(select, *s)?,
                    s.label(),
                    start.to_string(),
                    end.to_string(),
                ))
            })
            .collect::<OutlookResult<_>>()?,
        TableId::MineralDemand => {
            let scenario = Scenario::from_label(select)
                .ok_or_else(|| OutlookError::NotFound(format!("scenario '{}'", select)))?;
            vec![Probe::new(
                mineral_demand::OUTPUT_FILE,
                scenario.label().to_string(),
                scenario.label(),
                start.to_string(),
                end.to_string(),
            )]
        }
        other => {
            let preset = other.technology_preset().ok_or_else(|| {
                OutlookError::Config(format!("No insights for table {}", other.id()))
            })?;
            Scenario::ALL
                .iter()
                .map(|s| {
                    let sheet = match preset.layout {
                        OutputLayout::SectionScenario => scenario_sheet_name(select, *s)?,
                        OutputLayout::Combined => select.to_string(),
                    };
                    Ok(Probe::new(
                        preset.output_file,
                        sheet,
                        s.label(),
                        start.to_string(),
                        format!("{}_{}", s.label(), end),
                    ))
                })
                .collect::<OutlookResult<_>>()?
        }
    };
    Ok(probes)
}

/// Growth rows for the selected entity, optionally limited to one material
pub fn insights(
    table: TableId,
    select: &str,
    material: Option<&str>,
    config: &OutlookConfig,
) -> OutlookResult<Insights> {
    let (start_year, end_year) = insight_years(table, config);
    let mut rows = Vec::new();
    let mut found = 0;

    let probes = probes(table, select, config)?;
    let mut files: Vec<&'static str> = probes.iter().map(|p| p.file).collect();
    files.dedup();

    for file in files {
        let mut workbook = SourceWorkbook::open(config.output_path(file))?;
        let names = workbook.sheet_names();
        for probe in probes.iter().filter(|p| p.file == file) {
            let sheet = clean_sheet_name(&probe.sheet)?;
            if !names.contains(&sheet) {
                debug!(file, sheet = %sheet, "sheet not in cleaned workbook");
                continue;
            }
            found += 1;
            let sheet_table = workbook.table(&sheet)?;
            let label_col = sheet_table.column_index("Material").unwrap_or(0);
            for (i, row) in sheet_table.rows.iter().enumerate() {
                let Some(label) = row.get(label_col).and_then(Cell::as_text) else {
                    continue;
                };
                if material.is_some_and(|m| m != label) {
                    continue;
                }
                let start = sheet_table.get(i, &probe.start).and_then(Cell::as_number);
                let end = sheet_table.get(i, &probe.end).and_then(Cell::as_number);
                rows.push(InsightRow {
                    label: label.to_string(),
                    group: probe.group.clone(),
                    start,
                    end,
                    growth_pct: start.zip(end).and_then(|(s, e)| growth_pct(s, e)),
                });
            }
        }
    }

    if found == 0 {
        return Err(OutlookError::NotFound(format!(
            "no cleaned data for '{}' in {}",
            select, table
        )));
    }
    Ok(Insights {
        table: table.id().to_string(),
        select: select.to_string(),
        start_year,
        end_year,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::ExcelExporter;
    use crate::types::SheetTable;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> OutlookConfig {
        OutlookConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    fn write(dir: &TempDir, file: &str, tables: Vec<SheetTable>) {
        let mut exporter = ExcelExporter::new();
        for table in tables {
            exporter.add_table(table).unwrap();
        }
        exporter.export(&dir.path().join(file)).unwrap();
    }

    #[test]
    fn test_mineral_demand_growth() {
        let dir = TempDir::new().unwrap();
        let mut table =
            SheetTable::new("Net Zero", vec!["Metal".into(), "2023".into(), "2050".into()]);
        table.push_row(vec!["Lithium".into(), 2.0.into(), 10.0.into()]);
        table.push_row(vec!["Cobalt".into(), 0.0.into(), 1.0.into()]);
        write(&dir, mineral_demand::OUTPUT_FILE, vec![table]);

        let result = insights(TableId::MineralDemand, "Net Zero", None, &config(&dir)).unwrap();
        assert_eq!(result.start_year, 2023);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].growth_pct, Some(400.0));
        assert_eq!(result.rows[1].growth_pct, None);
    }

    #[test]
    fn test_combined_layout_filters_material() {
        let dir = TempDir::new().unwrap();
        let mut table = SheetTable::new(
            "Base case",
            vec![
                "Section".into(),
                "Material".into(),
                "2023".into(),
                "Net Zero_2050".into(),
            ],
        );
        table.push_row(vec!["Base case".into(), "Copper".into(), 10.0.into(), 15.0.into()]);
        table.push_row(vec!["Base case".into(), "Neodymium".into(), 1.0.into(), 3.0.into()]);
        write(&dir, "4_2_wind_scenarios.xlsx", vec![table]);

        let result =
            insights(TableId::Wind, "Base case", Some("Neodymium"), &config(&dir)).unwrap();
        // Every scenario probes the same sheet; only Net Zero has an end column
        assert_eq!(result.rows.len(), 3);
        let net_zero = result.rows.iter().find(|r| r.group == "Net Zero").unwrap();
        assert_eq!(net_zero.growth_pct, Some(200.0));
        let stated = result.rows.iter().find(|r| r.group == "Stated Policies").unwrap();
        assert_eq!(stated.end, None);
    }

    #[test]
    fn test_missing_workbook_and_sheet() {
        let dir = TempDir::new().unwrap();
        let err = insights(TableId::MineralDemand, "Net Zero", None, &config(&dir)).unwrap_err();
        assert!(matches!(err, OutlookError::NotFound(_)));

        let table = SheetTable::new("Stated Policies", vec!["Metal".into(), "2023".into()]);
        write(&dir, mineral_demand::OUTPUT_FILE, vec![table]);
        let err = insights(TableId::MineralDemand, "Net Zero", None, &config(&dir)).unwrap_err();
        assert!(matches!(err, OutlookError::NotFound(_)));
    }

    #[test]
    fn test_long_section_probes_distinct_sheets() {
        let section = "Comeback of high Cd-Te technology";
        let probes = probes(TableId::SolarPv, section, &OutlookConfig::default()).unwrap();
        let sheets: Vec<&str> = probes.iter().map(|p| p.sheet.as_str()).collect();
        assert_eq!(
            sheets,
            vec![
                "Comeback of high Cd-Te te_STEPS",
                "Comeback of high Cd-Te te_APS",
                "Comeback of high Cd-Te te_NZE"
            ]
        );
    }

    #[test]
    fn test_supply_compares_2023_and_2040() {
        assert_eq!(insight_years(TableId::Supply, &OutlookConfig::default()), (2023, 2040));
        let probes = probes(TableId::Supply, "Copper", &OutlookConfig::default()).unwrap();
        assert_eq!(probes[1].file, supply::REFINING_FILE);
        assert_eq!(probes[1].end, "Refining_2040");
    }
}
