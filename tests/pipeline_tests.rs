//! End-to-end tests over a fixture explorer workbook: clean, chart, read back

mod common;

use common::Fixture;
use mineral_outlook::charts;
use mineral_outlook::dashboard::insights::insights;
use mineral_outlook::error::OutlookError;
use mineral_outlook::excel::{read_table, SourceWorkbook};
use mineral_outlook::tables::{clean_tables, TableId};
use mineral_outlook::types::Cell;
use pretty_assertions::assert_eq;

// ═══════════════════════════════════════════════════════════════════════════
// CLEANING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_clean_all_tables_continues_past_missing_sheets() {
    let fixture = Fixture::new();
    let outcomes = clean_tables(&TableId::ALL, &fixture.config()).unwrap();
    assert_eq!(outcomes.len(), 10);

    let ok: Vec<&str> = outcomes.iter().filter(|o| o.is_ok()).map(|o| o.table.id()).collect();
    assert_eq!(ok, vec!["1", "2", "3.1", "3.2", "4.6"]);

    for outcome in outcomes.iter().filter(|o| !o.is_ok()) {
        assert!(matches!(outcome.result, Err(OutlookError::Workbook(_))));
    }
}

#[test]
fn test_clean_writes_expected_files() {
    let fixture = Fixture::new();
    clean_tables(&TableId::ALL, &fixture.config()).unwrap();

    for file in [
        "organized_mineral_demand.xlsx",
        "mineral_supply_mining.xlsx",
        "mineral_supply_refining.xlsx",
        "demand_scenarios.xlsx",
        "cleantech_demand_by_mineral.xlsx",
        "4_6_hydrogen_scenarios.xlsx",
    ] {
        assert!(fixture.output_dir().join(file).exists(), "missing {}", file);
    }
    assert!(!fixture.output_dir().join("4_2_wind_scenarios.xlsx").exists());
}

#[test]
fn test_missing_input_is_fatal() {
    let fixture = Fixture::new();
    let mut config = fixture.config();
    config.input = fixture.dir.path().join("nope.xlsx");
    assert!(matches!(
        clean_tables(&[TableId::Demand], &config),
        Err(OutlookError::NotFound(_))
    ));
}

#[test]
fn test_cleaned_demand_workbook_round_trips() {
    let fixture = Fixture::new();
    clean_tables(&[TableId::Demand], &fixture.config()).unwrap();

    let mut workbook =
        SourceWorkbook::open(fixture.output_dir().join("organized_mineral_demand.xlsx")).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![
            "Overview",
            "Summary_Stated Policies",
            "Summary_Announced Pledges",
            "Summary_Net Zero",
            "Copper",
            "Lithium"
        ]
    );

    let copper = workbook.table("Copper").unwrap();
    assert_eq!(copper.headers[1], "Stated Policies scenario_2023");
    let row = copper.find_row("Clean technologies").unwrap();
    assert_eq!(
        copper.get(row, "Stated Policies scenario_2023"),
        Some(&Cell::Number(10.0))
    );
}

#[test]
fn test_cleaned_mineral_demand_has_base_year_in_every_scenario() {
    let fixture = Fixture::new();
    clean_tables(&[TableId::MineralDemand], &fixture.config()).unwrap();

    let path = fixture.output_dir().join("cleantech_demand_by_mineral.xlsx");
    for sheet in ["Stated Policies", "Announced Pledges", "Net Zero"] {
        let table = read_table(&path, sheet).unwrap();
        assert_eq!(table.headers[1], "2023");
        assert!(table.find_row("Total").is_none());
        let boron = table.find_row("Boron").unwrap();
        assert_eq!(table.get(boron, "2023"), Some(&Cell::Number(1.0)));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CHARTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_render_charts_from_cleaned_datasets() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let outcomes = clean_tables(&[TableId::MineralDemand, TableId::Hydrogen], &config).unwrap();

    for outcome in outcomes {
        let cleaned = outcome.result.unwrap();
        let written = charts::render(outcome.table, &cleaned.dataset, &config).unwrap();
        assert!(!written.is_empty());
        for path in &written {
            let html = std::fs::read_to_string(path).unwrap();
            assert!(html.contains("Plotly.newPlot"), "{} is not a chart", path.display());
        }
    }

    let dir = fixture.figures_dir().join("table_3_2");
    assert!(dir.join("statistics_net_zero.html").exists());
    assert!(dir.join("top_growing_metals_stated_policies.html").exists());
    assert!(dir.join("top_declining_metals_announced_pledges.html").exists());
}

// ═══════════════════════════════════════════════════════════════════════════
// INSIGHTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_insights_read_back_cleaned_values() {
    let fixture = Fixture::new();
    let config = fixture.config();
    clean_tables(&[TableId::MineralDemand], &config).unwrap();

    let result = insights(TableId::MineralDemand, "Net Zero", Some("Boron"), &config).unwrap();
    assert_eq!(result.start_year, 2023);
    assert_eq!(result.end_year, 2050);
    assert_eq!(result.rows.len(), 1);

    let boron = &result.rows[0];
    assert_eq!(boron.start, Some(1.0));
    assert_eq!(boron.end, Some(15.0));
    assert!((boron.growth_pct.unwrap() - 1400.0).abs() < 1e-9);
}

#[test]
fn test_insights_for_long_section_name() {
    let fixture = Fixture::new();
    let mut config = fixture.config();
    config.input = fixture.dir.path().join("solar.xlsx");
    common::write_workbook(&config.input, &[("4.1 Solar PV", common::solar_pv_sheet())]);
    let outcomes = clean_tables(&[TableId::SolarPv], &config).unwrap();
    assert!(outcomes[0].is_ok());

    let section = "Comeback of high Cd-Te technology";
    let result = insights(TableId::SolarPv, section, Some("Cadmium"), &config).unwrap();
    let groups: Vec<&str> = result.rows.iter().map(|r| r.group.as_str()).collect();
    assert_eq!(groups, vec!["Stated Policies", "Announced Pledges", "Net Zero"]);
    for row in &result.rows {
        assert_eq!(row.start, Some(2.0));
        assert!(row.end.is_some(), "{} has no end value", row.group);
        assert!(row.growth_pct.is_some());
    }
    assert_eq!(result.rows[2].end, Some(9.5));
    assert!((result.rows[2].growth_pct.unwrap() - 375.0).abs() < 1e-9);

    // The base case keeps its full scenario labels
    let path = fixture.output_dir().join("4_1_solar_pv_scenarios.xlsx");
    let base = read_table(&path, "Base case_Net Zero").unwrap();
    assert_eq!(base.get(0, "Net Zero_2050"), Some(&Cell::Number(16.0)));
}

#[test]
fn test_insights_without_cleaned_workbook() {
    let fixture = Fixture::new();
    let result = insights(TableId::MineralDemand, "Net Zero", None, &fixture.config());
    assert!(matches!(result, Err(OutlookError::NotFound(_))));
}
