//! Tables 4.1-4.6 charts: material trends and per-section scenario views

use super::figure::{bar_trace, fmt_value, heatmap_trace, line_trace, table_trace, Figure};
use super::{naming, ChartSet};
use crate::analysis::{growth_pct, scenario_stats};
use crate::tables::technology::{Section, TechnologyTable, BASE_CASE, WIND};
use crate::types::{Projection, Scenario, BASE_YEAR};
use serde_json::json;

/// Wind section compared against the base case
const CONSTRAINED_SECTION: &str = "Constrained rare earth elements supply";

pub(crate) fn figures(table: &TechnologyTable, target_year: u16) -> ChartSet {
    let mut charts = ChartSet::new();
    for section in &table.sections {
        for material in &section.materials {
            charts.push((
                naming::material_trends(&section.name, &material.label),
                material_trends(&section.name, material),
            ));
        }
        charts.push((
            naming::section_comparison(&section.name, target_year),
            scenario_comparison(section, target_year),
        ));
        charts.push((naming::section_growth(&section.name), growth_rates(section, target_year)));
        charts.push((
            naming::section_statistics(&section.name),
            statistics(section, target_year),
        ));
    }

    if table.preset.id == WIND.id {
        if let (Some(base), Some(constrained)) =
            (table.section(BASE_CASE), table.section(CONSTRAINED_SECTION))
        {
            charts.push((
                naming::supply_constraint_impact(),
                constraint_impact(base, constrained, target_year),
            ));
        }
    }
    charts
}

fn material_trends(section: &str, material: &Projection) -> Figure {
    let mut figure = Figure::new(format!("{} demand, {}", material.label, section));
    for scenario in Scenario::ALL {
        figure.add_trace(line_trace(
            scenario.label(),
            &material.series(scenario),
            Some(scenario.color()),
        ));
    }
    figure.axis_titles("Year", "Demand (kt)");
    figure
}

/// Materials against scenarios at one year
fn scenario_comparison(section: &Section, year: u16) -> Figure {
    let scenarios: Vec<String> = Scenario::ALL.iter().map(|s| s.label().to_string()).collect();
    let materials: Vec<String> = section.materials.iter().map(|m| m.label.clone()).collect();
    let z: Vec<Vec<Option<f64>>> = section
        .materials
        .iter()
        .map(|m| Scenario::ALL.iter().map(|s| m.value(*s, year)).collect())
        .collect();

    let mut figure = Figure::new(format!("{}: demand by scenario, {}", section.name, year));
    figure.add_trace(heatmap_trace(&scenarios, &materials, &z));
    figure.set_layout("height", json!(200 + 40 * materials.len()));
    figure
}

fn growth_rates(section: &Section, target_year: u16) -> Figure {
    let materials: Vec<String> = section.materials.iter().map(|m| m.label.clone()).collect();
    let mut figure = Figure::new(format!(
        "{}: growth {}-{}",
        section.name, BASE_YEAR, target_year
    ));
    for scenario in Scenario::ALL {
        let growth: Vec<f64> = section
            .materials
            .iter()
            .map(|m| {
                scenario_stats(m, scenario, BASE_YEAR, target_year)
                    .growth_pct
                    .unwrap_or(0.0)
            })
            .collect();
        figure.add_trace(bar_trace(scenario.label(), &materials, &growth, Some(scenario.color())));
    }
    figure
        .set_layout("barmode", json!("group"))
        .axis_titles("Material", "Growth (%)");
    figure
}

fn statistics(section: &Section, target_year: u16) -> Figure {
    let headers: Vec<String> = vec![
        "Material".into(),
        "Scenario".into(),
        format!("{} (kt)", BASE_YEAR),
        format!("{} (kt)", target_year),
        "Growth %".into(),
        "CAGR %".into(),
    ];
    let mut rows = Vec::new();
    for material in &section.materials {
        for scenario in Scenario::ALL {
            let stats = scenario_stats(material, scenario, BASE_YEAR, target_year);
            rows.push(vec![
                material.label.clone(),
                scenario.label().to_string(),
                fmt_value(stats.base, 3),
                fmt_value(stats.target, 3),
                fmt_value(stats.growth_pct, 1),
                fmt_value(stats.cagr_pct, 1),
            ]);
        }
    }
    let mut figure = Figure::new(format!("{}: summary statistics", section.name));
    figure.add_trace(table_trace(&headers, &rows));
    figure.set_layout("height", json!(700));
    figure
}

/// Percent difference of the constrained case against the base case
fn constraint_impact(base: &Section, constrained: &Section, year: u16) -> Figure {
    let scenarios: Vec<String> = Scenario::ALL.iter().map(|s| s.label().to_string()).collect();
    let mut materials = Vec::new();
    let mut z = Vec::new();
    for material in &base.materials {
        let Some(other) = constrained.material(&material.label) else {
            continue;
        };
        materials.push(material.label.clone());
        z.push(
            Scenario::ALL
                .iter()
                .map(|s| match (material.value(*s, year), other.value(*s, year)) {
                    (Some(b), Some(c)) => growth_pct(b, c),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        );
    }

    let mut trace = heatmap_trace(&scenarios, &materials, &z);
    trace["colorscale"] = json!("RdBu");
    trace["zmid"] = json!(0);
    trace["colorbar"] = json!({ "title": { "text": "% difference" } });

    let mut figure = Figure::new(format!("Impact of constrained rare earth supply, {}", year));
    figure.add_trace(trace);
    figure.set_layout("height", json!(200 + 40 * materials.len()));
    figure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::ScenarioColumns;

    fn material(label: &str, base: f64, end: f64) -> Projection {
        let mut p = Projection::new(label);
        p.base = Some(base);
        for scenario in Scenario::ALL {
            p.set(scenario, 2050, end);
        }
        p
    }

    fn section(name: &str, scale: f64) -> Section {
        Section {
            name: name.to_string(),
            columns: ScenarioColumns::canonical(),
            materials: vec![
                material("Neodymium", 2.0, 4.0 * scale),
                material("Copper", 10.0, 15.0),
            ],
        }
    }

    fn wind() -> TechnologyTable {
        TechnologyTable {
            preset: &WIND,
            sections: vec![section(BASE_CASE, 1.0), section(CONSTRAINED_SECTION, 0.5)],
        }
    }

    #[test]
    fn test_wind_adds_constraint_impact() {
        let charts = figures(&wind(), 2050);
        // 2 sections x (2 trends + comparison + growth + statistics) + impact
        assert_eq!(charts.len(), 2 * 5 + 1);
        let (name, impact) = charts.last().unwrap();
        assert_eq!(name, "supply_constraint_impact.html");
        assert_eq!(impact.traces()[0]["z"][0], json!([-50.0, -50.0, -50.0]));
        assert_eq!(impact.traces()[0]["z"][1], json!([0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_other_tables_skip_constraint_impact() {
        let table = TechnologyTable {
            preset: &crate::tables::technology::SOLAR_PV,
            sections: vec![section(BASE_CASE, 1.0)],
        };
        let charts = figures(&table, 2050);
        assert!(charts.iter().all(|(n, _)| n != "supply_constraint_impact.html"));
        assert_eq!(charts[0].0, "base_case_neodymium_trends.html");
    }

    #[test]
    fn test_growth_and_heatmap() {
        let s = section(BASE_CASE, 1.0);
        let growth = growth_rates(&s, 2050);
        assert_eq!(growth.traces().len(), 3);
        assert_eq!(growth.traces()[0]["y"], json!([100.0, 50.0]));

        let heatmap = scenario_comparison(&s, 2050);
        assert_eq!(heatmap.traces()[0]["y"], json!(["Neodymium", "Copper"]));
        assert_eq!(heatmap.traces()[0]["z"][1], json!([15.0, 15.0, 15.0]));
    }
}
