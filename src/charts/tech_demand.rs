//! Table 3.1 charts: technology trends and technology mix per metal

use super::figure::{bar_trace, line_trace, subplot_axes, Figure};
use super::{naming, padded_range, palette, series_max, without_totals, ChartSet};
use crate::tables::tech_demand::{MetalTechnologies, TechDemandTable};
use crate::types::Scenario;
use serde_json::json;

pub(crate) fn figures(table: &TechDemandTable, target_year: u16) -> ChartSet {
    table
        .metals
        .iter()
        .flat_map(|metal| {
            [
                (naming::technology_trends(&metal.metal), trends(metal)),
                (
                    naming::technology_mix(&metal.metal, target_year),
                    technology_mix(metal, target_year),
                ),
            ]
        })
        .collect()
}

fn trends(metal: &MetalTechnologies) -> Figure {
    let technologies = without_totals(&metal.technologies);
    let all_series: Vec<Vec<(u16, f64)>> = Scenario::ALL
        .iter()
        .flat_map(|s| technologies.iter().map(move |p| p.series(*s)))
        .collect();
    let range = padded_range(series_max(all_series.iter().map(Vec::as_slice)));

    let mut figure = Figure::new(format!("{} demand by clean technology", metal.metal));
    for (i, scenario) in Scenario::ALL.iter().enumerate() {
        let (xaxis, yaxis) = subplot_axes(i);
        for (j, tech) in technologies.iter().enumerate() {
            let mut trace = line_trace(&tech.label, &tech.series(*scenario), Some(palette(j)));
            trace["xaxis"] = json!(xaxis);
            trace["yaxis"] = json!(yaxis);
            trace["legendgroup"] = json!(tech.label);
            trace["showlegend"] = json!(i == 0);
            figure.add_trace(trace);
        }
    }
    let titles: Vec<&str> = Scenario::ALL.iter().map(|s| s.label()).collect();
    figure
        .side_by_side(&titles, range, "Demand (kt)")
        .set_layout("height", json!(550));
    figure
}

/// Technologies stacked per scenario at the target year
fn technology_mix(metal: &MetalTechnologies, year: u16) -> Figure {
    let scenarios: Vec<String> = Scenario::ALL.iter().map(|s| s.label().to_string()).collect();
    let mut figure = Figure::new(format!("{} technology mix, {}", metal.metal, year));
    for (j, tech) in without_totals(&metal.technologies).iter().enumerate() {
        let values: Vec<f64> = Scenario::ALL
            .iter()
            .map(|s| tech.value(*s, year).unwrap_or(0.0))
            .collect();
        figure.add_trace(bar_trace(&tech.label, &scenarios, &values, Some(palette(j))));
    }
    figure
        .set_layout("barmode", json!("stack"))
        .axis_titles("Scenario", "Demand (kt)");
    figure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Projection;

    fn metal() -> MetalTechnologies {
        let mut ev = Projection::new("Electric vehicles");
        ev.base = Some(5.0);
        ev.set(Scenario::StatedPolicies, 2050, 20.0);
        ev.set(Scenario::NetZero, 2050, 40.0);
        let mut grid = Projection::new("Grid battery storage");
        grid.base = Some(1.0);
        grid.set(Scenario::NetZero, 2050, 8.0);
        MetalTechnologies {
            metal: "Lithium".into(),
            technologies: vec![ev, grid],
        }
    }

    #[test]
    fn test_trends_have_a_panel_per_scenario() {
        let figure = trends(&metal());
        assert_eq!(figure.traces().len(), 6);
        assert_eq!(figure.layout("grid").unwrap()["columns"], json!(3));
        let range = &figure.layout("yaxis").unwrap()["range"];
        assert!((range[1].as_f64().unwrap() - 44.0).abs() < 1e-9);
    }

    #[test]
    fn test_mix_fills_missing_scenarios_with_zero() {
        let figure = technology_mix(&metal(), 2050);
        let grid = &figure.traces()[1];
        assert_eq!(grid["name"], json!("Grid battery storage"));
        assert_eq!(grid["y"], json!([0.0, 0.0, 8.0]));
        assert_eq!(grid["x"][2], json!("Net Zero"));
    }

    #[test]
    fn test_figure_names() {
        let table = TechDemandTable {
            columns: crate::excel::ScenarioColumns::canonical(),
            metals: vec![metal()],
        };
        let names: Vec<String> = figures(&table, 2050).into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["lithium_technology_trends.html", "lithium_technology_mix_2050.html"]
        );
    }
}
