//! Table 1 charts: per-mineral trends, statistics and demand mix, plus
//! cross-mineral totals and growth

use super::figure::{bar_trace, fmt_value, line_trace, subplot_axes, table_trace, Figure};
use super::{naming, padded_range, palette, series_max, without_totals, ChartSet};
use crate::analysis::{scenario_stats, shares};
use crate::tables::demand::{DemandTable, MineralBlock};
use crate::types::{Scenario, BASE_YEAR};
use serde_json::json;

pub(crate) fn figures(table: &DemandTable, target_year: u16) -> ChartSet {
    let mut charts = ChartSet::new();
    for block in &table.minerals {
        charts.push((naming::mineral_trends(&block.mineral), trends(block)));
        charts.push((
            naming::mineral_statistics(&block.mineral),
            statistics(block, target_year),
        ));
        for scenario in Scenario::ALL {
            charts.push((
                naming::mineral_proportions(&block.mineral, scenario),
                proportions(block, scenario),
            ));
        }
    }
    for scenario in Scenario::ALL {
        charts.push((
            naming::total_demand_comparison(scenario),
            total_comparison(table, scenario, target_year),
        ));
        charts.push((
            naming::growth_comparison(scenario),
            growth_comparison(table, scenario, target_year),
        ));
    }
    charts
}

/// Three scenario panels sharing one y range
fn trends(block: &MineralBlock) -> Figure {
    let categories = without_totals(&block.categories);
    let all_series: Vec<Vec<(u16, f64)>> = Scenario::ALL
        .iter()
        .flat_map(|s| categories.iter().map(move |p| p.series(*s)))
        .collect();
    let range = padded_range(series_max(all_series.iter().map(Vec::as_slice)));

    let mut figure = Figure::new(format!("{} demand by category", block.mineral));
    for (i, scenario) in Scenario::ALL.iter().enumerate() {
        let (xaxis, yaxis) = subplot_axes(i);
        for (j, category) in categories.iter().enumerate() {
            let mut trace =
                line_trace(&category.label, &category.series(*scenario), Some(palette(j)));
            trace["xaxis"] = json!(xaxis);
            trace["yaxis"] = json!(yaxis);
            trace["legendgroup"] = json!(category.label);
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

fn statistics(block: &MineralBlock, target_year: u16) -> Figure {
    let headers: Vec<String> = vec![
        "Category".into(),
        "Scenario".into(),
        format!("{} (kt)", BASE_YEAR),
        format!("{} (kt)", target_year),
        "Growth %".into(),
        "CAGR %".into(),
    ];
    let mut rows = Vec::new();
    for category in &block.categories {
        for scenario in Scenario::ALL {
            let stats = scenario_stats(category, scenario, BASE_YEAR, target_year);
            rows.push(vec![
                category.label.clone(),
                scenario.label().to_string(),
                fmt_value(stats.base, 1),
                fmt_value(stats.target, 1),
                fmt_value(stats.growth_pct, 1),
                fmt_value(stats.cagr_pct, 1),
            ]);
        }
    }
    let mut figure = Figure::new(format!("{} demand statistics", block.mineral));
    figure.add_trace(table_trace(&headers, &rows));
    figure
}

/// Stacked share of each category per year
fn proportions(block: &MineralBlock, scenario: Scenario) -> Figure {
    let categories = without_totals(&block.categories);
    let years: Vec<u16> = categories
        .first()
        .map(|p| p.years(scenario))
        .unwrap_or_default();
    let x: Vec<String> = years.iter().map(u16::to_string).collect();

    // shares[year][category]
    let per_year: Vec<Vec<f64>> = years
        .iter()
        .map(|y| {
            let values: Vec<f64> = categories
                .iter()
                .map(|p| p.value(scenario, *y).unwrap_or(0.0))
                .collect();
            shares(&values)
        })
        .collect();

    let mut figure = Figure::new(format!("{} demand mix, {}", block.mineral, scenario));
    for (j, category) in categories.iter().enumerate() {
        let y: Vec<f64> = per_year.iter().map(|s| s[j] * 100.0).collect();
        figure.add_trace(bar_trace(&category.label, &x, &y, Some(palette(j))));
    }
    figure
        .set_layout("barmode", json!("stack"))
        .axis_titles("Year", "Share of demand (%)");
    figure
}

fn total_comparison(table: &DemandTable, scenario: Scenario, target_year: u16) -> Figure {
    let summary = table.summary(scenario, target_year);
    let minerals: Vec<String> = summary.iter().map(|r| r.mineral.clone()).collect();
    let base: Vec<f64> = summary.iter().map(|r| r.total_base).collect();
    let target: Vec<f64> = summary.iter().map(|r| r.total_target).collect();

    let mut figure = Figure::new(format!("Total demand by mineral, {}", scenario));
    figure
        .add_trace(bar_trace(&BASE_YEAR.to_string(), &minerals, &base, Some("#7f7f7f")))
        .add_trace(bar_trace(&target_year.to_string(), &minerals, &target, Some(scenario.color())))
        .set_layout("barmode", json!("group"))
        .axis_titles("Mineral", "Total demand (kt)");
    figure
}

fn growth_comparison(table: &DemandTable, scenario: Scenario, target_year: u16) -> Figure {
    let summary = table.summary(scenario, target_year);
    let minerals: Vec<String> = summary.iter().map(|r| r.mineral.clone()).collect();
    let growth: Vec<f64> = summary.iter().map(|r| r.growth_pct).collect();

    let mut figure = Figure::new(format!(
        "Demand growth {}-{}, {}",
        BASE_YEAR, target_year, scenario
    ));
    figure
        .add_trace(bar_trace("Growth %", &minerals, &growth, Some(scenario.color())))
        .axis_titles("Mineral", "Growth (%)");
    figure
}
