//! Table 2 charts: country trends per mineral and cross-mineral country
//! dominance for mining and refining

use super::figure::{bar_trace, fmt_value, line_trace, table_trace, Figure};
use super::naming::{self, SUPPLY_YEARS};
use super::{palette, ChartSet};
use crate::analysis::{supply_summary, top_shares};
use crate::tables::supply::{MineralSupply, SupplyTable};
use crate::types::{Activity, SupplySeries};
use serde_json::json;

/// Countries shown in the top-shares table
const TOP_COUNTRIES: usize = 3;

/// Rows listed in the statistics table
const STATISTICS_ROWS: usize = 25;

pub(crate) fn figures(table: &SupplyTable) -> ChartSet {
    let mut charts = ChartSet::new();
    for mineral in &table.minerals {
        for activity in Activity::ALL {
            charts.push((
                naming::supply_trend(&mineral.mineral, activity),
                country_trends(mineral, activity),
            ));
        }
    }
    for activity in Activity::ALL {
        for year in SUPPLY_YEARS {
            charts.push((
                naming::country_dominance(activity, year),
                country_dominance(table, activity, year),
            ));
            charts.push((
                naming::top3_shares(activity, year),
                top3_shares(table, activity, year),
            ));
        }
        charts.push((naming::supply_statistics(activity), statistics(table, activity)));
    }
    charts
}

/// Activity total for a mineral: its "Total" row when present, else the sum
fn mineral_total(mineral: &MineralSupply, activity: Activity, year: u16) -> f64 {
    match mineral.countries.iter().find(|c| c.is_total()) {
        Some(total) => total.value(activity, year).unwrap_or(0.0),
        None => mineral
            .countries
            .iter()
            .filter_map(|c| c.value(activity, year))
            .sum(),
    }
}

fn producers(mineral: &MineralSupply, activity: Activity) -> Vec<&SupplySeries> {
    mineral
        .with_activity(activity)
        .filter(|c| !c.is_total())
        .collect()
}

fn country_trends(mineral: &MineralSupply, activity: Activity) -> Figure {
    let mut figure = Figure::new(format!(
        "{} {} by country",
        mineral.mineral,
        activity.label().to_lowercase()
    ));
    for (i, series) in producers(mineral, activity).iter().enumerate() {
        let points: Vec<(u16, f64)> = series
            .activity(activity)
            .iter()
            .map(|(y, v)| (*y, *v))
            .collect();
        figure.add_trace(line_trace(&series.country, &points, Some(palette(i))));
    }
    figure.axis_titles("Year", "Production (kt)");
    figure
}

/// Stacked country shares of every mineral's output
fn country_dominance(table: &SupplyTable, activity: Activity, year: u16) -> Figure {
    let minerals: Vec<String> = table.minerals.iter().map(|m| m.mineral.clone()).collect();

    let mut countries: Vec<&str> = Vec::new();
    for mineral in &table.minerals {
        for series in producers(mineral, activity) {
            if !countries.contains(&series.country.as_str()) {
                countries.push(series.country.as_str());
            }
        }
    }

    let mut figure = Figure::new(format!(
        "Country dominance in {}, {}",
        activity.label().to_lowercase(),
        year
    ));
    for (i, country) in countries.iter().enumerate() {
        let shares: Vec<f64> = table
            .minerals
            .iter()
            .map(|m| {
                let total = mineral_total(m, activity, year);
                let value = m
                    .country(country)
                    .and_then(|c| c.value(activity, year))
                    .unwrap_or(0.0);
                if total > 0.0 {
                    value / total * 100.0
                } else {
                    0.0
                }
            })
            .collect();
        figure.add_trace(bar_trace(country, &minerals, &shares, Some(palette(i))));
    }
    figure
        .set_layout("barmode", json!("stack"))
        .set_layout("height", json!(700))
        .axis_titles("Mineral", "Share of output (%)");
    figure
}

/// Top three producers per mineral with the remainder as "Others"
fn top3_shares(table: &SupplyTable, activity: Activity, year: u16) -> Figure {
    let mut headers = vec!["Mineral".to_string()];
    for rank in 1..=TOP_COUNTRIES {
        headers.push(format!("#{}", rank));
    }
    headers.push("Others".to_string());

    let mut rows = Vec::new();
    for mineral in &table.minerals {
        let items: Vec<(String, f64)> = producers(mineral, activity)
            .iter()
            .filter_map(|c| c.value(activity, year).map(|v| (c.country.clone(), v)))
            .collect();
        let total = mineral_total(mineral, activity, year);
        let ranked = top_shares(&items, total, TOP_COUNTRIES, &["Total"]);
        if ranked.is_empty() {
            continue;
        }
        let mut row = vec![mineral.mineral.clone()];
        let others = ranked.last().map(|(_, share)| *share).unwrap_or(0.0);
        let top = &ranked[..ranked.len() - 1];
        for rank in 0..TOP_COUNTRIES {
            row.push(match top.get(rank) {
                Some((country, share)) => format!("{} ({:.1}%)", country, share * 100.0),
                None => String::new(),
            });
        }
        row.push(format!("{:.1}%", others * 100.0));
        rows.push(row);
    }

    let mut figure = Figure::new(format!(
        "Top {} {} countries, {}",
        TOP_COUNTRIES,
        activity.label().to_lowercase(),
        year
    ));
    figure.add_trace(table_trace(&headers, &rows));
    figure
}

fn statistics(table: &SupplyTable, activity: Activity) -> Figure {
    let [start, end] = SUPPLY_YEARS;
    let summary = supply_summary(&table.series(), activity, start, end);
    let headers: Vec<String> = vec![
        "Country".into(),
        "Mineral".into(),
        format!("{} (kt)", start),
        format!("{} (kt)", end),
        "Growth %".into(),
        "CAGR %".into(),
        format!("Share {} %", start),
        format!("Share {} %", end),
    ];
    let rows: Vec<Vec<String>> = summary
        .iter()
        .take(STATISTICS_ROWS)
        .map(|r| {
            vec![
                r.country.clone(),
                r.mineral.clone(),
                fmt_value(Some(r.start), 1),
                fmt_value(Some(r.end), 1),
                fmt_value(r.growth_pct, 1),
                fmt_value(r.cagr_pct, 1),
                fmt_value(Some(r.share_start_pct), 1),
                fmt_value(Some(r.share_end_pct), 1),
            ]
        })
        .collect();

    let mut figure = Figure::new(format!(
        "{} summary statistics {}-{}",
        activity.label(),
        start,
        end
    ));
    figure.add_trace(table_trace(&headers, &rows));
    figure.set_layout("height", json!(800));
    figure
}
