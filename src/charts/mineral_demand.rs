//! Table 3.2 charts: growth rankings and statistics per scenario

use super::figure::{fmt_value, hbar_trace, table_trace, Figure};
use super::{naming, ChartSet};
use crate::analysis::{rank_growth, GrowthRanking};
use crate::tables::mineral_demand::MineralDemandTable;
use crate::types::Scenario;
use serde_json::json;

/// Metals shown in each ranking
const RANKED: usize = 10;

pub(crate) fn figures(table: &MineralDemandTable, target_year: u16) -> ChartSet {
    let mut charts = ChartSet::new();
    for scenario in Scenario::ALL {
        let ranking = rank_growth(&table.metals, scenario, target_year);
        charts.push((
            naming::scenario_statistics(scenario),
            statistics(&ranking, scenario, target_year),
        ));
        charts.push((
            naming::top_growing(scenario),
            ranking_chart(
                &format!("Top {} growing metals, {}", RANKED, scenario),
                ranking.iter().take(RANKED),
                scenario.color(),
            ),
        ));
        charts.push((
            naming::top_declining(scenario),
            ranking_chart(
                &format!("Top {} declining metals, {}", RANKED, scenario),
                ranking.iter().rev().take(RANKED),
                "#8c564b",
            ),
        ));
    }
    charts
}

/// Horizontal growth bars, first item on top
fn ranking_chart<'a>(
    title: &str,
    rows: impl Iterator<Item = &'a GrowthRanking>,
    color: &str,
) -> Figure {
    let rows: Vec<&GrowthRanking> = rows.collect();
    // Plotly draws the first category at the bottom
    let labels: Vec<String> = rows.iter().rev().map(|r| r.label.clone()).collect();
    let values: Vec<f64> = rows.iter().rev().map(|r| r.growth_pct).collect();

    let mut figure = Figure::new(title);
    figure
        .add_trace(hbar_trace("Growth %", &labels, &values, color))
        .axis_titles("Growth (%)", "Metal")
        .set_layout("showlegend", json!(false));
    figure
}

fn statistics(ranking: &[GrowthRanking], scenario: Scenario, target_year: u16) -> Figure {
    let headers: Vec<String> = vec![
        "Metal".into(),
        "From".into(),
        "Start (kt)".into(),
        format!("{} (kt)", target_year),
        "Growth %".into(),
        "CAGR %".into(),
    ];
    let rows: Vec<Vec<String>> = ranking
        .iter()
        .map(|r| {
            vec![
                r.label.clone(),
                r.start_year.to_string(),
                fmt_value(Some(r.start), 1),
                fmt_value(Some(r.end), 1),
                fmt_value(Some(r.growth_pct), 1),
                fmt_value(Some(r.cagr_pct), 1),
            ]
        })
        .collect();

    let mut figure = Figure::new(format!("Metal demand statistics, {}", scenario));
    figure.add_trace(table_trace(&headers, &rows));
    figure.set_layout("height", json!(700));
    figure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::ScenarioColumns;
    use crate::types::Projection;

    fn metal(label: &str, base: f64, end: f64) -> Projection {
        let mut p = Projection::new(label);
        p.base = Some(base);
        for scenario in Scenario::ALL {
            p.set(scenario, 2050, end);
        }
        p
    }

    fn table() -> MineralDemandTable {
        MineralDemandTable {
            columns: ScenarioColumns::canonical(),
            metals: vec![
                metal("Copper", 10.0, 20.0),
                metal("Lithium", 1.0, 10.0),
                metal("Zinc", 4.0, 2.0),
            ],
        }
    }

    #[test]
    fn test_rankings_put_extreme_on_top() {
        let charts = figures(&table(), 2050);
        assert_eq!(charts.len(), 9);

        let (name, growing) = &charts[1];
        assert_eq!(name, "top_growing_metals_stated_policies.html");
        assert_eq!(growing.traces()[0]["y"], json!(["Zinc", "Copper", "Lithium"]));

        let (_, declining) = &charts[2];
        assert_eq!(declining.traces()[0]["y"], json!(["Lithium", "Copper", "Zinc"]));
    }

    #[test]
    fn test_statistics_rows() {
        let ranking = rank_growth(&table().metals, Scenario::NetZero, 2050);
        let figure = statistics(&ranking, Scenario::NetZero, 2050);
        let cells = &figure.traces()[0]["cells"]["values"];
        assert_eq!(cells[0], json!(["Lithium", "Copper", "Zinc"]));
        assert_eq!(cells[1][0], json!("2023"));
        assert_eq!(cells[4][2], json!("-50.0"));
    }
}
