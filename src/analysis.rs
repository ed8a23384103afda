//! Derived quantities: growth, CAGR, shares and summary rows
//!
//! Nothing here is stored in the cleaned workbooks as authoritative data;
//! the chart stage and the dashboard recompute these on read.

use crate::types::{Activity, Projection, Scenario, SupplySeries};
use serde::Serialize;
use std::cmp::Ordering;

/// Stand-in base used when ranking series that start from zero
const ZERO_BASE_FLOOR: f64 = 0.001;

/// Total growth in percent; undefined for a zero or non-finite base
pub fn growth_pct(base: f64, end: f64) -> Option<f64> {
    if base == 0.0 || !base.is_finite() || !end.is_finite() {
        return None;
    }
    Some((end - base) / base * 100.0)
}

/// Total growth in percent with a zero base floored to 0.001
pub fn growth_pct_floored(base: f64, end: f64) -> f64 {
    if base == 0.0 {
        if end == 0.0 {
            return 0.0;
        }
        return (end / ZERO_BASE_FLOOR - 1.0) * 100.0;
    }
    (end / base - 1.0) * 100.0
}

/// Compound annual growth rate in percent over `years`
pub fn cagr_pct(base: f64, end: f64, years: u16) -> Option<f64> {
    if years == 0 || base <= 0.0 || end < 0.0 || !base.is_finite() || !end.is_finite() {
        return None;
    }
    if end == 0.0 {
        return Some(-100.0);
    }
    Some(((end / base).powf(1.0 / f64::from(years)) - 1.0) * 100.0)
}

/// Each value as a fraction of the sum; all zeros when the sum is zero
pub fn shares(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().filter(|v| v.is_finite()).sum();
    values
        .iter()
        .map(|v| if total > 0.0 && v.is_finite() { v / total } else { 0.0 })
        .collect()
}

/// Largest `n` shares of `total` (labels in `excluded` never rank), with the
/// remainder reported as "Others"
pub fn top_shares(
    items: &[(String, f64)],
    total: f64,
    n: usize,
    excluded: &[&str],
) -> Vec<(String, f64)> {
    if total <= 0.0 {
        return Vec::new();
    }
    let mut ranked: Vec<(String, f64)> = items
        .iter()
        .filter(|(label, _)| !excluded.iter().any(|e| e.eq_ignore_ascii_case(label)))
        .map(|(label, value)| (label.clone(), value / total))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(n);
    let others = 1.0 - ranked.iter().map(|(_, s)| s).sum::<f64>();
    ranked.push(("Others".to_string(), others.max(0.0)));
    ranked
}

fn sort_desc_by<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}

//==============================================================================
// Demand summaries
//==============================================================================

/// Sum of a year across categories; blanks skipped
pub fn total(projections: &[Projection], scenario: Scenario, year: u16) -> f64 {
    projections
        .iter()
        .filter_map(|p| p.value(scenario, year))
        .sum()
}

/// One line of a per-scenario mineral summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandSummary {
    pub mineral: String,
    pub total_base: f64,
    pub total_target: f64,
    pub growth_pct: f64,
    pub cagr_pct: Option<f64>,
}

/// Totals, growth and CAGR per mineral, best growth first; minerals without
/// a usable base total are left out
pub fn demand_summary(
    minerals: &[(String, Vec<Projection>)],
    scenario: Scenario,
    base_year: u16,
    target_year: u16,
) -> Vec<DemandSummary> {
    let years = target_year.saturating_sub(base_year);
    let mut rows: Vec<DemandSummary> = minerals
        .iter()
        .filter_map(|(mineral, categories)| {
            let total_base = total(categories, scenario, base_year);
            let total_target = total(categories, scenario, target_year);
            let growth = growth_pct(total_base, total_target)?;
            Some(DemandSummary {
                mineral: mineral.clone(),
                total_base,
                total_target,
                growth_pct: growth,
                cagr_pct: cagr_pct(total_base, total_target, years),
            })
        })
        .collect();
    sort_desc_by(&mut rows, |r| r.growth_pct);
    rows
}

/// Growth of one labelled series for ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRanking {
    pub label: String,
    pub start_year: u16,
    pub start: f64,
    pub end: f64,
    pub growth_pct: f64,
    pub cagr_pct: f64,
}

/// Rank projections by floored growth from their first year to `target_year`
pub fn rank_growth(
    projections: &[Projection],
    scenario: Scenario,
    target_year: u16,
) -> Vec<GrowthRanking> {
    let mut rows: Vec<GrowthRanking> = projections
        .iter()
        .filter_map(|p| {
            let series = p.series(scenario);
            let (start_year, start) = *series.first()?;
            let end = p.value(scenario, target_year)?;
            let years = target_year.saturating_sub(start_year);
            let floored = if start == 0.0 { ZERO_BASE_FLOOR } else { start };
            Some(GrowthRanking {
                label: p.label.clone(),
                start_year,
                start,
                end,
                growth_pct: growth_pct_floored(start, end),
                cagr_pct: cagr_pct(floored, end, years).unwrap_or(-100.0),
            })
        })
        .collect();
    sort_desc_by(&mut rows, |r| r.growth_pct);
    rows
}

/// Base, target, growth and CAGR of one projection under one scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioStats {
    pub label: String,
    pub scenario: Scenario,
    pub base: Option<f64>,
    pub target: Option<f64>,
    pub growth_pct: Option<f64>,
    pub cagr_pct: Option<f64>,
}

pub fn scenario_stats(
    p: &Projection,
    scenario: Scenario,
    base_year: u16,
    target_year: u16,
) -> ScenarioStats {
    let base = p.value(scenario, base_year);
    let target = p.value(scenario, target_year);
    let (growth, cagr) = match (base, target) {
        (Some(b), Some(t)) => (
            growth_pct(b, t),
            cagr_pct(b, t, target_year.saturating_sub(base_year)),
        ),
        _ => (None, None),
    };
    ScenarioStats {
        label: p.label.clone(),
        scenario,
        base,
        target,
        growth_pct: growth,
        cagr_pct: cagr,
    }
}

//==============================================================================
// Supply summaries
//==============================================================================

/// Country production for one mineral between two years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplySummary {
    pub country: String,
    pub mineral: String,
    pub start: f64,
    pub end: f64,
    pub growth_pct: Option<f64>,
    pub cagr_pct: Option<f64>,
    pub share_start_pct: f64,
    pub share_end_pct: f64,
}

/// Per-country production across all minerals, largest `end_year` first.
/// Shares are of the activity total over every listed row.
pub fn supply_summary(
    minerals: &[(String, Vec<SupplySeries>)],
    activity: Activity,
    start_year: u16,
    end_year: u16,
) -> Vec<SupplySummary> {
    let years = end_year.saturating_sub(start_year);
    let mut rows: Vec<SupplySummary> = Vec::new();
    for (mineral, countries) in minerals {
        for series in countries.iter().filter(|s| !s.is_total()) {
            let start = series.value(activity, start_year).unwrap_or(0.0);
            let end = series.value(activity, end_year).unwrap_or(0.0);
            let growth = if start != 0.0 {
                growth_pct(start, end)
            } else if end > 0.0 {
                None
            } else {
                Some(0.0)
            };
            let cagr = if start > 0.0 && end > 0.0 {
                cagr_pct(start, end, years)
            } else {
                None
            };
            rows.push(SupplySummary {
                country: series.country.clone(),
                mineral: mineral.clone(),
                start,
                end,
                growth_pct: growth,
                cagr_pct: cagr,
                share_start_pct: 0.0,
                share_end_pct: 0.0,
            });
        }
    }

    let start_shares = shares(&rows.iter().map(|r| r.start).collect::<Vec<_>>());
    let end_shares = shares(&rows.iter().map(|r| r.end).collect::<Vec<_>>());
    for (row, (s, e)) in rows.iter_mut().zip(start_shares.into_iter().zip(end_shares)) {
        row.share_start_pct = s * 100.0;
        row.share_end_pct = e * 100.0;
    }
    sort_desc_by(&mut rows, |r| r.end);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BASE_YEAR;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn projection(label: &str, base: f64, end: f64) -> Projection {
        let mut p = Projection::new(label);
        p.base = Some(base);
        p.set(Scenario::NetZero, 2050, end);
        p
    }

    #[test]
    fn test_growth_pct() {
        assert_eq!(growth_pct(100.0, 150.0), Some(50.0));
        assert_eq!(growth_pct(0.0, 150.0), None);
        assert_eq!(growth_pct(100.0, f64::NAN), None);
    }

    #[test]
    fn test_growth_pct_floored() {
        assert_eq!(growth_pct_floored(0.0, 0.0), 0.0);
        assert!(approx(growth_pct_floored(0.0, 1.0), 99_900.0));
        assert!(approx(growth_pct_floored(2.0, 1.0), -50.0));
    }

    #[test]
    fn test_cagr_pct() {
        let cagr = cagr_pct(100.0, 200.0, 27).unwrap();
        assert!(approx((1.0 + cagr / 100.0).powi(27), 2.0));
        assert_eq!(cagr_pct(100.0, 0.0, 27), Some(-100.0));
        assert_eq!(cagr_pct(0.0, 10.0, 27), None);
        assert_eq!(cagr_pct(1.0, 10.0, 0), None);
    }

    #[test]
    fn test_shares_zero_total() {
        assert_eq!(shares(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert_eq!(shares(&[1.0, 3.0]), vec![0.25, 0.75]);
    }

    #[test]
    fn test_top_shares_adds_others() {
        let items = vec![
            ("China".to_string(), 60.0),
            ("Rest of world".to_string(), 20.0),
            ("Chile".to_string(), 15.0),
            ("Peru".to_string(), 5.0),
        ];
        let top = top_shares(&items, 100.0, 2, &["Rest of world"]);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].0, "China");
        assert_eq!(top[1].0, "Chile");
        assert_eq!(top[2].0, "Others");
        assert!(approx(top[2].1, 0.25));
    }

    #[test]
    fn test_demand_summary_sorted_and_filtered() {
        let minerals = vec![
            (
                "Copper".to_string(),
                vec![projection("EV", 10.0, 20.0), projection("Grid", 10.0, 10.0)],
            ),
            ("Lithium".to_string(), vec![projection("EV", 1.0, 10.0)]),
            ("Zero".to_string(), vec![projection("EV", 0.0, 10.0)]),
        ];
        let summary = demand_summary(&minerals, Scenario::NetZero, BASE_YEAR, 2050);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].mineral, "Lithium");
        assert!(approx(summary[0].growth_pct, 900.0));
        assert_eq!(summary[1].total_base, 20.0);
        assert_eq!(summary[1].total_target, 30.0);
    }

    #[test]
    fn test_rank_growth_handles_zero_start() {
        let rows = rank_growth(
            &[projection("A", 0.0, 0.0), projection("B", 2.0, 4.0), projection("C", 0.0, 1.0)],
            Scenario::NetZero,
            2050,
        );
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["C", "B", "A"]);
        assert_eq!(rows[2].cagr_pct, -100.0);
    }

    #[test]
    fn test_supply_summary_shares() {
        let mut china = SupplySeries::new("China");
        china.mining.insert(2023, 30.0);
        china.mining.insert(2040, 60.0);
        let mut chile = SupplySeries::new("Chile");
        chile.mining.insert(2023, 10.0);
        chile.mining.insert(2040, 0.0);
        let mut total = SupplySeries::new("Total");
        total.mining.insert(2023, 40.0);

        let rows = supply_summary(
            &[("Copper".to_string(), vec![china, chile, total])],
            Activity::Mining,
            2023,
            2040,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country, "China");
        assert!(approx(rows[0].share_start_pct, 75.0));
        assert!(approx(rows[0].share_end_pct, 100.0));
        assert_eq!(rows[1].growth_pct, Some(-100.0));
        assert_eq!(rows[1].cagr_pct, None);
    }
}
