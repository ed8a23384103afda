//! Chart file naming
//!
//! The chart stage writes files under these names and the dashboard looks
//! them up by the same names, so both sides go through this module.

use crate::tables::TableId;
use crate::types::{Activity, Scenario, BASE_YEAR};

/// Years compared by the supply charts
pub const SUPPLY_YEARS: [u16; 2] = [2023, 2040];

/// Lower-case file-name slug: "Net Zero" -> "net_zero",
/// "PGMs (other than iridium)" -> "pgms_other_than_iridium"
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// A chart shown on a dashboard page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureRef {
    pub title: String,
    /// File name inside the table's figures directory
    pub file: String,
}

impl FigureRef {
    fn new(title: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file: file.into(),
        }
    }
}

//==============================================================================
// Table 1
//==============================================================================

pub fn mineral_trends(mineral: &str) -> String {
    format!("{}_trends.html", slug(mineral))
}

pub fn mineral_statistics(mineral: &str) -> String {
    format!("{}_statistics.html", slug(mineral))
}

pub fn mineral_proportions(mineral: &str, scenario: Scenario) -> String {
    format!("{}_{}_proportions.html", slug(mineral), slug(scenario.label()))
}

pub fn total_demand_comparison(scenario: Scenario) -> String {
    format!("total_demand_comparison_{}.html", slug(scenario.label()))
}

pub fn growth_comparison(scenario: Scenario) -> String {
    format!("growth_comparison_{}.html", slug(scenario.label()))
}

//==============================================================================
// Table 2
//==============================================================================

pub fn supply_trend(mineral: &str, activity: Activity) -> String {
    format!("{}_{}_trend.html", slug(mineral), activity.slug())
}

pub fn country_dominance(activity: Activity, year: u16) -> String {
    format!("country_dominance_{}_{}.html", activity.slug(), year)
}

pub fn top3_shares(activity: Activity, year: u16) -> String {
    format!("top3_shares_{}_{}.html", activity.slug(), year)
}

pub fn supply_statistics(activity: Activity) -> String {
    format!("summary_statistics_{}.html", activity.slug())
}

//==============================================================================
// Tables 3.1 and 3.2
//==============================================================================

pub fn technology_trends(metal: &str) -> String {
    format!("{}_technology_trends.html", slug(metal))
}

pub fn technology_mix(metal: &str, year: u16) -> String {
    format!("{}_technology_mix_{}.html", slug(metal), year)
}

pub fn top_growing(scenario: Scenario) -> String {
    format!("top_growing_metals_{}.html", slug(scenario.label()))
}

pub fn top_declining(scenario: Scenario) -> String {
    format!("top_declining_metals_{}.html", slug(scenario.label()))
}

pub fn scenario_statistics(scenario: Scenario) -> String {
    format!("statistics_{}.html", slug(scenario.label()))
}

//==============================================================================
// Tables 4.x
//==============================================================================

pub fn material_trends(section: &str, material: &str) -> String {
    format!("{}_{}_trends.html", slug(section), slug(material))
}

pub fn section_comparison(section: &str, year: u16) -> String {
    format!("{}_scenario_comparison_{}.html", slug(section), year)
}

pub fn section_growth(section: &str) -> String {
    format!("{}_growth_rates.html", slug(section))
}

pub fn section_statistics(section: &str) -> String {
    format!("{}_statistics.html", slug(section))
}

pub fn supply_constraint_impact() -> String {
    "supply_constraint_impact.html".to_string()
}

//==============================================================================
// Dashboard pages
//==============================================================================

/// Figures of a table page for the selected entity (mineral, metal,
/// scenario or section) and, on technology pages, material
pub fn page_figures(
    table: TableId,
    select: &str,
    material: Option<&str>,
    target_year: u16,
) -> Vec<FigureRef> {
    match table {
        TableId::Demand => {
            let mut figures = vec![
                FigureRef::new(format!("{} demand trends", select), mineral_trends(select)),
                FigureRef::new(format!("{} statistics", select), mineral_statistics(select)),
            ];
            for scenario in Scenario::ALL {
                figures.push(FigureRef::new(
                    format!("{} demand mix, {}", select, scenario),
                    mineral_proportions(select, scenario),
                ));
            }
            for scenario in Scenario::ALL {
                figures.push(FigureRef::new(
                    format!("Total demand by mineral, {}", scenario),
                    total_demand_comparison(scenario),
                ));
                figures.push(FigureRef::new(
                    format!("Growth {}-{}, {}", BASE_YEAR, target_year, scenario),
                    growth_comparison(scenario),
                ));
            }
            figures
        }
        TableId::Supply => {
            let mut figures = Vec::new();
            for activity in Activity::ALL {
                figures.push(FigureRef::new(
                    format!("{} {} by country", select, activity.label().to_lowercase()),
                    supply_trend(select, activity),
                ));
            }
            for activity in Activity::ALL {
                figures.push(FigureRef::new(
                    format!("{} summary statistics", activity.label()),
                    supply_statistics(activity),
                ));
                for year in SUPPLY_YEARS {
                    figures.push(FigureRef::new(
                        format!("{} country dominance, {}", activity.label(), year),
                        country_dominance(activity, year),
                    ));
                    figures.push(FigureRef::new(
                        format!("{} top-3 shares, {}", activity.label(), year),
                        top3_shares(activity, year),
                    ));
                }
            }
            figures
        }
        TableId::TechDemand => vec![
            FigureRef::new(format!("{} demand by technology", select), technology_trends(select)),
            FigureRef::new(
                format!("{} technology mix, {}", select, target_year),
                technology_mix(select, target_year),
            ),
        ],
        TableId::MineralDemand => {
            let scenario = Scenario::from_label(select).unwrap_or(Scenario::StatedPolicies);
            vec![
                FigureRef::new(format!("Statistics, {}", scenario), scenario_statistics(scenario)),
                FigureRef::new(format!("Top growing metals, {}", scenario), top_growing(scenario)),
                FigureRef::new(
                    format!("Top declining metals, {}", scenario),
                    top_declining(scenario),
                ),
            ]
        }
        _ => {
            let mut figures = vec![
                FigureRef::new(format!("{} statistics", select), section_statistics(select)),
                FigureRef::new(
                    format!("{} scenario comparison, {}", select, target_year),
                    section_comparison(select, target_year),
                ),
                FigureRef::new(format!("{} growth rates", select), section_growth(select)),
            ];
            if let Some(material) = material {
                figures.push(FigureRef::new(
                    format!("{} - {} trends", select, material),
                    material_trends(select, material),
                ));
            }
            if table == TableId::Wind {
                figures.push(FigureRef::new(
                    "Impact of constrained rare earth supply",
                    supply_constraint_impact(),
                ));
            }
            figures
        }
    }
}
