//! Dashboard pages as plain HTML
//!
//! Pages only arrange chart files that the chart stage wrote. Nothing is
//! plotted here.

use crate::charts::{escape_html, FigureRef};
use crate::config::OutlookConfig;
use crate::dashboard::insights::Insights;
use crate::excel::{split_scenario_sheet_name, SourceWorkbook};
use crate::tables::tech_demand::METALS;
use crate::tables::{demand, supply, tech_demand, TableId};
use crate::types::Scenario;
use tracing::debug;

/// Dropdown entries for a table page (minerals, metals, scenarios or
/// sections). Tables 1, 2 and 3.1 list what the cleaned workbook holds and
/// fall back to the known metals when it has not been written yet.
pub fn entity_options(table: TableId, config: &OutlookConfig) -> Vec<String> {
    let from_sheets = match table {
        TableId::Demand => sheet_options(config, demand::OUTPUT_FILE, |name| {
            (name != "Overview" && !name.starts_with("Summary_")).then(|| name.to_string())
        }),
        TableId::Supply => sheet_options(config, supply::MINING_FILE, |name| {
            (name != "Overview").then(|| name.to_string())
        }),
        TableId::TechDemand => sheet_options(config, tech_demand::OUTPUT_FILE, |name| {
            split_scenario_sheet_name(name).map(|(metal, _)| metal.to_string())
        }),
        TableId::MineralDemand => {
            return Scenario::ALL.iter().map(|s| s.label().to_string()).collect();
        }
        other => {
            return other
                .technology_preset()
                .map(|p| p.sections.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default();
        }
    };
    if from_sheets.is_empty() {
        METALS.iter().map(|m| m.to_string()).collect()
    } else {
        from_sheets
    }
}

/// Materials offered on the 4.x pages
pub fn material_options(table: TableId) -> Vec<String> {
    table
        .technology_preset()
        .map(|p| p.materials.iter().map(|m| m.to_string()).collect())
        .unwrap_or_default()
}

fn sheet_options(
    config: &OutlookConfig,
    file: &str,
    pick: impl Fn(&str) -> Option<String>,
) -> Vec<String> {
    let path = config.output_path(file);
    let names = match SourceWorkbook::open(&path) {
        Ok(workbook) => workbook.sheet_names(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no cleaned workbook for options");
            return Vec::new();
        }
    };
    let mut options: Vec<String> = Vec::new();
    for name in names {
        if let Some(option) = pick(&name) {
            if !options.contains(&option) {
                options.push(option);
            }
        }
    }
    options
}

//==============================================================================
// Rendering
//==============================================================================

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; display: flex;
       color: #222; }
nav { width: 260px; min-height: 100vh; background: #f4f6f8; padding: 1rem; box-sizing: border-box; }
nav a { display: block; padding: 0.3rem 0.5rem; color: #1f77b4; text-decoration: none;
        border-radius: 4px; }
nav a.active { background: #1f77b4; color: white; }
main { flex: 1; padding: 1.5rem 2rem; }
.figure { margin-bottom: 2rem; }
.figure iframe { width: 100%; height: 560px; border: 1px solid #ddd; }
.missing { color: #a94442; background: #f2dede; padding: 0.5rem 1rem; border-radius: 4px; }
form { margin-bottom: 1.5rem; }
table.growth { border-collapse: collapse; margin-bottom: 2rem; }
table.growth th, table.growth td { border: 1px solid #ddd; padding: 0.3rem 0.6rem;
                                   text-align: right; }
table.growth th:first-child, table.growth td:first-child { text-align: left; }
"#;

/// Page chrome with navigation to every table
pub fn layout(title: &str, active: Option<TableId>, body: &str) -> String {
    let mut nav = String::from("<nav>\n<h3>Mineral Outlook</h3>\n<a href=\"/\">Introduction</a>\n");
    for table in TableId::ALL {
        let class = if Some(table) == active { " class=\"active\"" } else { "" };
        nav.push_str(&format!(
            "<a href=\"/tables/{}\"{}>{}: {}</a>\n",
            table.id(),
            class,
            escape_html(&table.to_string()),
            escape_html(table.title())
        ));
    }
    nav.push_str("</nav>\n");

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n\
         <body>\n{}<main>\n{}</main>\n</body>\n</html>\n",
        escape_html(title),
        STYLE,
        nav,
        body
    )
}

pub fn index_page(version: &str) -> String {
    let mut body = String::from("<h1>Critical minerals outlook</h1>\n");
    body.push_str(
        "<p>Demand and supply projections for the minerals used in clean energy \
         technologies, cleaned from the data explorer workbook and charted per table.</p>\n",
    );
    body.push_str("<h2>Scenarios</h2>\n<ul>\n");
    for scenario in Scenario::ALL {
        body.push_str(&format!(
            "<li><strong style=\"color:{}\">{}</strong>: {}</li>\n",
            scenario.color(),
            escape_html(scenario.label()),
            escape_html(scenario.description())
        ));
    }
    body.push_str("</ul>\n<h2>Tables</h2>\n<ul>\n");
    for table in TableId::ALL {
        body.push_str(&format!(
            "<li><a href=\"/tables/{}\">{}</a>: {}</li>\n",
            table.id(),
            escape_html(&table.to_string()),
            escape_html(table.title())
        ));
    }
    body.push_str(&format!("</ul>\n<p><small>Version {}</small></p>\n", escape_html(version)));
    layout("Mineral Outlook", None, &body)
}

/// A figure entry and whether its file exists
#[derive(Debug, Clone, PartialEq)]
pub struct PageFigure {
    pub figure: FigureRef,
    pub available: bool,
}

/// Everything a table page shows
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub table: TableId,
    pub select: String,
    pub options: Vec<String>,
    pub material: Option<String>,
    pub materials: Vec<String>,
    pub figures: Vec<PageFigure>,
    /// Growth read back from the cleaned workbook, when it exists
    pub insights: Option<Insights>,
}

/// `/figures/...` URL of a table's chart file
pub fn figure_url(table: TableId, file: &str) -> String {
    format!("/figures/{}/{}", table.figures_subdir(), file)
}

fn select_html(
    name: &str,
    label: &str,
    options: &[String],
    selected: Option<&str>,
    blank: bool,
) -> String {
    let mut html = format!("<label>{} <select name=\"{}\">", escape_html(label), name);
    if blank {
        html.push_str("<option value=\"\">(none)</option>");
    }
    for option in options {
        let attr = if Some(option.as_str()) == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            escape_html(option),
            attr
        ));
    }
    html.push_str("</select></label>\n");
    html
}

fn value_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// Start, end and growth per row and scenario (or activity)
fn growth_html(table: TableId, insights: &Insights) -> String {
    if insights.rows.is_empty() {
        return String::new();
    }
    let group = if table == TableId::Supply { "Activity" } else { "Scenario" };
    let mut html = format!(
        "<h2>Growth {} → {}</h2>\n<table class=\"growth\">\n\
         <tr><th>Label</th><th>{}</th><th>{}</th><th>{}</th><th>Growth</th></tr>\n",
        insights.start_year, insights.end_year, group, insights.start_year, insights.end_year
    );
    for row in &insights.rows {
        let growth = match (row.growth_pct, row.start, row.end) {
            (Some(pct), _, _) => format!("{:.1}%", pct),
            (None, Some(start), Some(end)) if start == 0.0 && end > 0.0 => {
                "growth from zero baseline".to_string()
            }
            _ => "-".to_string(),
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.label),
            escape_html(&row.group),
            value_cell(row.start),
            value_cell(row.end),
            growth
        ));
    }
    html.push_str("</table>\n");
    html
}

pub fn table_page(page: &TablePage) -> String {
    let table = page.table;
    let mut body = format!(
        "<h1>{}: {}</h1>\n<form method=\"get\" action=\"/tables/{}\">\n",
        escape_html(&table.to_string()),
        escape_html(table.title()),
        table.id()
    );
    let entity = match table {
        TableId::Demand | TableId::Supply => "Mineral",
        TableId::TechDemand => "Metal",
        TableId::MineralDemand => "Scenario",
        _ => "Section",
    };
    body.push_str(&select_html("select", entity, &page.options, Some(&page.select), false));
    if !page.materials.is_empty() {
        body.push_str(&select_html(
            "material",
            "Material",
            &page.materials,
            page.material.as_deref(),
            true,
        ));
    }
    body.push_str("<button type=\"submit\">Show</button>\n</form>\n");
    if let Some(insights) = &page.insights {
        body.push_str(&growth_html(table, insights));
    }

    for entry in &page.figures {
        let title = escape_html(&entry.figure.title);
        body.push_str(&format!("<div class=\"figure\">\n<h3>{}</h3>\n", title));
        if entry.available {
            let url = figure_url(table, &entry.figure.file);
            body.push_str(&format!(
                "<iframe src=\"{0}\" title=\"{1}\" loading=\"lazy\"></iframe>\n\
                 <p><a href=\"{0}?download=1\">Download</a></p>\n",
                url, title
            ));
        } else {
            body.push_str(&format!(
                "<p class=\"missing\">Chart not available: {}</p>\n",
                escape_html(&entry.figure.file)
            ));
        }
        body.push_str("</div>\n");
    }
    layout(&format!("{} - {}", table, table.title()), Some(table), &body)
}
