use crate::config::OutlookConfig;
use crate::error::{OutlookError, OutlookResult};
use crate::excel::SourceWorkbook;
use crate::tables::{self, Dataset, TableId, TableOutcome};
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Path overrides given on the command line or through `OUTLOOK_*`
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub figures_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Load the config file and apply overrides on top
pub fn resolve_config(overrides: &Overrides) -> OutlookResult<OutlookConfig> {
    let mut config = OutlookConfig::load(overrides.config.as_deref())?;
    if let Some(input) = &overrides.input {
        config.input = input.clone();
    }
    if let Some(dir) = &overrides.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(dir) = &overrides.figures_dir {
        config.figures_dir = dir.clone();
    }
    if let Some(host) = &overrides.host {
        config.server.host = host.clone();
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    Ok(config)
}

/// Requested tables, or all of them when none were named
fn selected(tables: &[TableId]) -> Vec<TableId> {
    if tables.is_empty() {
        TableId::ALL.to_vec()
    } else {
        let mut tables = tables.to_vec();
        tables.sort();
        tables.dedup();
        tables
    }
}

/// Truncate a preview cell to `width` characters
fn preview_cell(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{:<width$}", text, width = width)
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Execute the inspect command
pub fn inspect(config: &OutlookConfig, sheet: Option<String>, rows: usize) -> OutlookResult<()> {
    println!("{}", "🔍 Mineral Outlook - Inspect workbook".bold().green());
    println!("   Input: {}\n", config.input.display());

    let mut workbook = SourceWorkbook::open(&config.input)?;
    let names = workbook.sheet_names();

    println!("{}", format!("📄 {} sheets", names.len()).bold());
    for name in &names {
        let table = TableId::ALL
            .iter()
            .find(|t| config.sheet_for(t.id(), t.default_sheet()) == name);
        match table {
            Some(t) => println!(
                "   {} {} {}",
                "✅".green(),
                name.bright_blue(),
                format!("({})", t).cyan()
            ),
            None => println!("   {} {}", "  ".dimmed(), name),
        }
    }

    let missing: Vec<TableId> = TableId::ALL
        .iter()
        .copied()
        .filter(|t| !names.iter().any(|n| n == config.sheet_for(t.id(), t.default_sheet())))
        .collect();
    if !missing.is_empty() {
        println!();
        for table in &missing {
            println!(
                "   {} {} sheet not found: {}",
                "⚠️ ".yellow(),
                table,
                config.sheet_for(table.id(), table.default_sheet()).yellow()
            );
        }
    }

    if let Some(sheet) = sheet {
        let grid = workbook.grid(&sheet)?;
        println!(
            "\n{}",
            format!("📊 {} ({} rows x {} columns)", sheet, grid.height(), grid.width()).bold()
        );
        for (i, row) in grid.rows().iter().take(rows).enumerate() {
            let cells: Vec<String> = row.iter().map(|c| preview_cell(&c.render(), 14)).collect();
            println!("   {:>3} │ {}", i + 1, cells.join(" │ ").trim_end());
        }
        if grid.height() > rows {
            println!("   {}", format!("... {} more rows", grid.height() - rows).dimmed());
        }
    }
    println!();
    Ok(())
}

fn print_outcome(outcome: &TableOutcome) {
    match &outcome.result {
        Ok(cleaned) => {
            println!(
                "   {} {}: {}",
                "✅".green(),
                outcome.table.to_string().bold(),
                outcome.table.title()
            );
            for path in &cleaned.outputs {
                println!("      → {}", path.display());
            }
        }
        Err(e) => print_failure(outcome.table, e),
    }
}

fn print_failure(table: TableId, e: &OutlookError) {
    println!("   {} {}: {}", "❌".red(), table.to_string().bold(), e.to_string().red());
}

fn failure_summary(failed: &[TableId], total: usize, action: &str) -> OutlookResult<()> {
    if failed.is_empty() {
        return Ok(());
    }
    let ids: Vec<&str> = failed.iter().map(|t| t.id()).collect();
    Err(OutlookError::Failed(format!(
        "{} of {} tables failed to {}: {}",
        failed.len(),
        total,
        action,
        ids.join(", ")
    )))
}

/// Execute the clean command
pub fn clean(config: &OutlookConfig, tables: &[TableId]) -> OutlookResult<()> {
    let tables = selected(tables);
    println!("{}", "🧹 Mineral Outlook - Cleaning tables".bold().green());
    println!("   Input:  {}", config.input.display());
    println!("   Output: {}\n", config.output_dir.display());

    let outcomes = tables::clean_tables(&tables, config)?;
    outcomes.iter().for_each(print_outcome);

    let failed: Vec<TableId> = outcomes.iter().filter(|o| !o.is_ok()).map(|o| o.table).collect();
    println!();
    if failed.is_empty() {
        println!("{}", format!("✅ Cleaned {} tables", outcomes.len()).bold().green());
    }
    failure_summary(&failed, outcomes.len(), "clean")
}

fn render_charts(
    table: TableId,
    dataset: &Dataset,
    config: &OutlookConfig,
) -> OutlookResult<usize> {
    let written = crate::charts::render(table, dataset, config)?;
    println!(
        "   {} {}: {} charts → {}",
        "📈".green(),
        table.to_string().bold(),
        written.len(),
        config.figures_dir.join(table.figures_subdir()).display()
    );
    Ok(written.len())
}

/// Execute the charts command: parse each table and write its charts
pub fn charts(config: &OutlookConfig, tables: &[TableId]) -> OutlookResult<()> {
    let tables = selected(tables);
    println!("{}", "📈 Mineral Outlook - Rendering charts".bold().green());
    println!("   Input:   {}", config.input.display());
    println!("   Figures: {}\n", config.figures_dir.display());

    let mut workbook = SourceWorkbook::open(&config.input)?;
    let mut failed = Vec::new();
    let mut total = 0;
    for table in &tables {
        let result = tables::parse_table(*table, &mut workbook, config)
            .and_then(|dataset| render_charts(*table, &dataset, config));
        match result {
            Ok(n) => total += n,
            Err(e) => {
                print_failure(*table, &e);
                failed.push(*table);
            }
        }
    }

    println!();
    if failed.is_empty() {
        println!("{}", format!("✅ Wrote {} charts", total).bold().green());
    }
    failure_summary(&failed, tables.len(), "chart")
}

/// Execute the run command: clean every table, then chart what was cleaned
pub fn run(config: &OutlookConfig) -> OutlookResult<()> {
    println!("{}", "🚀 Mineral Outlook - Full run".bold().green());
    println!("   Input:   {}", config.input.display());
    println!("   Output:  {}", config.output_dir.display());
    println!("   Figures: {}\n", config.figures_dir.display());

    let outcomes = tables::clean_tables(&TableId::ALL, config)?;
    let mut failed = Vec::new();
    for outcome in &outcomes {
        print_outcome(outcome);
        let Ok(cleaned) = &outcome.result else {
            failed.push(outcome.table);
            continue;
        };
        if let Err(e) = render_charts(outcome.table, &cleaned.dataset, config) {
            print_failure(outcome.table, &e);
            failed.push(outcome.table);
        }
    }

    println!();
    if failed.is_empty() {
        println!("{}", "✅ All tables cleaned and charted".bold().green());
    }
    failure_summary(&failed, outcomes.len(), "clean and chart")
}

/// Execute the watch command: re-run on every change to the input workbook
pub fn watch(config: &OutlookConfig) -> OutlookResult<()> {
    println!("{}", "👁️  Mineral Outlook - Watch Mode".bold().green());
    println!("   Watching: {}", config.input.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    if !config.input.exists() {
        return Err(OutlookError::NotFound(config.input.display().to_string()));
    }

    let canonical_path = config.input.canonicalize()?;
    let parent_dir = canonical_path
        .parent()
        .ok_or_else(|| OutlookError::Config("Cannot determine parent directory".to_string()))?;

    let (tx, rx) = channel();
    // Spreadsheet apps write in several steps; wait for them to settle
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)
        .map_err(|e| OutlookError::Config(format!("Failed to create file watcher: {}", e)))?;
    debouncer
        .watcher()
        .watch(parent_dir, RecursiveMode::NonRecursive)
        .map_err(|e| OutlookError::Config(format!("Failed to watch directory: {}", e)))?;

    println!("{}", "🔄 Initial run...".cyan());
    run_watch_action(config);
    println!();

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any
                        && is_same_file(&event.path, &canonical_path)
                });
                if relevant {
                    println!(
                        "\n{} {}",
                        "🔄 Change detected at".cyan(),
                        chrono::Local::now().format("%H:%M:%S").to_string().cyan()
                    );
                    run_watch_action(config);
                    println!();
                }
            }
            Ok(Err(error)) => {
                eprintln!("{} Watch error: {}", "❌".red(), error);
            }
            Err(e) => {
                eprintln!("{} Channel error: {}", "❌".red(), e);
                break;
            }
        }
    }

    Ok(())
}

/// Event path refers to the watched file (by canonical path or file name)
fn is_same_file(event_path: &Path, watched: &Path) -> bool {
    if let Ok(canonical) = event_path.canonicalize() {
        if canonical == watched {
            return true;
        }
    }
    match (event_path.file_name(), watched.file_name()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn run_watch_action(config: &OutlookConfig) {
    match run(config) {
        Ok(()) => println!("{}", "✅ Run complete".bold().green()),
        Err(e) => println!("{} {}", "❌ Run failed:".bold().red(), e),
    }
}

/// Execute the serve command
pub fn serve(config: OutlookConfig) -> anyhow::Result<()> {
    println!("{}", "🌐 Mineral Outlook - Dashboard".bold().green());
    println!(
        "   Listening on http://{}:{}",
        config.server.host, config.server.port
    );
    println!("   Figures: {}", config.figures_dir.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(crate::dashboard::run_dashboard(config))
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
