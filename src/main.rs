use clap::{Parser, Subcommand};
use mineral_outlook::cli::{self, Overrides};
use mineral_outlook::tables::TableId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "outlook")]
#[command(about = "Clean the Data Explorer workbook, chart it and serve a dashboard.")]
#[command(long_about = "Mineral Outlook - Critical minerals scenario tables

Reads the Critical Minerals Data Explorer workbook, writes one cleaned
spreadsheet per table, renders interactive scenario charts and serves
them on a local dashboard.

TABLES:
  1    Total demand for key minerals
  2    Total supply for key minerals
  3.1  Cleantech demand by technology
  3.2  Cleantech demand by mineral
  4.1  Solar PV           4.4  Grid battery storage
  4.2  Wind               4.5  Electricity networks
  4.3  Electric vehicles  4.6  Hydrogen

SCENARIOS:
  Stated policies, Announced pledges, Net Zero Emissions by 2050

COMMANDS:
  inspect  - List workbook sheets and preview one
  clean    - Write cleaned spreadsheets
  charts   - Write chart files
  run      - Clean and chart every table
  watch    - Re-run whenever the workbook changes
  serve    - Start the dashboard

EXAMPLES:
  outlook inspect --sheet '3.2 Cleantech demand by mineral'
  outlook clean --table 1 --table 3.2
  outlook run --input explorer.xlsx --output-dir output
  outlook serve --port 8501

Settings are read from outlook.yaml when present.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./outlook.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Source workbook
    #[arg(short, long, global = true, env = "OUTLOOK_INPUT")]
    input: Option<PathBuf>,

    /// Directory for cleaned spreadsheets
    #[arg(short, long, global = true, env = "OUTLOOK_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Directory for chart files
    #[arg(short, long, global = true, env = "OUTLOOK_FIGURES_DIR")]
    figures_dir: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "List the sheets of the source workbook.

Sheets matching a table are marked. Missing table sheets are reported
with the name that was expected, which can be changed in outlook.yaml:

  sheets:
    \"3.2\": \"3.2 Cleantech demand by mineral\"

Use --sheet to preview the first rows of one sheet.")]
    /// List workbook sheets and preview one
    Inspect {
        /// Sheet to preview
        #[arg(short, long)]
        sheet: Option<String>,

        /// Rows to preview
        #[arg(short, long, default_value = "15")]
        rows: usize,
    },

    #[command(long_about = "Write cleaned spreadsheets into the output directory.

Each table is cleaned on its own; a failing table is reported and the
others still run. The command fails when any table failed.")]
    /// Write cleaned spreadsheets
    Clean {
        /// Tables to clean (repeatable; default: all)
        #[arg(short, long, value_enum)]
        table: Vec<TableId>,
    },

    /// Write chart files into the figures directory
    Charts {
        /// Tables to chart (repeatable; default: all)
        #[arg(short, long, value_enum)]
        table: Vec<TableId>,
    },

    /// Clean and chart every table
    Run,

    #[command(long_about = "Watch the source workbook and re-run on every save.

Runs once at start, then cleans and charts all tables after each change.
Press Ctrl+C to stop.")]
    /// Re-run whenever the workbook changes
    Watch,

    /// Start the dashboard
    Serve {
        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, env = "OUTLOOK_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "OUTLOOK_PORT")]
        port: Option<u16>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mineral_outlook=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut overrides = Overrides {
        config: cli.config,
        input: cli.input,
        output_dir: cli.output_dir,
        figures_dir: cli.figures_dir,
        ..Default::default()
    };
    if let Commands::Serve { host, port } = &cli.command {
        overrides.host = host.clone();
        overrides.port = *port;
    }
    let config = cli::resolve_config(&overrides)?;

    match cli.command {
        Commands::Inspect { sheet, rows } => cli::inspect(&config, sheet, rows)?,
        Commands::Clean { table } => cli::clean(&config, &table)?,
        Commands::Charts { table } => cli::charts(&config, &table)?,
        Commands::Run => cli::run(&config)?,
        Commands::Watch => cli::watch(&config)?,
        Commands::Serve { .. } => cli::serve(config)?,
    }
    Ok(())
}
