//! Mineral Outlook dashboard binary
//!
//! Serves the table pages and chart files without the rest of the CLI.

use clap::Parser;
use mineral_outlook::cli::{resolve_config, Overrides};
use mineral_outlook::dashboard::run_dashboard;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "outlook-server")]
#[command(version)]
#[command(about = "Mineral Outlook dashboard - scenario charts per table")]
#[command(long_about = r#"
Mineral Outlook dashboard

Pages:
  - GET  /                       - Overview and scenario descriptions
  - GET  /tables/{id}            - Charts for one table (?select=&material=)
  - GET  /figures/{path}         - Chart files (?download=1 to save)

API:
  - GET  /api/v1/insights/{id}   - Growth figures from the cleaned workbooks
  - GET  /health                 - Health check
  - GET  /version                - Server version info

Charts are written by `outlook charts` or `outlook run`.

Example usage:
  outlook-server                           # Start on 127.0.0.1:8501
  outlook-server --host 0.0.0.0 --port 3000
"#)]
struct Args {
    /// Config file (default: ./outlook.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, env = "OUTLOOK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "OUTLOOK_PORT")]
    port: Option<u16>,

    /// Directory with chart files
    #[arg(short, long, env = "OUTLOOK_FIGURES_DIR")]
    figures_dir: Option<PathBuf>,

    /// Directory with cleaned spreadsheets
    #[arg(short, long, env = "OUTLOOK_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mineral_outlook=info,tower_http=info")),
        )
        .init();

    let config = resolve_config(&Overrides {
        config: args.config,
        output_dir: args.output_dir,
        figures_dir: args.figures_dir,
        host: args.host,
        port: args.port,
        ..Default::default()
    })?;

    run_dashboard(config).await
}
