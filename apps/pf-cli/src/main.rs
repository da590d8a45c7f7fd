use clap::Parser;
use pf_sim::{Configuration, SimResult, run_scenario};
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{Level, info, warn};

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "PanelFlow - unsteady panel-method aerodynamics", long_about = None)]
struct Cli {
    /// Configuration YAML; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); logs go to stderr
    #[arg(short, long, default_value = "warn", value_parser = parse_level)]
    log_level: Level,
}

fn parse_level(name: &str) -> Result<Level, String> {
    Level::from_str(name).map_err(|_| {
        format!("unknown log level {name:?}; expected trace, debug, info, warn or error")
    })
}

fn main() -> SimResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Configuration::load(path)?,
        None => Configuration::default(),
    };
    info!(test_case = config.test_case, threads = config.effective_threads(), "configuration resolved");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run_scenario(&config, &mut out)? {
        Some(summary) => info!(case = summary.case, iterations = summary.iterations, "done"),
        None => warn!(test_case = config.test_case, "unrecognized scenario id; nothing to run"),
    }
    out.flush()?;
    Ok(())
}
