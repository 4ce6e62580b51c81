use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::io::{self, Write};
use taptst10_lib::{TapTst10, render};
use tracing::{debug, info};

/// Read the power consumption history stored in a SANWA TAP-TST10 and print it as CSV.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Fetch all power consumption data. Reserved: the full history is always read.
    #[arg(short, long)]
    all: bool,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Logs go to stderr so stdout stays pure CSV
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(cli.verbose.tracing_level_filter())
        .with_target(false)
        .init();

    if cli.all {
        debug!("--all has no effect, the device always returns its full history");
    }

    let mut device = TapTst10::open().context("Failed to open the TAP-TST10")?;
    let now = Local::now().naive_local();
    let session = device.read_history().context("Failed to read power history")?;
    debug!("Closing TAP-TST10");
    drop(device);

    info!(
        samples = session.series.len(),
        total_kwh = session.series.total_kwh(),
        "Rendering CSV"
    );

    let csv = render(&session.series, now);
    let mut stdout = io::stdout().lock();
    stdout.write_all(csv.as_bytes()).context("Failed to write CSV")?;
    stdout.flush().context("Failed to write CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_all_flag() {
        assert!(!Cli::try_parse_from(["taptst10ctl"]).unwrap().all);
        assert!(Cli::try_parse_from(["taptst10ctl", "-a"]).unwrap().all);
        assert!(Cli::try_parse_from(["taptst10ctl", "--all"]).unwrap().all);
    }

    #[test]
    fn test_rejects_unknown_arguments() {
        assert!(Cli::try_parse_from(["taptst10ctl", "--continuous"]).is_err());
        assert!(Cli::try_parse_from(["taptst10ctl", "extra"]).is_err());
    }
}
