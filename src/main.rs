use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use psinfo::{Config, Manager, OutputFormat, DEFAULT_CAPACITY};

#[derive(Parser, Debug)]
#[command(name = "psinfo")]
#[command(about = "Print /proc status details for a list of processes", long_about = None)]
#[command(version)]
struct Cli {
    /// Process ids to report on
    #[arg(required = true, value_name = "PID")]
    pids: Vec<u32>,

    /// Slots in the shared report pool
    #[arg(short = 'n', long, env = "PSINFO_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Read <DIR>/<pid>/status as text instead of going through procfs
    #[arg(long, env = "PSINFO_PROC_ROOT", value_name = "DIR")]
    proc_root: Option<PathBuf>,

    /// Output format (human, json)
    #[arg(long, default_value = "human")]
    format: OutputFormatArg,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    // Exits with status 2 and a usage message when no pids are given.
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("psinfo: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config {
        capacity: cli.capacity,
        proc_root: cli.proc_root,
        format: cli.format.into(),
    };
    let manager = Manager::new(config).context("invalid configuration")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = manager.run(&cli.pids, &mut out).context("run failed")?;

    tracing::info!(
        reported = summary.reported,
        failed = summary.failed,
        high_water = summary.stats.high_water,
        capacity = summary.stats.capacity,
        "done"
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("psinfo=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("psinfo=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}
