//! poolstat - periodic ZFS pool metric monitor.
//!
//! Samples one pool through `zpool`/`zfs` commands (locally or over SSH),
//! renders the requested columns as an aligned two-row table and refreshes
//! it on a fixed interval until interrupted.
//!
//! Usage:
//!   poolstat                          # local pool "amalgm", 4s refresh
//!   poolstat -p tank -t 1.0           # pool "tank", 1s refresh
//!   poolstat --ssh root@192.168.1.33  # sample a remote host
//!   poolstat -o Name,VirtCapUsed:G    # custom columns, forced unit

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use poolstat::collector::{LocalTransport, PoolSources, SshTransport, declared_keys};
use poolstat::tui::{App, RunError, Screen, TermScreen};
use poolstat::view::{ColumnSpec, validate_columns};

/// Columns shown when `-o` is not given.
const DEFAULT_COLUMNS: &str = "Name,CapLogicUsed,CapLogicFree,OpsRead,OpsWrite,BwRead,BwWrite,\
                               TotalwaitBoth,VirtCapUsedPerc,VirtCompPerc,StateHealth,StateFragPerc";

/// Periodic ZFS pool metric monitor.
#[derive(Parser)]
#[command(name = "poolstat", about = "Periodic ZFS pool metric monitor", version)]
struct Args {
    /// Pool to monitor.
    #[arg(short, long, default_value = "amalgm")]
    pool: String,

    /// Refresh interval in seconds (fractional allowed). Also used as the
    /// `zpool iostat` sampling window; at least 1 second gives accurate
    /// statistics.
    #[arg(short = 't', long, default_value = "4.0")]
    interval: f64,

    /// Comma-separated columns to display, each `name[:unit]`.
    #[arg(short = 'o', long, value_name = "LIST")]
    columns: Option<String>,

    /// Sample a remote host over SSH (user@host). Default is to run the
    /// pool commands locally.
    #[arg(long, value_name = "TARGET")]
    ssh: Option<String>,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber. Warnings and errors go to stderr so
/// they survive the alternate screen.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("poolstat={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    if args.interval <= 0.0 {
        eprintln!("Error: interval must be positive, got {}", args.interval);
        std::process::exit(1);
    }

    let columns = ColumnSpec::parse_list(args.columns.as_deref().unwrap_or(DEFAULT_COLUMNS));
    if columns.is_empty() {
        eprintln!("Error: no columns requested");
        std::process::exit(1);
    }

    // Report typos and ambiguous names once, before the first cycle.
    validate_columns(&columns, &declared_keys());

    let sources = PoolSources::new(&args.pool, args.interval);
    let interval = Duration::from_secs_f64(args.interval);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("poolstat {} monitoring '{}'", env!("CARGO_PKG_VERSION"), args.pool);

    let screen = match TermScreen::new() {
        Ok(screen) => screen,
        Err(e) => {
            eprintln!("Error: failed to set up terminal: {}", e);
            std::process::exit(1);
        }
    };

    let result = match args.ssh {
        Some(target) => run_app(sources, SshTransport::new(target), screen, columns, interval, running),
        None => run_app(sources, LocalTransport::new(), screen, columns, interval, running),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app<T: poolstat::collector::Transport, S: Screen>(
    sources: PoolSources,
    transport: T,
    screen: S,
    columns: Vec<ColumnSpec>,
    interval: Duration,
    running: Arc<AtomicBool>,
) -> Result<(), RunError> {
    App::new(sources, transport, screen, columns, interval, running).run()
}
