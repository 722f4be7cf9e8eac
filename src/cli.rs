//! Command-line interface for portsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing. Everything
//! here is I/O glue around the library: reading the target list, loading
//! settings, wiring Ctrl-C to cancellation, and printing or saving the
//! report.

use crate::aggregate::ScanReport;
use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use crate::scanner::{ScanConfig, ScanEngine};
use crate::types::{parse_ports, parse_targets};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Concurrent TCP reachability sweeper.
///
/// Probes every target against every port with a plain TCP connect, labels
/// open ports by well-known service, and reports one line per host.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sweep hosts, ranges and CIDR blocks for open TCP ports", long_about = None)]
pub struct Args {
    /// Target IP, hostname, range or CIDR (repeatable)
    ///
    /// Examples:
    ///   10.0.0.5                 Single IP address
    ///   db.internal              Hostname
    ///   10.0.0.1-10.0.0.40       Inclusive range
    ///   192.168.1.0/24           CIDR block
    #[arg(short = 't', long = "target", value_name = "TARGET")]
    pub targets: Vec<String>,

    /// File containing one target per line
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Ports to scan ("80", "80,443", "1-1000"); empty means common ports
    #[arg(short, long, default_value = "")]
    pub ports: String,

    /// Number of concurrent probes
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write results to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Format of the results file
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Skip reverse hostname lookups
    #[arg(long)]
    pub no_dns: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging and a progress bar)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Read target specifications from a file, one per line.
///
/// Lines are trimmed and blank lines are skipped.
pub fn read_target_file(path: &Path) -> CliResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| CliError::TargetFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

impl Args {
    /// All target specifications: `--target` values first, then the file.
    pub fn target_specs(&self) -> CliResult<Vec<String>> {
        let mut specs = self.targets.clone();
        if let Some(ref path) = self.file {
            specs.extend(read_target_file(path)?);
        }
        if specs.is_empty() {
            return Err(CliError::NoTargetsGiven);
        }
        Ok(specs)
    }

    fn load_settings(&self) -> CliResult<AppSettings> {
        match self.config {
            Some(ref path) => Ok(AppSettings::load_from(path)?),
            None => Ok(AppSettings::load().unwrap_or_else(|e| {
                warn!(error = %e, "could not load settings, using defaults");
                AppSettings::default()
            })),
        }
    }
}

fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    )
    .map(|s| s.progress_chars("=>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Run a scan as described by `args` and report the results.
pub async fn run(args: Args) -> CliResult<ScanReport> {
    let settings = args.load_settings()?;

    let specs = args.target_specs()?;
    let targets = parse_targets(&specs, u128::from(settings.max_hosts_per_target));
    for skipped in &targets.skipped {
        warn!(target = %skipped.input, reason = %skipped.reason, "skipping target");
    }
    if targets.items.is_empty() {
        return Err(CliError::NoTargetsResolved);
    }

    let ports = parse_ports(&args.ports);
    for skipped in &ports.skipped {
        warn!(port = %skipped.input, reason = %skipped.reason, "skipping port");
    }
    if ports.items.is_empty() {
        warn!(spec = %args.ports, "no ports resolved, nothing will be probed");
    }

    let threads = args.threads.unwrap_or(settings.default_threads);
    let timeout_secs = args.timeout.unwrap_or(settings.default_timeout_secs);

    let mut config = ScanConfig::new(threads, Duration::from_secs(timeout_secs));
    if args.no_dns || !settings.resolve_hostnames {
        config = config.without_hostnames();
    }

    if !args.quiet {
        output::print_scan_header(
            targets.items.len(),
            ports.items.len(),
            config.concurrency,
            timeout_secs,
        );
    }

    let mut engine = ScanEngine::new(config, Arc::new(settings.service_table()));
    let progress = (args.verbose && !args.quiet)
        .then(|| progress_bar(targets.items.len() * ports.items.len()));
    if let Some(ref pb) = progress {
        engine = engine.with_progress(pb.clone());
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let report = engine.run(targets.items, ports.items, cancel.clone()).await;

    if let Some(pb) = progress {
        pb.finish_with_message("Scan complete");
    }
    if cancel.is_cancelled() {
        output::print_warning("Scan interrupted; results are partial.");
    }

    output::print_results(&report)?;

    if let Some(ref path) = args.output {
        output::save_results(path, &report, args.format)?;
        info!(path = %path.display(), format = %args.format, "results saved");
        if !args.quiet {
            output::print_success(&format!("Results saved to: {}", path.display()));
        }
    }

    Ok(report)
}
