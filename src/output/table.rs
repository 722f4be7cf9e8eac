//! Plain text output formatting.
//!
//! The table itself is plain, fixed-width text so it can be redirected or
//! compared verbatim. Status lines around it are styled with `console`.

use crate::aggregate::{HostRecord, ScanReport};
use console::style;
use std::io::{self, Write};

const ADDRESS_WIDTH: usize = 15;
const HOSTNAME_WIDTH: usize = 30;
const PORTS_WIDTH: usize = 20;
const SERVICES_RULE: usize = 20;

fn row(address: &str, hostname: &str, ports: &str, services: &str) -> String {
    format!(
        "{:<aw$} {:<hw$} {:<pw$} {}",
        address,
        hostname,
        ports,
        services,
        aw = ADDRESS_WIDTH,
        hw = HOSTNAME_WIDTH,
        pw = PORTS_WIDTH,
    )
}

fn host_row(host: &HostRecord) -> String {
    let ports: Vec<String> = host.open_ports().iter().map(|p| p.to_string()).collect();
    row(
        host.address(),
        host.hostname().unwrap_or(""),
        &ports.join(","),
        &host.services().join(","),
    )
}

/// Render the report as a fixed-width table, one line per host.
pub fn render_table(report: &ScanReport) -> String {
    let mut lines = vec![
        row("IP", "Hostname", "Open Ports", "Services"),
        row(
            &"-".repeat(ADDRESS_WIDTH),
            &"-".repeat(HOSTNAME_WIDTH),
            &"-".repeat(PORTS_WIDTH),
            &"-".repeat(SERVICES_RULE),
        ),
    ];
    lines.extend(report.hosts().iter().map(host_row));

    let mut table = lines.join("\n");
    table.push('\n');
    table
}

/// Print the results table and a summary line to stdout.
pub fn print_results(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(out, "{}", style("Scan Results").cyan().bold())?;
    write!(out, "{}", render_table(report))?;
    writeln!(out)?;
    writeln!(
        out,
        "{} Scan completed. Found {} open ports on {} hosts.",
        style("✓").green().bold(),
        style(report.open_port_count()).green().bold(),
        report.len()
    )?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(targets: usize, ports: usize, threads: usize, timeout_secs: u64) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("portsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Scanning {} target(s) and {} port(s)",
        style("•").dim(),
        style(targets).white().bold(),
        style(ports).white().bold()
    );
    println!(
        "{} {} workers, {}s timeout",
        style("•").dim(),
        threads,
        timeout_secs
    );
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}
