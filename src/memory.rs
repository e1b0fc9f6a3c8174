//! Process memory reporting

use anyhow::{anyhow, Context, Result};
use sysinfo::{ProcessExt, System, SystemExt};
use tracing::info;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Resident set size of the current process in bytes
pub fn current_rss_bytes() -> Result<u64> {
    let pid = sysinfo::get_current_pid()
        .map_err(|e| anyhow!(e))
        .context("Failed to determine current process id")?;

    let mut sys = System::new();
    sys.refresh_process(pid);

    sys.process(pid)
        .map(|p| p.memory())
        .context("Current process not visible to the OS process table")
}

/// Format a byte count as megabytes with two decimals
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

/// Print the current memory usage line
pub fn report() -> Result<()> {
    let rss = current_rss_bytes()?;
    info!(rss_bytes = rss, "process memory");
    println!("Current memory usage: {}", format_mb(rss));
    Ok(())
}
