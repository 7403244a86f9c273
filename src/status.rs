//! Process status for the `/status` command.

use std::time::{Duration, Instant};
use sysinfo::System;

/// Reports uptime and memory usage of the running bot.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    launched: Instant,
}

impl StatusReporter {
    /// Start measuring uptime from now.
    #[must_use]
    pub fn new() -> Self {
        Self::since(Instant::now())
    }

    /// Measure uptime from the given launch instant.
    #[must_use]
    pub const fn since(launched: Instant) -> Self {
        Self { launched }
    }

    /// Time elapsed since launch
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.launched.elapsed()
    }

    /// Human readable uptime, e.g. `2 days 3 hours 4 minutes 5 seconds`
    #[must_use]
    pub fn uptime_text(&self) -> String {
        format_uptime(self.uptime())
    }

    /// Human readable resident memory of this process.
    ///
    /// Returns `unknown` if the process table cannot be read.
    #[must_use]
    pub fn memory_text(&self) -> String {
        resident_memory().map_or_else(|| "unknown".to_string(), format_bytes)
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn resident_memory() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    if !system.refresh_process(pid) {
        return None;
    }
    system.process(pid).map(sysinfo::Process::memory)
}

fn plural(value: u64, unit: &str) -> String {
    if value == 1 {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

/// Format a duration as days/hours/minutes/seconds, skipping leading zero units.
#[must_use]
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60,
    );

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if days > 0 || hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }
    parts.push(plural(seconds, "second"));
    parts.join(" ")
}

/// Format a byte count with binary units.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut unit = 0;
    let mut whole = bytes;
    while whole >= 1024 && unit < UNITS.len() - 1 {
        whole /= 1024;
        unit += 1;
    }
    if unit == 0 {
        return format!("{bytes} B");
    }

    #[allow(clippy::cast_precision_loss)]
    let value = bytes as f64 / 1024_f64.powi(i32::try_from(unit).unwrap_or(0));
    format!("{value:.1} {}", UNITS[unit])
}
