//! Process resource sampling
//!
//! CPU utilisation since the previous sample (utime+stime from
//! /proc/self/stat over elapsed wall time) and resident set size from
//! /proc/self/status. Both degrade to 0.0 off Linux or on read failure.

use std::time::Instant;

/// Kernel USER_HZ; fixed at 100 on every supported Linux target.
#[cfg(target_os = "linux")]
const CLOCK_TICKS_PER_SEC: f64 = 100.0;

/// Tracks CPU time between samples
pub struct CpuSampler {
    last_wall: Option<Instant>,
    last_cpu_secs: f64,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self {
            last_wall: None,
            last_cpu_secs: 0.0,
        }
    }

    /// CPU percentage since the previous call; 0.0 on the first call
    pub fn sample(&mut self) -> f64 {
        let now = Instant::now();
        let cpu_secs = match process_cpu_seconds() {
            Some(secs) => secs,
            None => return 0.0,
        };

        let usage = match self.last_wall {
            Some(last_wall) => {
                let wall_delta = now.duration_since(last_wall).as_secs_f64();
                let cpu_delta = cpu_secs - self.last_cpu_secs;
                if wall_delta > 0.0 {
                    (cpu_delta / wall_delta) * 100.0
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        self.last_wall = Some(now);
        self.last_cpu_secs = cpu_secs;
        usage
    }
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Cumulative user+system CPU seconds for this process
#[cfg(target_os = "linux")]
fn process_cpu_seconds() -> Option<f64> {
    let stat = std::fs::read_to_string("/proc/self/stat").ok()?;
    // Fields after the parenthesised comm (which may contain spaces)
    let rest = &stat[stat.rfind(')')? + 1..];
    let mut fields = rest.split_whitespace();
    // utime and stime are the 12th and 13th fields after comm
    let utime: f64 = fields.nth(11)?.parse().ok()?;
    let stime: f64 = fields.next()?.parse().ok()?;
    Some((utime + stime) / CLOCK_TICKS_PER_SEC)
}

#[cfg(not(target_os = "linux"))]
fn process_cpu_seconds() -> Option<f64> {
    None
}

/// Current resident set size in MB
#[cfg(target_os = "linux")]
pub fn memory_usage_mb() -> f64 {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return 0.0;
    };
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kb: f64 = rest
                .trim()
                .trim_end_matches("kB")
                .trim()
                .parse()
                .unwrap_or(0.0);
            return kb / 1024.0;
        }
    }
    0.0
}

#[cfg(not(target_os = "linux"))]
pub fn memory_usage_mb() -> f64 {
    0.0
}
