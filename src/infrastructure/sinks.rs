//! Durable record sinks
//!
//! One append-mode file per record stream, laid out under the data
//! directory:
//!
//! ```text
//! data/
//!   trades/<SYMBOL>.log            raw frames, line-delimited
//!   metrics/vwap/<SYMBOL>.csv      iso_minute,vwap
//!   metrics/correlations/<SYMBOL>.csv
//!   performance/latency.csv
//!   performance/scheduler.csv
//!   performance/system.csv
//! ```
//!
//! Every file is opened once at startup; open failure is fatal. Write
//! failures after startup are logged and swallowed so a full disk never
//! unwinds the pipeline.

use crate::core::time::format_minute_iso;
use crate::core::{Symbol, N_SYMBOLS, NS_PER_MS};
use crate::infrastructure::config::StorageConfig;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// All record sinks, addressed by symbol where applicable
pub struct Sinks {
    trade_logs: Vec<Mutex<File>>,
    vwap: Vec<Mutex<File>>,
    correlations: Vec<Mutex<File>>,
    latency: Mutex<File>,
    scheduler: Mutex<File>,
    system: Mutex<File>,
    fsync_per_write: bool,
}

fn open_append(dir: &Path, name: &str, ext: &str) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(format!("{name}.{ext}")))
}

impl Sinks {
    /// Create the directory layout and open every sink file
    pub fn create(config: &StorageConfig) -> std::io::Result<Self> {
        let base = &config.data_dir;
        let trades_dir = base.join("trades");
        let vwap_dir = base.join("metrics/vwap");
        let corr_dir = base.join("metrics/correlations");
        let perf_dir = base.join("performance");
        for dir in [&trades_dir, &vwap_dir, &corr_dir, &perf_dir] {
            fs::create_dir_all(dir)?;
        }

        let mut trade_logs = Vec::with_capacity(N_SYMBOLS);
        let mut vwap = Vec::with_capacity(N_SYMBOLS);
        let mut correlations = Vec::with_capacity(N_SYMBOLS);
        for symbol in Symbol::ALL {
            trade_logs.push(Mutex::new(open_append(&trades_dir, symbol.as_str(), "log")?));
            vwap.push(Mutex::new(open_append(&vwap_dir, symbol.as_str(), "csv")?));
            correlations.push(Mutex::new(open_append(&corr_dir, symbol.as_str(), "csv")?));
        }

        Ok(Self {
            trade_logs,
            vwap,
            correlations,
            latency: Mutex::new(open_append(&perf_dir, "latency", "csv")?),
            scheduler: Mutex::new(open_append(&perf_dir, "scheduler", "csv")?),
            system: Mutex::new(open_append(&perf_dir, "system", "csv")?),
            fsync_per_write: config.fsync_per_write,
        })
    }

    fn append_line(&self, file: &Mutex<File>, line: &[u8], stream: &'static str) {
        let mut file = file.lock().unwrap();
        if let Err(e) = file.write_all(line) {
            tracing::error!(stream, error = %e, "sink write failed");
            return;
        }
        if self.fsync_per_write {
            if let Err(e) = file.sync_data() {
                tracing::warn!(stream, error = %e, "sink fsync failed");
            }
        }
    }

    /// Durable append of a raw trade frame for its symbol
    pub fn log_trade_raw(&self, symbol: Symbol, raw: &[u8]) {
        let mut line = Vec::with_capacity(raw.len() + 1);
        line.extend_from_slice(raw);
        line.push(b'\n');
        self.append_line(&self.trade_logs[symbol.index()], &line, "trades");
    }

    /// Per-trade latency record with derived network/processing/total fields
    pub fn log_latency(
        &self,
        symbol: Symbol,
        exchange_ts_ms: i64,
        recv_ts_ms: i64,
        process_ts_ms: i64,
    ) {
        let network = recv_ts_ms - exchange_ts_ms;
        let processing = process_ts_ms - recv_ts_ms;
        let total = process_ts_ms - exchange_ts_ms;
        let line = format!(
            "{},{exchange_ts_ms},{recv_ts_ms},{process_ts_ms},{network},{processing},{total}\n",
            symbol.index()
        );
        self.append_line(&self.latency, line.as_bytes(), "latency");
    }

    /// Per-minute VWAP record; NaN is written as its textual form
    pub fn log_vwap(&self, symbol: Symbol, minute_ts_ms: i64, vwap: f64) {
        let line = format!("{},{vwap}\n", format_minute_iso(minute_ts_ms));
        self.append_line(&self.vwap[symbol.index()], line.as_bytes(), "vwap");
    }

    /// Per-minute best-peer correlation record
    pub fn log_correlation(
        &self,
        symbol: Symbol,
        minute_ts_ms: i64,
        peer: Symbol,
        r: f64,
        peer_end_minute_ts_ms: i64,
    ) {
        let line = format!(
            "{},{},{r:.6},{}\n",
            format_minute_iso(minute_ts_ms),
            peer.as_str(),
            format_minute_iso(peer_end_minute_ts_ms),
        );
        self.append_line(&self.correlations[symbol.index()], line.as_bytes(), "correlations");
    }

    /// Per-tick scheduler drift record; timestamps on the monotonic axis
    pub fn log_scheduler(&self, scheduled_ms: i64, actual_ms: i64, drift_ns: i64) {
        let drift_ms = drift_ns as f64 / NS_PER_MS as f64;
        let line = format!("{scheduled_ms},{actual_ms},{drift_ms:.2}\n");
        self.append_line(&self.scheduler, line.as_bytes(), "scheduler");
    }

    /// Per-tick process resource record
    pub fn log_system(&self, ts_ms: i64, cpu_pct: f64, memory_mb: f64) {
        let line = format!("{ts_ms},{cpu_pct:.2},{memory_mb:.2}\n");
        self.append_line(&self.system, line.as_bytes(), "system");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_config(tag: &str) -> StorageConfig {
        let dir = std::env::temp_dir().join(format!("okxflow_sinks_{tag}_{}", std::process::id()));
        StorageConfig {
            data_dir: dir,
            fsync_per_write: false,
        }
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_layout_created_and_records_written() {
        let config = scratch_config("layout");
        let sinks = Sinks::create(&config).unwrap();

        sinks.log_trade_raw(Symbol::BTC_USDT, b"{\"data\":[]}");
        sinks.log_latency(Symbol::BTC_USDT, 1_000, 1_005, 1_007);
        sinks.log_vwap(Symbol::ETH_USDT, 60_000, 113.0);
        sinks.log_correlation(Symbol::BTC_USDT, 60_000, Symbol::ETH_USDT, 0.98, 0);
        sinks.log_scheduler(120_000, 120_004, 4_000_000);
        sinks.log_system(60_000, 12.5, 34.2);

        let base = &config.data_dir;
        assert_eq!(read(base.join("trades/BTC-USDT.log")), "{\"data\":[]}\n");
        assert_eq!(
            read(base.join("performance/latency.csv")),
            "0,1000,1005,1007,5,2,7\n"
        );
        assert!(read(base.join("metrics/vwap/ETH-USDT.csv")).ends_with(",113\n"));
        let corr = read(base.join("metrics/correlations/BTC-USDT.csv"));
        assert!(corr.contains(",ETH-USDT,0.980000,"));
        assert_eq!(
            read(base.join("performance/scheduler.csv")),
            "120000,120004,4.00\n"
        );
        assert_eq!(read(base.join("performance/system.csv")), "60000,12.50,34.20\n");

        fs::remove_dir_all(&config.data_dir).ok();
    }

    #[test]
    fn test_nan_vwap_serializes_textually() {
        let config = scratch_config("nan");
        let sinks = Sinks::create(&config).unwrap();

        sinks.log_vwap(Symbol::BTC_USDT, 60_000, f64::NAN);
        let contents = read(config.data_dir.join("metrics/vwap/BTC-USDT.csv"));
        assert!(contents.ends_with(",NaN\n"));

        fs::remove_dir_all(&config.data_dir).ok();
    }

    #[test]
    fn test_appends_accumulate() {
        let config = scratch_config("append");
        let sinks = Sinks::create(&config).unwrap();

        sinks.log_system(1, 1.0, 1.0);
        sinks.log_system(2, 2.0, 2.0);
        let contents = read(config.data_dir.join("performance/system.csv"));
        assert_eq!(contents.lines().count(), 2);

        fs::remove_dir_all(&config.data_dir).ok();
    }
}
