//! Scoped, timestamped performance event log with a sidecar OS memory-snapshot
//! log. This is the measurement-grade logger the benchmark numbers this
//! harness produces depend on; it is deliberately not replaced by the ambient
//! `tracing` diagnostics used elsewhere in the crate because its on-disk
//! format is itself consumed by downstream analysis.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{Error, Result};
use crate::keystore::create_file;
use crate::naming::stamped_filename;
use crate::params::Parameters;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// The five `/proc/self/status` fields sampled on every `log` call. On
/// platforms without that facility, [`MemorySnapshot::sample`]
/// degrades to zeros — a documented limitation, not a silent correctness gap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub vm_swap_kb: u64,
    pub vm_hwm_kb: u64,
    pub vm_rss_kb: u64,
    pub vm_peak_kb: u64,
    pub vm_size_kb: u64,
}

impl MemorySnapshot {
    #[must_use]
    pub fn sample() -> Self {
        Self::from_proc_status().unwrap_or_default()
    }

    #[cfg(target_os = "linux")]
    fn from_proc_status() -> Option<Self> {
        let contents = fs::read_to_string("/proc/self/status").ok()?;
        let mut snapshot = Self::default();
        for line in contents.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let Some(kb) = parse_kb_field(value) else {
                continue;
            };
            match key.trim() {
                "VmSwap" => snapshot.vm_swap_kb = kb,
                "VmHWM" => snapshot.vm_hwm_kb = kb,
                "VmRSS" => snapshot.vm_rss_kb = kb,
                "VmPeak" => snapshot.vm_peak_kb = kb,
                "VmSize" => snapshot.vm_size_kb = kb,
                _ => {}
            }
        }
        Some(snapshot)
    }

    #[cfg(not(target_os = "linux"))]
    fn from_proc_status() -> Option<Self> {
        // No `/proc/self/status` on this platform; callers see all-zero
        // snapshots rather than a spurious error.
        None
    }
}

#[cfg(target_os = "linux")]
fn parse_kb_field(value: &str) -> Option<u64> {
    value.trim().split_whitespace().next()?.parse().ok()
}

/// Opens a time log and a sidecar memory log under stamped filenames and
/// writes timestamped entries to both on every [`PerfLogger::log`]
/// call. Both files are closed when the logger is dropped.
pub struct PerfLogger {
    time_file: File,
    memory_file: File,
}

impl PerfLogger {
    /// Opens `<time_dir>/<stamp>…<role>.txt` and
    /// `<memory_dir>/<stamp>…<role>.txt`, creating the directories if needed.
    pub fn open(
        time_dir: &Path,
        memory_dir: &Path,
        params: &Parameters,
        role: &str,
    ) -> Result<Self> {
        let filename = stamped_filename(params, role, "txt");
        let time_path = time_dir.join(&filename);
        let memory_path = memory_dir.join(&filename);

        Ok(Self {
            time_file: create_file(&time_path)?,
            memory_file: create_file(&memory_path)?,
        })
    }

    /// Writes `timestamp : msg` to the time log, and five `timestamp : FIELD = value`
    /// lines — one per [`MemorySnapshot`] field — to the memory log.
    pub fn log(&mut self, msg: &str) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        writeln!(self.time_file, "{timestamp} : {msg}").map_err(Error::IoBare)?;

        let snapshot = MemorySnapshot::sample();
        for (field, value) in [
            ("VmSwap", snapshot.vm_swap_kb),
            ("VmHWM", snapshot.vm_hwm_kb),
            ("VmRSS", snapshot.vm_rss_kb),
            ("VmPeak", snapshot.vm_peak_kb),
            ("VmSize", snapshot.vm_size_kb),
        ] {
            writeln!(self.memory_file, "{timestamp} : {field} = {value} kB")
                .map_err(Error::IoBare)?;
        }
        Ok(())
    }
}

/// Resolves the paths a [`PerfLogger`] would open for `params`/`role`, without
/// opening them — used by roles that want to log the path they chose.
#[must_use]
pub fn planned_paths(time_dir: &Path, memory_dir: &Path, params: &Parameters, role: &str) -> (PathBuf, PathBuf) {
    let filename = stamped_filename(params, role, "txt");
    (time_dir.join(&filename), memory_dir.join(&filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DataHandling, IntBits, Variant};
    use std::io::Read;

    fn test_params() -> Parameters {
        Parameters {
            variant: Variant::He,
            int_bits: IntBits::B8,
            batch_size: 1,
            batch_count: 1,
            data_handling: DataHandling::SingleComponent,
        }
    }

    #[test]
    fn log_writes_to_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let time_dir = dir.path().join("time");
        let memory_dir = dir.path().join("memory");
        let params = test_params();

        let mut logger = PerfLogger::open(&time_dir, &memory_dir, &params, "client").unwrap();
        logger.log("batch 1 started").unwrap();
        logger.log("batch 1 finished").unwrap();
        drop(logger);

        let mut time_contents = String::new();
        let time_path = fs::read_dir(&time_dir)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        File::open(&time_path)
            .unwrap()
            .read_to_string(&mut time_contents)
            .unwrap();
        assert!(time_contents.contains("batch 1 started"));
        assert!(time_contents.contains("batch 1 finished"));

        let mut memory_contents = String::new();
        let memory_path = fs::read_dir(&memory_dir)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        File::open(&memory_path)
            .unwrap()
            .read_to_string(&mut memory_contents)
            .unwrap();
        assert!(memory_contents.contains("VmRSS"));
        assert!(memory_contents.matches("VmSwap").count() == 2);
    }
}
