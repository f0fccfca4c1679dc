//! Exporter process metrics

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::{debug, warn};

use super::Collector;
use crate::exposition::{Desc, SampleSink};

/// Point-in-time figures for one process
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProcessStats {
    resident_memory_bytes: u64,
    virtual_memory_bytes: u64,
    cpu_seconds: f64,
    start_time_seconds: u64,
}

/// Memory, CPU time and start time of the exporter process itself
pub struct ProcessCollector {
    pid: Option<Pid>,
    system: Mutex<System>,
    resident_memory: Arc<Desc>,
    virtual_memory: Arc<Desc>,
    cpu_seconds: Arc<Desc>,
    start_time: Arc<Desc>,
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!(error = e, "Cannot determine own pid, process metrics disabled");
                None
            }
        };

        Self {
            pid,
            system: Mutex::new(System::new()),
            resident_memory: Desc::gauge(
                "process_resident_memory_bytes",
                "Resident memory size in bytes",
                &[],
            ),
            virtual_memory: Desc::gauge(
                "process_virtual_memory_bytes",
                "Virtual memory size in bytes",
                &[],
            ),
            cpu_seconds: Desc::counter(
                "process_cpu_seconds_total",
                "Total user and system CPU time spent in seconds",
                &[],
            ),
            start_time: Desc::gauge(
                "process_start_time_seconds",
                "Start time of the process since unix epoch in seconds",
                &[],
            ),
        }
    }

    fn read_stats(&self) -> Option<ProcessStats> {
        let pid = self.pid?;
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());

        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );

        let process = system.process(pid)?;
        Some(ProcessStats {
            resident_memory_bytes: process.memory(),
            virtual_memory_bytes: process.virtual_memory(),
            cpu_seconds: process.accumulated_cpu_time() as f64 / 1000.0,
            start_time_seconds: process.start_time(),
        })
    }
}

#[async_trait]
impl Collector for ProcessCollector {
    fn name(&self) -> &'static str {
        "process"
    }

    fn describe(&self) -> Vec<Arc<Desc>> {
        vec![
            Arc::clone(&self.resident_memory),
            Arc::clone(&self.virtual_memory),
            Arc::clone(&self.cpu_seconds),
            Arc::clone(&self.start_time),
        ]
    }

    async fn collect(&self, sink: &mut SampleSink) {
        let Some(stats) = self.read_stats() else {
            debug!("Process information unavailable");
            return;
        };

        sink.emit(&self.resident_memory, stats.resident_memory_bytes as f64, &[]);
        sink.emit(&self.virtual_memory, stats.virtual_memory_bytes as f64, &[]);
        sink.emit(&self.cpu_seconds, stats.cpu_seconds, &[]);
        sink.emit(&self.start_time, stats.start_time_seconds as f64, &[]);
    }
}
