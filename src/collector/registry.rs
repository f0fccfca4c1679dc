//! Collector registry and scrape orchestration
//!
//! The registry owns the enabled collectors. Descriptor names are checked
//! for uniqueness at registration, which lets a scrape run every collector
//! concurrently and concatenate their output.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::Collector;
use crate::error::RegistryError;
use crate::exposition::{Desc, PrometheusFormatter, Sample, SampleSink};

/// Exporter self-metric descriptors, always present
struct SelfMetrics {
    build_info: Arc<Desc>,
    collector_duration: Arc<Desc>,
    scrape_duration: Arc<Desc>,
}

impl SelfMetrics {
    fn new() -> Self {
        Self {
            build_info: Desc::gauge(
                "wanguard_exporter_build_info",
                "wanguard-exporter build information",
                &["version"],
            ),
            collector_duration: Desc::gauge(
                "wanguard_exporter_collector_duration_seconds",
                "Time spent in each collector during the last scrape",
                &["collector"],
            ),
            scrape_duration: Desc::gauge(
                "wanguard_exporter_scrape_duration_seconds",
                "Time spent on the whole scrape",
                &[],
            ),
        }
    }

    fn descs(&self) -> Vec<Arc<Desc>> {
        vec![
            Arc::clone(&self.build_info),
            Arc::clone(&self.collector_duration),
            Arc::clone(&self.scrape_duration),
        ]
    }
}

/// Set of enabled collectors exposed through one metrics endpoint
pub struct Registry {
    collectors: Vec<Arc<dyn Collector>>,
    collector_names: HashSet<&'static str>,
    desc_names: HashSet<String>,
    self_metrics: SelfMetrics,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let self_metrics = SelfMetrics::new();
        let desc_names = self_metrics
            .descs()
            .iter()
            .map(|d| d.name().to_string())
            .collect();

        Self {
            collectors: Vec::new(),
            collector_names: HashSet::new(),
            desc_names,
            self_metrics,
        }
    }

    /// Add a collector if `enabled`
    ///
    /// Returns `Ok(false)` when the collector was skipped because it is
    /// disabled.
    ///
    /// # Errors
    /// Fails if a descriptor is malformed or its name is already taken; the
    /// registry is left unchanged in that case.
    pub fn register<C>(&mut self, collector: C, enabled: bool) -> Result<bool, RegistryError>
    where
        C: Collector + 'static,
    {
        let name = collector.name();
        if !enabled {
            debug!(collector = name, "Collector disabled, not registering");
            return Ok(false);
        }

        if self.collector_names.contains(name) {
            return Err(RegistryError::DuplicateCollector(name.to_string()));
        }

        let mut new_names = HashSet::new();
        for desc in collector.describe() {
            desc.validate()?;
            let desc_name = desc.name().to_string();
            if self.desc_names.contains(&desc_name) || !new_names.insert(desc_name.clone()) {
                return Err(RegistryError::DuplicateDescriptor {
                    name: desc_name,
                    collector: name.to_string(),
                });
            }
        }

        self.desc_names.extend(new_names);
        self.collector_names.insert(name);
        self.collectors.push(Arc::new(collector));
        info!(collector = name, "Registered collector");

        Ok(true)
    }

    /// Names of registered collectors, in registration order
    pub fn collector_names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// Combined schema of all registered collectors and self-metrics
    pub fn describe(&self) -> Vec<Arc<Desc>> {
        let mut descs: Vec<Arc<Desc>> = self
            .collectors
            .iter()
            .flat_map(|c| c.describe())
            .collect();
        descs.extend(self.self_metrics.descs());
        descs
    }

    /// Run every collector concurrently and return all samples
    ///
    /// Output is ordered by registration, followed by self-metrics. A
    /// collector that panics contributes no samples.
    pub async fn scrape(&self) -> Vec<Sample> {
        let start = Instant::now();
        let mut tasks = JoinSet::new();

        for (index, collector) in self.collectors.iter().enumerate() {
            let collector = Arc::clone(collector);
            tasks.spawn(async move {
                let started = Instant::now();
                let mut sink = SampleSink::new();
                collector.collect(&mut sink).await;
                (index, sink.into_samples(), started.elapsed().as_secs_f64())
            });
        }

        let mut results: Vec<(usize, Vec<Sample>, f64)> = Vec::with_capacity(self.collectors.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!(error = %e, "Collector task failed"),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);

        let mut samples = Vec::new();
        let mut durations = SampleSink::new();
        for (index, collected, elapsed) in results {
            let name = self.collectors[index].name();
            debug!(
                collector = name,
                samples = collected.len(),
                duration_ms = (elapsed * 1000.0) as u64,
                "Collector finished"
            );
            samples.extend(collected);
            durations.emit(&self.self_metrics.collector_duration, elapsed, &[name]);
        }

        let mut sink = SampleSink::new();
        sink.emit(
            &self.self_metrics.build_info,
            1.0,
            &[env!("CARGO_PKG_VERSION")],
        );
        samples.extend(sink.into_samples());
        samples.extend(durations.into_samples());

        let mut sink = SampleSink::new();
        sink.emit(
            &self.self_metrics.scrape_duration,
            start.elapsed().as_secs_f64(),
            &[],
        );
        samples.extend(sink.into_samples());

        samples
    }

    /// Scrape and format as exposition text
    pub async fn gather(&self) -> String {
        let samples = self.scrape().await;
        PrometheusFormatter::new().format(&samples)
    }
}
