//! Metric schema and samples
//!
//! A [`Desc`] is the static shape of a metric (name, help, label names),
//! built once per collector. A [`Sample`] is one value for one label
//! combination, produced fresh on every scrape and handed to a
//! [`SampleSink`].

pub mod formatter;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

pub use formatter::PrometheusFormatter;

use crate::error::RegistryError;

static METRIC_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("valid regex"));

static LABEL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("valid regex"));

/// Prometheus metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricType {
    /// A value that can go up and down
    #[default]
    Gauge,
    /// A monotonically increasing value
    Counter,
}

impl MetricType {
    /// Returns the exposition type string
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
        }
    }
}

/// Static metric descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    name: String,
    help: String,
    label_names: Vec<String>,
    metric_type: MetricType,
}

impl Desc {
    /// Create a gauge descriptor
    pub fn gauge(name: &str, help: &str, label_names: &[&str]) -> Arc<Self> {
        Self::new(name, help, label_names, MetricType::Gauge)
    }

    /// Create a counter descriptor
    pub fn counter(name: &str, help: &str, label_names: &[&str]) -> Arc<Self> {
        Self::new(name, help, label_names, MetricType::Counter)
    }

    fn new(name: &str, help: &str, label_names: &[&str], metric_type: MetricType) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            help: help.to_string(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            metric_type,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    /// Check metric and label names against the exposition grammar
    pub fn validate(&self) -> Result<(), RegistryError> {
        if !METRIC_NAME_RE.is_match(&self.name) {
            return Err(RegistryError::InvalidMetricName {
                name: self.name.clone(),
                reason: "must match [a-zA-Z_:][a-zA-Z0-9_:]*".to_string(),
            });
        }

        for (i, label) in self.label_names.iter().enumerate() {
            let reason = if !LABEL_NAME_RE.is_match(label) {
                Some("must match [a-zA-Z_][a-zA-Z0-9_]*")
            } else if label.starts_with("__") {
                Some("names starting with '__' are reserved")
            } else if self.label_names[..i].contains(label) {
                Some("duplicate label name")
            } else {
                None
            };

            if let Some(reason) = reason {
                return Err(RegistryError::InvalidLabelName {
                    metric: self.name.clone(),
                    name: label.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// One emitted value with its label values
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    desc: Arc<Desc>,
    value: f64,
    label_values: Vec<String>,
}

impl Sample {
    /// Create a sample; `None` if the label count does not match the descriptor
    pub fn new(desc: &Arc<Desc>, value: f64, label_values: &[&str]) -> Option<Self> {
        if label_values.len() != desc.label_names.len() {
            return None;
        }

        Some(Self {
            desc: Arc::clone(desc),
            value,
            label_values: label_values.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Value of a label by name
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .label_names
            .iter()
            .position(|l| l == name)
            .map(|i| self.label_values[i].as_str())
    }

    /// Label name/value pairs in descriptor order
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.desc
            .label_names
            .iter()
            .map(String::as_str)
            .zip(self.label_values.iter().map(String::as_str))
    }
}

/// Destination for samples produced during one collector run
#[derive(Debug, Default)]
pub struct SampleSink {
    samples: Vec<Sample>,
}

impl SampleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a value for a descriptor
    ///
    /// A label count mismatch is a collector bug; the sample is dropped and
    /// logged.
    pub fn emit(&mut self, desc: &Arc<Desc>, value: f64, label_values: &[&str]) {
        match Sample::new(desc, value, label_values) {
            Some(sample) => self.samples.push(sample),
            None => tracing::error!(
                metric = %desc.name(),
                expected = desc.label_names().len(),
                got = label_values.len(),
                "Label count mismatch, dropping sample"
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desc_validate() {
        assert!(Desc::gauge("wanguard_api_up", "help", &["api_address"])
            .validate()
            .is_ok());
        assert!(Desc::gauge("ns:metric", "help", &[]).validate().is_ok());
    }

    #[test]
    fn test_desc_invalid_metric_name() {
        let err = Desc::gauge("1bad", "help", &[]).validate().unwrap_err();
        assert!(matches!(err, RegistryError::InvalidMetricName { .. }));
        assert!(Desc::gauge("bad-name", "help", &[]).validate().is_err());
        assert!(Desc::gauge("", "help", &[]).validate().is_err());
    }

    #[test]
    fn test_desc_invalid_label_names() {
        assert!(Desc::gauge("m", "h", &["bad-label"]).validate().is_err());
        assert!(Desc::gauge("m", "h", &["__reserved"]).validate().is_err());
        assert!(Desc::gauge("m", "h", &["a", "a"]).validate().is_err());
    }

    #[test]
    fn test_sample_label_lookup() {
        let desc = Desc::gauge("m", "h", &["a", "b"]);
        let sample = Sample::new(&desc, 1.5, &["x", "y"]).unwrap();

        assert_eq!(sample.name(), "m");
        assert_eq!(sample.value(), 1.5);
        assert_eq!(sample.label("b"), Some("y"));
        assert_eq!(sample.label("c"), None);
        assert_eq!(
            sample.labels().collect::<Vec<_>>(),
            vec![("a", "x"), ("b", "y")]
        );
    }

    #[test]
    fn test_sample_label_count_mismatch() {
        let desc = Desc::gauge("m", "h", &["a"]);
        assert!(Sample::new(&desc, 1.0, &[]).is_none());
        assert!(Sample::new(&desc, 1.0, &["x", "y"]).is_none());
    }

    #[test]
    fn test_sink_drops_mismatched_samples() {
        let desc = Desc::gauge("m", "h", &["a"]);
        let mut sink = SampleSink::new();

        sink.emit(&desc, 1.0, &["x"]);
        sink.emit(&desc, 2.0, &[]);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.into_samples()[0].value(), 1.0);
    }
}
