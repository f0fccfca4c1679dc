//! Prometheus Exposition Format output
//!
//! This module handles formatting of samples into the text exposition
//! format (version 0.0.4).
//!
//! # Format Specification
//!
//! ```text
//! # HELP <metric_name> <help_text>
//! # TYPE <metric_name> <type>
//! <metric_name>{<label1>="<value1>",<label2>="<value2>"} <value>
//! ```

use std::collections::HashMap;

use super::Sample;

/// Content type of the text exposition format
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus exposition format formatter
#[derive(Debug, Clone, Default)]
pub struct PrometheusFormatter;

impl PrometheusFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self
    }

    /// Format samples into Prometheus exposition format
    ///
    /// # Notes
    ///
    /// - HELP and TYPE lines are emitted once per metric name
    /// - Samples with the same name are grouped, in order of first occurrence
    /// - Labels keep descriptor order
    pub fn format(&self, samples: &[Sample]) -> String {
        if samples.is_empty() {
            return String::new();
        }

        let mut output = String::with_capacity(samples.len() * 100);

        for (name, group) in Self::group_by_name(samples) {
            let first = group[0].desc();
            output.push_str(&format!(
                "# HELP {} {}\n",
                name,
                Self::escape_help(first.help())
            ));
            output.push_str(&format!(
                "# TYPE {} {}\n",
                name,
                first.metric_type().as_str()
            ));

            for sample in group {
                output.push_str(&Self::format_sample_line(sample));
                output.push('\n');
            }
        }

        output
    }

    /// Group samples by name, preserving order of first occurrence
    fn group_by_name(samples: &[Sample]) -> Vec<(&str, Vec<&Sample>)> {
        let mut groups: HashMap<&str, Vec<&Sample>> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for sample in samples {
            let name = sample.name();
            if !groups.contains_key(name) {
                order.push(name);
            }
            groups.entry(name).or_default().push(sample);
        }

        order
            .into_iter()
            .filter_map(|name| groups.remove(name).map(|g| (name, g)))
            .collect()
    }

    fn format_sample_line(sample: &Sample) -> String {
        let mut line = sample.name().to_string();

        if !sample.label_values().is_empty() {
            let label_pairs: Vec<String> = sample
                .labels()
                .map(|(k, v)| format!("{}=\"{}\"", k, Self::escape_label_value(v)))
                .collect();

            line.push('{');
            line.push_str(&label_pairs.join(","));
            line.push('}');
        }

        line.push(' ');
        line.push_str(&Self::format_value(sample.value()));
        line
    }

    /// Format a numeric value
    ///
    /// - NaN → "NaN"
    /// - +Inf → "+Inf"
    /// - -Inf → "-Inf"
    /// - Integers are formatted without decimal point
    fn format_value(value: f64) -> String {
        if value.is_nan() {
            "NaN".to_string()
        } else if value.is_infinite() {
            if value.is_sign_positive() {
                "+Inf".to_string()
            } else {
                "-Inf".to_string()
            }
        } else if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{}", value)
        }
    }

    /// Escapes backslash and newline characters.
    fn escape_help(help: &str) -> String {
        help.replace('\\', "\\\\").replace('\n', "\\n")
    }

    /// Escapes backslash, double-quote, and newline characters.
    fn escape_label_value(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '"' => escaped.push_str("\\\""),
                '\n' => escaped.push_str("\\n"),
                _ => escaped.push(c),
            }
        }
        escaped
    }
}
