//! WANGuard metric collectors
//!
//! Each collector owns the descriptors of one metric group and, on every
//! scrape, drives the shared [`ApiClient`] to fill them in. Failures never
//! leave a collector: a failed listing call emits nothing, a failed
//! per-item call skips that item, and unparseable numbers are emitted as 0.
//!
//! [`ApiClient`]: crate::client::ApiClient

mod announcements;
mod api_up;
mod firewall_rules;
mod process;
pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, warn};

pub use announcements::AnnouncementsCollector;
pub use api_up::ApiUpCollector;
pub use firewall_rules::FirewallRulesCollector;
pub use process::ProcessCollector;
pub use registry::Registry;

use crate::client::ApiClient;
use crate::error::{parse_value, ClientError};
use crate::exposition::{Desc, SampleSink};

/// One metric group exposed by the exporter
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used for logging and self-metrics
    fn name(&self) -> &'static str;

    /// Descriptors built at construction; must not change between calls
    fn describe(&self) -> Vec<Arc<Desc>>;

    /// Fetch current values and emit them into `sink`
    async fn collect(&self, sink: &mut SampleSink);
}

/// `{"Count": "<text>"}` payload returned by count endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountResponse {
    #[serde(rename = "Count", default)]
    pub count: String,
}

/// Parse `text` and emit it, or emit 0 if it is not a number
pub fn emit_or_zero(sink: &mut SampleSink, desc: &Arc<Desc>, text: &str, labels: &[&str]) {
    let value = match parse_value(text) {
        Ok(v) => v,
        Err(e) => {
            error!(metric = %desc.name(), error = %e, "Conversion failed, emitting 0");
            0.0
        }
    };
    sink.emit(desc, value, labels);
}

/// Fetch a count endpoint and emit its value through [`emit_or_zero`]
///
/// Client errors are returned untouched so the caller decides whether they
/// end the group or skip one item.
pub async fn collect_count(
    client: &ApiClient,
    path: &str,
    desc: &Arc<Desc>,
    labels: &[&str],
    sink: &mut SampleSink,
) -> Result<(), ClientError> {
    let response: CountResponse = client.get_parsed(path).await?;
    emit_or_zero(sink, desc, &response.count, labels);
    Ok(())
}

/// Log a listing failure that ends a collector's contribution to the scrape
fn log_listing_failure(collector: &str, path: &str, e: &ClientError) {
    error!(
        collector,
        path,
        kind = ?e.kind(),
        status = ?e.http_status(),
        error = %e,
        "Listing request failed, emitting no samples"
    );
}

/// Log a per-item failure that only skips that item
fn log_item_failure(collector: &str, path: &str, e: &ClientError) {
    warn!(
        collector,
        path,
        kind = ?e.kind(),
        error = %e,
        "Item request failed, skipping item"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_or_zero_parses() {
        let desc = Desc::gauge("m", "h", &["k"]);
        let mut sink = SampleSink::new();

        emit_or_zero(&mut sink, &desc, "12", &["a"]);

        assert_eq!(sink.samples()[0].value(), 12.0);
    }

    #[test]
    fn test_emit_or_zero_falls_back() {
        let desc = Desc::gauge("m", "h", &["k"]);
        let mut sink = SampleSink::new();

        emit_or_zero(&mut sink, &desc, "n/a", &["a"]);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.samples()[0].value(), 0.0);
        assert_eq!(sink.samples()[0].label("k"), Some("a"));
    }

    #[test]
    fn test_count_response_missing_field() {
        let parsed: CountResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.count, "");

        let parsed: CountResponse = serde_json::from_str(r#"{"Count":"3"}"#).unwrap();
        assert_eq!(parsed.count, "3");
    }
}
