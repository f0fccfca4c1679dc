//! Firewall rule count

use std::sync::Arc;

use async_trait::async_trait;

use super::{collect_count, log_listing_failure, Collector};
use crate::client::ApiClient;
use crate::exposition::{Desc, SampleSink};

const COUNT_PATH: &str = "firewall_rules?count=true";

/// Number of active firewall rules
pub struct FirewallRulesCollector {
    client: Arc<ApiClient>,
    active: Arc<Desc>,
}

impl FirewallRulesCollector {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            active: Desc::gauge("wanguard_firewall_rule_active", "Active firewall rules", &[]),
        }
    }
}

#[async_trait]
impl Collector for FirewallRulesCollector {
    fn name(&self) -> &'static str {
        "firewall_rules"
    }

    fn describe(&self) -> Vec<Arc<Desc>> {
        vec![Arc::clone(&self.active)]
    }

    async fn collect(&self, sink: &mut SampleSink) {
        if let Err(e) = collect_count(&self.client, COUNT_PATH, &self.active, &[], sink).await {
            log_listing_failure(self.name(), COUNT_PATH, &e);
        }
    }
}
