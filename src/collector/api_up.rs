//! API availability gauge

use std::sync::Arc;

use async_trait::async_trait;

use super::Collector;
use crate::exposition::{Desc, SampleSink};
use crate::metrics::AvailabilitySignal;

/// Exposes an [`AvailabilitySignal`] as `wanguard_api_up{api_address}`
pub struct ApiUpCollector {
    signal: AvailabilitySignal,
    up: Arc<Desc>,
}

impl ApiUpCollector {
    pub fn new(signal: AvailabilitySignal) -> Self {
        Self {
            signal,
            up: Desc::gauge(
                "wanguard_api_up",
                "Whether the WANGuard API is reachable (1 = up, 0 = down)",
                &["api_address"],
            ),
        }
    }
}

#[async_trait]
impl Collector for ApiUpCollector {
    fn name(&self) -> &'static str {
        "api_up"
    }

    fn describe(&self) -> Vec<Arc<Desc>> {
        vec![Arc::clone(&self.up)]
    }

    async fn collect(&self, sink: &mut SampleSink) {
        for (address, value) in self.signal.snapshot() {
            sink.emit(&self.up, value, &[&address]);
        }
    }
}
