//! Announcement counts

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{emit_or_zero, log_item_failure, log_listing_failure, Collector, CountResponse};
use crate::client::ApiClient;
use crate::exposition::{Desc, SampleSink};

const LISTING_PATH: &str = "announcements?count=true";

/// Active and finished announcement counts, one label set per listed item
pub struct AnnouncementsCollector {
    client: Arc<ApiClient>,
    active: Arc<Desc>,
    finished: Arc<Desc>,
}

impl AnnouncementsCollector {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let prefix = "wanguard_announcement";

        Self {
            client,
            active: Desc::gauge(
                &format!("{}_active", prefix),
                "Active announcements",
                &["count"],
            ),
            finished: Desc::gauge(
                &format!("{}_finished", prefix),
                "Finished announcements",
                &["count"],
            ),
        }
    }
}

/// Item keys are interpolated into a URL path
fn is_path_segment(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[async_trait]
impl Collector for AnnouncementsCollector {
    fn name(&self) -> &'static str {
        "announcements"
    }

    fn describe(&self) -> Vec<Arc<Desc>> {
        vec![Arc::clone(&self.active), Arc::clone(&self.finished)]
    }

    async fn collect(&self, sink: &mut SampleSink) {
        let announcements: Vec<CountResponse> = match self.client.get_parsed(LISTING_PATH).await
        {
            Ok(list) => list,
            Err(e) => {
                log_listing_failure(self.name(), LISTING_PATH, &e);
                return;
            }
        };

        debug!(items = announcements.len(), "Fetched announcement listing");

        for announcement in &announcements {
            let key = announcement.count.as_str();
            if !is_path_segment(key) {
                warn!(key, "Skipping announcement with unusable key");
                continue;
            }

            let path = format!("announcements/{}/finished", key);
            let finished: CountResponse = match self.client.get_parsed(&path).await {
                Ok(finished) => finished,
                Err(e) => {
                    log_item_failure(self.name(), &path, &e);
                    continue;
                }
            };

            emit_or_zero(sink, &self.active, key, &[key]);
            emit_or_zero(sink, &self.finished, &finished.count, &[key]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Target;
    use crate::config::Secret;

    #[test]
    fn test_describe() {
        let target = Target::new("http://127.0.0.1", "u", Secret::new("p"), false).unwrap();
        let collector = AnnouncementsCollector::new(Arc::new(ApiClient::new(target).unwrap()));

        let descs = collector.describe();
        assert_eq!(descs.len(), 2);
        assert_eq!(descs[0].name(), "wanguard_announcement_active");
        assert_eq!(descs[1].name(), "wanguard_announcement_finished");
        assert_eq!(descs[0].label_names(), ["count".to_string()]);

        // Same descriptors on every call
        assert_eq!(collector.describe(), descs);
    }

    #[test]
    fn test_is_path_segment() {
        assert!(is_path_segment("5"));
        assert!(is_path_segment("abc-1_2"));
        assert!(!is_path_segment(""));
        assert!(!is_path_segment(".."));
        assert!(!is_path_segment("5/../../x"));
        assert!(!is_path_segment("5?x=1"));
    }
}
