use std::time::{
    Duration,
    Instant,
};

use serde_json::Value;
use tracing::{
    debug,
    info,
    warn,
};

use super::ApiClient;
use crate::{
    cache::TtlCache,
    models::{
        Entity,
        EntityKind,
    },
    workflow::Notices,
};

/// Entity collections used for tables and dropdowns, cached per kind.
///
/// A failed fetch is remembered as an empty collection for the same time-to-live, so a
/// dead backend is asked once per interval rather than once per frame.
pub struct ReferenceData {
    cache: TtlCache<EntityKind, Value>,
}

/// Shortest lifetime honoured; anything lower would refetch on every repaint.
const MIN_TTL: Duration = Duration::from_secs(1);

impl ReferenceData {
    pub fn new(ttl: Duration) -> Self {
        Self { cache: TtlCache::new(ttl.max(MIN_TTL)) }
    }

    pub fn fetch_all<T: Entity>(&mut self, api: &ApiClient, notices: &mut Notices) -> Vec<T> {
        self.fetch_all_at(api, notices, Instant::now())
    }

    pub(crate) fn fetch_all_at<T: Entity>(
        &mut self,
        api: &ApiClient,
        notices: &mut Notices,
        now: Instant,
    ) -> Vec<T> {
        let kind = T::KIND;
        if let Some(cached) = self.cache.get(&kind, now) {
            return serde_json::from_value(cached).unwrap_or_default();
        }

        debug!(entity = %kind, "reference cache miss");
        let response = api.get(kind.endpoint());

        let records = if response.status == 200 {
            match serde_json::from_value::<Vec<T>>(response.body.clone()) {
                Ok(records) => {
                    self.cache.insert(kind, response.body, now);
                    return records;
                }
                Err(e) => {
                    warn!(entity = %kind, error = %e, "undecodable reference data");
                    notices.error(format!("Failed to read {} from the API: {}", kind.plural(), e));
                    Vec::new()
                }
            }
        } else {
            warn!(entity = %kind, status = response.status, "reference fetch failed");
            notices.error(format!(
                "Failed to fetch {}: {}",
                kind.plural(),
                response.error_message()
            ));
            Vec::new()
        };

        self.cache.insert(kind, Value::Array(Vec::new()), now);
        records
    }

    pub fn invalidate_all(&mut self) {
        info!("reference cache invalidated");
        self.cache.clear();
    }
}
