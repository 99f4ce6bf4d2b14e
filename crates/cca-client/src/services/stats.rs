//! Dashboard statistics.

use cca_domain::{DashboardStats, StatsFilters};

use crate::error::Result;
use crate::http::ApiClient;

/// `/api/stats/dashboard`
#[derive(Debug, Clone)]
pub struct StatsService {
    client: ApiClient,
}

impl StatsService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Aggregates for the given filters. Empty filter values are not sent.
    pub async fn dashboard(&self, filters: &StatsFilters) -> Result<DashboardStats> {
        let query = filters.to_query();
        tracing::debug!(params = query.len(), "Loading dashboard stats");
        self.client.get_json("/api/stats/dashboard", &query).await
    }
}
