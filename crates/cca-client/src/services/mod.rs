//! # Resource Services
//!
//! One service per backend resource. Every operation is a single HTTP call
//! through the shared [`ApiClient`](crate::ApiClient).
//!
//! The dashboard only needs three read operations; they are exposed as
//! traits so it can run against stubs.

mod associates;
mod auth;
mod campaigns;
mod export;
mod stats;
mod tickets;
mod users;

pub use associates::AssociatesService;
pub use auth::AuthService;
pub use campaigns::CampaignsService;
pub use export::{ExportService, PARTICIPATIONS_EXPORT_FILE};
pub use stats::StatsService;
pub use tickets::TicketsService;
pub use users::UsersService;

use async_trait::async_trait;
use cca_domain::{
    Associate, Campaign, CampaignDraft, DashboardStats, Page, PageRequest, StatsFilters,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// Response of the upload endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
}

// =============================================================================
// DASHBOARD SOURCES
// =============================================================================

/// Campaigns as the dashboard sees them: the full list plus the mutations
/// that invalidate it
#[async_trait]
pub trait CampaignCatalog: Send + Sync {
    /// Every campaign, unpaginated
    async fn fetch_all(&self) -> Result<Vec<Campaign>>;

    async fn create(&self, draft: &CampaignDraft) -> Result<Value>;

    async fn remove(&self, id: &str) -> Result<()>;
}

/// Paginated associates
#[async_trait]
pub trait AssociateDirectory: Send + Sync {
    async fn list_page(&self, request: PageRequest) -> Result<Page<Associate>>;
}

/// Aggregate statistics
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn dashboard(&self, filters: &StatsFilters) -> Result<DashboardStats>;
}

#[async_trait]
impl CampaignCatalog for CampaignsService {
    async fn fetch_all(&self) -> Result<Vec<Campaign>> {
        self.list_all().await
    }

    async fn create(&self, draft: &CampaignDraft) -> Result<Value> {
        Self::create(self, draft).await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.delete(id).await
    }
}

#[async_trait]
impl AssociateDirectory for AssociatesService {
    async fn list_page(&self, request: PageRequest) -> Result<Page<Associate>> {
        self.list(request).await
    }
}

#[async_trait]
impl StatsSource for StatsService {
    async fn dashboard(&self, filters: &StatsFilters) -> Result<DashboardStats> {
        Self::dashboard(self, filters).await
    }
}

/// Query pairs for a page request
fn page_query(request: PageRequest) -> [(&'static str, String); 2] {
    [
        ("page", request.page.to_string()),
        ("limit", request.limit.to_string()),
    ]
}
