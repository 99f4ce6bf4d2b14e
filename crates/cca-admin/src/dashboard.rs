//! # Dashboard
//!
//! Loads the data behind the statistics dashboard: the filter choices
//! (campaigns and associates) and the aggregates for the current filters.
//!
//! The full campaigns list is slow to produce, so it goes through a
//! [`CampaignsCache`] owned by the dashboard. Concurrent loads share one
//! request; campaign mutations made through the dashboard invalidate it.

use std::sync::Arc;
use std::time::Duration;

use cca_client::{
    ApiClient, AssociateDirectory, AssociatesService, CampaignCatalog, CampaignsCache,
    CampaignsService, ClientError, StatsService, StatsSource,
};
use cca_domain::{Associate, Campaign, CampaignDraft, DashboardStats, PageRequest, StatsFilters};
use serde_json::Value;

/// Associates offered as filter choices: first page, up to this many
pub const FILTER_ASSOCIATES_LIMIT: u32 = 100;

/// Choices for the campaign and associate filters
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub campaigns: Arc<Vec<Campaign>>,
    pub associates: Vec<Associate>,
}

/// Statistics dashboard backed by the resource services
pub struct Dashboard {
    campaigns: Arc<dyn CampaignCatalog>,
    associates: Arc<dyn AssociateDirectory>,
    stats: Arc<dyn StatsSource>,
    cache: Arc<CampaignsCache>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Create a dashboard with its own campaigns cache
    pub fn new(
        campaigns: Arc<dyn CampaignCatalog>,
        associates: Arc<dyn AssociateDirectory>,
        stats: Arc<dyn StatsSource>,
        cache_ttl: Duration,
    ) -> Self {
        Self::with_cache(
            campaigns,
            associates,
            stats,
            Arc::new(CampaignsCache::new(cache_ttl)),
        )
    }

    /// Create a dashboard around an existing cache
    pub fn with_cache(
        campaigns: Arc<dyn CampaignCatalog>,
        associates: Arc<dyn AssociateDirectory>,
        stats: Arc<dyn StatsSource>,
        cache: Arc<CampaignsCache>,
    ) -> Self {
        tracing::debug!(ttl_secs = cache.ttl().as_secs(), "Campaigns cache attached");
        Self {
            campaigns,
            associates,
            stats,
            cache,
        }
    }

    /// Dashboard over the HTTP services
    #[must_use]
    pub fn from_client(client: &ApiClient, cache_ttl: Duration) -> Self {
        Self::new(
            Arc::new(CampaignsService::new(client.clone())),
            Arc::new(AssociatesService::new(client.clone())),
            Arc::new(StatsService::new(client.clone())),
            cache_ttl,
        )
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<CampaignsCache> {
        &self.cache
    }

    /// Full campaigns list, served from the cache when fresh
    ///
    /// # Errors
    ///
    /// Returns the shared error of the fetch; nothing is cached.
    pub async fn campaigns(&self) -> Result<Arc<Vec<Campaign>>, Arc<ClientError>> {
        let catalog = Arc::clone(&self.campaigns);
        self.cache
            .get_or_fetch(move || async move { catalog.fetch_all().await })
            .await
    }

    /// Load both filter lists. A failed list is logged and left empty.
    pub async fn load_filter_options(&self) -> FilterOptions {
        let (campaigns, associates) = futures::join!(
            self.campaigns(),
            self.associates
                .list_page(PageRequest::new(1, FILTER_ASSOCIATES_LIMIT))
        );

        let campaigns = campaigns.unwrap_or_else(|e| {
            tracing::warn!(error = %e, offline = e.is_connection(), "Could not load campaigns for filters");
            Arc::default()
        });

        let associates = associates.map(|page| page.items).unwrap_or_else(|e| {
            tracing::warn!(error = %e, offline = e.is_connection(), "Could not load associates for filters");
            Vec::new()
        });

        tracing::debug!(
            campaigns = campaigns.len(),
            associates = associates.len(),
            "Filter options loaded"
        );

        FilterOptions {
            campaigns,
            associates,
        }
    }

    /// Aggregates for the given filters
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn load_stats(&self, filters: &StatsFilters) -> cca_client::Result<DashboardStats> {
        tracing::info!(filtered = filters.has_active_filters(), "Loading dashboard stats");
        self.stats.dashboard(filters).await
    }

    /// Create a campaign and drop the cached list
    ///
    /// # Errors
    ///
    /// Validation or backend errors; the cache is left untouched on failure.
    pub async fn create_campaign(&self, draft: &CampaignDraft) -> cca_client::Result<Value> {
        let created = self.campaigns.create(draft).await?;
        self.invalidate_campaigns();
        Ok(created)
    }

    /// Delete a campaign and drop the cached list
    ///
    /// # Errors
    ///
    /// Backend errors; the cache is left untouched on failure.
    pub async fn delete_campaign(&self, id: &str) -> cca_client::Result<()> {
        self.campaigns.remove(id).await?;
        self.invalidate_campaigns();
        Ok(())
    }

    /// Forget the cached campaigns list
    pub fn invalidate_campaigns(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cca_client::ManualClock;
    use cca_domain::{GlobalStats, Page, Pagination};
    use chrono::{TimeZone, Utc};
    use fake::Fake;
    use fake::faker::company::en::CompanyName;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn campaign(id: &str) -> Campaign {
        Campaign {
            id: id.to_string(),
            nombre: format!("Campaña {id}"),
            descripcion: None,
            fecha_inicio: Some(Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap()),
            fecha_fin: Some(Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap()),
            is_active: true,
            imagen_url: None,
        }
    }

    #[derive(Default)]
    struct StubCatalog {
        fetches: AtomicUsize,
        fail: bool,
        fail_mutations: bool,
    }

    #[async_trait]
    impl CampaignCatalog for StubCatalog {
        async fn fetch_all(&self) -> cca_client::Result<Vec<Campaign>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                Err(ClientError::Status {
                    status: 503,
                    message: "Servicio no disponible".into(),
                })
            } else {
                Ok(vec![campaign("c1"), campaign("c2")])
            }
        }

        async fn create(&self, draft: &CampaignDraft) -> cca_client::Result<Value> {
            if self.fail_mutations {
                return Err(ClientError::Status {
                    status: 400,
                    message: "rechazada".into(),
                });
            }
            Ok(serde_json::json!({ "nombre": draft.nombre }))
        }

        async fn remove(&self, _id: &str) -> cca_client::Result<()> {
            if self.fail_mutations {
                return Err(ClientError::Status {
                    status: 404,
                    message: "no existe".into(),
                });
            }
            Ok(())
        }
    }

    struct StubDirectory {
        fail: bool,
        requests: Mutex<Vec<PageRequest>>,
    }

    #[async_trait]
    impl AssociateDirectory for StubDirectory {
        async fn list_page(&self, request: PageRequest) -> cca_client::Result<Page<Associate>> {
            self.requests.lock().unwrap().push(request);
            if self.fail {
                return Err(ClientError::Unauthorized("Token inválido".into()));
            }
            Ok(Page {
                items: vec![Associate {
                    id: "a1".into(),
                    nombre: CompanyName().fake(),
                    ..Associate::default()
                }],
                pagination: Pagination {
                    total: 1,
                    total_pages: 1,
                    ..Pagination::default()
                },
            })
        }
    }

    struct StubStats;

    #[async_trait]
    impl StatsSource for StubStats {
        async fn dashboard(&self, filters: &StatsFilters) -> cca_client::Result<DashboardStats> {
            Ok(DashboardStats {
                global: Some(GlobalStats {
                    total_tickets: Some(if filters.has_active_filters() { 5.0 } else { 50.0 }),
                    ..GlobalStats::default()
                }),
                ..DashboardStats::default()
            })
        }
    }

    fn dashboard(catalog: Arc<StubCatalog>, directory: Arc<StubDirectory>) -> Dashboard {
        let cache = Arc::new(CampaignsCache::with_clock(
            Duration::from_secs(300),
            Arc::new(ManualClock::new()),
        ));
        Dashboard::with_cache(catalog, directory, Arc::new(StubStats), cache)
    }

    fn directory(fail: bool) -> Arc<StubDirectory> {
        Arc::new(StubDirectory {
            fail,
            requests: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_filter_options_load_both_lists() {
        let catalog = Arc::new(StubCatalog::default());
        let directory = directory(false);
        let dashboard = dashboard(catalog.clone(), directory.clone());

        let options = dashboard.load_filter_options().await;

        assert_eq!(options.campaigns.len(), 2);
        assert_eq!(options.associates.len(), 1);
        assert_eq!(
            directory.requests.lock().unwrap().as_slice(),
            &[PageRequest::new(1, FILTER_ASSOCIATES_LIMIT)]
        );
    }

    #[tokio::test]
    async fn test_failed_lists_become_empty() {
        let catalog = Arc::new(StubCatalog {
            fail: true,
            ..StubCatalog::default()
        });
        let dashboard = dashboard(catalog.clone(), directory(true));

        let options = dashboard.load_filter_options().await;

        assert!(options.campaigns.is_empty());
        assert!(options.associates.is_empty());
        assert!(dashboard.cache().get().is_none());
        assert!(dashboard.cache().get_pending().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_loads_fetch_campaigns_once() {
        let catalog = Arc::new(StubCatalog::default());
        let dashboard = dashboard(catalog.clone(), directory(false));

        let (a, b) = tokio::join!(dashboard.load_filter_options(), dashboard.load_filter_options());

        assert!(Arc::ptr_eq(&a.campaigns, &b.campaigns));
        assert_eq!(catalog.fetches.load(Ordering::SeqCst), 1);

        dashboard.load_filter_options().await;
        assert_eq!(catalog.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_campaign_mutations_invalidate_cache() {
        let catalog = Arc::new(StubCatalog::default());
        let dashboard = dashboard(catalog.clone(), directory(false));

        dashboard.campaigns().await.unwrap();
        assert!(dashboard.cache().get().is_some());

        let draft = CampaignDraft {
            nombre: "Primavera".into(),
            descripcion: String::new(),
            imagen_url: None,
            is_active: true,
            fecha_inicio: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            fecha_fin: Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap(),
        };
        dashboard.create_campaign(&draft).await.unwrap();
        assert!(dashboard.cache().get().is_none());

        dashboard.campaigns().await.unwrap();
        dashboard.delete_campaign("c1").await.unwrap();
        assert!(dashboard.cache().get().is_none());
        assert_eq!(catalog.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() {
        let catalog = Arc::new(StubCatalog {
            fail_mutations: true,
            ..StubCatalog::default()
        });
        let dashboard = dashboard(catalog, directory(false));

        dashboard.campaigns().await.unwrap();
        assert!(dashboard.delete_campaign("c1").await.is_err());
        assert!(dashboard.cache().get().is_some());
    }

    #[tokio::test]
    async fn test_load_stats_passes_filters() {
        let dashboard = dashboard(Arc::new(StubCatalog::default()), directory(false));

        let unfiltered = dashboard.load_stats(&StatsFilters::cleared()).await.unwrap();
        let filtered = dashboard
            .load_stats(&StatsFilters {
                campaign_id: Some("c1".into()),
                ..StatsFilters::cleared()
            })
            .await
            .unwrap();

        assert_eq!(unfiltered.global.unwrap().total_tickets, Some(50.0));
        assert_eq!(filtered.global.unwrap().total_tickets, Some(5.0));
    }
}
