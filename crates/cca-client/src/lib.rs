//! # CCA Client Library
//!
//! Typed REST client for the CCA Ceuta backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Admin tooling / CLI                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Directory traits                         │
//! │    (CampaignCatalog, AssociateDirectory, StatsSource)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Resource services                         │
//! │  (auth, associates, campaigns, tickets, users, stats, ...)   │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │   De-duplication cache  │   │   ApiClient (reqwest)        │
//! │   (campaigns list)      │   │   bearer token + request id  │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cca_client::{ApiClient, ClientConfig, MemoryTokenStore, services::CampaignsService};
//!
//! let client = ApiClient::new(ClientConfig::default(), MemoryTokenStore::shared())?;
//! let campaigns = CampaignsService::new(client.clone()).list_all().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod error;
pub mod http;
pub mod services;
pub mod token;

pub use cache::{
    CampaignsCache, Clock, DedupCache, FetchResult, ManualClock, PendingFetch, SystemClock,
};
pub use error::{ClientError, Result};
pub use http::{ApiClient, ClientConfig};
pub use services::{
    AssociateDirectory, AssociatesService, AuthService, CampaignCatalog, CampaignsService,
    ExportService, PARTICIPATIONS_EXPORT_FILE, StatsService, StatsSource, TicketsService,
    UploadedFile, UsersService,
};
pub use token::{FileTokenStore, MemoryTokenStore, SharedTokenStore, TokenStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
