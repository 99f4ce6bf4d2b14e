//! # Cache Module
//!
//! Request de-duplication cache for slow, shared list endpoints.

pub mod clock;
pub mod dedup;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dedup::{DedupCache, FetchResult, PendingFetch};

use cca_domain::Campaign;

use crate::error::ClientError;

/// Default lifetime of the cached campaigns list
pub const CAMPAIGNS_TTL: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// Cache for the full campaigns list used by dashboard filters
pub type CampaignsCache = DedupCache<Vec<Campaign>, ClientError>;
