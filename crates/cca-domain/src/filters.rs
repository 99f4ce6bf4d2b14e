//! Query filters for the statistics and export endpoints.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default number of entries in the top-users / top-associates rankings
pub const DEFAULT_TOP_LIMIT: i64 = 10;

/// Days covered by the default dashboard range
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Last 30 days ending at `today`, as `YYYY-MM-DD` strings
#[must_use]
pub fn default_date_range(today: NaiveDate) -> (String, String) {
    let from = today - Duration::days(DEFAULT_RANGE_DAYS);
    (
        from.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}

/// Dashboard statistics filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsFilters {
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
    pub campaign_id: Option<String>,
    pub associate_id: Option<String>,
    pub include_top_users: Option<bool>,
    pub include_top_associates: Option<bool>,
    pub top_limit: Option<i64>,
}

impl Default for StatsFilters {
    fn default() -> Self {
        Self::for_today(Utc::now().date_naive())
    }
}

impl StatsFilters {
    /// Default dashboard filters: last 30 days, both rankings, top 10
    #[must_use]
    pub fn for_today(today: NaiveDate) -> Self {
        let (from, to) = default_date_range(today);
        Self {
            fecha_desde: Some(from),
            fecha_hasta: Some(to),
            ..Self::cleared()
        }
    }

    /// Filters after "clear": no dates, no campaign, no associate
    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            fecha_desde: None,
            fecha_hasta: None,
            campaign_id: None,
            associate_id: None,
            include_top_users: Some(true),
            include_top_associates: Some(true),
            top_limit: Some(DEFAULT_TOP_LIMIT),
        }
    }

    /// True when any date, campaign or associate filter is set
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        [
            &self.fecha_desde,
            &self.fecha_hasta,
            &self.campaign_id,
            &self.associate_id,
        ]
        .into_iter()
        .any(|v| trimmed(v.as_deref()).is_some())
    }

    /// Query parameters. Blank strings are dropped, the rest trimmed;
    /// booleans go out as `"true"`/`"false"`; the limit only when positive.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();

        push_trimmed(&mut query, "fechaDesde", self.fecha_desde.as_deref());
        push_trimmed(&mut query, "fechaHasta", self.fecha_hasta.as_deref());
        push_trimmed(&mut query, "campaignId", self.campaign_id.as_deref());
        push_trimmed(&mut query, "associateId", self.associate_id.as_deref());

        if let Some(flag) = self.include_top_users {
            query.push(("includeTopUsers", flag.to_string()));
        }
        if let Some(flag) = self.include_top_associates {
            query.push(("includeTopAssociates", flag.to_string()));
        }
        if let Some(limit) = self.top_limit.filter(|l| *l > 0) {
            query.push(("topLimit", limit.to_string()));
        }

        query
    }
}

/// Filters for the participations spreadsheet export
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilters {
    pub user_id: Option<String>,
    pub associate_id: Option<String>,
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
    pub numero_ticket: Option<String>,
}

impl ExportFilters {
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_trimmed(&mut query, "userId", self.user_id.as_deref());
        push_trimmed(&mut query, "associateId", self.associate_id.as_deref());
        push_trimmed(&mut query, "fechaDesde", self.fecha_desde.as_deref());
        push_trimmed(&mut query, "fechaHasta", self.fecha_hasta.as_deref());
        push_trimmed(&mut query, "numeroTicket", self.numero_ticket.as_deref());
        query
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn push_trimmed(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(v) = trimmed(value) {
        query.push((key, v.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    #[test]
    fn test_default_range_is_thirty_days() {
        let (from, to) = default_date_range(today());
        assert_eq!(from, "2025-03-01");
        assert_eq!(to, "2025-03-31");
    }

    #[test]
    fn test_query_drops_blank_and_trims() {
        let filters = StatsFilters {
            fecha_desde: Some(" 2025-01-01 ".into()),
            fecha_hasta: Some("   ".into()),
            campaign_id: Some("abc".into()),
            associate_id: None,
            include_top_users: Some(false),
            include_top_associates: None,
            top_limit: Some(0),
        };

        assert_eq!(
            filters.to_query(),
            vec![
                ("fechaDesde", "2025-01-01".to_string()),
                ("campaignId", "abc".to_string()),
                ("includeTopUsers", "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_filters_query() {
        let query = StatsFilters::for_today(today()).to_query();
        assert!(query.contains(&("includeTopUsers", "true".to_string())));
        assert!(query.contains(&("includeTopAssociates", "true".to_string())));
        assert!(query.contains(&("topLimit", "10".to_string())));
        assert_eq!(query.len(), 5);
    }

    #[test]
    fn test_active_filters() {
        assert!(StatsFilters::for_today(today()).has_active_filters());
        assert!(!StatsFilters::cleared().has_active_filters());

        let only_blank = StatsFilters {
            associate_id: Some(" ".into()),
            ..StatsFilters::cleared()
        };
        assert!(!only_blank.has_active_filters());
    }

    #[test]
    fn test_export_query() {
        let filters = ExportFilters {
            numero_ticket: Some(" T-001 ".into()),
            user_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filters.to_query(), vec![("numeroTicket", "T-001".to_string())]);
    }
}
