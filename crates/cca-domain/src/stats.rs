//! Dashboard statistics returned by `/api/stats/dashboard`.
//!
//! Every section is optional: the backend omits rankings that were not
//! requested and may omit series for empty ranges.

use serde::{Deserialize, Deserializer, Serialize};

/// Full dashboard statistics payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub global: Option<GlobalStats>,
    pub time_series: Option<TimeSeries>,
    pub campaigns_summary: Option<CampaignsSummary>,
    #[serde(deserialize_with = "null_as_default")]
    pub campaigns: Vec<CampaignStatsEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub top_users: Vec<TopUser>,
    #[serde(deserialize_with = "null_as_default")]
    pub top_associates: Vec<TopAssociate>,
    pub metadata: Option<StatsMetadata>,
}

/// Program-wide totals with their change against the previous period
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalStats {
    pub total_tickets: Option<f64>,
    pub total_tickets_change: Option<f64>,
    pub total_amount: Option<f64>,
    pub total_amount_change: Option<f64>,
    pub total_users: Option<f64>,
    pub total_users_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSeries {
    pub daily_tickets: Vec<DailyCount>,
    pub daily_amount: Vec<DailyAmount>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyCount {
    pub date: String,
    pub count: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyAmount {
    pub date: String,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignsSummary {
    pub total_campaigns: u64,
    pub active_campaigns: u64,
    pub upcoming_campaigns: u64,
    pub expiring_soon: u64,
}

/// Per-campaign statistics block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignStatsEntry {
    pub id: String,
    pub nombre: String,
    pub imagen_url: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub dias_restantes: Option<i64>,
    pub stats: CampaignMetrics,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignMetrics {
    /// Elapsed share of the campaign, in percent
    pub progress: Option<f64>,
    pub total_tickets: Option<f64>,
    pub total_participations: Option<f64>,
    pub total_amount: Option<f64>,
    pub recent_tickets: Option<f64>,
    pub top_associates: Vec<CampaignTopAssociate>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignTopAssociate {
    pub id: Option<String>,
    pub nombre: String,
    pub ticket_count: Option<f64>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopUser {
    pub user_id: Option<String>,
    pub user_name: String,
    pub campaigns_count: Option<u64>,
    pub total_tickets: Option<f64>,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopAssociate {
    pub associate_id: Option<String>,
    pub associate_name: String,
    pub total_tickets: Option<f64>,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsMetadata {
    pub generated_at: Option<String>,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_payload() {
        let json = r#"{
            "global": { "totalTickets": 1520, "totalAmount": 30412.5, "totalUsersChange": -2 },
            "timeSeries": { "dailyTickets": [{ "date": "2025-01-01", "count": 4 }] },
            "topUsers": [{ "userId": "u1", "userName": "Ana", "campaignsCount": 2 }],
            "topAssociates": null,
            "metadata": { "generatedAt": "2025-01-02T08:00:00Z" }
        }"#;

        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        let global = stats.global.unwrap();
        assert_eq!(global.total_tickets, Some(1520.0));
        assert_eq!(global.total_users_change, Some(-2.0));
        assert_eq!(global.total_users, None);

        let series = stats.time_series.unwrap();
        assert_eq!(series.daily_tickets.len(), 1);
        assert!(series.daily_amount.is_empty());

        assert!(stats.campaigns.is_empty());
        assert!(stats.campaigns_summary.is_none());
        assert_eq!(stats.top_users[0].campaigns_count, Some(2));
        assert!(stats.top_associates.is_empty());
    }
}
