//! Dashboard tests against an in-process axum backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};
use cca_admin::Dashboard;
use cca_admin::report;
use cca_client::cache::CAMPAIGNS_TTL;
use cca_client::{ApiClient, ClientConfig, MemoryTokenStore};
use cca_domain::CampaignStatus;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Backend {
    campaign_calls: Arc<AtomicUsize>,
    associate_queries: Arc<Mutex<Vec<Option<String>>>>,
}

/// Records as the backend actually mixes them
async fn all_campaigns(State(backend): State<Backend>) -> Json<Value> {
    backend.campaign_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {
            "id": "c1",
            "nombre": "Navidad",
            "fechaInicio": "2025-12-01T00:00:00.000Z",
            "fechaFin": "2025-12-31T23:59:59.000Z",
            "isActive": true
        },
        {
            "id": 2,
            "nombre": "Primavera",
            "fechaInicio": "2026-03-01",
            "fechaFin": null,
            "isActive": true
        },
        {
            "id": "c3",
            "nombre": "Rebajas",
            "fechaFin": "pendiente",
            "isActive": false
        }
    ]))
}

async fn associates(State(backend): State<Backend>, RawQuery(query): RawQuery) -> Json<Value> {
    backend.associate_queries.lock().unwrap().push(query);
    Json(json!({
        "associates": [
            { "id": 10, "nombre": "Librería Central", "activo": true },
            { "id": "a2", "nombre": "Bar Puerto" }
        ],
        "pagination": { "total": 2, "totalPages": 1 }
    }))
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/campaigns/all", get(all_campaigns))
        .route("/api/associates", get(associates))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), backend)
}

fn dashboard(base_url: &str) -> Dashboard {
    let config = ClientConfig {
        base_url: base_url.to_string(),
        ..Default::default()
    };
    let client = ApiClient::new(config, MemoryTokenStore::shared()).unwrap();
    Dashboard::from_client(&client, CAMPAIGNS_TTL)
}

#[tokio::test]
async fn test_filter_options_keep_every_mixed_record() {
    let (base, backend) = spawn_backend().await;
    let dashboard = dashboard(&base);

    let options = dashboard.load_filter_options().await;

    let ids: Vec<_> = options.campaigns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c1", "2", "c3"]);
    assert_eq!(
        options.campaigns[1].fecha_inicio,
        Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(options.campaigns[1].fecha_fin, None);
    assert_eq!(options.campaigns[2].fecha_inicio, None);

    let names: Vec<_> = options.associates.iter().map(|a| a.nombre.as_str()).collect();
    assert_eq!(names, ["Librería Central", "Bar Puerto"]);
    assert_eq!(options.associates[0].id, "10");

    let queries = backend.associate_queries.lock().unwrap().clone();
    assert_eq!(queries, [Some("page=1&limit=100".to_string())]);

    // The decoded list is what the cache holds
    let cached = dashboard.cache().get().unwrap();
    assert!(Arc::ptr_eq(&cached, &options.campaigns));
    assert_eq!(backend.campaign_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mixed_records_render() {
    let (base, _backend) = spawn_backend().await;
    let dashboard = dashboard(&base);

    let campaigns = dashboard.campaigns().await.unwrap();
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

    assert_eq!(campaigns[1].status_at(now), CampaignStatus::Activa);
    assert_eq!(campaigns[2].status_at(now), CampaignStatus::Archivada);

    let table = report::campaigns_table(&campaigns, now);
    assert!(table.contains("Primavera"));
    assert!(table.contains("Rebajas"));
}
