// HTTP request handlers
use crate::application::factory_api::HistoryQuery;
use crate::application::poller::Snapshot;
use crate::application::session::{SessionState, SessionUser};
use crate::domain::aggregator::{self, AlertFilter, AlertSummary};
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Envelope around every polled view.
#[derive(Debug, Serialize)]
pub struct SnapshotView<T> {
    pub updated_at: Option<DateTime<Utc>>,
    /// The last poll failed and `data` is from an earlier one.
    pub stale: bool,
    pub data: T,
}

// Build the view while the watch borrow is held; the guard must not cross an await.
fn view_of<T, U>(
    rx: &watch::Receiver<Snapshot<T>>,
    project: impl FnOnce(&T) -> U,
) -> SnapshotView<U> {
    let snapshot = rx.borrow();
    SnapshotView {
        updated_at: snapshot.updated_at,
        stale: snapshot.is_stale(),
        data: project(&snapshot.data),
    }
}

async fn respond<T: Serialize>(headers: &HeaderMap, data: &T) -> Result<Response, ApiError> {
    Ok(json_response(data, accepts_brotli(headers)).await?)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest reading per machine with its status badge
pub async fn machine_table(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let view = view_of(&state.snapshots.machines, |latest| {
        state.machine_service.table(latest)
    });
    respond(&headers, &view).await
}

pub async fn machine_detail(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let view = view_of(&state.snapshots.machines, |latest| {
        state.machine_service.find(latest, &id)
    });
    let SnapshotView {
        updated_at,
        stale,
        data,
    } = view;
    let row = data.ok_or_else(|| ApiError::NotFound(id.clone()))?;
    respond(
        &headers,
        &SnapshotView {
            updated_at,
            stale,
            data: row,
        },
    )
    .await
}

/// Alert journal: filtered, most severe first, with counts over all alerts
pub async fn list_alerts(
    Query(criteria): Query<AlertFilter>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let view = view_of(&state.snapshots.alerts, |records| {
        state.alert_service.feed(records, &criteria)
    });
    respond(&headers, &view).await
}

pub async fn alert_events(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let view = view_of(&state.snapshots.alerts, |records| {
        state.alert_service.events(records)
    });
    respond(&headers, &view).await
}

pub async fn alert_summary(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let view = view_of(&state.snapshots.alerts, |records| aggregator::summarize(records));
    respond(&headers, &view).await
}

#[derive(Debug, Serialize)]
struct SummaryUpdate {
    updated_at: Option<DateTime<Utc>>,
    summary: AlertSummary,
}

/// One summary line now and after every alert poll
pub async fn stream_alert_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_watch(state.snapshots.alerts.clone(), |snapshot| SummaryUpdate {
        updated_at: snapshot.updated_at,
        summary: aggregator::summarize(&snapshot.data),
    })
}

/// Header dropdown feed
pub async fn notifications(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let view = view_of(&state.snapshots.notifications, |records| {
        state.alert_service.notifications(records)
    });
    respond(&headers, &view).await
}

/// Rolling temperature and vibration series
pub async fn realtime(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let view = view_of(&state.snapshots.realtime, |window| window.series());
    respond(&headers, &view).await
}

async fn passthrough(
    headers: &HeaderMap,
    rx: &watch::Receiver<Snapshot<Value>>,
) -> Result<Response, ApiError> {
    let view = view_of(rx, Value::clone);
    respond(headers, &view).await
}

pub async fn factory_kpis(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    passthrough(&headers, &state.snapshots.factory_kpis).await
}

pub async fn analytics_kpis(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    passthrough(&headers, &state.snapshots.analytics_kpis).await
}

pub async fn analytics_heatmap(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    passthrough(&headers, &state.snapshots.heatmap).await
}

/// Archive rows or a prediction, fetched on demand
pub async fn history(
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let view = state.history_service.history(&query).await?;
    respond(&headers, &view).await
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn current_session(State(state): State<Arc<AppState>>) -> Json<SessionState> {
    Json(state.session.current())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionUser>, ApiError> {
    let user = state.session.login(&request.email, &request.password)?;
    Ok(Json(user))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.logout();
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::alert_service::AlertService;
    use crate::application::history_service::HistoryService;
    use crate::application::machine_service::MachineService;
    use crate::application::session::{DemoCredentials, SessionStore};
    use crate::application::testing::FakeFactoryApi;
    use crate::domain::alert::{AlertCause, MachineAlert, Severity};
    use crate::domain::reading::{latest_per_machine, MachineReading};
    use crate::domain::telemetry::RollingWindow;
    use crate::presentation::app_state::Snapshots;
    use crate::presentation::router;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::json;
    use tower::ServiceExt;

    fn reading(id: &str, machine_type: &str, temperature: f64) -> MachineReading {
        MachineReading {
            machine_id: id.to_string(),
            machine_type: machine_type.to_string(),
            temperature,
            vibration: 4.0,
            timestamp: "2024-03-01T10:00:00".to_string(),
            ..Default::default()
        }
    }

    fn alert(id: &str, machine_type: &str, causes: &[(&str, Severity)]) -> MachineAlert {
        MachineAlert::new(
            reading(id, machine_type, 80.0),
            causes.iter().map(|(k, s)| AlertCause::new(*k, *s)).collect(),
        )
    }

    fn fresh<T>(data: T) -> watch::Receiver<Snapshot<T>> {
        let (tx, rx) = watch::channel(Snapshot {
            data,
            updated_at: Some(Utc::now()),
            last_error: None,
        });
        // Dropping the sender keeps the last value readable.
        drop(tx);
        rx
    }

    fn test_app(api: FakeFactoryApi) -> axum::Router {
        let alerts = vec![
            alert("M1", "Pompe", &[("VIBRATION ÉLEVÉE", Severity::Medium)]),
            alert(
                "KUKA_10",
                "Robot",
                &[
                    ("TEMPÉRATURE CRITIQUE", Severity::High),
                    ("PRESSION", Severity::Medium),
                ],
            ),
        ];
        let machines = latest_per_machine(vec![
            reading("M1", "Pompe", 60.0),
            reading("M2", "Moteur", 70.0),
            reading("M1", "Pompe", 90.0),
        ]);

        let state = Arc::new(AppState {
            snapshots: Snapshots {
                machines: fresh(machines),
                alerts: fresh(alerts.clone()),
                notifications: fresh(alerts),
                realtime: fresh(RollingWindow::default()),
                factory_kpis: fresh(json!({"total_machines": 2})),
                analytics_kpis: watch::channel(Snapshot::new(Value::Null)).1,
                heatmap: fresh(json!([])),
            },
            machine_service: MachineService::new(),
            alert_service: AlertService::default(),
            history_service: HistoryService::new(Arc::new(api)),
            session: SessionStore::new(
                DemoCredentials {
                    email: "admin@ai4bmi.com".to_string(),
                    password: "Admin2026!".to_string(),
                    name: "Admin BMI".to_string(),
                },
                None,
            ),
        });
        router(state)
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app(FakeFactoryApi::default())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_machine_table() {
        let (status, json) = get(test_app(FakeFactoryApi::default()), "/machines").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stale"], false);
        assert_eq!(json["data"]["counts"]["total"], 2);
        assert_eq!(json["data"]["counts"]["failure"], 1);
        assert_eq!(json["data"]["machines"][0]["machine_id"], "M1");
        assert_eq!(json["data"]["machines"][0]["badge"]["label"], "En Panne");
        assert_eq!(json["data"]["machines"][1]["badge"]["color"], "warning");
    }

    #[tokio::test]
    async fn test_machine_detail() {
        let (status, json) = get(test_app(FakeFactoryApi::default()), "/machines/M2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["badge"]["status"], "maintenance");

        let (status, _) = get(test_app(FakeFactoryApi::default()), "/machines/M9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_alerts_sorted_with_summary() {
        let (status, json) = get(test_app(FakeFactoryApi::default()), "/alerts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["alerts"][0]["machine_id"], "KUKA_10");
        assert_eq!(json["data"]["summary"]["highCount"], 1);
        assert_eq!(json["data"]["summary"]["mediumCount"], 1);
        assert_eq!(json["data"]["summary"]["total"], 2);
    }

    #[tokio::test]
    async fn test_alerts_filtered() {
        let app = test_app(FakeFactoryApi::default());
        let (_, json) = get(app.clone(), "/alerts?search=kuka").await;
        assert_eq!(json["data"]["alerts"].as_array().unwrap().len(), 1);

        let (_, json) = get(app.clone(), "/alerts?severity=MEDIUM").await;
        assert_eq!(json["data"]["alerts"][0]["machine_id"], "M1");
        assert_eq!(json["data"]["alerts"].as_array().unwrap().len(), 1);

        let (status, _) = get(app, "/alerts?severity=LOW").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_alerts_blank_form_fields_mean_no_filter() {
        let (status, json) = get(
            test_app(FakeFactoryApi::default()),
            "/alerts?severity=&search=",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["alerts"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_alert_events_expose_unknown_cause() {
        let (_, json) = get(test_app(FakeFactoryApi::default()), "/alerts/events").await;
        let events = json["data"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1]["unit"], "°C");
        assert_eq!(events[2]["metric"], "unknown");
        assert_eq!(events[2]["value"], 0.0);
    }

    #[tokio::test]
    async fn test_notifications() {
        let (_, json) = get(test_app(FakeFactoryApi::default()), "/notifications").await;
        assert_eq!(json["data"]["hasHigh"], true);
        assert_eq!(json["data"]["urgentCount"], 1);
    }

    #[tokio::test]
    async fn test_passthrough_before_first_poll() {
        let app = test_app(FakeFactoryApi::default());
        let (_, json) = get(app.clone(), "/factory/kpis").await;
        assert_eq!(json["data"]["total_machines"], 2);

        let (_, json) = get(app, "/analytics/kpis").await;
        assert!(json["updated_at"].is_null());
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_realtime_series() {
        let (_, json) = get(test_app(FakeFactoryApi::default()), "/realtime").await;
        assert_eq!(json["data"][0]["id"], "temperature");
        assert_eq!(json["data"][1]["id"], "vibration");
    }

    #[tokio::test]
    async fn test_history_rows_and_upstream_failure() {
        let api = FakeFactoryApi {
            history: json!([{"machine_id": "M1", "temperature": 66.0, "vibration": 5.0}]),
            ..Default::default()
        };
        let (status, json) = get(test_app(api), "/history?machine_id=M1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rows"][0]["badge"]["label"], "Maintenance");

        let failing = FakeFactoryApi {
            fail: true,
            ..Default::default()
        };
        let (status, json) = get(test_app(failing), "/history").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn test_login_flow() {
        let app = test_app(FakeFactoryApi::default());

        let (status, _) = post_json(
            app.clone(),
            "/session/login",
            json!({"email": "admin@ai4bmi.com", "password": "wrong"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, json) = post_json(
            app.clone(),
            "/session/login",
            json!({"email": "admin@ai4bmi.com", "password": "Admin2026!"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Admin BMI");

        let (_, json) = get(app.clone(), "/session").await;
        assert_eq!(json["isAuthenticated"], true);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/session/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let (_, json) = get(app, "/session").await;
        assert_eq!(json["isAuthenticated"], false);
    }

    #[tokio::test]
    async fn test_brotli_negotiation() {
        let response = test_app(FakeFactoryApi::default())
            .oneshot(
                Request::builder()
                    .uri("/alerts/summary")
                    .header(header::ACCEPT_ENCODING, "br")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");
    }
}
