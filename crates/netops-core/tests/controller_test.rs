#![allow(clippy::unwrap_used)]
// Controller behaviour against a mocked REST backend.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netops_core::{
    AuthCredentials, BackendConfig, BreakdownStatus, Command, CommandResult, Controller,
    CoreError, CreateEnergyRequest, EntityId, UpdateBreakdownRequest, UpdateProfileRequest,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer, acting_user: Option<&str>) -> BackendConfig {
    let mut cfg = BackendConfig::new(
        Url::parse(&server.uri()).unwrap(),
        AuthCredentials::ApiKey {
            api_key: "anon-key".to_string().into(),
            access_token: None,
        },
    );
    cfg.acting_user = acting_user.map(EntityId::from);
    cfg
}

async fn setup(acting_user: Option<&str>) -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let controller = Controller::new(config(&server, acting_user)).unwrap();
    (server, controller)
}

fn breakdown_row(status: &str) -> Value {
    json!({
        "id": "b-1",
        "title": "Fibre cut on ring A",
        "type": "connectivity_loss",
        "severity": "major",
        "priority": "high",
        "status": status,
        "site_id": "s-1",
        "impact_users": 120,
        "estimated_fix_time": "PT2H",
        "reported_at": "2025-03-01T08:00:00Z",
        "downtime_start": "2025-03-01T08:00:00Z",
        "sites": { "name": "Harbour", "code": "HB1" }
    })
}

async fn mount_breakdown_read(server: &MockServer, status: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/breakdowns"))
        .and(query_param("id", "eq.b-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([breakdown_row(status)])))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

async fn patch_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

// ── Lifecycle writes ────────────────────────────────────────────────

#[tokio::test]
async fn test_resolve_sends_conditional_patch_with_stamps() {
    let (server, controller) = setup(None).await;
    mount_breakdown_read(&server, "investigating", 1).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/breakdowns"))
        .and(query_param("id", "eq.b-1"))
        .and(query_param("status", "eq.investigating"))
        .and(body_partial_json(json!({ "status": "resolved" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([breakdown_row("resolved")])))
        .expect(1)
        .mount(&server)
        .await;

    let updated = controller
        .transition_breakdown(&EntityId::from("b-1"), BreakdownStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(updated.status, BreakdownStatus::Resolved);

    let bodies = patch_bodies(&server).await;
    let body = bodies[0].as_object().unwrap();
    assert!(body.contains_key("resolved_at"));
    assert!(body.contains_key("downtime_end"));
    assert!(!body.contains_key("acknowledged_at"));
}

#[tokio::test]
async fn test_lost_race_reports_conflict() {
    let (server, controller) = setup(None).await;
    mount_breakdown_read(&server, "open", 1).await;
    mount_breakdown_read(&server, "investigating", 1).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/breakdowns"))
        .and(query_param("status", "eq.open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let err = controller
        .transition_breakdown(&EntityId::from("b-1"), BreakdownStatus::Investigating)
        .await
        .unwrap_err();
    match err {
        CoreError::Conflict {
            id,
            expected,
            actual,
        } => {
            assert_eq!(id, "b-1");
            assert_eq!(expected, BreakdownStatus::Open);
            assert_eq!(actual, BreakdownStatus::Investigating);
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_row_deleted_mid_update_is_not_found() {
    let (server, controller) = setup(None).await;
    mount_breakdown_read(&server, "open", 1).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/breakdowns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/breakdowns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = controller
        .transition_breakdown(&EntityId::from("b-1"), BreakdownStatus::Investigating)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_invalid_transition_never_writes() {
    let (server, controller) = setup(None).await;
    mount_breakdown_read(&server, "resolved", 1).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::TransitionBreakdown {
            id: EntityId::from("b-1"),
            to: BreakdownStatus::Resolved,
        })
        .await;
    assert!(matches!(
        result,
        Err(CoreError::InvalidTransition {
            from: BreakdownStatus::Resolved,
            to: BreakdownStatus::Resolved,
        })
    ));
}

#[tokio::test]
async fn test_edit_skipping_forward_stamps_each_edge() {
    let (server, controller) = setup(None).await;
    mount_breakdown_read(&server, "open", 1).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/breakdowns"))
        .and(query_param("status", "eq.open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([breakdown_row("resolved")])))
        .expect(1)
        .mount(&server)
        .await;

    let manual_end = Utc.with_ymd_and_hms(2025, 3, 1, 11, 30, 0).unwrap();
    let update = UpdateBreakdownRequest {
        status: Some(BreakdownStatus::Resolved),
        root_cause: Some(Some("Backhoe".into())),
        downtime_end: Some(Some(manual_end)),
        ..UpdateBreakdownRequest::default()
    };
    controller
        .edit_breakdown(&EntityId::from("b-1"), &update)
        .await
        .unwrap();

    let body = patch_bodies(&server).await.remove(0);
    assert_eq!(body["status"], "resolved");
    assert_eq!(body["root_cause"], "Backhoe");
    assert_eq!(body["downtime_end"], "2025-03-01T11:30:00Z");
    assert!(body["acknowledged_at"].is_string());
    assert!(body["resolved_at"].is_string());
}

#[tokio::test]
async fn test_backward_edit_is_rejected() {
    let (server, controller) = setup(None).await;
    mount_breakdown_read(&server, "closed", 1).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let update = UpdateBreakdownRequest {
        status: Some(BreakdownStatus::Open),
        ..UpdateBreakdownRequest::default()
    };
    let err = controller
        .edit_breakdown(&EntityId::from("b-1"), &update)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { .. }));
}

// ── Energy ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inverted_energy_period_never_writes() {
    let (server, controller) = setup(None).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
    let req = CreateEnergyRequest {
        site_id: EntityId::from("s-1"),
        equipment_id: None,
        consumption_kwh: 120.0,
        cost_amount: 18.0,
        period_start: start,
        period_end: start,
        recorded_at: start,
    };
    let err = controller
        .execute(Command::RecordEnergy(req))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}

#[tokio::test]
async fn test_equipment_must_belong_to_site() {
    let (server, controller) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/equipment"))
        .and(query_param("id", "eq.e-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "e-9", "name": "Rectifier", "site_id": "s-2", "status": "operational" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
    let req = CreateEnergyRequest {
        site_id: EntityId::from("s-1"),
        equipment_id: Some(EntityId::from("e-9")),
        consumption_kwh: 120.0,
        cost_amount: 18.0,
        period_start: start,
        period_end: Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
        recorded_at: start,
    };
    let err = controller.record_energy(&req).await.unwrap_err();
    assert!(err.to_string().contains("not installed at site s-1"));
}

// ── Role checks ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_user_listing_without_acting_user_is_denied() {
    let (server, controller) = setup(None).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = controller.profiles().await.unwrap_err();
    assert!(matches!(err, CoreError::PermissionDenied { .. }));
}

#[tokio::test]
async fn test_manager_may_list_but_not_edit_users() {
    let (server, controller) = setup(Some("u-7")).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", "eq.u-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u-7", "full_name": "Ada Okafor", "role": "manager" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u-7", "full_name": "Ada Okafor", "role": "manager" },
            { "id": "u-8", "full_name": "Lin Park", "role": "technician" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(controller.profiles().await.unwrap().len(), 2);

    let result = controller
        .execute(Command::UpdateUser {
            id: EntityId::from("u-8"),
            update: UpdateProfileRequest {
                full_name: Some("Lin Park-Chen".into()),
                ..UpdateProfileRequest::default()
            },
        })
        .await;
    assert!(matches!(result, Err(CoreError::PermissionDenied { .. })));
}

#[tokio::test]
async fn test_admin_deletes_user() {
    let (server, controller) = setup(Some("u-1")).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", "eq.u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u-1", "full_name": "Root", "role": "admin" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", "eq.u-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "u-8" }])))
        .expect(1)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::DeleteUser {
            id: EntityId::from("u-8"),
        })
        .await
        .unwrap();
    assert!(matches!(result, CommandResult::Ok));
}

#[tokio::test]
async fn test_admin_cannot_delete_own_account() {
    let (server, controller) = setup(Some("u-1")).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u-1", "full_name": "Root", "role": "admin" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "u-1" }])))
        .expect(0)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::DeleteUser {
            id: EntityId::from("u-1"),
        })
        .await;
    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
}

// ── Own profile ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_technician_edits_own_profile() {
    let (server, controller) = setup(Some("u-5")).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", "eq.u-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u-5", "full_name": "Ade Bello", "role": "technician" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", "eq.u-5"))
        .and(body_partial_json(json!({ "region": "Centre", "phone": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u-5", "full_name": "Ade Bello", "role": "technician", "region": "Centre" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::UpdateOwnProfile(UpdateProfileRequest {
            region: Some(Some("Centre".into())),
            phone: Some(None),
            ..UpdateProfileRequest::default()
        }))
        .await
        .unwrap();
    let CommandResult::Profile(profile) = result else {
        panic!("expected a profile, got {result:?}");
    };
    assert_eq!(profile.region.as_deref(), Some("Centre"));

    let body = &patch_bodies(&server).await[0];
    assert!(body.get("role").is_none());
}

#[tokio::test]
async fn test_own_profile_edit_cannot_change_role() {
    let (server, controller) = setup(Some("u-5")).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::UpdateOwnProfile(UpdateProfileRequest {
            role: Some(netops_core::Role::Admin),
            ..UpdateProfileRequest::default()
        }))
        .await;
    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
}

#[tokio::test]
async fn test_own_profile_needs_acting_user() {
    let (_server, controller) = setup(None).await;
    let result = controller
        .execute(Command::UpdateOwnProfile(UpdateProfileRequest {
            full_name: Some("Nobody".into()),
            ..UpdateProfileRequest::default()
        }))
        .await;
    assert!(matches!(result, Err(CoreError::PermissionDenied { .. })));
}

// ── Degraded reads ──────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_collection_degrades_to_empty() {
    let (server, controller) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/sites"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/breakdowns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([breakdown_row("open")])))
        .mount(&server)
        .await;
    for table in ["equipment", "interventions", "alerts", "energy_consumption"] {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{table}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
    }

    let snapshot = controller.snapshot().await;
    assert!(snapshot.sites.is_empty());
    assert_eq!(snapshot.breakdowns.len(), 1);
    assert_eq!(
        snapshot.breakdowns[0].site.as_ref().map(|s| s.name.as_str()),
        Some("Harbour")
    );
}

#[tokio::test]
async fn test_dashboard_counts_from_content_range() {
    let (server, controller) = setup(None).await;

    Mock::given(method("HEAD"))
        .and(path("/rest/v1/sites"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-3/4"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "*/0"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/energy_consumption"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "en-1", "site_id": "s-1", "consumption_kwh": "250.5",
                "cost_amount": 37.58,
                "period_start": "2025-03-01T00:00:00Z", "period_end": "2025-03-02T00:00:00Z",
                "recorded_at": "2025-03-02T00:00:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let stats = controller.dashboard().await;
    assert_eq!(stats.counts.total_sites, 4);
    assert_eq!(stats.counts.total_breakdowns, 0);
    assert!((stats.recent_energy_kwh - 250.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_energy_trend_fetches_only_the_six_month_window() {
    let (server, controller) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/energy_consumption"))
        .and(query_param("recorded_at", "gte.2024-10-01T00:00:00Z"))
        .and(query_param("recorded_at", "lt.2025-04-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "en-2", "site_id": "s-1", "consumption_kwh": 120.0,
                "period_start": "2025-03-01T00:00:00Z", "period_end": "2025-03-02T00:00:00Z",
                "recorded_at": "2025-03-02T00:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
    let points = controller.energy_trend(&now).await;
    assert_eq!(points.len(), 6);
    assert_eq!(points[0].label, "Oct 24");
    assert_eq!(points[5].label, "Mar 25");
    assert_eq!(points[5].records, 1);
    assert!((points[5].consumption_kwh - 120.0).abs() < 1e-9);
}
