#![allow(clippy::unwrap_used)]
// Integration tests for `RestClient` using wiremock.

use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netops_api::{Error, Order, Query, RestClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: String,
    status: String,
}

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client = RestClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    (server, client)
}

// ── Auth headers ────────────────────────────────────────────────────

#[tokio::test]
async fn test_api_key_headers_sent() {
    let server = MockServer::start().await;
    let key: secrecy::SecretString = "anon-key".to_string().into();
    let client =
        RestClient::from_api_key(&server.uri(), &key, None, &TransportConfig::default()).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/sites"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rows: Vec<Row> = client.select("sites", &Query::new()).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_access_token_overrides_bearer() {
    let server = MockServer::start().await;
    let key: secrecy::SecretString = "anon-key".to_string().into();
    let token: secrecy::SecretString = "user-jwt".to_string().into();
    let client =
        RestClient::from_api_key(&server.uri(), &key, Some(&token), &TransportConfig::default())
            .unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rows: Vec<Row> = client.select("profiles", &Query::new()).await.unwrap();
    assert!(rows.is_empty());
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_select_with_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/alerts"))
        .and(query_param("select", "id,status"))
        .and(query_param("status", "eq.active"))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a1", "status": "active" },
            { "id": "a2", "status": "active" }
        ])))
        .mount(&server)
        .await;

    let query = Query::new()
        .select("id,status")
        .eq("status", "active")
        .order("created_at", Order::Desc)
        .limit(10);
    let rows: Vec<Row> = client.select("alerts", &query).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "a1");
}

#[tokio::test]
async fn test_select_one_missing_row() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/breakdowns"))
        .and(query_param("id", "eq.nope"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let row: Option<Row> = client
        .select_one("breakdowns", &Query::new().eq("id", "nope"))
        .await
        .unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn test_count_reads_content_range() {
    let (server, client) = setup().await;

    Mock::given(method("HEAD"))
        .and(path("/rest/v1/sites"))
        .and(query_param("status", "eq.active"))
        .and(header("prefer", "count=exact"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-24/57"))
        .mount(&server)
        .await;

    let total = client
        .count("sites", &Query::new().eq("status", "active"))
        .await
        .unwrap();
    assert_eq!(total, 57);
}

#[tokio::test]
async fn test_deserialization_error_keeps_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result: Result<Vec<Row>, _> = client.select("sites", &Query::new()).await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_deserialization_preview_respects_char_boundaries() {
    let (server, client) = setup().await;

    // Byte 200 falls inside the two-byte 'é'.
    let raw = format!("{}é Douala-Bassa garbage", "x".repeat(199));
    Mock::given(method("GET"))
        .and(path("/rest/v1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_string(raw.clone()))
        .mount(&server)
        .await;

    let result: Result<Vec<Row>, _> = client.select("sites", &Query::new()).await;
    match result {
        Err(Error::Deserialization { message, body }) => {
            assert_eq!(body, raw);
            assert!(message.contains("xé"));
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_insert_returns_representation() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/breakdowns"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!({ "status": "open" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([{ "id": "b1", "status": "open" }])),
        )
        .mount(&server)
        .await;

    let rows: Vec<Row> = client
        .insert("breakdowns", &json!({ "status": "open" }))
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![Row {
            id: "b1".into(),
            status: "open".into()
        }]
    );
}

#[tokio::test]
async fn test_conditional_update_no_match_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/breakdowns"))
        .and(query_param("id", "eq.b1"))
        .and(query_param("status", "eq.open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let query = Query::new().eq("id", "b1").eq("status", "open");
    let rows: Vec<Row> = client
        .update("breakdowns", &query, &json!({ "status": "investigating" }))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_unfiltered_update_refused() {
    let (_server, client) = setup().await;

    let result: Result<Vec<Row>, _> = client
        .update("breakdowns", &Query::new(), &json!({ "status": "closed" }))
        .await;
    assert!(
        matches!(result, Err(Error::UnfilteredWrite { verb: "PATCH", .. })),
        "expected UnfilteredWrite, got: {result:?}"
    );
}

#[tokio::test]
async fn test_delete_returns_removed_rows() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/energy_consumption"))
        .and(query_param("id", "eq.e1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "e1", "status": "x" }])),
        )
        .mount(&server)
        .await;

    let rows: Vec<Row> = client
        .delete("energy_consumption", &Query::new().eq("id", "e1"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/sites"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "JWT expired"
        })))
        .mount(&server)
        .await;

    let result: Result<Vec<Row>, _> = client.select("sites", &Query::new()).await;
    assert!(
        matches!(result, Err(Error::Authentication { ref message }) if message == "JWT expired"),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_rls_violation_maps_to_permission_denied() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "42501",
            "message": "new row violates row-level security policy"
        })))
        .mount(&server)
        .await;

    let result: Result<Vec<Row>, _> = client
        .delete("profiles", &Query::new().eq("id", "u1"))
        .await;
    assert!(
        matches!(result, Err(Error::PermissionDenied { .. })),
        "expected PermissionDenied, got: {result:?}"
    );
}

#[tokio::test]
async fn test_foreign_key_violation_maps_to_constraint() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/breakdowns"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23503",
            "message": "insert or update violates foreign key constraint",
            "details": "Key (site_id)=(x) is not present in table \"sites\"."
        })))
        .mount(&server)
        .await;

    let result: Result<Vec<Row>, _> = client.insert("breakdowns", &json!({})).await;
    match result {
        Err(err @ Error::Constraint { .. }) => assert_eq!(err.api_error_code(), Some("23503")),
        other => panic!("expected Constraint error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/sites"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let result: Result<Vec<Row>, _> = client.select("sites", &Query::new()).await;
    match result {
        Err(err @ Error::Api { status: 502, .. }) => {
            assert!(err.is_transient());
            assert!(err.to_string().contains("bad gateway"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
