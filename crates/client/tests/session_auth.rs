//! Login flow, session transitions, and conditional bearer headers.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use labdesk_client::backend::BackendDescriptor;
use labdesk_client::{
    ApplicationClient, AuthClient, ClientError, Connection, MemoryTokenStorage, RegisterRequest,
    SessionStore,
};

fn backend(uri: &str) -> BackendDescriptor {
    BackendDescriptor::new(uri.parse().unwrap(), Duration::from_secs(5), 0)
}

fn signed_token(payload: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{header}.{body}.signature")
}

#[tokio::test]
async fn login_persists_token_and_exposes_identity() {
    let server = MockServer::start().await;
    let token = signed_token(json!({
        "userId": 1,
        "employeeId": "E1",
        "name": "X",
        "roles": ["OP"],
    }));

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"employeeId": "E1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "userId": 1,
            "employeeId": "E1",
            "name": "X",
            "roles": ["OP"],
        })))
        .mount(&server)
        .await;

    let session = SessionStore::new(MemoryTokenStorage::new());
    let auth = AuthClient::new(Connection::new(backend(&server.uri())), session.clone());

    assert!(!session.is_authenticated().await);

    let response = auth.login("E1").await.expect("login");
    assert_eq!(response.employee_id, "E1");
    assert_eq!(response.roles, vec!["OP"]);

    assert!(session.is_authenticated().await);
    let identity = session.current_user().await.expect("decoded identity");
    assert_eq!(identity.employee_id, "E1");
    assert_eq!(identity.user_id, 1);
}

#[tokio::test]
async fn failed_login_leaves_session_anonymous() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unknown employee"))
        .mount(&server)
        .await;

    let session = SessionStore::new(MemoryTokenStorage::new());
    let auth = AuthClient::new(Connection::new(backend(&server.uri())), session.clone());

    let result = auth.login("E404").await;
    assert!(matches!(result, Err(ClientError::Auth { .. })));
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn register_does_not_touch_the_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "name": "New Operator",
            "employeeId": "E9",
            "password": "hunter2",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "registered"})))
        .mount(&server)
        .await;

    let session = SessionStore::new(MemoryTokenStorage::new());
    let auth = AuthClient::new(Connection::new(backend(&server.uri())), session.clone());

    let request = RegisterRequest {
        name: "New Operator".to_owned(),
        employee_id: "E9".to_owned(),
        password: "hunter2".to_owned(),
        role_id: None,
    };
    let response = auth.register(&request).await.expect("register");

    assert_eq!(response["message"], "registered");
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let server = MockServer::start().await;
    let session = SessionStore::new(MemoryTokenStorage::new());
    let auth = AuthClient::new(Connection::new(backend(&server.uri())), session.clone());

    session.store_token("a.b.c").await.unwrap();
    assert!(session.is_authenticated().await);

    auth.logout().await.expect("first logout");
    assert!(!session.is_authenticated().await);

    auth.logout().await.expect("second logout");
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn valid_token_is_sent_as_bearer_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/statistics/users/count"))
        .and(header("authorization", "Bearer h.p.s"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(42)))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::new(MemoryTokenStorage::new());
    session.store_token("h.p.s").await.unwrap();

    let client = ApplicationClient::from_backend(backend(&server.uri()), session);
    assert_eq!(client.user_count().await.expect("count"), 42);
}

#[tokio::test]
async fn structurally_invalid_token_sends_no_auth_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/statistics/users/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(0)))
        .mount(&server)
        .await;

    let session = SessionStore::new(MemoryTokenStorage::new());
    session.store_token("two.segments").await.unwrap();

    let client = ApplicationClient::from_backend(backend(&server.uri()), session);
    let _ = client.user_count().await.expect("count");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0].headers.get("authorization").is_none(),
        "invalid token must not produce an Authorization header"
    );
}

#[tokio::test]
async fn time_range_query_parameters_are_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/statistics/experiments/time-range"))
        .and(wiremock::matchers::query_param("startTime", "2026-08-01T00:00:00"))
        .and(wiremock::matchers::query_param("endTime", "2026-08-29T23:59:59"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::new(MemoryTokenStorage::new());
    let client = ApplicationClient::from_backend(backend(&server.uri()), session);

    let rows = client
        .time_range_statistics("2026-08-01T00:00:00", "2026-08-29T23:59:59")
        .await
        .expect("time range query");
    assert!(rows.is_empty());
}

#[tokio::test]
async fn statistics_rows_deserialize_from_server_dto() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/statistics/experiments/user/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "experimentId": 31,
            "experimentType": "titration",
            "userName": "Novak",
            "experimentTime": "2026-08-20T10:15:00",
            "totalDataPoints": 120,
            "averageConcentration": 0.1023,
            "confidenceLevel": 0.95,
            "analysisSummary": "endpoint reached",
        }])))
        .mount(&server)
        .await;

    let session = SessionStore::new(MemoryTokenStorage::new());
    session.store_token("h.p.s").await.unwrap();
    let client = ApplicationClient::from_backend(backend(&server.uri()), session);

    let rows = client.user_experiment_statistics(7).await.expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].experiment_id, Some(31));
    assert_eq!(rows[0].total_data_points, 120);
    assert!((rows[0].average_concentration - 0.1023).abs() < 1e-9);
}

#[tokio::test]
async fn upload_propagates_executor_failure_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/data/upload"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let session = SessionStore::new(MemoryTokenStorage::new());
    session.store_token("h.p.s").await.unwrap();
    let client = ApplicationClient::from_backend(backend(&server.uri()), session);

    let result = client
        .upload_experiment_data(&json!({"experimentId": 1, "volume": 24.5}))
        .await;

    match result {
        Err(ClientError::Auth { status, body }) => {
            assert_eq!(status, Some(403));
            assert_eq!(body, "forbidden");
        }
        other => panic!("expected auth error, got {other:?}"),
    }
}
