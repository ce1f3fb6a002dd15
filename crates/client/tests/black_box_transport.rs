use std::sync::Arc;

use axum::{Json, Router, http::HeaderMap, http::StatusCode, response::IntoResponse, routing::get};
use scholar_auth::{Session, UserProfile};
use scholar_client::testing::{BusyEvent, RecordingIndicator, RecordingNavigator, RecordingNotifier};
use scholar_client::{
    ClientConfig, ClientContext, HostPorts, MemoryStorage, TransportError,
};
use serde_json::json;
use tower::{ServiceBuilder, ServiceExt};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let app = Router::new()
            .route("/api/whoami", get(whoami))
            .route("/api/expired", get(expired))
            .route("/api/broken", get(broken));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn whoami(headers: HeaderMap) -> impl IntoResponse {
    let auth = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if auth.is_empty() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "message": "Please log in" })),
        );
    }
    (StatusCode::OK, Json(json!({ "token": auth })))
}

async fn expired() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized", "message": "Your session has expired" })),
    )
}

async fn broken() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal", "message": "database unavailable" })),
    )
}

struct Client {
    ctx: ClientContext,
    navigator: Arc<RecordingNavigator>,
    notifier: Arc<RecordingNotifier>,
    indicator: Arc<RecordingIndicator>,
}

fn client(base_url: &str) -> Client {
    scholar_observability::init_with(scholar_observability::LogFormat::Pretty);

    let navigator = Arc::new(RecordingNavigator::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let indicator = Arc::new(RecordingIndicator::default());
    let config = ClientConfig {
        api_base_url: base_url.to_string(),
        ..Default::default()
    };
    let ctx = ClientContext::new(
        config,
        Arc::new(MemoryStorage::new()),
        HostPorts {
            navigator: navigator.clone(),
            notifier: notifier.clone(),
            indicator: indicator.clone(),
        },
    );
    Client {
        ctx,
        navigator,
        notifier,
        indicator,
    }
}

fn get_request(path: &str) -> http::Request<String> {
    http::Request::get(path).body(String::new()).unwrap()
}

fn teacher() -> Session {
    Session::new(
        "tok-teacher",
        UserProfile::new("Tess", ["teacher"].into_iter().collect()).completed(),
    )
}

#[tokio::test]
async fn token_reaches_server() {
    let server = TestServer::spawn().await;
    let client = client(&server.base_url);
    client.ctx.account().sign_in(teacher()).unwrap();

    let svc = ServiceBuilder::new()
        .layer(client.ctx.interceptor())
        .service(client.ctx.transport());

    let resp = svc.oneshot(get_request("/api/whoami")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["token"], "tok-teacher");
    assert_eq!(
        client.indicator.events(),
        vec![BusyEvent::Shown, BusyEvent::Hidden]
    );
}

#[tokio::test]
async fn server_rejection_forces_single_logout() {
    let server = TestServer::spawn().await;
    let client = client(&server.base_url);
    client.ctx.account().sign_in(teacher()).unwrap();

    let svc = ServiceBuilder::new()
        .layer(client.ctx.interceptor())
        .service(client.ctx.transport());

    let err = svc
        .clone()
        .oneshot(get_request("/api/expired"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.message(), "Your session has expired");

    // Now logged out: the empty header is still sent and rejected, but no
    // second teardown happens.
    let err = svc.oneshot(get_request("/api/whoami")).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.message(), "Please log in");

    assert!(!client.ctx.session().is_logged_in());
    assert_eq!(
        client.notifier.warnings(),
        vec!["Your session has expired".to_string()]
    );
    assert_eq!(
        client.navigator.paths(),
        vec!["/dashboard".to_string(), "/login".to_string()]
    );
    assert_eq!(client.ctx.tracker().in_flight(), 0);
}

#[tokio::test]
async fn server_errors_propagate_without_logout() {
    let server = TestServer::spawn().await;
    let client = client(&server.base_url);
    client.ctx.account().sign_in(teacher()).unwrap();

    let svc = ServiceBuilder::new()
        .layer(client.ctx.interceptor())
        .service(client.ctx.transport());

    let err: TransportError = svc.oneshot(get_request("/api/broken")).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.message(), "database unavailable");
    assert!(client.ctx.session().is_logged_in());
    assert!(client.notifier.warnings().is_empty());
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = client(&base_url);
    let svc = ServiceBuilder::new()
        .layer(client.ctx.interceptor())
        .service(client.ctx.transport());

    let err = svc.oneshot(get_request("/api/whoami")).await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
    assert_eq!(client.ctx.tracker().in_flight(), 0);
}
