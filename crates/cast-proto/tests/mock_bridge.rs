//! Drives `BackendClient` and `PanelController` against an in-process bridge.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use cast_proto::client::{BackendClient, ClientError};
use cast_proto::panel::{CoverArt, PanelController, ScanState};
use cast_proto::protocol::Command;
use tokio::net::TcpListener;

const STATUS: &str = "1\nLiving Room\n35%\nAlice Coltrane\nTuriya and Ramakrishna\nPtah, the El Daoud\n02:10\n08:21\n0";
const COVER: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";

#[derive(Clone, Default)]
struct Bridge {
    received: Arc<Mutex<Vec<(String, String)>>>,
}

async fn control(
    State(bridge): State<Bridge>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    bridge
        .received
        .lock()
        .unwrap()
        .push((body.clone(), content_type));

    match body.parse::<Command>() {
        Ok(Command::GetStatus) => (StatusCode::OK, STATUS.to_string()),
        Ok(Command::ScanDevices) => (StatusCode::OK, "0,Living Room\n1,Kitchen\n".to_string()),
        Ok(_) => (StatusCode::OK, String::new()),
        Err(_) => (StatusCode::BAD_REQUEST, String::new()),
    }
}

async fn cover() -> (StatusCode, Vec<u8>) {
    (StatusCode::OK, COVER.to_vec())
}

async fn spawn_bridge() -> (String, Bridge) {
    let bridge = Bridge::default();
    let app = Router::new()
        .route("/", post(control))
        .route("/cover.jpg", get(cover))
        .with_state(bridge.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), bridge)
}

fn client(base: &str) -> BackendClient {
    BackendClient::new(base, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn commands_are_posted_as_bare_bodies() {
    let (base, bridge) = spawn_bridge().await;
    let client = client(&base);

    for cmd in [
        Command::VolumeUp,
        Command::TogglePause,
        Command::SelectDevice(1),
    ] {
        let body = client.send(cmd).await.unwrap();
        assert!(body.is_empty());
    }

    let received = bridge.received.lock().unwrap().clone();
    let bodies: Vec<&str> = received.iter().map(|(b, _)| b.as_str()).collect();
    assert_eq!(bodies, vec!["volume_up", "toggle_pause", "select_device 1"]);
    assert!(received
        .iter()
        .all(|(_, ct)| ct == "application/x-www-form-urlencoded"));
}

#[tokio::test]
async fn status_poll_renders_panel() {
    let (base, _bridge) = spawn_bridge().await;
    let client = client(&base);
    let mut panel = PanelController::new(39, client.base_url());

    let body = client.send(Command::GetStatus).await.unwrap();
    let cover_url = panel.apply_status(&body).expect("first poll loads cover");

    let view = panel.view();
    assert!(view.connected);
    assert!(view.header.to_html().starts_with("<b>Living Room</b>"));
    assert!(view.header.to_html().ends_with("02:10<b>/</b>08:21"));
    assert_eq!(view.track.chars().count(), 39);
    assert_eq!(panel.cover(), &CoverArt::Shown { url: cover_url.clone() });

    let bytes = client.fetch_cover(&cover_url).await.unwrap();
    assert_eq!(bytes, COVER);
}

#[tokio::test]
async fn scan_round_trip() {
    let (base, bridge) = spawn_bridge().await;
    let client = client(&base);
    let mut panel = PanelController::new(39, client.base_url());

    let cmd = panel.begin_scan().unwrap();
    let body = client.send(cmd).await.unwrap();
    panel.finish_scan(&body);
    assert!(matches!(panel.scan(), ScanState::Open(list) if list.len() == 2));

    let select = panel.select_device(1).unwrap();
    client.send(select).await.unwrap();
    assert_eq!(panel.scan(), &ScanState::Closed);

    let received = bridge.received.lock().unwrap();
    assert_eq!(received.last().unwrap().0, "select_device 1");
}

#[tokio::test]
async fn rejected_command_is_a_status_error() {
    let (base, _bridge) = spawn_bridge().await;
    let client = client(&base);
    // Unknown bodies are answered with 400 by the bridge.
    let http = reqwest::Client::new();
    let resp = http.post(format!("{}/", base)).body("reboot").send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    let err = client.fetch_cover(&format!("{}/missing.jpg", base)).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status, .. } if status == reqwest::StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn unreachable_bridge_is_an_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::new(format!("http://{}", addr), Duration::from_millis(500)).unwrap();
    let err = client.send(Command::GetStatus).await.unwrap_err();
    assert!(matches!(err, ClientError::Http { .. }));
}
