mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use common::ChannelObserver;
use simpulse::config::{SchedulerSettings, TelemetryConfig};
use simpulse::host::{FixedClock, HostEntity, Position};
use simpulse::kernel::scheduler::{TelemetryScheduler, TickOutcome};
use simpulse::kernel::telemetry::event::DeliveryOutcome;
use simpulse::services::transport::http::CODE_CONNECT;
use simpulse::services::transport::{HttpTransport, Transport};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const ACK: &str = "{\"status\":\"ok\"}";

async fn collect(State(bodies): State<mpsc::UnboundedSender<String>>, body: String) -> (StatusCode, &'static str) {
    let _ = bodies.send(body);
    (StatusCode::OK, ACK)
}

async fn fail() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "{\"error\":\"Internal Server Error\"}")
}

async fn stall() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    ACK
}

/// Fake collector. Returns its address and a stream of received bodies.
async fn spawn_collector() -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/api/telemetry", post(collect))
        .route("/fail", post(fail))
        .route("/slow", post(stall))
        .with_state(tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, rx)
}

/// Local collector only: bypass any proxy configured in the environment.
fn local_transport(timeout: Duration) -> HttpTransport {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
        .unwrap();
    HttpTransport::with_client(client).unwrap()
}

async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<DeliveryOutcome>) -> DeliveryOutcome {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("callback not invoked in time")
        .expect("observer channel closed")
}

#[tokio::test]
async fn test_success_reports_body_and_size() {
    let (addr, mut bodies) = spawn_collector().await;
    let transport = local_transport(Duration::from_secs(2));
    let (observer, mut outcomes) = ChannelObserver::pair();

    transport.send(
        &format!("http://{}/api/telemetry", addr),
        "{\"fps\":60.0}".to_string(),
        observer,
    );

    assert_eq!(
        next_outcome(&mut outcomes).await,
        DeliveryOutcome::Success {
            body: ACK.to_string(),
            size: ACK.len(),
        }
    );
    assert_eq!(bodies.recv().await.unwrap(), "{\"fps\":60.0}");
}

#[tokio::test]
async fn test_non_2xx_reports_status_code() {
    let (addr, _bodies) = spawn_collector().await;
    let transport = local_transport(Duration::from_secs(2));
    let (observer, mut outcomes) = ChannelObserver::pair();

    transport.send(&format!("http://{}/fail", addr), "{}".to_string(), observer);

    assert_eq!(next_outcome(&mut outcomes).await, DeliveryOutcome::Error { code: 500 });
}

#[tokio::test]
async fn test_stalled_collector_reports_timeout() {
    let (addr, _bodies) = spawn_collector().await;
    let transport = local_transport(Duration::from_millis(200));
    let (observer, mut outcomes) = ChannelObserver::pair();

    transport.send(&format!("http://{}/slow", addr), "{}".to_string(), observer);

    assert_eq!(next_outcome(&mut outcomes).await, DeliveryOutcome::Timeout);
}

#[tokio::test]
async fn test_refused_connection_reports_transport_code() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = local_transport(Duration::from_secs(2));
    let (observer, mut outcomes) = ChannelObserver::pair();
    transport.send(&format!("http://{}/api/telemetry", addr), "{}".to_string(), observer);

    assert_eq!(next_outcome(&mut outcomes).await, DeliveryOutcome::Error { code: CODE_CONNECT });
}

#[tokio::test]
async fn test_send_returns_before_response() {
    let (addr, _bodies) = spawn_collector().await;
    let transport = local_transport(Duration::from_secs(2));
    let (observer, mut outcomes) = ChannelObserver::pair();

    let started = std::time::Instant::now();
    transport.send(&format!("http://{}/slow", addr), "{}".to_string(), observer);
    assert!(started.elapsed() < Duration::from_millis(100));
    assert!(outcomes.try_recv().is_err(), "outcome must arrive asynchronously");
}

#[test]
fn test_no_runtime_means_capability_unavailable() {
    let err = HttpTransport::new(Duration::from_secs(1)).err().expect("no runtime here");
    assert!(matches!(err, simpulse::TelemetryError::CapabilityUnavailable(_)), "{:?}", err);
}

#[tokio::test]
async fn test_pipeline_delivers_parseable_document() {
    let (addr, mut bodies) = spawn_collector().await;
    let transport: Arc<dyn Transport> = Arc::new(local_transport(Duration::from_secs(2)));
    let config = TelemetryConfig {
        endpoint: format!("http://{}/api/telemetry", addr),
    };
    let (observer, mut outcomes) = ChannelObserver::pair();
    let mut scheduler = TelemetryScheduler::new(config, Some(transport), SchedulerSettings::default())
        .with_observer(observer);
    scheduler.arm().unwrap();

    let registry = vec![HostEntity::player(
        "76561198000000001",
        "Bob \"Bunny\" Smith",
        Position::new(100.5, 20.25, 300.75),
        75.9,
    )];
    let outcome = scheduler.tick_step(&registry, &FixedClock { millis: 5000, date: None });
    assert!(matches!(outcome, TickOutcome::Sent { .. }));

    let received = tokio::time::timeout(Duration::from_secs(5), bodies.recv())
        .await
        .unwrap()
        .unwrap();
    let doc: serde_json::Value = serde_json::from_str(&received).unwrap();
    assert_eq!(doc["players"][0]["name"], "Bob \"Bunny\" Smith");
    assert_eq!(doc["players"][0]["pos"], "100.5 20.25 300.75");
    assert_eq!(doc["players"][0]["health"], 75);

    assert!(matches!(next_outcome(&mut outcomes).await, DeliveryOutcome::Success { .. }));
    assert_eq!(scheduler.in_flight(), 0);
    assert_eq!(scheduler.stats().delivery_stats.succeeded, 1);
}

#[test]
fn test_runtime_shutdown_does_not_stall_ticks() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let transport = {
        let _guard = runtime.enter();
        HttpTransport::new(Duration::from_secs(1)).unwrap()
    };
    drop(runtime);

    let transport: Arc<dyn Transport> = Arc::new(transport);
    let mut scheduler =
        TelemetryScheduler::new(TelemetryConfig::default(), Some(transport), SchedulerSettings::default());
    scheduler.arm().unwrap();

    // The spawned delivery never runs, its callback is released instead
    for _ in 0..3 {
        let outcome = scheduler.tick_step(&Vec::<HostEntity>::new(), &FixedClock::default());
        assert!(matches!(outcome, TickOutcome::Sent { .. }), "{:?}", outcome);
    }
    assert_eq!(scheduler.in_flight(), 0);
    assert_eq!(scheduler.stats().delivery_stats.dropped, 3);
}
