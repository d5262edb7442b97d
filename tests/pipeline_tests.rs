// tests/pipeline_tests.rs
//
// Integration tests for the contact-discovery pipeline. HTTP endpoints are
// simulated with wiremock; the concurrency-bound test uses a raw TCP probe
// server so it can observe peak in-flight requests.

use lead_harvester::{CompanyStatus, Config, Frontier, Phase, Pipeline, SiteIdentity};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Config {
    let mut config = Config::default();
    config.pipeline.fetch_timeout_seconds = 2;
    config
}

/// A URL that refuses connections: bind an ephemeral port, then free it.
fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn end_to_end_one_company_per_identity() {
    let acme = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Mail: hello@acme-care.com"))
        .mount(&acme)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>welkom</html>"))
        .mount(&acme)
        .await;

    let mut frontier = Frontier::new();
    frontier.add(SiteIdentity::new("Acme", acme.uri()));
    frontier.add(SiteIdentity::new("Bad", refused_url()));
    // Duplicate key is silently dropped.
    frontier.add(SiteIdentity::new("Acme", acme.uri()));
    assert_eq!(frontier.len(), 2);

    let pipeline = Pipeline::new(test_config()).expect("pipeline");
    let handle = pipeline.handle();
    let companies = pipeline.run(frontier).await.expect("run");

    assert_eq!(companies.len(), 2);
    // Frontier order, not completion order.
    assert_eq!(companies[0].identity.name, "Acme");
    assert_eq!(companies[1].identity.name, "Bad");

    assert_eq!(companies[0].status, CompanyStatus::Success);
    assert_eq!(
        companies[0].primary_email.as_deref(),
        Some("hello@acme-care.com")
    );
    assert!(companies[0].pages_checked >= 1);

    assert!(matches!(companies[1].status, CompanyStatus::Error(_)));
    assert!(companies[1].emails.is_empty());

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.completed, 2);
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.phase, Phase::Complete);
}

#[tokio::test]
async fn early_stop_keeps_in_flight_emails_and_skips_queued_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string("contact@acme-care.com"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string("about@acme-care.com"))
        .mount(&server)
        .await;
    // Root is slow and carries its own address: it is already in flight
    // when /contact wins, so its email must still be merged.
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("root@acme-care.com")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let mut frontier = Frontier::new();
    frontier.add(SiteIdentity::new("Acme", server.uri()));

    let pipeline = Pipeline::new(test_config()).expect("pipeline");
    let companies = pipeline.run(frontier).await.expect("run");
    let company = &companies[0];

    assert_eq!(company.status, CompanyStatus::Success);
    // /contact completed first, so it supplies the primary email.
    assert_eq!(company.primary_email.as_deref(), Some("contact@acme-care.com"));

    let addresses: Vec<&str> = company.emails.iter().map(|e| e.address.as_str()).collect();
    assert!(addresses.contains(&"root@acme-care.com"));
    // /about was queued behind the sub-concurrency cap and never launched.
    assert!(!addresses.contains(&"about@acme-care.com"));

    // Only root and /contact were actually fetched.
    assert_eq!(company.pages_checked, 2);
}

#[tokio::test]
async fn hung_endpoint_resolves_as_timeout_not_a_hang() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let mut config = test_config();
    config.pipeline.fetch_timeout_seconds = 1;
    config.pipeline.max_candidate_paths = 2;

    let mut frontier = Frontier::new();
    frontier.add(SiteIdentity::new("Slow", server.uri()));

    let started = Instant::now();
    let pipeline = Pipeline::new(config).expect("pipeline");
    let companies = pipeline.run(frontier).await.expect("run");

    assert!(started.elapsed() < Duration::from_secs(10));
    match &companies[0].status {
        CompanyStatus::Error(reason) => assert!(reason.contains("timeout"), "got: {}", reason),
        other => panic!("expected timeout error, got {:?}", other),
    }
}

#[tokio::test]
async fn cancellation_still_yields_one_company_per_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("info@acme-care.com"))
        .mount(&server)
        .await;

    let mut frontier = Frontier::new();
    for i in 0..3 {
        frontier.add(SiteIdentity::new(format!("Site {}", i), server.uri()));
    }

    let pipeline = Pipeline::new(test_config()).expect("pipeline");
    let handle = pipeline.handle();
    handle.cancel();
    assert!(handle.is_cancelled());

    let companies = pipeline.run(frontier).await.expect("run");
    assert_eq!(companies.len(), 3);
    for company in &companies {
        assert_eq!(
            company.status,
            CompanyStatus::Error("run cancelled".to_string())
        );
        assert_eq!(company.pages_checked, 0);
    }

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.completed, 3);
    assert_eq!(snapshot.phase, Phase::Complete);
}

#[tokio::test]
async fn empty_frontier_is_a_run_level_error() {
    let pipeline = Pipeline::new(test_config()).expect("pipeline");
    let handle = pipeline.handle();
    let result = pipeline.run(Frontier::new()).await;
    assert!(result.is_err());
    assert_eq!(handle.snapshot().phase, Phase::Error);
}

/// Counts in-flight requests at the socket level, answering each one with
/// a small HTML page after a fixed delay.
async fn spawn_probe_server(delay: Duration) -> (String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe server");
    let addr = listener.local_addr().expect("addr");
    let peak = Arc::new(AtomicUsize::new(0));
    let inflight = Arc::new(AtomicUsize::new(0));

    let peak_writer = Arc::clone(&peak);
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let inflight = Arc::clone(&inflight);
            let peak = Arc::clone(&peak_writer);
            tokio::spawn(async move {
                let current = inflight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(current, Ordering::SeqCst);

                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                tokio::time::sleep(delay).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
                    )
                    .await;
                let _ = socket.shutdown().await;

                inflight.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });

    (format!("http://{}", addr), peak)
}

#[tokio::test]
async fn in_flight_fetches_never_exceed_the_layered_caps() {
    let (url, peak) = spawn_probe_server(Duration::from_millis(50)).await;

    let mut config = test_config();
    config.pipeline.max_concurrent_sites = 3;
    config.pipeline.per_site_concurrency = 2;

    let mut frontier = Frontier::new();
    for i in 0..5 {
        frontier.add(SiteIdentity::new(format!("Site {}", i), url.clone()));
    }

    let pipeline = Pipeline::new(config).expect("pipeline");
    let companies = pipeline.run(frontier).await.expect("run");

    assert_eq!(companies.len(), 5);
    for company in &companies {
        assert_eq!(company.status, CompanyStatus::NoContactFound);
    }

    let observed_peak = peak.load(Ordering::SeqCst);
    assert!(observed_peak >= 1);
    // global cap (3) × per-site cap (2)
    assert!(
        observed_peak <= 6,
        "peak in-flight fetches was {}",
        observed_peak
    );
}
