//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use sumi_reach::config::{Config, DepthBoundary};
use sumi_reach::crawler::{run_crawl, Coordinator};
use sumi_reach::output::{CrawlReport, MemorySink};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Upper bound for any single crawl in these tests
const CRAWL_TIMEOUT: Duration = Duration::from_secs(20);

/// Creates a test configuration that keeps pages in memory
fn create_test_config(seeds: Vec<String>, worker_count: usize, max_depth: u32) -> Config {
    let mut config = Config {
        seeds,
        ..Config::default()
    };
    config.crawler.worker_count = worker_count;
    config.crawler.max_depth = max_depth;
    config.output.save_pages = false;
    config
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Runs a crawl and returns the report plus everything the sink received
async fn crawl(config: Config) -> (CrawlReport, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let coordinator =
        Coordinator::new(config, sink.clone()).expect("Failed to create coordinator");

    let report = tokio::time::timeout(CRAWL_TIMEOUT, coordinator.run())
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed");

    (report, sink)
}

/// Counts GET requests per path seen by the mock server
async fn requests_by_path(server: &MockServer) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for request in server.received_requests().await.unwrap_or_default() {
        *counts.entry(request.url.path().to_string()).or_insert(0) += 1;
    }
    counts
}

fn sorted_paths(counts: &HashMap<String, usize>) -> Vec<String> {
    let mut paths: Vec<String> = counts.keys().cloned().collect();
    paths.sort();
    paths
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_self_link_scenario() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><body>
            <a href="/about">About</a>
            <a href="{}">Home</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<html><body><a href="/team">Team</a></body></html>"#.to_string(),
    )
    .await;

    let config = create_test_config(vec![base_url.clone()], 2, 1);
    let (report, sink) = crawl(config).await;

    assert_eq!(
        sink.urls(),
        vec![format!("{}/", base_url), format!("{}/about", base_url)]
    );
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_failed, 0);
    assert_eq!(report.urls_seen, 2);
    assert!(!report.stopped);

    let requests = requests_by_path(&server).await;
    assert_eq!(requests.get("/"), Some(&1));
    assert_eq!(requests.get("/about"), Some(&1));
    assert_eq!(requests.get("/team"), None);
}

/// Mounts a linear chain /0 -> /1 -> ... -> /{len - 1}
async fn mount_chain(server: &MockServer, len: usize) {
    for i in 0..len {
        let body = if i + 1 < len {
            format!(r#"<a href="/{}">next</a>"#, i + 1)
        } else {
            "<p>end of the line</p>".to_string()
        };
        mount_page(server, &format!("/{}", i), body).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_bound_inclusive() {
    let server = MockServer::start().await;
    mount_chain(&server, 6).await;

    let config = create_test_config(vec![format!("{}/0", server.uri())], 3, 2);
    let (report, _) = crawl(config).await;

    let requests = requests_by_path(&server).await;
    assert_eq!(sorted_paths(&requests), vec!["/0", "/1", "/2"]);
    assert_eq!(report.pages_fetched, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_bound_exclusive() {
    let server = MockServer::start().await;
    mount_chain(&server, 6).await;

    let mut config = create_test_config(vec![format!("{}/0", server.uri())], 3, 2);
    config.crawler.depth_boundary = DepthBoundary::Exclusive;
    let (report, _) = crawl(config).await;

    let requests = requests_by_path(&server).await;
    assert_eq!(sorted_paths(&requests), vec!["/0", "/1"]);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_max_depth_zero_fetches_only_seeds() {
    let server = MockServer::start().await;
    mount_chain(&server, 3).await;

    let config = create_test_config(vec![format!("{}/0", server.uri())], 2, 0);
    let (report, _) = crawl(config).await;

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.links_discovered, 0);
}

/// A small cyclic graph:
///   /    -> /a /b /c
///   /a   -> /b /a/x /
///   /b   -> /c /a
///   /c   -> / /b
///   /a/x -> ../c
async fn mount_cyclic_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        r#"<a href="/a"><a href='/b'><a href=/c>"#.to_string(),
    )
    .await;
    mount_page(
        server,
        "/a",
        r#"<a href="/b"><a href="/a/x"><a href="/">"#.to_string(),
    )
    .await;
    mount_page(server, "/b", r#"<a href="/c"><a href="a">"#.to_string()).await;
    mount_page(server, "/c", r#"<a href="/"><a href="/b">"#.to_string()).await;
    mount_page(server, "/a/x", r#"<a href="../c">"#.to_string()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_termination_for_various_worker_counts() {
    let server = MockServer::start().await;
    mount_cyclic_site(&server).await;
    let base_url = server.uri();

    for worker_count in [1, 2, 4, 16] {
        let config = create_test_config(vec![base_url.clone()], worker_count, 3);
        let (report, sink) = crawl(config).await;

        let expected: Vec<String> = ["/", "/a", "/a/x", "/b", "/c"]
            .iter()
            .map(|p| format!("{}{}", base_url, p))
            .collect();
        assert_eq!(sink.urls(), expected, "worker_count = {}", worker_count);
        assert_eq!(report.pages_fetched, 5);
        assert_eq!(report.urls_seen, 5);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_link_fetched_once() {
    let server = MockServer::start().await;

    let hub: String = (0..20)
        .map(|i| format!(r#"<a href="/page{}">"#, i))
        .collect();
    mount_page(&server, "/", hub).await;
    for i in 0..20 {
        mount_page(
            &server,
            &format!("/page{}", i),
            r#"<a href="/shared"><a href="/">"#.to_string(),
        )
        .await;
    }
    mount_page(&server, "/shared", "<p>shared</p>".to_string()).await;

    let config = create_test_config(vec![server.uri()], 8, 3);
    let (report, _) = crawl(config).await;

    let requests = requests_by_path(&server).await;
    assert_eq!(requests.get("/shared"), Some(&1));
    assert_eq!(requests.get("/"), Some(&1));
    assert!(requests.values().all(|count| *count == 1));
    assert_eq!(report.pages_fetched, 22);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failure_isolation() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/p1"><a href="/missing">"#.to_string(),
    )
    .await;
    mount_page(&server, "/p1", r#"<a href="/p2">"#.to_string()).await;
    mount_page(&server, "/p2", "<p>leaf</p>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(
        vec!["http://127.0.0.1:1/".to_string(), server.uri()],
        2,
        2,
    );
    let (report, sink) = crawl(config).await;

    let base_url = server.uri();
    assert_eq!(
        sink.urls(),
        vec![
            format!("{}/", base_url),
            format!("{}/p1", base_url),
            format!("{}/p2", base_url),
        ]
    );
    assert_eq!(report.pages_fetched, 3);
    // Unreachable seed plus the 404
    assert_eq!(report.pages_failed, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_invalid_links_are_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="mailto:someone@example.com"><a href="http://[::1"><a href="javascript:void(0)"><a href="/ok">"#
            .to_string(),
    )
    .await;
    mount_page(&server, "/ok", "<p>ok</p>".to_string()).await;

    let config = create_test_config(vec![server.uri()], 2, 2);
    let (report, sink) = crawl(config).await;

    assert_eq!(sink.len(), 2);
    assert_eq!(report.invalid_links, 3);
    assert_eq!(report.links_discovered, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sink_receives_body() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html>hello sink</html>".to_string()).await;

    let config = create_test_config(vec![server.uri()], 1, 1);
    let (_, sink) = crawl(config).await;

    let pages = sink.pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url, format!("{}/", server.uri()));
    assert_eq!(pages[0].body, "<html>hello sink</html>");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stop_leaves_pending_tasks() {
    let server = MockServer::start().await;

    let hub: String = (0..20)
        .map(|i| format!(r#"<a href="/page{}">"#, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(hub)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = create_test_config(vec![server.uri()], 2, 2);
    let coordinator =
        Coordinator::new(config, Arc::new(MemorySink::new())).expect("Failed to create coordinator");
    let stop = coordinator.stop_handle();

    let crawl = tokio::spawn(coordinator.run());

    // Stop only once the seed request is on the wire
    tokio::time::timeout(CRAWL_TIMEOUT, async {
        while server.received_requests().await.map_or(true, |r| r.is_empty()) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Seed was never requested");
    stop.stop();

    let report = tokio::time::timeout(CRAWL_TIMEOUT, crawl)
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl task panicked")
        .expect("Crawl failed");

    assert!(report.stopped);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.pending_remaining, 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_crawl_writes_files() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/docs/guide.html">"#.to_string()).await;
    mount_page(&server, "/docs/guide.html", "<p>guide</p>".to_string()).await;

    let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(vec![server.uri()], 2, 1);
    config.output.save_pages = true;
    config.output.directory = temp.path().display().to_string();

    let report = tokio::time::timeout(CRAWL_TIMEOUT, run_crawl(config))
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed");
    assert_eq!(report.pages_fetched, 2);

    let mut names: Vec<String> = std::fs::read_dir(temp.path())
        .expect("Failed to read output dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("fetched_content_127.0.0.1_"));
    assert!(names[1].starts_with("fetched_content_guide.html_"));
}

#[tokio::test]
async fn test_invalid_configuration_fails_before_dispatch() {
    let config = create_test_config(vec!["https://example.com".to_string()], 0, 1);
    let result = run_crawl(config).await;
    assert!(result.is_err());
}
