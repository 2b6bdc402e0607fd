//! Integration tests for the scanner
//!
//! These tests use wiremock to create mock HTTP servers and run full scans
//! end-to-end. Any request without a matching mock is answered with 404.

use deadlink_scout::config::ScanOptions;
use deadlink_scout::storage::{JsonFileCache, ResponseCache};
use deadlink_scout::{scan, ConfigError, ScanError, ScanPolicy, ScanReport, STATUS_BAD_LINK};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts an HTML page answered with 200
async fn mount_page(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

/// Mounts a page that must be requested exactly `times` times
async fn mount_page_expecting(server: &MockServer, at: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(times)
        .mount(server)
        .await;
}

fn links(report: &ScanReport, page: &str) -> Vec<(String, u16)> {
    report.broken_links[page]
        .iter()
        .map(|b| (b.link.clone(), b.code))
        .collect()
}

#[tokio::test]
async fn test_page2_scenario() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/page2",
        r#"<html><body>
            <img src="/broken.png">
            <a href="/page2/broken/relative">Relative</a>
            <a href="/page2/broken2.png">Image link</a>
        </body></html>"#,
    )
    .await;

    let report = scan(&format!("{}/page2", base), ScanPolicy::default())
        .await
        .unwrap();

    let page = format!("{}/page2", base);
    assert_eq!(report.broken_links.len(), 1);
    assert_eq!(
        links(&report, &page),
        vec![
            (format!("{}/broken.png", base), 404),
            (format!("{}/page2/broken/relative", base), 404),
            (format!("{}/page2/broken2.png", base), 404),
        ]
    );

    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    let entry = &json["broken_links"][page.as_str()][0];
    assert_eq!(entry["code"], 404);
    assert!(entry.get("error").is_none());
}

#[tokio::test]
async fn test_bounded_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page_expecting(
        &server,
        "/",
        r#"<a href="/missing-from-root">Missing</a><a href="/page2">Page 2</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/page2", r#"<a href="/">Home</a><a href="/page2/gone">Gone</a>"#).await;
    mount_page_expecting(&server, "/missing-from-root", "", 0).await;

    let report = scan(&format!("{}/page2/", base), ScanPolicy::default())
        .await
        .unwrap();

    assert_eq!(
        report.broken_links.keys().collect::<Vec<_>>(),
        vec![&format!("{}/page2", base)]
    );
    assert_eq!(
        links(&report, &format!("{}/page2", base)),
        vec![(format!("{}/page2/gone", base), 404)]
    );
}

#[tokio::test]
async fn test_at_most_once_fetch() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page_expecting(
        &server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/shared">Shared</a>"#,
        1,
    )
    .await;
    mount_page_expecting(&server, "/a", r#"<a href="/b">B</a><a href="/shared/">S</a><a href="/">Home</a>"#, 1).await;
    mount_page_expecting(&server, "/b", r#"<a href="/a">A</a><a href="/shared#x">S</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let policy = ScanPolicy {
        max_concurrent_requests: 1,
        ..Default::default()
    };
    let report = scan(&base, policy).await.unwrap();

    let shared = format!("{}/shared", base);
    for page in [base.clone(), format!("{}/a", base), format!("{}/b", base)] {
        assert_eq!(links(&report, &page), vec![(shared.clone(), 404)]);
    }
    assert_eq!(report.broken_count(), 3);
}

#[tokio::test]
async fn test_origin_containment() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;

    mount_page(
        &server,
        "/",
        &format!(r#"<a href="{}/">External</a>"#, external.uri()),
    )
    .await;
    mount_page_expecting(&external, "/", r#"<a href="/deeper">Deeper</a>"#, 1).await;
    mount_page_expecting(&external, "/deeper", "", 0).await;

    let report = scan(&server.uri(), ScanPolicy::default()).await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_ignore_status() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/forbidden">F</a><a href="/missing">M</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/forbidden"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let policy = ScanPolicy {
        ignore_statuses: [403].into_iter().collect(),
        ..Default::default()
    };
    let report = scan(&base, policy).await.unwrap();

    assert_eq!(
        links(&report, &base),
        vec![(format!("{}/missing", base), 404)]
    );
}

#[tokio::test]
async fn test_malformed_link() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="http://127.0.0.1:abc">Bad</a><a href="/missing">Missing</a>"#,
    )
    .await;

    let report = scan(&base, ScanPolicy::default()).await.unwrap();

    let entries = &report.broken_links[&base];
    assert_eq!(entries.len(), 2);
    let malformed = entries
        .iter()
        .find(|b| b.link == "http://127.0.0.1:abc")
        .unwrap();
    assert_eq!(malformed.code, STATUS_BAD_LINK);
    assert!(!malformed.error.as_deref().unwrap_or("").is_empty());
}

#[tokio::test]
async fn test_recheck_mode() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page_expecting(&server, "/", r#"<a href="/page1">1</a><a href="/page2">2</a>"#, 0).await;
    mount_page_expecting(&server, "/page1", r#"<a href="/p1-broken">x</a>"#, 0).await;
    mount_page_expecting(
        &server,
        "/page2",
        r#"<a href="/p2-broken">x</a><a href="/page2/sub">Sub</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/page2/sub", r#"<a href="/deep-broken">x</a>"#).await;
    mount_page_expecting(&server, "/deep-broken", "", 0).await;

    let mut past = NamedTempFile::new().unwrap();
    write!(
        past,
        r#"{{"broken_links": {{"{}/page2": [{{"link": "{}/old", "code": 404}}]}}}}"#,
        base, base
    )
    .unwrap();
    past.flush().unwrap();

    let options = ScanOptions {
        url: Some(base.clone()),
        past_result_file: Some(past.path().to_path_buf()),
        no_cache: true,
        ..Default::default()
    };
    let policy = options.into_policy().unwrap();
    let report = scan(&base, policy).await.unwrap();

    let page2 = format!("{}/page2", base);
    assert_eq!(report.broken_links.keys().collect::<Vec<_>>(), vec![&page2]);
    assert_eq!(
        links(&report, &page2),
        vec![(format!("{}/p2-broken", base), 404)]
    );
}

#[tokio::test]
async fn test_recheck_healthy_page_disappears() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/page2", r#"<a href="/page2/fixed">Fixed</a>"#).await;
    mount_page(&server, "/page2/fixed", "").await;

    let policy = ScanPolicy {
        mode: deadlink_scout::ScanMode::RecheckSeeds(
            [format!("{}/page2", base)].into_iter().collect(),
        ),
        ..Default::default()
    };
    let report = scan(&base, policy).await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_seed_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = scan(&format!("http://127.0.0.1:{}", port), ScanPolicy::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::SeedUnreachable { .. }));
}

#[tokio::test]
async fn test_invalid_seed() {
    let err = scan("127.0.0.1:14594", ScanPolicy::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScanError::Config(ConfigError::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn test_root_http_error_is_not_fatal() {
    let server = MockServer::start().await;

    let report = scan(&format!("{}/missing", server.uri()), ScanPolicy::default())
        .await
        .unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_image_checked_with_head() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<img src="/logo.png">"#).await;
    Mock::given(method("HEAD"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = scan(&server.uri(), ScanPolicy::default()).await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_external_responses_are_cached() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    let cache_path = cache_dir.path().join("nested").join("cache.json");

    mount_page(
        &server,
        "/",
        &format!(r#"<a href="{0}/ok">Ok</a><a href="{0}/gone">Gone</a>"#, external.uri()),
    )
    .await;
    mount_page_expecting(&external, "/ok", "", 1).await;

    let policy = ScanPolicy {
        cache_file: Some(cache_path.clone()),
        ..Default::default()
    };
    let report = scan(&server.uri(), policy.clone()).await.unwrap();
    assert_eq!(report.broken_count(), 1);

    let cache = JsonFileCache::load(&cache_path).unwrap();
    let ok = cache.get(&format!("{}/ok", external.uri())).unwrap();
    assert_eq!(ok.response_code, 200);
    let gone = cache.get(&format!("{}/gone", external.uri())).unwrap();
    assert_eq!(gone.response_code, 404);

    // The healthy link is answered from the cache on the second run.
    let report = scan(&server.uri(), policy).await.unwrap();
    assert_eq!(
        links(&report, &server.uri()),
        vec![(format!("{}/gone", external.uri()), 404)]
    );
}

#[tokio::test]
async fn test_recheck_refetches_cached_links() {
    let server = MockServer::start().await;
    let base = server.uri();
    let cache_dir = TempDir::new().unwrap();
    let cache_path = cache_dir.path().join("cache.json");

    let now_gone = format!("{}/now-gone", base);
    let stale = JsonFileCache::load(&cache_path).unwrap();
    stale.set(&now_gone, 200, 128);
    stale.flush().unwrap();

    mount_page(&server, "/page2", r#"<a href="/now-gone">Gone</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/now-gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let policy = ScanPolicy {
        mode: deadlink_scout::ScanMode::RecheckSeeds(
            [format!("{}/page2", base)].into_iter().collect(),
        ),
        cache_file: Some(cache_path.clone()),
        ..Default::default()
    };
    let report = scan(&base, policy).await.unwrap();

    assert_eq!(
        links(&report, &format!("{}/page2", base)),
        vec![(now_gone.clone(), 404)]
    );

    let cache = JsonFileCache::load(&cache_path).unwrap();
    assert_eq!(cache.get(&now_gone).unwrap().response_code, 404);
}
