//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full harvest cycle end-to-end against an on-disk SQLite store.

use lecture_harvester::config::Config;
use lecture_harvester::crawler::{crawl, Fetcher, HttpFetcher, PageEnumerator};
use lecture_harvester::storage::{IdentityKey, RecordStore, RunStatus, SqliteStorage};
use lecture_harvester::HarvestError;
use std::path::Path;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LECTURE_PAGE: &str = include_str!("../fixtures/lecture_page.html");
const LECTURE_KEY: (&str, &str, &str) = ("Alain Wijffels", "29 juin 2017", "17:00");

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, db_path: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.root_url = format!("{}/search?type=audio", server.uri());
    config.crawler.site_base = server.uri();
    config.user_agent.agent = "TestHarvester/1.0".to_string();
    config.output.project_id = "test".to_string();
    config.output.database_path = db_path.display().to_string();
    config
}

fn listing(paths: &[&str]) -> String {
    let links: String = paths
        .iter()
        .map(|p| format!(r#"<li><a href="{}">lecture</a></li>"#, p))
        .collect();
    format!(
        r#"<html><body><a href="/components/help.jsp">help</a><ul>{}</ul></body></html>"#,
        links
    )
}

fn lecture_key() -> IdentityKey {
    IdentityKey::new(LECTURE_KEY.0, LECTURE_KEY.1, LECTURE_KEY.2)
}

async fn mount_robots(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, index: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "audio"))
        .and(query_param("index", index))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

/// Two target pages, one lecture and one without audio, then an empty page
async fn mount_site(server: &MockServer, expected_hits: u64) {
    mount_listing(
        server,
        "0",
        listing(&["/site/alain-wijffels/closing-lecture.htm", "/site/news.htm"]),
    )
    .await;
    mount_listing(server, "2", listing(&[])).await;
    mount_page(
        server,
        "/site/alain-wijffels/closing-lecture.htm",
        LECTURE_PAGE,
        expected_hits,
    )
    .await;
    mount_page(server, "/site/news.htm", "<p>No recording</p>", expected_hits).await;
}

#[tokio::test]
async fn test_full_harvest_into_sqlite() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 200, "User-agent: *\nAllow: /").await;
    mount_site(&mock_server, 1).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lectures.db");
    let config = create_test_config(&mock_server, &db_path);

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let outcomes = crawl(&config, &mut storage).await.unwrap();

    assert_eq!(outcomes.saved, 1);
    assert_eq!(outcomes.no_audio, 1);
    assert_eq!(outcomes.total(), 2);

    let record = storage.get(&lecture_key()).unwrap().unwrap();
    assert_eq!(
        record.source,
        format!("{}/site/alain-wijffels/closing-lecture.htm", mock_server.uri())
    );
    assert_eq!(record.lecturer, "Alain Wijffels");
    assert_eq!(record.duration_sec, 3600);
    assert_eq!(record.language, "fr");
    assert_eq!(record.chair.as_deref(), Some("Chaire Européenne (2016-2017)"));
    assert!(!record.converted);
    assert_eq!(storage.count_records().unwrap(), 1);
}

#[tokio::test]
async fn test_second_run_skips_present_records() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 200, "").await;
    mount_site(&mock_server, 2).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lectures.db");
    let config = create_test_config(&mock_server, &db_path);
    let mut storage = SqliteStorage::new(&db_path).unwrap();

    let first = crawl(&config, &mut storage).await.unwrap();
    assert_eq!(first.saved, 1);

    let second = crawl(&config, &mut storage).await.unwrap();
    assert_eq!(second.saved, 0);
    assert_eq!(second.already_present, 1);
    assert_eq!(second.no_audio, 1);
    assert_eq!(storage.count_records().unwrap(), 1);
}

#[tokio::test]
async fn test_stop_when_present_ends_the_run() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 404, "").await;
    mount_listing(
        &mock_server,
        "0",
        listing(&["/site/alain-wijffels/closing-lecture.htm", "/site/news.htm"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/site/alain-wijffels/closing-lecture.htm",
        LECTURE_PAGE,
        1,
    )
    .await;
    // Never reached: the run stops on the first, already stored, lecture
    mount_page(&mock_server, "/site/news.htm", "<p>No recording</p>", 0).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lectures.db");
    let mut config = create_test_config(&mock_server, &db_path);
    config.crawler.stop_when_present = true;

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let existing = lecture_harvester::RecordBuilder::from_config(&config.extraction)
        .unwrap()
        .build(LECTURE_PAGE, "http://archive.example.org/old-url")
        .unwrap();
    storage.put(&existing).unwrap();

    let outcomes = crawl(&config, &mut storage).await.unwrap();

    assert_eq!(outcomes.already_present, 1);
    assert_eq!(outcomes.total(), 1);
    let stored = storage.get(&lecture_key()).unwrap().unwrap();
    assert_eq!(stored.source, "http://archive.example.org/old-url");
}

#[tokio::test]
async fn test_overwrite_respects_converted_flag() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 200, "User-agent: *\nAllow: /").await;
    mount_site(&mock_server, 2).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lectures.db");
    let mut config = create_test_config(&mock_server, &db_path);
    let mut storage = SqliteStorage::new(&db_path).unwrap();

    let existing = lecture_harvester::RecordBuilder::from_config(&config.extraction)
        .unwrap()
        .build(LECTURE_PAGE, "http://archive.example.org/old-url")
        .unwrap();
    storage.put(&existing).unwrap();
    assert!(storage.mark_converted(&lecture_key()).unwrap());

    config.crawler.overwrite = true;
    config.crawler.stop_when_present = true;
    let outcomes = crawl(&config, &mut storage).await.unwrap();
    assert_eq!(outcomes.already_present, 1);
    assert_eq!(outcomes.no_audio, 1);
    let stored = storage.get(&lecture_key()).unwrap().unwrap();
    assert_eq!(stored.source, "http://archive.example.org/old-url");
    assert!(stored.converted);

    // Once reopened for conversion, the record can be overwritten
    let mut reopened = stored.clone();
    reopened.converted = false;
    storage.put(&reopened).unwrap();

    let outcomes = crawl(&config, &mut storage).await.unwrap();
    assert_eq!(outcomes.overwritten, 1);
    let stored = storage.get(&lecture_key()).unwrap().unwrap();
    assert!(stored.source.starts_with(&mock_server.uri()));
}

#[tokio::test]
async fn test_robots_disallow_skips_target_pages() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 200, "User-agent: *\nDisallow: /site/").await;
    mount_site(&mock_server, 0).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lectures.db");
    let config = create_test_config(&mock_server, &db_path);
    let mut storage = SqliteStorage::new(&db_path).unwrap();

    let outcomes = crawl(&config, &mut storage).await.unwrap();

    assert_eq!(outcomes.disallowed, 2);
    assert_eq!(outcomes.total(), 2);
    assert_eq!(storage.count_records().unwrap(), 0);
}

#[tokio::test]
async fn test_robots_forbidden_denies_everything() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 403, "").await;
    mount_site(&mock_server, 0).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lectures.db");
    let config = create_test_config(&mock_server, &db_path);
    let mut storage = SqliteStorage::new(&db_path).unwrap();

    let outcomes = crawl(&config, &mut storage).await.unwrap();
    assert_eq!(outcomes.disallowed, 2);
}

#[tokio::test]
async fn test_robots_server_error_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 503, "").await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lectures.db");
    let config = create_test_config(&mock_server, &db_path);
    let mut storage = SqliteStorage::new(&db_path).unwrap();

    let result = crawl(&config, &mut storage).await;
    assert!(matches!(
        result,
        Err(HarvestError::HttpStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 200, "").await;
    mount_site(&mock_server, 1).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lectures.db");
    let mut config = create_test_config(&mock_server, &db_path);
    config.crawler.dry_run = true;
    let mut storage = SqliteStorage::new(&db_path).unwrap();

    let outcomes = crawl(&config, &mut storage).await.unwrap();

    assert_eq!(outcomes.saved, 1);
    assert_eq!(storage.count_records().unwrap(), 0);
}

#[tokio::test]
async fn test_enumerator_paginates_over_http() {
    let mock_server = MockServer::start().await;
    mount_listing(
        &mock_server,
        "0",
        listing(&["/site/url1", "/not/a/good/url", "/site/url2"]),
    )
    .await;
    mount_listing(&mock_server, "2", listing(&["/site/url3"])).await;
    mount_listing(&mock_server, "3", listing(&[])).await;

    let config = create_test_config(&mock_server, Path::new("unused.db"));
    let fetcher = HttpFetcher::new(&config.user_agent).unwrap();
    let mut enumerator = PageEnumerator::new(
        Url::parse(&config.crawler.root_url).unwrap(),
        Url::parse(&config.crawler.site_base).unwrap(),
        "/site/",
    );

    let mut urls = Vec::new();
    while let Some(url) = enumerator.next_url(&fetcher).await.unwrap() {
        urls.push(url.path().to_string());
    }

    assert_eq!(urls, vec!["/site/url1", "/site/url2", "/site/url3"]);
    assert_eq!(enumerator.discovered(), 3);
}

#[tokio::test]
async fn test_http_fetcher_maps_status_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, Path::new("unused.db"));
    let fetcher = HttpFetcher::new(&config.user_agent).unwrap();

    let ok = fetcher
        .fetch(&format!("{}/ok", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(ok, "body");

    let missing = fetcher
        .fetch(&format!("{}/missing", mock_server.uri()))
        .await;
    assert!(matches!(
        missing,
        Err(HarvestError::HttpStatus { status: 404, .. })
    ));
}

#[test]
fn test_run_bookkeeping_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lectures.db");

    let run_id = {
        let mut storage = SqliteStorage::new(&db_path).unwrap();
        let run_id = storage.create_run("test", Some("abc123")).unwrap();
        let outcomes = [
            lecture_harvester::Outcome::Saved,
            lecture_harvester::Outcome::NoAudio,
        ]
        .into_iter()
        .collect();
        storage
            .finish_run(run_id, RunStatus::Completed, &outcomes)
            .unwrap();
        run_id
    };

    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.id, run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash.as_deref(), Some("abc123"));
    assert_eq!(run.outcomes.saved, 1);
    assert_eq!(run.outcomes.no_audio, 1);
}
