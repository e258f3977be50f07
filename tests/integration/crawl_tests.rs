//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small fake catalog and run the full
//! crawl cycle end-to-end, checking the files left on disk.

use catalog_harvest::config::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use catalog_harvest::crawler::{run_crawl, CrawlOptions};
use catalog_harvest::extract::ExtractionRules;
use catalog_harvest::storage::{Dataset, PersistedStore, Record, ResumeStore};
use catalog_harvest::{ScrapeError, StopReason};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock catalog
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            start_url: format!("{}/tracks/", base_url),
        },
        crawler: CrawlerConfig {
            max_attempts: 2,
            retry_delay: 0,
            request_timeout: 5,
            detail_delay: 0, // No politeness needed against a mock
            page_delay: 0,
            queue_capacity: 2,
        },
        user_agent: UserAgentConfig {
            value: "TestHarvester/1.0".to_string(),
        },
        output: OutputConfig {
            dataset_path: dir.join("tracks.json").display().to_string(),
            resume_path: dir.join("processed.json").display().to_string(),
        },
        rules: None,
    }
}

/// A catalog list page in the reference markup
fn list_page(items: &[(&str, &str)], next: Option<&str>) -> String {
    let mut html = String::from("<html><body><div class=\"products\">");
    for (name, href) in items {
        html.push_str(&format!(
            r#"<div class="product-grid"><h4 class="product-title"><a href="{}">{}</a></h4></div>"#,
            href, name
        ));
    }
    html.push_str("</div>");
    if let Some(next) = next {
        html.push_str(&format!(
            r#"<nav><a class="next page-numbers" href="{}">Next &rarr;</a></nav>"#,
            next
        ));
    }
    html.push_str("</body></html>");
    html
}

/// A catalog detail page in the reference markup
fn detail_page(name: &str, author: &str, released: &str, price: Option<&str>) -> String {
    let price_box = price
        .map(|p| format!(r#"<div class="product-purchase-box"><span class="edd_price">{}</span></div>"#, p))
        .unwrap_or_default();

    format!(
        r#"<html><body>
        <h1 class="single-post-title">{name}</h1>
        <div class="single--post--content">by <a href="/creator/{author}/">{author}</a></div>
        {price_box}
        <ul class="release-info">
            <li class="release-info-block">
                <span class="rel-info-tag">Released</span>
                <div class="rel-info-value"><p>{released}</p></div>
            </li>
            <li class="release-info-block">
                <span class="rel-info-tag">Version</span>
                <div class="rel-info-value"><p>1.0</p></div>
            </li>
        </ul>
        <table>
            <tr id="mod_difficulty"><td class="fes-display-field-values">Hard</td></tr>
        </table>
        </body></html>"#
    )
}

async fn mount_page(server: &MockServer, p: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts a two-page catalog with three items and returns their URLs
async fn mount_catalog(server: &MockServer) -> [String; 3] {
    mount_page(
        server,
        "/tracks/",
        list_page(
            &[("Alpha Ridge", "/downloads/alpha/"), ("Bravo Sands", "/downloads/bravo/")],
            Some("/tracks/page/2/"),
        ),
    )
    .await;
    mount_page(
        server,
        "/tracks/page/2/",
        list_page(&[("Charlie Park", "/downloads/charlie/")], None),
    )
    .await;

    mount_page(server, "/downloads/alpha/", detail_page("Alpha Ridge", "ana", "March 5, 2024", None)).await;
    mount_page(server, "/downloads/bravo/", detail_page("Bravo Sands", "ben", "January 2, 2023", Some("$4.99"))).await;
    mount_page(server, "/downloads/charlie/", detail_page("Charlie Park", "ana", "June 1, 2024", Some("Free"))).await;

    let base = server.uri();
    [
        format!("{}/downloads/alpha/", base),
        format!("{}/downloads/bravo/", base),
        format!("{}/downloads/charlie/", base),
    ]
}

fn read_dataset(config: &Config) -> Vec<Record> {
    let content = std::fs::read_to_string(&config.output.dataset_path).expect("dataset written");
    serde_json::from_str(&content).expect("dataset is a JSON array of records")
}

fn read_resume(config: &Config) -> Vec<String> {
    let content = std::fs::read_to_string(&config.output.resume_path).expect("resume file written");
    serde_json::from_str(&content).expect("resume file is a JSON array of URLs")
}

#[tokio::test]
async fn test_full_crawl_writes_sorted_dataset() {
    let mock_server = MockServer::start().await;
    let [alpha, bravo, charlie] = mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let report = run_crawl(config.clone(), CrawlOptions::default())
        .await
        .expect("crawl should succeed");

    assert_eq!(report.stop_reason, StopReason::NoNextPage);
    assert_eq!(report.progress.pages_visited, 2);
    assert_eq!(report.progress.records_sent, 3);
    assert_eq!(report.collected.inserted, 3);
    assert_eq!(report.dataset_before, 0);
    assert_eq!(report.dataset_after, 3);

    // Newest release first
    let records = read_dataset(&config);
    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec![charlie.as_str(), alpha.as_str(), bravo.as_str()]);

    let charlie_record = &records[0];
    assert_eq!(charlie_record.name, "Charlie Park");
    assert_eq!(charlie_record.author_name, "ana");
    assert_eq!(
        charlie_record.author_url,
        format!("{}/creator/ana/", mock_server.uri())
    );
    assert_eq!(charlie_record.price, "Free");
    assert_eq!(charlie_record.released_date, "June 1, 2024");
    assert_eq!(charlie_record.version, "1.0");
    assert_eq!(charlie_record.difficulty.as_deref(), Some("Hard"));
    assert!(charlie_record.scraped_at().is_some());

    // No price anywhere on the page
    assert_eq!(records[1].price, "");

    let mut expected = vec![alpha, bravo, charlie];
    expected.sort();
    assert_eq!(read_resume(&config), expected);
}

#[tokio::test]
async fn test_dataset_uses_catalog_json_keys() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    run_crawl(config.clone(), CrawlOptions::default()).await.unwrap();

    let content = std::fs::read_to_string(&config.output.dataset_path).unwrap();
    let json: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
    let first = &json[0];
    assert_eq!(first["track_name"], "Charlie Park");
    assert!(first.get("track_url").is_some());
    assert!(first.get("scraped_timestamp").is_some());
    assert!(first.get("ingame_mod_name").is_none());
}

#[tokio::test]
async fn test_second_run_fetches_nothing_new() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_page(
        &mock_server,
        "/tracks/",
        list_page(&[("Alpha Ridge", "/downloads/alpha/")], Some("/tracks/page/2/")),
    )
    .await;
    mount_page(&mock_server, "/tracks/page/2/", list_page(&[], None)).await;

    // Only the first run may fetch the detail page
    Mock::given(method("GET"))
        .and(path("/downloads/alpha/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(
            "Alpha Ridge",
            "ana",
            "March 5, 2024",
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let first = run_crawl(config.clone(), CrawlOptions::default()).await.unwrap();
    assert_eq!(first.stop_reason, StopReason::EmptyListing);
    assert_eq!(first.progress.records_sent, 1);
    let resume_after_first = read_resume(&config);

    let second = run_crawl(config.clone(), CrawlOptions::default()).await.unwrap();
    assert_eq!(second.stop_reason, StopReason::FirstEntryKnown);
    assert_eq!(second.progress.records_sent, 0);
    assert_eq!(second.dataset_before, 1);
    assert_eq!(second.dataset_after, 1);
    assert_eq!(read_resume(&config), resume_after_first);
    assert_eq!(read_dataset(&config).len(), 1);
}

#[tokio::test]
async fn test_early_stop_skips_remaining_pages() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let known = format!("{}/downloads/alpha/", mock_server.uri());
    let resume: ResumeStore = [known.as_str()].into_iter().collect();
    resume.save(Path::new(&config.output.resume_path)).unwrap();

    mount_page(
        &mock_server,
        "/tracks/",
        list_page(
            &[("Alpha Ridge", "/downloads/alpha/"), ("Bravo Sands", "/downloads/bravo/")],
            Some("/tracks/page/2/"),
        ),
    )
    .await;
    for p in ["/downloads/alpha/", "/downloads/bravo/", "/tracks/page/2/"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let report = run_crawl(config.clone(), CrawlOptions::default()).await.unwrap();
    assert_eq!(report.stop_reason, StopReason::FirstEntryKnown);
    assert_eq!(report.progress.entries_seen, 1);

    // Stores are still written, even when nothing changed
    assert!(read_dataset(&config).is_empty());
    assert_eq!(read_resume(&config), vec![known]);
}

#[tokio::test]
async fn test_fresh_run_rescrapes_known_items() {
    let mock_server = MockServer::start().await;
    let [alpha, bravo, charlie] = mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let elsewhere = "https://elsewhere.example/downloads/old/".to_string();
    let resume: ResumeStore = [alpha.as_str(), elsewhere.as_str()].into_iter().collect();
    resume.save(Path::new(&config.output.resume_path)).unwrap();

    let mut stale = Record::new(alpha.clone());
    stale.name = "Alpha (old)".to_string();
    let dataset: Dataset = vec![stale].into_iter().collect();
    dataset.save(Path::new(&config.output.dataset_path)).unwrap();

    let report = run_crawl(config.clone(), CrawlOptions { fresh: true })
        .await
        .unwrap();
    assert_eq!(report.progress.records_sent, 3);
    assert_eq!(report.collected.replaced, 1);
    assert_eq!(report.collected.inserted, 2);

    let records = read_dataset(&config);
    let alpha_record = records.iter().find(|r| r.url == alpha).unwrap();
    assert_eq!(alpha_record.name, "Alpha Ridge");

    // The resume set never shrinks
    let mut expected = vec![alpha, bravo, charlie, elsewhere];
    expected.sort();
    assert_eq!(read_resume(&config), expected);
}

#[tokio::test]
async fn test_failed_list_page_recovers_via_next_link() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/tracks/"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string(list_page(&[], Some("/tracks/page/2/"))),
        )
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/tracks/page/2/",
        list_page(&[("Charlie Park", "/downloads/charlie/")], None),
    )
    .await;
    mount_page(
        &mock_server,
        "/downloads/charlie/",
        detail_page("Charlie Park", "ana", "June 1, 2024", None),
    )
    .await;

    let report = run_crawl(config.clone(), CrawlOptions::default()).await.unwrap();
    assert_eq!(report.progress.pages_failed, 1);
    assert_eq!(report.progress.pages_visited, 1);
    assert_eq!(report.progress.records_sent, 1);
    assert!(report.stop_reason.is_complete());
    assert_eq!(read_dataset(&config)[0].name, "Charlie Park");
}

#[tokio::test]
async fn test_unreachable_start_page_stops_cleanly() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/tracks/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let report = run_crawl(config.clone(), CrawlOptions::default()).await.unwrap();
    assert_eq!(report.stop_reason, StopReason::ListPageFailed);
    assert!(!report.stop_reason.is_complete());
    assert!(read_dataset(&config).is_empty());
}

#[tokio::test]
async fn test_unnamed_and_unreachable_items_are_skipped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_page(
        &mock_server,
        "/tracks/",
        list_page(
            &[
                ("", "/downloads/nameless-link/"),
                ("Untitled", "/downloads/untitled/"),
                ("Gone", "/downloads/gone/"),
                ("Alpha Ridge", "/downloads/alpha/"),
            ],
            None,
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/downloads/untitled/",
        "<html><body><p>Coming soon</p></body></html>".to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/downloads/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/downloads/alpha/",
        detail_page("Alpha Ridge", "ana", "March 5, 2024", None),
    )
    .await;

    let report = run_crawl(config.clone(), CrawlOptions::default()).await.unwrap();
    assert_eq!(report.progress.entries_seen, 4);
    assert_eq!(report.progress.unnamed_records, 1);
    assert_eq!(report.progress.detail_failures, 1);
    assert_eq!(report.progress.records_sent, 1);

    // Skipped items stay eligible for the next run
    assert_eq!(
        read_resume(&config),
        vec![format!("{}/downloads/alpha/", mock_server.uri())]
    );
}

#[tokio::test]
async fn test_corrupt_resume_file_is_tolerated() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    std::fs::write(&config.output.resume_path, "{ not json").unwrap();

    let report = run_crawl(config.clone(), CrawlOptions::default()).await.unwrap();
    assert_eq!(report.progress.records_sent, 3);
    assert_eq!(read_resume(&config).len(), 3);
}

#[tokio::test]
async fn test_corrupt_dataset_aborts_before_crawling() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    std::fs::write(&config.output.dataset_path, "[{\"track_name\": ").unwrap();

    let result = run_crawl(config.clone(), CrawlOptions::default()).await;
    assert!(matches!(result, Err(ScrapeError::Storage(_))));

    // The broken file is left for the user to inspect
    assert_eq!(
        std::fs::read_to_string(&config.output.dataset_path).unwrap(),
        "[{\"track_name\": "
    );
    assert!(!Path::new(&config.output.resume_path).exists());
}

#[tokio::test]
async fn test_rules_from_config_replace_builtin() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());

    config.rules = Some(
        ExtractionRules::from_toml(
            r#"
            [listing]
            item = "li.mod"
            link = "a.title"
            next-page = "a[rel=next]"

            [fields.name]
            probes = [{ kind = "text", selector = "h2.name" }]

            [fields.price]
            probes = [
                { kind = "text", selector = ".cost" },
                { kind = "marker", selector = ".badge", marker = "Free" },
            ]
            "#,
        )
        .unwrap(),
    );

    mount_page(
        &mock_server,
        "/tracks/",
        r#"<ul><li class="mod"><a class="title" href="/m/1">Mod One</a></li></ul>"#.to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/m/1",
        r#"<h2 class="name">Mod One</h2><span class="badge"> Free </span>"#.to_string(),
    )
    .await;

    let report = run_crawl(config.clone(), CrawlOptions::default()).await.unwrap();
    assert_eq!(report.stop_reason, StopReason::NoNextPage);

    let records = read_dataset(&config);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Mod One");
    assert_eq!(records[0].price, "Free");
    assert_eq!(records[0].author_name, "");
}
