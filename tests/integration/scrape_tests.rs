//! Integration tests for the scraper
//!
//! These tests use wiremock to stand in for the Explorer endpoint and run
//! category scrapes end-to-end.

use mixdb_scraper::catalog::TimeFilter;
use mixdb_scraper::config::Config;
use mixdb_scraper::crawler::{CancelFlag, Harvester, StopReason, EXPLORER_PATH};
use mixdb_scraper::extract::DiscardReason;
use mixdb_scraper::output::{
    load_report, save_report, ScrapeReport, ScrapeSession, SessionStatus,
};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server, without delays
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.scraper.base_url = base_url.to_string();
    config.scraper.request_delay_ms = 0;
    config
}

/// One listing entry with a two-track tracklist
fn mix_entry(i: usize) -> String {
    let day = i % 28 + 1;
    format!(
        r#"<div class="explorerItem">
          <a href="/w/2024-01-{day:02}_-_DJ_{i}_@_Club">2024-01-{day:02} - DJ {i} @ Club</a>
          <div class="details">1:58:12 | 320 kbps</div>
          <ol>
            <li>[0:00:00] Artist {i} - Opening Track</li>
            <li>[0:05:00] Other Artist - Second Track</li>
          </ol>
        </div>"#
    )
}

/// One listing entry without any tracklist
fn bare_entry(i: usize) -> String {
    format!(
        r#"<div class="explorerItem">
          <a href="/w/2023-06-01_-_Bare_{i}">2023-06-01 - Bare Mix {i}</a>
          <p>No tracklist yet.</p>
        </div>"#
    )
}

fn listing_page(ids: std::ops::Range<usize>, next_offset: Option<u32>) -> String {
    let entries: String = ids.map(mix_entry).collect();
    let pagination = next_offset
        .map(|offset| {
            format!(
                r#"<div class="pager"><a href="{}?do=mx&amp;offset={}">next page</a></div>"#,
                EXPLORER_PATH, offset
            )
        })
        .unwrap_or_default();
    format!(
        "<html><head><title>Explorer</title></head><body>{}{}</body></html>",
        entries, pagination
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, offset: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(EXPLORER_PATH))
        .and(query_param("offset", offset))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_short_page_without_next_control_stops() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..3, None), 1).await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Techno", Some(10), &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 3);
    assert_eq!(scrape.pages_fetched, 1);
    assert_eq!(scrape.stop_reason, StopReason::NoNextPage);

    let item = &scrape.items[0];
    assert_eq!(item.creator(), Some("DJ 0"));
    assert_eq!(item.subentries().len(), 2);
    assert_eq!(item.categories(), &["Techno".to_string()]);
    assert!(item.url().starts_with(&mock_server.uri()));
}

#[tokio::test]
async fn test_full_page_requests_next_offset() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..25, None), 1).await;
    mount_page(&mock_server, "25", listing_page(25..30, None), 1).await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 30);
    assert_eq!(scrape.pages_fetched, 2);
    assert_eq!(scrape.stop_reason, StopReason::NoNextPage);
    assert_eq!(scrape.stats.pages[1].offset, 25);
}

#[tokio::test]
async fn test_next_control_continues_short_page() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..3, Some(25)), 1).await;
    mount_page(&mock_server, "25", listing_page(3..5, None), 1).await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 5);
    assert_eq!(scrape.stop_reason, StopReason::NoNextPage);
}

#[tokio::test]
async fn test_limit_truncates_without_extra_requests() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..12, Some(25)), 1).await;
    mount_page(&mock_server, "25", listing_page(12..24, None), 0).await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Techno", Some(5), &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 5);
    assert_eq!(scrape.stop_reason, StopReason::LimitReached);
    // Statistics still describe the whole page
    assert_eq!(scrape.stats.snapshot().accepted, 12);
}

#[tokio::test]
async fn test_http_error_returns_partial_results() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..25, None), 1).await;
    Mock::given(method("GET"))
        .and(path(EXPLORER_PATH))
        .and(query_param("offset", "25"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 25);
    assert_eq!(scrape.stop_reason, StopReason::Transport("HTTP 503".to_string()));
    assert_eq!(scrape.stats.pages.len(), 1);
}

#[tokio::test]
async fn test_network_error_returns_partial_results() {
    // Nothing listens on the server's port once it is dropped
    let uri = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };

    let harvester = Harvester::new(create_test_config(&uri)).unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert!(scrape.items.is_empty());
    assert!(matches!(scrape.stop_reason, StopReason::Transport(_)));
}

#[tokio::test]
async fn test_cancelled_scrape_makes_no_requests() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..3, None), 0).await;

    let cancel = CancelFlag::new();
    cancel.cancel();
    let harvester = Harvester::new(create_test_config(&mock_server.uri()))
        .unwrap()
        .with_cancel(cancel);

    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert!(scrape.items.is_empty());
    assert_eq!(scrape.stop_reason, StopReason::Cancelled);
    assert_eq!(scrape.pages_fetched, 0);
}

#[tokio::test]
async fn test_cancel_between_pages_keeps_gathered_items() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..25, Some(25)), 1).await;
    mount_page(&mock_server, "25", listing_page(25..50, None), 0).await;

    let mut config = create_test_config(&mock_server.uri());
    config.scraper.request_delay_ms = 800;
    let harvester = Harvester::new(config).unwrap();

    let cancel = harvester.cancel_flag();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        cancel.cancel();
    });

    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 25);
    assert_eq!(scrape.pages_fetched, 1);
    assert_eq!(scrape.stop_reason, StopReason::Cancelled);
    assert_eq!(scrape.stats.pages.len(), 1);
}

#[tokio::test]
async fn test_delay_is_applied_between_pages() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..25, None), 1).await;
    mount_page(&mock_server, "25", listing_page(25..30, None), 1).await;

    let mut config = create_test_config(&mock_server.uri());
    config.scraper.request_delay_ms = 250;
    let harvester = Harvester::new(config).unwrap();

    let started = Instant::now();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.pages_fetched, 2);
    assert!(started.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn test_duplicates_are_discarded_across_pages() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..25, None), 1).await;
    mount_page(&mock_server, "25", listing_page(20..30, None), 1).await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 30);
    let mut ids: Vec<&str> = scrape.items.iter().map(|item| item.id()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 30);

    let second = &scrape.stats.pages[1];
    assert_eq!(second.found, 10);
    assert_eq!(second.accepted, 5);
    assert_eq!(second.discard_reasons[&DiscardReason::Duplicate], 5);
}

#[tokio::test]
async fn test_page_of_only_duplicates_ends_results() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..25, None), 1).await;
    mount_page(&mock_server, "25", listing_page(0..25, None), 1).await;
    mount_page(&mock_server, "50", listing_page(0..25, None), 0).await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 25);
    assert_eq!(scrape.stop_reason, StopReason::EndOfResults);
}

#[tokio::test]
async fn test_page_cap_stops_scrape() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..25, Some(25)), 1).await;
    mount_page(&mock_server, "25", listing_page(25..50, Some(50)), 1).await;
    mount_page(&mock_server, "50", listing_page(50..75, None), 0).await;

    let mut config = create_test_config(&mock_server.uri());
    config.scraper.max_pages = 2;
    let harvester = Harvester::new(config).unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 50);
    assert_eq!(scrape.stop_reason, StopReason::PageCap);
}

#[tokio::test]
async fn test_coded_category_uses_style_parameter() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXPLORER_PATH))
        .and(query_param("style", "TH"))
        .and(query_param("cat1", ""))
        .and(query_param("tlC", "1"))
        .and(query_param("tlI", "1"))
        .and(query_param("count", "25"))
        .respond_with(html(listing_page(0..2, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Electro", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.category.code.as_deref(), Some("TH"));
    assert_eq!(scrape.items[0].categories(), &["Electro".to_string()]);
}

#[tokio::test]
async fn test_uncoded_category_uses_cat1_parameter() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXPLORER_PATH))
        .and(query_param("cat1", "Dubstep"))
        .and(query_param("style", ""))
        .respond_with(html(listing_page(0..2, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Dubstep", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    assert_eq!(scrape.category.code, None);
    assert_eq!(scrape.items.len(), 2);
}

#[tokio::test]
async fn test_time_filter_sets_year() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXPLORER_PATH))
        .and(query_param("year", "2010s"))
        .respond_with(html(listing_page(0..1, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let filter: TimeFilter = "2010s".parse().unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &filter, true)
        .await
        .unwrap();

    assert_eq!(scrape.items.len(), 1);
}

#[tokio::test]
async fn test_require_subentries_toggle() {
    let body = format!(
        "<html><body>{}{}{}</body></html>",
        mix_entry(0),
        bare_entry(1),
        bare_entry(2)
    );

    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", body, 2).await;
    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();

    let strict = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();
    assert_eq!(strict.items.len(), 1);
    assert_eq!(
        strict.stats.snapshot().discard_reasons[&DiscardReason::NoSubentries],
        2
    );

    let lenient = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, false)
        .await
        .unwrap();
    assert_eq!(lenient.items.len(), 3);
}

#[tokio::test]
async fn test_statistics_are_sum_of_pages() {
    let mut second = listing_page(25..30, None);
    second = second.replace("</body>", &format!("{}</body>", bare_entry(99)));

    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..25, None), 1).await;
    mount_page(&mock_server, "25", second, 1).await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    let totals = scrape.stats.snapshot();
    assert_eq!(totals.pages as usize, scrape.stats.pages.len());
    assert_eq!(
        totals.found,
        scrape.stats.pages.iter().map(|p| p.found).sum::<u64>()
    );
    assert_eq!(totals.found, totals.accepted + totals.discarded);
    assert_eq!(totals.accepted, 30);
    assert_eq!(totals.discarded, 1);
    for page in &scrape.stats.pages {
        assert!(page.is_balanced());
    }
}

#[tokio::test]
async fn test_scrape_categories_keeps_request_order() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXPLORER_PATH))
        .and(query_param("style", "TA"))
        .respond_with(html(listing_page(0..3, None)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(EXPLORER_PATH))
        .and(query_param("style", "DH"))
        .respond_with(html(listing_page(100..102, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let names = vec!["Deep House".to_string(), "Techno".to_string()];
    let results = harvester
        .scrape_categories(&names, Some(10), &TimeFilter::Fresh, true)
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "Deep House");
    assert_eq!(results[0].1.as_ref().unwrap().items.len(), 2);
    assert_eq!(results[1].0, "Techno");
    assert_eq!(results[1].1.as_ref().unwrap().items.len(), 3);
}

#[tokio::test]
async fn test_scrape_results_survive_report_roundtrip() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "0", listing_page(0..4, None), 1).await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let scrape = harvester
        .scrape_category("Techno", None, &TimeFilter::Fresh, true)
        .await
        .unwrap();

    let mut session = ScrapeSession::start(Some("deadbeef".to_string()));
    session.record_category("Techno", scrape.items.len());
    session.finish(SessionStatus::Completed);
    let report = ScrapeReport::new("mixesdb_techno", session, scrape.items);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    save_report(&report, &path).unwrap();

    let loaded = load_report(&path).unwrap();
    assert_eq!(loaded.total_items, 4);
    assert_eq!(loaded.items, report.items);
    assert_eq!(loaded.session.config_hash.as_deref(), Some("deadbeef"));
}
