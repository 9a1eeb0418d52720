//! End-to-end crosscheck runs against a mock SearX instance and mock pages.

use std::sync::Arc;
use std::time::Duration;

use crosscheck::crosscheck_search::{
    BrowserSession, ContentSource, SearchConfig, SearchEngine, SearchOrchestrator,
};
use crosscheck::{BestSource, Crosscheck, CrosscheckConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<html><head><title>EBITDA</title></head><body>
<article><p>EBITDA, or earnings before interest, taxes, depreciation and amortization,
is a measure of a company's overall financial performance and is used as an
alternative to net income in some circumstances.</p></article></body></html>"#;

fn searx_body(base: &str) -> String {
    serde_json::json!({
        "results": [
            {
                "url": format!("{base}/terms/ebitda"),
                "title": "EBITDA: Meaning, Formula, and History",
                "content": "EBITDA is earnings before interest, taxes, depreciation, and amortization.",
                "publishedDate": "2024-01-15T00:00:00"
            },
            {
                "url": format!("{base}/wiki/ebitda"),
                "title": "EBITDA - Wikipedia",
                "content": "A measure of a company's operating profitability."
            },
            {
                "url": format!("{base}/blog/weather"),
                "title": "Weekend weather",
                "content": "Sunny with light winds."
            }
        ]
    })
    .to_string()
}

async fn mock_web() -> MockServer {
    let server = MockServer::start().await;
    let body = searx_body(&server.uri());
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    for page in ["/terms/ebitda", "/wiki/ebitda"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/blog/weather"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

fn crosscheck_for(server: &MockServer, config: CrosscheckConfig) -> Crosscheck {
    let search = SearchConfig {
        engines: vec![SearchEngine::SearX],
        searx_instances: vec![server.uri()],
        ..SearchConfig::default()
    }
    .without_delays();
    let orchestrator =
        SearchOrchestrator::with_browser(search, Arc::new(BrowserSession::disabled("tests")))
            .expect("valid search config");
    Crosscheck::with_orchestrator(config, orchestrator).expect("valid scoring config")
}

#[tokio::test]
async fn hedged_answer_loses_to_web_evidence() {
    let server = mock_web().await;
    let crosscheck = crosscheck_for(&server, CrosscheckConfig::default());

    let report = crosscheck
        .answer("What is EBITDA?", "I don't know, perhaps a tax?", Some(0.2))
        .await;

    assert_eq!(report.outcome.best_source, BestSource::Web);
    assert!(report.outcome.web_score > report.outcome.rag_score);
    assert!(
        report
            .outcome
            .selected_answer
            .starts_with("Source 1: EBITDA: Meaning, Formula, and History\n")
    );
    assert!(report.outcome.selected_answer.contains("Source 3: Weekend weather"));
    assert_eq!(report.web.details.len(), 3);
    assert!(!report.flags.no_web_results);
    assert_ne!(report.web.best.as_ref().map(|b| b.index), Some(2));
}

#[tokio::test]
async fn confident_answer_is_kept() {
    let server = mock_web().await;
    let crosscheck = crosscheck_for(&server, CrosscheckConfig::default());

    let answer = "EBITDA stands for earnings before interest, taxes, depreciation and \
                  amortization. It is a measure of operating profitability that strips out \
                  financing and accounting decisions, which makes companies with different \
                  capital structures easier to compare. Analysts compute EBITDA by adding \
                  interest, taxes, depreciation and amortization back to net income, and \
                  often use it in valuation multiples such as enterprise value to EBITDA. \
                  Because it ignores capital expenditure, EBITDA can overstate the cash a \
                  business really generates.";
    let report = crosscheck.answer("What is EBITDA?", answer, Some(0.95)).await;

    assert_eq!(report.outcome.best_source, BestSource::Rag);
    assert_eq!(report.outcome.selected_answer, answer);
    assert_eq!(report.rag.component("completeness"), Some(1.0));
}

#[tokio::test]
async fn digest_size_follows_config() {
    let server = mock_web().await;
    let mut config = CrosscheckConfig::default();
    config.scoring.digest_sources = 1;
    let crosscheck = crosscheck_for(&server, config);

    let report = crosscheck.answer("What is EBITDA?", "", Some(0.0)).await;
    assert_eq!(report.outcome.best_source, BestSource::Web);
    assert!(!report.outcome.selected_answer.contains("Source 2"));
}

#[tokio::test]
async fn slow_web_side_times_out_to_rag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(searx_body(&server.uri()))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let mut config = CrosscheckConfig::default();
    config.scoring.request_deadline_secs = 1;
    let crosscheck = crosscheck_for(&server, config);

    let report = crosscheck.answer("What is EBITDA?", "Earnings before interest.", None).await;
    assert_eq!(report.outcome.best_source, BestSource::Rag);
    assert!(report.flags.no_web_results);
    assert_eq!(report.recommendation, "Using RAG response as no web results available");
}

#[tokio::test]
async fn slow_page_keeps_found_results_as_snippets() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "results": [
            {
                "url": format!("{}/fast", server.uri()),
                "title": "EBITDA: Meaning, Formula, and History",
                "content": "EBITDA is earnings before interest, taxes, depreciation, and amortization."
            },
            {
                "url": format!("{}/slow", server.uri()),
                "title": "EBITDA - Wikipedia",
                "content": "A measure of a company's operating profitability."
            }
        ]
    })
    .to_string();
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ARTICLE)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = CrosscheckConfig::default();
    config.scoring.request_deadline_secs = 2;
    let crosscheck = crosscheck_for(&server, config);

    let started = std::time::Instant::now();
    let evidence = crosscheck.gather("What is EBITDA?").await;
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(evidence.len(), 2);
    assert_eq!(evidence[0].content_source, ContentSource::Page);
    assert_eq!(evidence[1].content_source, ContentSource::Snippet);
    assert_eq!(evidence[1].content, "A measure of a company's operating profitability.");

    let report = crosscheck.answer("What is EBITDA?", "I don't know.", Some(0.2)).await;
    assert!(!report.flags.no_web_results);
    assert_eq!(report.web.details.len(), 2);
    assert_eq!(report.outcome.best_source, BestSource::Web);
}

#[tokio::test]
#[ignore] // Requires network access and live engines
async fn live_crosscheck() {
    let crosscheck = Crosscheck::new(CrosscheckConfig::default()).expect("config");
    let report = crosscheck
        .answer("What is EBITDA?", "EBITDA is a measure of operating profit.", None)
        .await;
    crosscheck.shutdown().await;
    assert!((0.0..=1.0).contains(&report.outcome.web_score));
}
