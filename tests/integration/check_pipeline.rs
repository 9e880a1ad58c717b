//! End-to-end tests of the probe → transition → alert path
//!
//! These tests verify that alerts fire on transitions only:
//! - steady up produces nothing
//! - going down produces one down alert
//! - staying down produces nothing
//! - coming back produces one recovery alert with the downtime

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use sitewatch::{
    Target,
    config::Templates,
    monitors::{HttpProbe, ProbeError},
    storage::SiteState,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_up_down_up_scenario() {
    let probe = Arc::new(ScriptedProbe::new());
    let pipeline = Pipeline::new(probe.clone());
    let target = ok_target();

    // 200: steady up
    probe.push(&target.url, Ok(200));
    pipeline.check(&target).await;

    assert!(pipeline.messages().is_empty());
    assert_eq!(
        pipeline.store.snapshot(&target.url).await,
        Some(SiteState::default())
    );

    // connection error: one down alert
    probe.push(&target.url, connection_refused());
    pipeline.check(&target).await;

    let messages = pipeline.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("DOWN ALERT"));
    assert!(messages[0].contains("OK (https://ok.test)"));
    assert!(messages[0].contains("connection failed: connection refused"));
    let time = Regex::new(r"(?m)^Time: \d{1,2}/\d{1,2}/\d{4}, \d{1,2}:\d{2}:\d{2} (AM|PM)$").unwrap();
    assert!(
        time.is_match(&messages[0]),
        "no alert time in {:?}",
        messages[0]
    );

    let state = pipeline.store.snapshot(&target.url).await.unwrap();
    assert!(state.is_down);
    assert!(state.down_since.is_some());

    // 200 again: one recovery alert
    probe.push(&target.url, Ok(200));
    pipeline.check(&target).await;

    let messages = pipeline.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[1].contains("RECOVERY ALERT"));
    assert!(messages[1].contains("Downtime: 0 minutes 0 seconds"));
    assert_eq!(
        pipeline.store.snapshot(&target.url).await,
        Some(SiteState::default())
    );
}

#[tokio::test]
async fn test_repeated_failures_alert_once() {
    let probe = Arc::new(ScriptedProbe::new());
    let pipeline = Pipeline::new(probe.clone());
    let target = ok_target();

    for _ in 0..5 {
        probe.push(&target.url, connection_refused());
        pipeline.check(&target).await;
    }

    assert_eq!(pipeline.messages().len(), 1);
}

#[tokio::test]
async fn test_repeated_successes_never_alert() {
    let probe = Arc::new(ScriptedProbe::new());
    let pipeline = Pipeline::new(probe.clone());
    let target = ok_target();

    for _ in 0..5 {
        pipeline.check(&target).await;
    }

    assert!(pipeline.messages().is_empty());
    assert_eq!(probe.call_count(&target.url), 5);
    assert_eq!(
        pipeline.store.snapshot(&target.url).await,
        Some(SiteState::default())
    );
}

#[tokio::test]
async fn test_latest_error_kept_while_down() {
    let probe = Arc::new(ScriptedProbe::new());
    let pipeline = Pipeline::new(probe.clone());
    let target = ok_target();

    probe.push(&target.url, connection_refused());
    pipeline.check(&target).await;
    probe.push(&target.url, Ok(503));
    pipeline.check(&target).await;

    let state = pipeline.store.snapshot(&target.url).await.unwrap();
    assert_eq!(
        state.last_error.as_deref(),
        Some("Request failed with status code 503")
    );
    assert_eq!(pipeline.messages().len(), 1);
}

#[tokio::test]
async fn test_non_2xx_status_is_failure() {
    let probe = Arc::new(ScriptedProbe::new());
    let pipeline = Pipeline::new(probe.clone());
    let target = ok_target();

    for status in [301, 404, 500] {
        probe.push(&target.url, Ok(status));
        pipeline.check(&target).await;
        probe.push(&target.url, Ok(204));
        pipeline.check(&target).await;
    }

    let messages = pipeline.messages();
    assert_eq!(messages.len(), 6);
    assert!(messages[0].contains("Request failed with status code 301"));
    assert!(messages[2].contains("Request failed with status code 404"));
    assert!(messages[4].contains("Request failed with status code 500"));
}

#[tokio::test]
async fn test_custom_templates_are_used() {
    let probe = Arc::new(ScriptedProbe::new());
    let templates = Templates {
        down: Some("{{name}} is down: {{error}}".to_string()),
        up: Some("{{name}} is up after {{downtime}} ({{url}})".to_string()),
    };
    let pipeline =
        Pipeline::with_options(probe.clone(), templates, 5, Duration::from_secs(10));
    let target = Target::new("https://api.test", "Api");

    probe.push(&target.url, Err(ProbeError::Timeout(Duration::from_millis(10_000))));
    pipeline.check(&target).await;
    pipeline.check(&target).await;

    assert_eq!(
        pipeline.messages(),
        vec![
            "Api is down: timeout of 10000ms exceeded".to_string(),
            "Api is up after 0 minutes 0 seconds (https://api.test)".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_targets_have_independent_state() {
    let probe = Arc::new(ScriptedProbe::new());
    let pipeline = Pipeline::new(probe.clone());
    let a = Target::new("https://a.test", "A");
    let b = Target::new("https://b.test", "B");

    probe.push(&a.url, connection_refused());
    pipeline.check(&a).await;
    pipeline.check(&b).await;

    assert!(pipeline.store.snapshot(&a.url).await.unwrap().is_down);
    assert!(!pipeline.store.snapshot(&b.url).await.unwrap().is_down);
    assert_eq!(pipeline.messages().len(), 1);
}

#[tokio::test]
async fn test_http_probe_against_mock_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let pipeline = Pipeline::new(Arc::new(HttpProbe::new(reqwest::Client::new())));
    let target = Target::new(format!("{}/health", mock_server.uri()), "Mock");

    pipeline.check(&target).await;
    assert!(pipeline.messages().is_empty());

    mock_server.reset().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    pipeline.check(&target).await;
    pipeline.check(&target).await;

    let messages = pipeline.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Request failed with status code 503"));

    mock_server.reset().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    pipeline.check(&target).await;

    let messages = pipeline.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[1].contains("RECOVERY ALERT"));
}
