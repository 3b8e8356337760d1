//! End-to-end runs against a local HTTP server serving sheet CSV.
#![cfg(feature = "network")]

use std::sync::mpsc;
use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wordpick::engine::summary::{render_word_list, summarize};
use wordpick::event::{AppEvent, SessionSender};
use wordpick::session::practice::{
    Phase, PracticeSession, RunConfig, SessionEvent, Severity,
};

const SHEET: &str = "\
Word,Category,Practiced
cat,Animals,3
,X,1
dog,Animals,
river,Nature,abc
stone,,2.0
";

async fn serve(body: &str, status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sheet.csv"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

/// Run one session to completion on a blocking thread, returning every event.
async fn run_once(config: RunConfig) -> Vec<SessionEvent> {
    tokio::task::spawn_blocking(move || {
        let mut session = PracticeSession::new().seeded(17);
        let (tx, rx) = mpsc::channel();
        assert!(session.start(config, tx));

        let mut events = Vec::new();
        loop {
            let event = rx
                .recv_timeout(Duration::from_secs(10))
                .expect("no terminal event");
            session.deliver(&event);
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                session.settle();
                assert!(session.is_idle());
                return events;
            }
        }
    })
    .await
    .unwrap()
}

fn terminal_count(events: &[SessionEvent]) -> usize {
    events.iter().filter(|e| e.is_terminal()).count()
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_parses_and_selects_from_server() {
    let server = serve(SHEET, 200).await;
    let url = format!("{}/sheet.csv", server.uri());

    let events = run_once(RunConfig::new(3, &url)).await;
    assert_eq!(terminal_count(&events), 1);

    let Some(SessionEvent::Result(result)) = events.last() else {
        panic!("expected a result, got {:?}", events.last());
    };
    assert_eq!(result.dataset.len(), 4);
    assert_eq!(result.selection.len(), 3);

    // dog and river both normalize to 0 and lead; stone (2) follows
    let first_two: Vec<&str> = {
        let mut words: Vec<&str> = result.selection[..2]
            .iter()
            .map(|r| r.word.as_str())
            .collect();
        words.sort();
        words
    };
    assert_eq!(first_two, vec!["dog", "river"]);
    assert_eq!(result.selection[2].word, "stone");

    let loaded = events.iter().any(|e| {
        *e == SessionEvent::status(Phase::Fetching, "Loaded 4 words", Severity::Success)
    });
    assert!(loaded);
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_yields_single_error_event() {
    let server = serve("oops", 500).await;
    let url = format!("{}/sheet.csv", server.uri());

    let events = run_once(RunConfig::new(3, &url)).await;
    assert_eq!(terminal_count(&events), 1);
    match events.last() {
        Some(SessionEvent::Error(message)) => {
            assert!(message.starts_with("Failed to read data from Google Sheet"));
            assert!(message.contains("500"));
        }
        other => panic!("expected an error, got {other:?}"),
    }
    assert!(!events.iter().any(|e| matches!(e, SessionEvent::Result(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_sheet_is_an_empty_result() {
    let server = serve("Word,Category,Practiced\n", 200).await;
    let url = format!("{}/sheet.csv", server.uri());

    let events = run_once(RunConfig::new(5, &url)).await;
    let Some(SessionEvent::Result(result)) = events.last() else {
        panic!("expected a result");
    };
    assert!(result.dataset.is_empty());
    assert!(result.selection.is_empty());

    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(render_word_list(&result.selection, date), "No words selected");
    assert_eq!(summarize(&result.dataset, &result.selection, date).total_words, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn placeholder_url_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHEET))
        .expect(0)
        .mount(&server)
        .await;
    let url = format!("{}/YOUR_SHEET_ID/sheet.csv", server.uri());

    let events = run_once(RunConfig::new(5, &url)).await;
    assert_eq!(terminal_count(&events), 1);
    assert_eq!(
        events.last(),
        Some(&SessionEvent::Error(
            "Please enter a valid Google Sheet URL".to_string()
        ))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn events_reach_the_interface_queue_in_phase_order() {
    let server = serve(SHEET, 200).await;
    let url = format!("{}/sheet.csv", server.uri());

    let phases = tokio::task::spawn_blocking(move || {
        let mut session = PracticeSession::new();
        let (tx, rx) = mpsc::channel::<AppEvent>();
        session.start(RunConfig::new(2, &url), SessionSender::new(tx));

        let mut phases = Vec::new();
        loop {
            let AppEvent::Session(event) = rx.recv_timeout(Duration::from_secs(10)).unwrap()
            else {
                continue;
            };
            session.deliver(&event);
            phases.push(session.phase());
            if event.is_terminal() {
                return phases;
            }
        }
    })
    .await
    .unwrap();

    let selecting = phases.iter().position(|p| *p == Phase::Selecting).unwrap();
    assert!(phases[..selecting].iter().all(|p| *p == Phase::Fetching));
    assert_eq!(phases.last(), Some(&Phase::Presenting));
}
