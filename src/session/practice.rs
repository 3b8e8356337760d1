use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::engine::selector::WordSelector;
use crate::error::{PracticeError, Result};
use crate::sheet::reader::{self, HttpSheet, SheetSource};
use crate::sheet::record::{Dataset, Selection};

/// How a status line should be coloured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
    Success,
}

/// Where a practice run currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Selecting,
    Presenting,
}

/// Everything one run needs, resolved before it starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub requested_word_count: usize,
    pub source_url: String,
}

impl RunConfig {
    pub fn new(requested_word_count: usize, source_url: &str) -> Self {
        Self {
            requested_word_count,
            source_url: source_url.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.requested_word_count == 0 {
            return Err(PracticeError::configuration(
                "Words to practice must be at least 1",
            ));
        }
        reader::validate_source_url(&self.source_url)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeResult {
    pub dataset: Dataset,
    pub selection: Selection,
}

/// What a running session reports back to the interface.
///
/// Every accepted `start` produces some `Status` events followed by exactly
/// one `Result` or `Error`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Status {
        phase: Phase,
        message: String,
        severity: Severity,
    },
    Result(PracticeResult),
    Error(String),
}

impl SessionEvent {
    pub fn status(phase: Phase, message: impl Into<String>, severity: Severity) -> Self {
        SessionEvent::Status {
            phase,
            message: message.into(),
            severity,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::Result(_) | SessionEvent::Error(_))
    }
}

/// Channel back to the thread that owns the interface.
///
/// Implementations only queue the event; the owning thread applies it.
/// Returns false once nobody is listening any more.
pub trait EventSink: Clone + Send + 'static {
    fn send_event(&self, event: SessionEvent) -> bool;
}

impl EventSink for mpsc::Sender<SessionEvent> {
    fn send_event(&self, event: SessionEvent) -> bool {
        self.send(event).is_ok()
    }
}

/// Runs fetch, parse and selection on a background thread, one run at a
/// time.
///
/// The session itself lives on the interface thread. It moves to `Fetching`
/// on `start`, follows the phases reported by the worker through
/// [`PracticeSession::deliver`], and is idle again once the terminal event
/// has been delivered (and, for results, presented).
pub struct PracticeSession {
    phase: Phase,
    source: Arc<dyn SheetSource>,
    seed: Option<u64>,
    runs: u64,
}

impl PracticeSession {
    pub fn new() -> Self {
        Self::with_source(HttpSheet)
    }

    pub fn with_source<S: SheetSource + 'static>(source: S) -> Self {
        Self {
            phase: Phase::Idle,
            source: Arc::new(source),
            seed: None,
            runs: 0,
        }
    }

    /// Make tie-breaking reproducible. Each run derives its own seed from
    /// this one.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Begin a run. Returns false, and does nothing, while another run is
    /// still in flight.
    pub fn start<S: EventSink>(&mut self, config: RunConfig, sink: S) -> bool {
        if !self.is_idle() {
            debug!(phase = ?self.phase, "run requested while busy, ignoring");
            return false;
        }

        self.phase = Phase::Fetching;
        self.runs += 1;
        let run = self.runs;
        info!(
            run,
            words = config.requested_word_count,
            "starting practice run"
        );

        sink.send_event(SessionEvent::status(
            Phase::Fetching,
            "Fetching words from Google Sheet...",
            Severity::Info,
        ));

        let selector = match self.seed {
            Some(seed) => WordSelector::seeded(seed.wrapping_add(run)),
            None => WordSelector::new(),
        };
        let source = Arc::clone(&self.source);
        let worker_sink = sink.clone();
        let spawned = thread::Builder::new()
            .name(format!("practice-run-{run}"))
            .spawn(move || run_worker(source.as_ref(), config, selector, worker_sink));

        if let Err(e) = spawned {
            error!(error = %e, "failed to spawn practice worker");
            let err = PracticeError::Unexpected(format!("could not start background task: {e}"));
            sink.send_event(SessionEvent::Error(err.user_message()));
        }
        true
    }

    /// Record an event on the interface thread after it came off the
    /// channel.
    pub fn deliver(&mut self, event: &SessionEvent) {
        if self.is_idle() {
            return;
        }
        match event {
            SessionEvent::Status { phase, .. } => self.phase = *phase,
            SessionEvent::Result(_) => self.phase = Phase::Presenting,
            SessionEvent::Error(_) => self.phase = Phase::Idle,
        }
    }

    /// Called once a delivered result has been shown; re-enables `start`.
    pub fn settle(&mut self) {
        if self.phase == Phase::Presenting {
            self.phase = Phase::Idle;
        }
    }
}

impl Default for PracticeSession {
    fn default() -> Self {
        Self::new()
    }
}

fn run_worker<S: EventSink>(
    source: &dyn SheetSource,
    config: RunConfig,
    mut selector: WordSelector,
    sink: S,
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run_pipeline(source, &config, &mut selector, &sink)
    }));

    let terminal = match outcome {
        Ok(Ok(result)) => {
            info!(
                total = result.dataset.len(),
                selected = result.selection.len(),
                "practice run finished"
            );
            SessionEvent::Result(result)
        }
        Ok(Err(err)) => {
            warn!(error = %err, "practice run failed");
            SessionEvent::Error(err.user_message())
        }
        Err(payload) => {
            let err = PracticeError::Unexpected(panic_message(payload.as_ref()));
            error!(error = %err, "practice worker panicked");
            SessionEvent::Error(err.user_message())
        }
    };

    if !sink.send_event(terminal) {
        debug!("interface went away before the run finished");
    }
}

fn run_pipeline<S: EventSink>(
    source: &dyn SheetSource,
    config: &RunConfig,
    selector: &mut WordSelector,
    sink: &S,
) -> Result<PracticeResult> {
    config.validate()?;

    sink.send_event(SessionEvent::status(
        Phase::Fetching,
        "Downloading sheet data...",
        Severity::Info,
    ));
    let dataset = source.fetch(&config.source_url)?;

    if dataset.is_empty() {
        sink.send_event(SessionEvent::status(
            Phase::Fetching,
            "Sheet has no words",
            Severity::Warn,
        ));
    } else {
        sink.send_event(SessionEvent::status(
            Phase::Fetching,
            format!("Loaded {} words", dataset.len()),
            Severity::Success,
        ));
    }

    sink.send_event(SessionEvent::status(
        Phase::Selecting,
        "Selecting practice words...",
        Severity::Info,
    ));
    let selection = selector.select(&dataset, config.requested_word_count);

    Ok(PracticeResult { dataset, selection })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "background task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::sheet::record::WordRecord;

    const PLACEHOLDER_URL: &str =
        "https://docs.google.com/spreadsheets/d/YOUR_SHEET_ID/export?format=csv";

    fn sample() -> Dataset {
        vec![
            WordRecord::new("cat", "Animals", 3),
            WordRecord::new("dog", "Animals", 0),
        ]
    }

    /// Deliver events until the terminal one, the way the interface loop does.
    fn drain(
        session: &mut PracticeSession,
        rx: &mpsc::Receiver<SessionEvent>,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        loop {
            let event = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("session never finished");
            session.deliver(&event);
            let done = event.is_terminal();
            events.push(event);
            if done {
                session.settle();
                return events;
            }
        }
    }

    fn terminal_counts(events: &[SessionEvent]) -> (usize, usize) {
        let results = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Result(_)))
            .count();
        let errors = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Error(_)))
            .count();
        (results, errors)
    }

    #[test]
    fn run_config_rejects_zero_words() {
        let err = RunConfig::new(0, "https://example.com/words.csv")
            .validate()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn run_config_rejects_placeholder_url() {
        assert!(RunConfig::new(5, PLACEHOLDER_URL).validate().is_err());
        assert!(RunConfig::new(5, "https://example.com/words.csv").validate().is_ok());
    }

    #[test]
    fn successful_run_reports_phases_in_order() {
        let mut session = PracticeSession::with_source(|_: &str| -> Result<Dataset> { Ok(sample()) });
        let (tx, rx) = mpsc::channel();

        assert!(session.start(RunConfig::new(2, "https://example.com/words.csv"), tx));
        assert_eq!(session.phase(), Phase::Fetching);
        let events = drain(&mut session, &rx);

        let phases: Vec<Phase> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Status { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                Phase::Fetching,
                Phase::Fetching,
                Phase::Fetching,
                Phase::Selecting
            ]
        );
        assert!(events.contains(&SessionEvent::status(
            Phase::Fetching,
            "Loaded 2 words",
            Severity::Success
        )));

        match events.last() {
            Some(SessionEvent::Result(result)) => {
                assert_eq!(result.dataset, sample());
                let words: Vec<&str> =
                    result.selection.iter().map(|r| r.word.as_str()).collect();
                assert_eq!(words, vec!["dog", "cat"]);
            }
            other => panic!("expected a result, got {other:?}"),
        }
        assert_eq!(terminal_counts(&events), (1, 0));
        assert!(session.is_idle());
    }

    #[test]
    fn placeholder_url_fails_without_fetching() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut session = PracticeSession::with_source(move |_: &str| -> Result<Dataset> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(sample())
        });
        let (tx, rx) = mpsc::channel();

        assert!(session.start(RunConfig::new(5, PLACEHOLDER_URL), tx));
        let events = drain(&mut session, &rx);

        assert_eq!(terminal_counts(&events), (0, 1));
        assert_eq!(
            events.last(),
            Some(&SessionEvent::Error(
                "Please enter a valid Google Sheet URL".to_string()
            ))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(session.is_idle());
    }

    #[test]
    fn fetch_failure_becomes_one_error_event() {
        let mut session = PracticeSession::with_source(|url: &str| -> Result<Dataset> {
            Err(PracticeError::HttpStatus {
                url: url.to_string(),
                status: 500,
            })
        });
        let (tx, rx) = mpsc::channel();

        session.start(RunConfig::new(5, "https://example.com/words.csv"), tx);
        let events = drain(&mut session, &rx);

        assert_eq!(terminal_counts(&events), (0, 1));
        match events.last() {
            Some(SessionEvent::Error(message)) => assert!(message.contains("500")),
            other => panic!("expected an error, got {other:?}"),
        }
        assert!(session.is_idle());
    }

    #[test]
    fn worker_panic_becomes_one_error_event() {
        let mut session =
            PracticeSession::with_source(|_: &str| -> Result<Dataset> { panic!("boom") });
        let (tx, rx) = mpsc::channel();

        session.start(RunConfig::new(5, "https://example.com/words.csv"), tx);
        let events = drain(&mut session, &rx);

        assert_eq!(terminal_counts(&events), (0, 1));
        assert_eq!(
            events.last(),
            Some(&SessionEvent::Error("Error: boom".to_string()))
        );
        assert!(session.is_idle());
    }

    #[test]
    fn empty_sheet_is_a_result_not_an_error() {
        let mut session = PracticeSession::with_source(|_: &str| -> Result<Dataset> { Ok(Vec::new()) });
        let (tx, rx) = mpsc::channel();

        session.start(RunConfig::new(5, "https://example.com/words.csv"), tx);
        let events = drain(&mut session, &rx);

        assert_eq!(
            events.last(),
            Some(&SessionEvent::Result(PracticeResult {
                dataset: Vec::new(),
                selection: Vec::new(),
            }))
        );
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::Status {
                severity: Severity::Warn,
                ..
            }
        )));
    }

    #[test]
    fn start_is_refused_while_busy() {
        let mut session = PracticeSession::with_source(|_: &str| -> Result<Dataset> { Ok(sample()) });
        let (tx, rx) = mpsc::channel();

        assert!(session.start(RunConfig::new(1, "https://example.com/a.csv"), tx.clone()));
        assert!(!session.start(RunConfig::new(1, "https://example.com/b.csv"), tx));
        assert_eq!(session.runs(), 1);

        let events = drain(&mut session, &rx);
        assert_eq!(terminal_counts(&events), (1, 0));
        // Nothing from the refused request ever arrives
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn session_waits_in_presenting_until_settled() {
        let mut session = PracticeSession::with_source(|_: &str| -> Result<Dataset> { Ok(sample()) });
        let (tx, rx) = mpsc::channel();
        session.start(RunConfig::new(1, "https://example.com/words.csv"), tx);

        loop {
            let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            session.deliver(&event);
            if event.is_terminal() {
                break;
            }
        }
        assert_eq!(session.phase(), Phase::Presenting);
        let (idle_tx, _idle_rx) = mpsc::channel::<SessionEvent>();
        assert!(!session.start(RunConfig::new(1, "https://example.com/words.csv"), idle_tx));
        session.settle();
        assert!(session.is_idle());
    }

    #[test]
    fn sequential_runs_are_allowed_after_terminal_event() {
        let mut session = PracticeSession::with_source(|_: &str| -> Result<Dataset> { Ok(sample()) }).seeded(3);
        let (tx, rx) = mpsc::channel();

        for _ in 0..3 {
            assert!(session.start(RunConfig::new(2, "https://example.com/words.csv"), tx.clone()));
            let events = drain(&mut session, &rx);
            assert_eq!(terminal_counts(&events), (1, 0));
        }
        assert_eq!(session.runs(), 3);
    }

    #[test]
    fn selection_respects_requested_count() {
        let many: Dataset = (0..20)
            .map(|i| WordRecord::new(&format!("w{i}"), "", i % 4))
            .collect();
        let mut session = PracticeSession::with_source(move |_: &str| -> Result<Dataset> { Ok(many.clone()) });
        let (tx, rx) = mpsc::channel();

        session.start(RunConfig::new(7, "https://example.com/words.csv"), tx);
        match drain(&mut session, &rx).pop() {
            Some(SessionEvent::Result(result)) => {
                assert_eq!(result.dataset.len(), 20);
                assert_eq!(result.selection.len(), 7);
                assert!(result.selection.iter().all(|r| r.practiced <= 1));
            }
            other => panic!("expected a result, got {other:?}"),
        }
    }
}
