use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::summary::{self, PracticeSummary};
use crate::session::practice::{
    EventSink, Phase, PracticeResult, PracticeSession, SessionEvent, Severity,
};
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    WordCount,
    SheetUrl,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::WordCount => FormField::SheetUrl,
            FormField::SheetUrl => FormField::WordCount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub severity: Severity,
}

/// A finished run, rendered once when it arrives.
pub struct Presented {
    pub result: PracticeResult,
    pub summary: PracticeSummary,
    pub statistics: String,
    pub word_list: String,
}

impl Presented {
    pub fn new(result: PracticeResult, as_of: NaiveDate) -> Self {
        let summary = summary::summarize(&result.dataset, &result.selection, as_of);
        let statistics = summary::render_statistics(&summary);
        let word_list = summary::render_word_list(&result.selection, as_of);
        Self {
            result,
            summary,
            statistics,
            word_list,
        }
    }

    /// Lines across both panes; scrolling never goes past this.
    pub fn line_count(&self) -> usize {
        self.statistics.lines().count() + self.word_list.lines().count()
    }
}

/// Interface state. Only ever touched from the interface thread; practice
/// workers reach it through [`App::apply_session_event`].
pub struct App {
    pub config: Config,
    pub theme: &'static Theme,
    pub session: PracticeSession,
    pub word_count: LineInput,
    pub sheet_url: LineInput,
    pub focus: FormField,
    pub status: StatusLine,
    pub presented: Option<Presented>,
    pub results_scroll: u16,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, theme: &'static Theme, session: PracticeSession) -> Self {
        let word_count = LineInput::numeric(&config.default_word_count.to_string());
        let sheet_url = LineInput::new(&config.sheet_url);
        Self {
            config,
            theme,
            session,
            word_count,
            sheet_url,
            focus: FormField::WordCount,
            status: StatusLine {
                message: "Ready to fetch words...".to_string(),
                severity: Severity::Info,
            },
            presented: None,
            results_scroll: 0,
            should_quit: false,
        }
    }

    /// The fetch trigger is disabled for as long as a run is in flight.
    pub fn trigger_enabled(&self) -> bool {
        self.session.is_idle()
    }

    pub fn is_busy(&self) -> bool {
        !self.session.is_idle()
    }

    /// Start a run from the current form values. Returns false while busy.
    pub fn request_fetch<S: EventSink>(&mut self, sink: S) -> bool {
        if !self.trigger_enabled() {
            return false;
        }
        let run = self
            .config
            .run_config(self.word_count.value(), self.sheet_url.value());
        self.presented = None;
        self.results_scroll = 0;
        self.session.start(run, sink)
    }

    pub fn apply_session_event(&mut self, event: SessionEvent) {
        self.apply_session_event_on(event, Local::now().date_naive());
    }

    /// Apply one event coming off the channel, stamping results with `today`.
    pub fn apply_session_event_on(&mut self, event: SessionEvent, today: NaiveDate) {
        self.session.deliver(&event);
        match event {
            SessionEvent::Status {
                message, severity, ..
            } => {
                self.status = StatusLine { message, severity };
            }
            SessionEvent::Result(result) => {
                let selected = result.selection.len();
                self.presented = Some(Presented::new(result, today));
                self.status = StatusLine {
                    message: format!("Ready! Selected {selected} words for practice"),
                    severity: Severity::Success,
                };
                self.session.settle();
            }
            SessionEvent::Error(message) => {
                self.status = StatusLine {
                    message,
                    severity: Severity::Error,
                };
            }
        }
    }

    /// Route a key to the focused field.
    pub fn edit_focused(&mut self, key: crossterm::event::KeyEvent) -> InputResult {
        self.focused_input_mut().handle(key)
    }

    pub fn paste(&mut self, text: &str) {
        self.focused_input_mut().paste(text);
    }

    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    fn focused_input_mut(&mut self) -> &mut LineInput {
        match self.focus {
            FormField::WordCount => &mut self.word_count,
            FormField::SheetUrl => &mut self.sheet_url,
        }
    }

    /// Remember the form values as the defaults for the next launch.
    pub fn save_form_as_defaults(&mut self) {
        let run = self
            .config
            .run_config(self.word_count.value(), self.sheet_url.value());
        if run.requested_word_count > 0 {
            self.config.default_word_count = run.requested_word_count;
        }
        self.config.sheet_url = run.source_url;

        match self.config.save() {
            Ok(()) => {
                info!(path = %Config::config_path().display(), "saved settings");
                self.status = StatusLine {
                    message: "Settings saved".to_string(),
                    severity: Severity::Success,
                };
            }
            Err(e) => {
                warn!(error = %e, "failed to save settings");
                self.status = StatusLine {
                    message: format!("Could not save settings: {e}"),
                    severity: Severity::Error,
                };
            }
        }
    }

    pub fn scroll_results(&mut self, delta: i32) {
        let limit = self
            .presented
            .as_ref()
            .map_or(0, |p| p.line_count().min(u16::MAX as usize)) as i32;
        let next = i32::from(self.results_scroll).saturating_add(delta);
        self.results_scroll = next.clamp(0, limit) as u16;
    }

    pub fn phase_label(&self) -> &'static str {
        match self.session.phase() {
            Phase::Idle => "idle",
            Phase::Fetching => "fetching",
            Phase::Selecting => "selecting",
            Phase::Presenting => "presenting",
        }
    }
}
