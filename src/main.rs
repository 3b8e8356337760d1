use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Mutex, mpsc};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use chrono::Local;
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wordpick::app::App;
use wordpick::config::Config;
use wordpick::engine::summary::{self, PracticeSummary};
use wordpick::event::{AppEvent, EventHandler};
use wordpick::session::practice::{PracticeSession, SessionEvent, Severity};
use wordpick::sheet::record::WordRecord;
use wordpick::ui::components::practice_form::PracticeForm;
use wordpick::ui::components::results_pane::ResultsPane;
use wordpick::ui::components::status_bar::StatusBar;
use wordpick::ui::layout::{AppLayout, pack_hint_lines};
use wordpick::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "wordpick",
    version,
    about = "Pick today's vocabulary practice words from a shared spreadsheet"
)]
struct Cli {
    #[arg(short, long, help = "Number of words to practice")]
    words: Option<usize>,

    #[arg(short, long, help = "Sheet URL (Google Sheets share link or any CSV URL)")]
    url: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Fetch once and print the word list instead of opening the UI")]
    print: bool,

    #[arg(long, requires = "print", help = "With --print, emit JSON")]
    json: bool,

    #[arg(long, help = "Seed for reproducible tie-breaking")]
    seed: Option<u64>,

    #[arg(long, help = "Log file for the interactive UI")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(words) = cli.words {
        config.default_word_count = words;
    }
    if let Some(ref url) = cli.url {
        config.sheet_url = url.clone();
    }
    if let Some(ref theme) = cli.theme {
        config.theme = theme.clone();
    }

    let mut session = PracticeSession::new();
    if let Some(seed) = cli.seed {
        session = session.seeded(seed);
    }

    if cli.print {
        init_logging(None)?;
        return run_print(&config, session, cli.json);
    }

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(Some(log_path))?;
    info!(theme = %config.theme, "starting interface");

    let theme = Theme::load_or_default(&config.theme);
    let theme: &'static Theme = Box::leak(Box::new(theme));
    let mut app = App::new(config, theme, session);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordpick")
        .join("wordpick.log")
}

/// Log to stderr, or to a file when the terminal belongs to the UI.
fn init_logging(log_file: Option<PathBuf>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordpick=info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!(e))
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| anyhow!(e)),
    }
}

#[derive(Serialize)]
struct PrintReport<'a> {
    summary: &'a PracticeSummary,
    selection: &'a [WordRecord],
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warn => "warn",
        Severity::Error => "error",
        Severity::Success => "ok",
    }
}

/// One run without the UI: progress on stderr, the word list on stdout.
fn run_print(config: &Config, mut session: PracticeSession, json: bool) -> Result<ExitCode> {
    let (tx, rx) = mpsc::channel();
    if !session.start(config.default_run(), tx) {
        bail!("practice session is already running");
    }

    loop {
        let event = rx.recv()?;
        session.deliver(&event);
        match event {
            SessionEvent::Status {
                message, severity, ..
            } => eprintln!("[{}] {message}", severity_label(severity)),
            SessionEvent::Result(result) => {
                let today = Local::now().date_naive();
                let summary = summary::summarize(&result.dataset, &result.selection, today);
                if json {
                    let report = PrintReport {
                        summary: &summary,
                        selection: &result.selection,
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("{}", summary::render_statistics(&summary));
                    println!("{}", summary::render_word_list(&result.selection, today));
                }
                session.settle();
                return Ok(ExitCode::SUCCESS);
            }
            SessionEvent::Error(message) => {
                eprintln!("[{}] {message}", severity_label(Severity::Error));
                return Ok(ExitCode::FAILURE);
            }
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key, events),
            AppEvent::Paste(text) => app.paste(&text),
            AppEvent::Session(event) => app.apply_session_event(event),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, events: &EventHandler) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => app.should_quit = true,
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('s') if ctrl => app.save_form_as_defaults(),
        KeyCode::Enter | KeyCode::F(5) => {
            // Ignored while a run is in flight; the trigger shows as disabled
            app.request_fetch(events.session_sink());
        }
        KeyCode::Tab | KeyCode::BackTab => app.cycle_focus(),
        KeyCode::Up => app.scroll_results(-1),
        KeyCode::Down => app.scroll_results(1),
        KeyCode::PageUp => app.scroll_results(-10),
        KeyCode::PageDown => app.scroll_results(10),
        _ => {
            app.edit_focused(key);
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " wordpick ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" Smart Word Practice | {}", app.phase_label()),
            Style::default()
                .fg(colors.text_muted())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    frame.render_widget(
        PracticeForm::new(
            &app.word_count,
            &app.sheet_url,
            app.focus,
            app.is_busy(),
            app.theme,
        ),
        layout.form,
    );
    frame.render_widget(StatusBar::new(&app.status, app.theme), layout.status);
    frame.render_widget(
        ResultsPane::new(app.presented.as_ref(), app.results_scroll, app.theme),
        layout.results,
    );

    let hints = [
        "[Enter] Fetch",
        "[Tab] Next field",
        "[\u{2191}\u{2193}] Scroll",
        "[Ctrl+S] Save defaults",
        "[Esc] Quit",
    ];
    let footer_text = pack_hint_lines(&hints, layout.footer.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text,
        Style::default().fg(colors.text_muted()),
    )));
    frame.render_widget(footer, layout.footer);
}
