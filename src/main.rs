mod app;
mod event;
mod logging;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use diffdrill::config::{Config, SourceKind};
use diffdrill::session::attempt::Phase;

use app::App;
use event::{AppEvent, EventHandler};
use ui::code_editor::CodeEditorView;
use ui::components::diff_view::DiffView;
use ui::components::metric_panel::MetricPanel;
use ui::components::results::ResultsPopup;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "diffdrill", version, about = "Terminal practice for fast, minimal code edits")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, value_enum, help = "Where problems come from")]
    source: Option<SourceKind>,

    #[arg(long, help = "Backend base URL for the remote source")]
    api_url: Option<String>,

    #[arg(long, help = "Session id sent as X-Session-ID")]
    session_id: Option<String>,

    #[arg(long, help = "Log file path")]
    log_file: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(source) = self.source {
            config.problem_source = source;
        }
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(id) = &self.session_id {
            config.session_id = Some(id.clone());
        }
        config.normalize();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    cli.apply(&mut config);

    let log_path = cli.log_file.clone().unwrap_or_else(Config::default_log_path);
    if let Err(err) = logging::init_logging(&log_path, &config.log_level, cli.verbose) {
        eprintln!("Warning: logging disabled: {err:#}");
    }

    let theme = Theme::load(&config.theme, &Config::themes_dir()).unwrap_or_else(|| {
        tracing::warn!(theme = %config.theme, "theme not found, using default");
        Theme::default()
    });

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, theme, events.sender())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Lets Ctrl+S and Ctrl+R through on terminals that would otherwise
    // swallow them as flow control.
    let keyboard_enhanced = execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    )
    .is_ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "exiting after error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => {
                // Releases only arrive with keyboard enhancement; repeats count.
                if key.kind != KeyEventKind::Release {
                    app.handle_key(key);
                }
            }
            AppEvent::Session(event) => app.handle_session_event(event),
            AppEvent::Tick => app.on_idle(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);

    let session = &app.session;
    match session.phase() {
        Phase::Loading => render_message(frame, app, layout.editor.union(layout.target), "Loading problem...", false),
        Phase::Idle { error } => {
            let text = match error {
                Some(err) => format!("Could not load a problem: {err}\n\nPress Enter to retry."),
                None => "Press Enter to load a problem.".to_string(),
            };
            render_message(frame, app, layout.editor.union(layout.target), &text, error.is_some());
        }
        Phase::Running | Phase::Paused | Phase::Completed => {
            let metrics = session.metrics();
            frame.render_widget(
                MetricPanel::new(
                    session.elapsed_secs(),
                    metrics.speed_ccpm,
                    metrics.completion_percent,
                    session.keystrokes(),
                    &app.theme,
                ),
                layout.metrics,
            );

            let focused = session.editor_focused() && session.phase() == &Phase::Running;
            let border = if focused { colors.border_focused() } else { colors.border() };
            let editor_title = if session.phase() == &Phase::Paused {
                " Your edit (paused, Esc to resume) "
            } else {
                " Your edit "
            };
            frame.render_widget(
                CodeEditorView::new(&app.editor, &app.theme, focused).block(
                    Block::bordered()
                        .title(editor_title)
                        .border_style(Style::default().fg(border)),
                ),
                layout.editor,
            );

            if let Some(problem) = session.problem() {
                frame.render_widget(
                    DiffView::new(session.current_text(), problem.modified_text(), &app.theme).block(
                        Block::bordered()
                            .title(" Target ")
                            .border_style(Style::default().fg(colors.border())),
                    ),
                    layout.target,
                );
            }

            if let Some(snapshot) = session.snapshot() {
                let popup = centered_rect(60, 50, area);
                frame.render_widget(ResultsPopup::new(snapshot, &app.theme), popup);
            }
        }
    }

    render_footer(frame, app, layout.footer);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let session = &app.session;
    let phase = match session.phase() {
        Phase::Loading => "loading",
        Phase::Idle { error: Some(_) } => "error",
        Phase::Idle { error: None } => "idle",
        Phase::Running => "running",
        Phase::Paused => "paused",
        Phase::Completed => "complete",
    };
    let problem = session
        .problem()
        .map(|p| format!(" | {}", p.problem_id()))
        .unwrap_or_default();
    let info = format!(" {phase}{problem} | {}", session.source_description());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " diffdrill ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let hints: &[&str] = match app.session.phase() {
        Phase::Loading => &["[Ctrl+C] Quit"],
        Phase::Idle { .. } => &["[Enter] Load", "[Ctrl+C] Quit"],
        Phase::Completed => &["[r] Retry", "[n] Next", "[Ctrl+C] Quit"],
        Phase::Running | Phase::Paused => &[
            "[Ctrl+R] Reset",
            "[Ctrl+S] Skip",
            "[Esc] Pause",
            "[Ctrl+C] Quit",
        ],
    };
    let line = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Span::styled(line, Style::default().fg(colors.text_dim()))),
        area,
    );
}

fn render_message(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, text: &str, is_error: bool) {
    let colors = &app.theme.colors;
    let fg = if is_error { colors.error() } else { colors.fg() };
    let popup = centered_rect(50, 30, area);
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(fg))
        .wrap(Wrap { trim: false })
        .centered()
        .block(Block::bordered().border_style(Style::default().fg(colors.border())));
    frame.render_widget(paragraph, popup);
}
