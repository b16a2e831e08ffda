use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use liftdeck::app::{App, AppScreen, FOOTER_ROWS};
use liftdeck::config::Config;
use liftdeck::event::{AppEvent, EventHandler};
use liftdeck::session::workout::format_date;
use liftdeck::store::json_store::JsonStore;
use liftdeck::store::plan_store::{MemoryStore, PlanStore};
use liftdeck::ui::components::bottom_nav::BottomNav;
use liftdeck::ui::components::plans_view::PlansView;
use liftdeck::ui::components::session_view::SessionView;
use liftdeck::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use liftdeck::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "liftdeck", version, about = "Terminal workout planner")]
struct Cli {
    #[arg(short, long, help = "User id whose plans to open")]
    user: Option<String>,

    #[arg(short, long, help = "Session date (YYYY-MM-DD), defaults to today")]
    date: Option<NaiveDate>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,
}

fn log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("liftdeck")
        .join("liftdeck.log")
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("LIFTDECK_LOG")
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let path = log_path();
    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));

    match file {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %path.display(), "logging initialized");
        }
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(%e, "config unreadable, using defaults");
        Config::default()
    });
    if let Some(user) = cli.user {
        config.user_id = user;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.validate();

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.theme, "unknown theme, using default");
        Theme::default()
    });

    let store: Box<dyn PlanStore> = match JsonStore::new() {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(%e, "plan store unavailable, changes will not persist");
            Box::new(MemoryStore::new())
        }
    };

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let mut app = App::new(config, theme, store, date);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(?err, "exited with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    let mut last_frame = Instant::now();
    loop {
        let size = terminal.size()?;
        app.resize(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|frame| render(frame, app))?;

        let event = events.next()?;
        let now = Instant::now();
        app.tick(now - last_frame);
        last_frame = now;

        match event {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            app.editor.teardown();
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.is_editing() {
        match app.screen {
            AppScreen::Session => app.handle_field_key(key),
            AppScreen::Plans => app.handle_plan_field_key(key),
            _ => {}
        }
        return;
    }

    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
            return;
        }
        KeyCode::Char(ch @ '1'..='4') => {
            let index = ch as usize - '1' as usize;
            app.go_to(AppScreen::ALL[index]);
            return;
        }
        _ => {}
    }

    match app.screen {
        AppScreen::Session => handle_session_key(app, key),
        AppScreen::Plans => handle_plans_key(app, key),
        AppScreen::History | AppScreen::Profile => {}
    }
}

fn handle_session_key(app: &mut App, key: KeyEvent) {
    let step = app.config.scroll_step as i32;
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Char('J') => app.move_expanded(true),
        KeyCode::Char('K') => app.move_expanded(false),
        KeyCode::PageDown => app.scroll_by(step),
        KeyCode::PageUp => app.scroll_by(-step),
        KeyCode::Tab => app.focus_next(true),
        KeyCode::BackTab => app.focus_next(false),
        KeyCode::Enter | KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Esc => app.release_focus(),
        KeyCode::Char('o') => app.toggle_edit_order(),
        KeyCode::Char('x') | KeyCode::Delete => app.delete_expanded(),
        KeyCode::Char('a') => app.add_exercise(),
        KeyCode::Char('s') => app.save_template(),
        KeyCode::Char('[') => app.shift_date(-1),
        KeyCode::Char(']') => app.shift_date(1),
        KeyCode::Char('t') => app.open_date(Local::now().date_naive()),
        _ => {}
    }
}

fn handle_plans_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.plans_move(true),
        KeyCode::Up | KeyCode::Char('k') => app.plans_move(false),
        KeyCode::Tab => app.plans_focus_next(true),
        KeyCode::BackTab => app.plans_focus_next(false),
        KeyCode::Enter | KeyCode::Char(' ') if app.plan_focus.is_none() => app.plans_toggle(),
        KeyCode::Enter | KeyCode::Char('e') => app.plans_begin_edit(),
        KeyCode::Esc => app.release_plan_focus(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let layout = AppLayout::new(app.area, FOOTER_ROWS);
    let nav = layout.nav;
    if mouse.row == nav.y && mouse.kind == MouseEventKind::Down(MouseButton::Left) {
        if nav.width > 0 {
            let col = mouse.column.saturating_sub(nav.x) as usize;
            let index = (col * AppScreen::ALL.len() / nav.width as usize)
                .min(AppScreen::ALL.len() - 1);
            app.go_to(AppScreen::ALL[index]);
        }
        return;
    }

    if app.screen != AppScreen::Session {
        return;
    }
    let step = app.config.scroll_step as i32;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(),
        MouseEventKind::ScrollDown => app.scroll_by(step),
        MouseEventKind::ScrollUp => app.scroll_by(-step),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area, FOOTER_ROWS);

    match app.screen {
        AppScreen::Session => render_session(frame, app, &layout),
        AppScreen::Plans => render_plans(frame, app, &layout),
        AppScreen::History => render_placeholder(
            frame,
            app,
            &layout,
            "History",
            "Completed sessions will show up here.",
        ),
        AppScreen::Profile => {
            let line = format!("{} ({})", app.config.display_name, app.user);
            render_placeholder(frame, app, &layout, "Profile", &line)
        }
    }

    render_footer(frame, app, &layout);
    frame.render_widget(BottomNav::new(app.screen, &app.theme), layout.nav);

    if app.show_help {
        render_help(frame, app);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, title: &str, detail: Line) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                " liftdeck ",
                Style::default()
                    .fg(colors.bg())
                    .bg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {title}"),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            ),
        ]),
        detail,
    ])
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(colors.border())),
    );
    frame.render_widget(header, area);
}

fn render_session(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let editor = &app.editor;

    let title = format!("{} · {}", format_date(editor.date()), editor.kind());
    let mut detail = vec![Span::styled(
        format!(" {} exercises", editor.len()),
        Style::default().fg(colors.muted()),
    )];
    if editor.reorder_state().is_edit_order() {
        detail.push(Span::styled(
            "  reordering",
            Style::default().fg(colors.warning()),
        ));
    }
    if editor.has_changes() {
        detail.push(Span::styled(
            "  ● unsaved changes, [s] update plan",
            Style::default().fg(colors.accent()),
        ));
    }
    render_header(frame, app, layout.header, &title, Line::from(detail));

    let session_layout = app.session_layout();
    frame.render_widget(
        SessionView {
            editor,
            layout: &session_layout,
            offset: app.scroll_offset,
            focus: app.focus,
            field: app.field.as_ref(),
            theme: &app.theme,
        },
        layout.main,
    );
}

fn render_plans(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let detail = Line::styled(
        " Edits are saved as you make them",
        Style::default().fg(colors.muted()),
    );
    render_header(frame, app, layout.header, "Plans", detail);
    frame.render_widget(
        PlansView {
            book: &app.plans,
            selected: app.plans_selected,
            focus: app.plan_focus,
            field: app.plan_field.as_ref(),
            theme: &app.theme,
        },
        layout.main,
    );
}

fn render_placeholder(
    frame: &mut ratatui::Frame,
    app: &App,
    layout: &AppLayout,
    title: &str,
    message: &str,
) {
    let colors = &app.theme.colors;
    render_header(frame, app, layout.header, title, Line::from(""));
    let body = Paragraph::new(vec![
        Line::from(""),
        Line::styled(message.to_string(), Style::default().fg(colors.muted())),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(body, layout.main);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let hints: &[&str] = match app.screen {
        _ if app.is_editing() => &[
            "[Enter] Commit",
            "[Tab] Commit + next",
            "[Esc] Revert",
            "[Ctrl-U] Clear",
        ],
        AppScreen::Session if app.editor.reorder_state().is_edit_order() => &[
            "[J/K] Move",
            "drag [≡] to reorder",
            "[o] Done",
            "[?] Help",
        ],
        AppScreen::Session => &[
            "[j/k] Card",
            "[Tab] Field",
            "[Enter] Edit",
            "[a] Add",
            "[x] Delete",
            "[o] Order",
            "[s] Save plan",
            "[[/]] Day",
            "[?] Help",
        ],
        AppScreen::Plans => &[
            "[j/k] Day",
            "[Enter] Open",
            "[Tab] Field",
            "[e] Edit",
            "[?] Help",
        ],
        AppScreen::History | AppScreen::Profile => &["[1-4] Switch", "[q] Quit"],
    };

    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        let color = if status.error {
            colors.error()
        } else {
            colors.success()
        };
        lines.push(Line::styled(
            format!("  {}", status.text),
            Style::default().fg(color),
        ));
    }
    let hint_style = Style::default().fg(colors.muted());
    lines.extend(
        pack_hint_lines(hints, layout.footer.width as usize)
            .into_iter()
            .map(|l| Line::styled(l, hint_style)),
    );
    lines.truncate(layout.footer.height as usize);
    frame.render_widget(Paragraph::new(lines), layout.footer);
}

fn render_help(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, area);

    let rows = [
        ("j / k", "expand next / previous exercise"),
        ("wheel, PgUp/PgDn", "scroll; the card in view expands"),
        ("Tab / Shift-Tab", "commit and move between fields"),
        ("Enter / e", "edit the focused field"),
        ("Esc", "revert an edit"),
        ("a / x", "add / delete exercise"),
        ("o", "toggle reorder mode"),
        ("J / K", "move expanded exercise"),
        ("s", "update the weekday plan"),
        ("[ / ] / t", "previous / next day / today"),
        ("1-4", "switch screens"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("  {keys:<18}"), Style::default().fg(colors.accent())),
                Span::styled(*what, Style::default().fg(colors.fg())),
            ])
        })
        .collect();

    let help = Paragraph::new(lines).block(
        Block::bordered()
            .title(" Keys ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg())),
    );
    frame.render_widget(help, area);
}
