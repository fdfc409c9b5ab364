mod app;
mod args;
mod list;
mod logging;
mod tui;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use delve_core::{RemovalPolicy, ScanParameters, Session};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};
use tracing::{error, info};

use app::{Action, AppMode, AppState};
use args::Args;
use tui::{AppEvent, EventHandler, handle_key};
use ui::{
    AppLayout, ConfirmRemoveView, Footer, Header, HelpView, ProgressView, RemovalProgressView,
    ResultsView, Theme, truncate_left,
};

const TICK_RATE: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let path = args
        .path
        .clone()
        .canonicalize()
        .unwrap_or(args.path.clone());
    let params = args.scan_parameters(path.clone());
    params.validate()?;

    let _guard = logging::init_logging(!args.list);
    info!(root = %path.display(), list = args.list, "starting");

    if args.list {
        let summary = list::run_list(params, args.json, &mut stdout().lock())?;
        eprintln!("{}", list::summary_line(&summary));
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, path, params, args.remove_depth);

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    path: PathBuf,
    params: ScanParameters,
    remove_depth: i64,
) -> Result<()> {
    let theme = Theme::default();
    let mut state = AppState::new(path, remove_depth);
    let event_handler = EventHandler::new(TICK_RATE);

    let mut session = Session::new();
    session.start_scan(params.clone())?;

    loop {
        // Drain worker messages without blocking
        if let Some(scan) = session.scan() {
            for msg in scan.try_iter() {
                state.apply_scan_message(msg);
            }
        }
        if let Some(removal) = session.removal() {
            for msg in removal.try_iter() {
                state.apply_removal_message(msg);
            }
        }

        terminal.draw(|frame| {
            let area = frame.area();
            let layout = AppLayout::new(area);

            frame
                .buffer_mut()
                .set_style(area, Style::default().bg(theme.bg));

            state.visible_height = layout.list.height as usize;

            Header::new(&state, &theme).render(layout.header, frame.buffer_mut());
            render_status_line(&state, &theme, layout.summary, frame.buffer_mut());

            if state.scanning && state.rows.is_empty() {
                ProgressView::new(&state.progress, state.spinner_frame, &theme)
                    .render(layout.list, frame.buffer_mut());
            } else {
                ResultsView::new(
                    &state.rows,
                    state.selected_index,
                    state.scroll_offset,
                    &state.marked,
                    state.largest_size(),
                    &theme,
                )
                .render(layout.list, frame.buffer_mut());
            }

            match state.mode {
                AppMode::Help => HelpView::new(&theme).render(area, frame.buffer_mut()),
                AppMode::ConfirmRemove => {
                    if let Some(pending) = &state.pending_removal {
                        ConfirmRemoveView::new(pending, &theme).render(area, frame.buffer_mut());
                    }
                }
                AppMode::Removing => {
                    if let Some(progress) = &state.removal_progress {
                        RemovalProgressView::new(progress, &theme)
                            .render(area, frame.buffer_mut());
                    }
                }
                AppMode::Scanning | AppMode::Browsing => {}
            }

            Footer::new(state.mode, state.marked.len(), &theme, &state.session_stats)
                .render(layout.footer, frame.buffer_mut());
        })?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                let action = handle_key(key, state.mode);
                handle_action(&mut state, &mut session, &params, action);
            }
            AppEvent::Resize => {
                // Terminal will redraw on next loop
            }
            AppEvent::Tick => {
                state.tick_spinner();
            }
        }

        if state.should_quit {
            break;
        }
    }

    session.shutdown();
    Ok(())
}

fn handle_action(
    state: &mut AppState,
    session: &mut Session,
    params: &ScanParameters,
    action: Action,
) {
    match action {
        Action::MoveUp => state.move_up(),
        Action::MoveDown => state.move_down(),
        Action::PageUp => state.page_up(),
        Action::PageDown => state.page_down(),
        Action::GoToFirst => state.go_to_first(),
        Action::GoToLast => state.go_to_last(),
        Action::ToggleMark => state.toggle_mark(),
        Action::MarkAll => state.mark_all(),
        Action::ClearMarks => state.clear_marks(),
        Action::StopScan => session.stop_scan(),
        Action::Rescan => {
            state.begin_scan();
            if let Err(e) = session.start_scan(params.clone()) {
                error!(error = %e, "rescan failed");
                state.scanning = false;
                state.mode = AppMode::Browsing;
                state.set_error(format!("Scan failed: {e}"));
            }
        }
        Action::RemoveUnlimited => state.request_removal(RemovalPolicy::Unlimited),
        Action::RemoveLimited => {
            state.request_removal(RemovalPolicy::limited(state.remove_depth))
        }
        Action::ConfirmRemove => {
            if let Some((entries, policy)) = state.confirm_removal() {
                info!(entries = entries.len(), ?policy, "removal confirmed");
                if let Err(e) = session.start_removal(entries, policy) {
                    error!(error = %e, "removal failed to start");
                    state.removal_progress = None;
                    state.mode = AppMode::Browsing;
                    state.set_error(format!("Remove failed: {e}"));
                }
            }
        }
        Action::CancelRemove => state.cancel_removal(),
        Action::StopRemoval => {
            session.stop_removal();
            state.mark_removal_stopping();
        }
        Action::ShowHelp => state.show_help(),
        Action::HideHelp => state.hide_help(),
        Action::Quit => state.quit(),
        Action::Tick => {}
    }
}

/// Error message if any, otherwise the selected row's full path
fn render_status_line(state: &AppState, theme: &Theme, area: Rect, buf: &mut Buffer) {
    if area.width < 10 {
        return;
    }

    let max_len = area.width.saturating_sub(2) as usize;
    if let Some(message) = &state.error_message {
        buf.set_string(
            area.x + 1,
            area.y,
            truncate_left(message, max_len),
            Style::default().fg(theme.red).add_modifier(Modifier::BOLD),
        );
    } else if let Some(row) = state.selected_row() {
        buf.set_string(
            area.x + 1,
            area.y,
            truncate_left(&row.path.to_string_lossy(), max_len),
            Style::default().fg(theme.fg_dim),
        );
    }
}
