use delve_core::{ScanProgress, format_count, format_size};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Padding, Widget},
};

use super::layout::truncate_left;
use super::theme::Theme;

/// Braille spinner characters
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Progress panel shown while a scan has not found anything yet
pub struct ProgressView<'a> {
    progress: &'a ScanProgress,
    spinner_frame: usize,
    theme: &'a Theme,
}

impl<'a> ProgressView<'a> {
    pub fn new(progress: &'a ScanProgress, spinner_frame: usize, theme: &'a Theme) -> Self {
        Self {
            progress,
            spinner_frame,
            theme,
        }
    }
}

impl Widget for ProgressView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .padding(Padding::horizontal(1));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width < 20 {
            return;
        }

        let spinner = SPINNER[self.spinner_frame % SPINNER.len()];
        buf.set_string(
            inner.x,
            inner.y,
            spinner.to_string(),
            Style::default()
                .fg(self.theme.blue)
                .add_modifier(Modifier::BOLD),
        );
        buf.set_string(
            inner.x + 2,
            inner.y,
            "Searching...",
            Style::default().fg(self.theme.fg),
        );

        if let Some(path) = &self.progress.current_path {
            let display_path =
                truncate_left(&path.to_string_lossy(), inner.width.saturating_sub(2) as usize);
            buf.set_string(
                inner.x,
                inner.y + 1,
                &display_path,
                Style::default().fg(self.theme.fg_dim),
            );
        }

        let stats = format!(
            "{} visited  {} errors  {} read  {:.1}s",
            format_count(self.progress.items_visited),
            format_count(self.progress.errors),
            format_size(self.progress.bytes_visited),
            self.progress.elapsed.as_secs_f64(),
        );
        buf.set_string(
            inner.x,
            inner.y + 2,
            &stats,
            Style::default().fg(self.theme.fg_muted),
        );
    }
}

/// Compact progress indicator for the header
pub fn progress_indicator(progress: &ScanProgress, spinner_frame: usize) -> String {
    let spinner = SPINNER[spinner_frame % SPINNER.len()];
    format!(
        "{} {} found / {} visited",
        spinner,
        format_count(progress.items_found()),
        format_count(progress.items_visited)
    )
}
