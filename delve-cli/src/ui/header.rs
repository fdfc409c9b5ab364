use delve_core::{OutcomeKind, format_count, format_size};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::app::AppState;

use super::layout::truncate_left;
use super::progress::progress_indicator;
use super::theme::Theme;

/// Header widget showing title, root path and scan status
pub struct Header<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 1 {
            return;
        }

        let title_style = Style::default()
            .fg(self.theme.blue)
            .add_modifier(Modifier::BOLD);
        buf.set_string(area.x + 1, area.y, "DELVE", title_style);
        buf.set_string(
            area.x + 7,
            area.y,
            "─",
            Style::default().fg(self.theme.border),
        );

        let status = if self.state.scanning {
            progress_indicator(&self.state.progress, self.state.spinner_frame)
        } else {
            let suffix = match self.state.scan_outcome {
                Some(OutcomeKind::Cancelled) => " (stopped)",
                _ => "",
            };
            format!(
                "{} matches, {}{}",
                format_count(self.state.rows.len() as u64),
                format_size(self.state.progress.file_bytes),
                suffix
            )
        };

        let max_path_len = (area.width as usize).saturating_sub(status.chars().count() + 12);
        let display_path = truncate_left(&self.state.root_path.to_string_lossy(), max_path_len);
        buf.set_string(
            area.x + 9,
            area.y,
            &display_path,
            Style::default().fg(self.theme.fg),
        );

        let status_x = area.x + area.width.saturating_sub(status.chars().count() as u16 + 2);
        let status_style = if self.state.scanning {
            Style::default().fg(self.theme.yellow)
        } else {
            Style::default().fg(self.theme.fg_dim)
        };
        buf.set_string(status_x, area.y, &status, status_style);
    }
}
