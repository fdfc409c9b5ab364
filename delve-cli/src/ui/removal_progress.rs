use delve_core::format_size;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::RemovalProgress;

use super::bar_chart::{percentage, render_bar};
use super::confirm_remove::policy_label;
use super::layout::{centered_rect, truncate_left};
use super::theme::Theme;

/// Progress overlay shown while a removal batch runs
pub struct RemovalProgressView<'a> {
    progress: &'a RemovalProgress,
    theme: &'a Theme,
}

impl<'a> RemovalProgressView<'a> {
    pub fn new(progress: &'a RemovalProgress, theme: &'a Theme) -> Self {
        Self { progress, theme }
    }
}

impl Widget for RemovalProgressView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dialog_area = centered_rect(50, 11, area);

        Clear.render(dialog_area, buf);

        let title = if self.progress.stopping {
            " Stopping... "
        } else {
            " Removing... "
        };
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.yellow))
            .style(Style::default().bg(self.theme.bg_surface))
            .padding(Padding::uniform(1));

        let inner = block.inner(dialog_area);
        block.render(dialog_area, buf);

        if inner.width < 10 || inner.height < 2 {
            return;
        }

        let text_style = Style::default().fg(self.theme.fg);
        let dim_style = Style::default().fg(self.theme.fg_dim);

        let mut row = inner.y;

        let count_str = format!(
            "{} / {} entries processed",
            self.progress.completed, self.progress.total
        );
        buf.set_string(inner.x, row, &count_str, text_style);
        row += 1;

        let bar_width = (inner.width as usize).saturating_sub(2);
        let pct = percentage(self.progress.completed, self.progress.total as u64);
        let bar = render_bar(pct, bar_width);
        buf.set_string(inner.x, row, &bar, Style::default().fg(self.theme.green));
        row += 2;

        let freed_str = format!(
            "{} items removed, {} freed",
            self.progress.removed_count,
            format_size(self.progress.bytes_freed)
        );
        buf.set_string(inner.x, row, &freed_str, text_style);
        row += 1;

        let label = truncate_left(&policy_label(self.progress.policy), inner.width as usize);
        buf.set_string(inner.x, row, &label, dim_style);
        row += 1;

        if !self.progress.failures.is_empty() {
            let fail_str = format!("{} failed", self.progress.failures.len());
            buf.set_string(
                inner.x,
                row,
                &fail_str,
                Style::default()
                    .fg(self.theme.red)
                    .add_modifier(Modifier::BOLD),
            );
            row += 1;
        }

        let hint_y = row.max(inner.y + inner.height.saturating_sub(1));
        buf.set_string(inner.x, hint_y, "Press s to stop, q to quit", dim_style);
    }
}
