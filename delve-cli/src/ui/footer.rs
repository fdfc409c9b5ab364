use delve_core::format_size;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::app::{AppMode, SessionStats};

use super::theme::Theme;

/// Footer widget showing keyboard hints and session stats
pub struct Footer<'a> {
    mode: AppMode,
    marked: usize,
    theme: &'a Theme,
    session_stats: &'a SessionStats,
}

impl<'a> Footer<'a> {
    pub fn new(
        mode: AppMode,
        marked: usize,
        theme: &'a Theme,
        session_stats: &'a SessionStats,
    ) -> Self {
        Self {
            mode,
            marked,
            theme,
            session_stats,
        }
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 1 {
            return;
        }

        let hints: Vec<(&str, &str)> = match self.mode {
            AppMode::Scanning => vec![("↑↓", "Navigate"), ("s", "Stop"), ("q", "Quit")],
            AppMode::Browsing => vec![
                ("↑↓", "Navigate"),
                ("Space", "Mark"),
                ("a", "Mark all"),
                ("d", "Remove"),
                ("D", "Remove (depth)"),
                ("r", "Rescan"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
            AppMode::Help => vec![("Esc", "Close help"), ("q", "Close")],
            AppMode::ConfirmRemove => vec![("y", "Yes"), ("n", "Cancel")],
            AppMode::Removing => vec![("s", "Stop"), ("q", "Quit")],
        };

        let key_style = Style::default()
            .fg(self.theme.fg)
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(self.theme.fg_dim);
        let sep_style = Style::default().fg(self.theme.border);

        let mut x = area.x + 1;
        for (i, (key, desc)) in hints.iter().enumerate() {
            buf.set_string(x, area.y, *key, key_style);
            x += key.chars().count() as u16 + 1;

            buf.set_string(x, area.y, *desc, desc_style);
            x += desc.chars().count() as u16;

            if i < hints.len() - 1 {
                buf.set_string(x, area.y, "  │  ", sep_style);
                x += 5;
            }

            if x >= area.x + area.width - 5 {
                break;
            }
        }

        // Right side: marked rows, then freed space once anything was removed
        let mut right = Vec::new();
        if self.marked > 0 {
            right.push(format!("{} marked", self.marked));
        }
        if self.session_stats.items_removed > 0 || self.session_stats.bytes_freed > 0 {
            right.push(format!(
                "Freed: {} ({} item{})",
                format_size(self.session_stats.bytes_freed),
                self.session_stats.items_removed,
                if self.session_stats.items_removed == 1 {
                    ""
                } else {
                    "s"
                }
            ));
        }
        if right.is_empty() {
            return;
        }

        let text = right.join("  ");
        let text_x = area.x + area.width.saturating_sub(text.chars().count() as u16 + 1);
        if text_x > x + 2 {
            buf.set_string(
                text_x,
                area.y,
                &text,
                Style::default()
                    .fg(self.theme.green)
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}
