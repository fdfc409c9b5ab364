use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use super::layout::centered_rect;
use super::theme::Theme;

const HELP_ITEMS: &[(&str, &str, bool)] = &[
    ("", "Navigation", true),
    ("↑ k", "Move up", false),
    ("↓ j", "Move down", false),
    ("PgUp/PgDn", "Page up/down", false),
    ("Home g", "Go to first", false),
    ("End G", "Go to last", false),
    ("", "", false),
    ("", "Selection", true),
    ("Space", "Mark / unmark row", false),
    ("a", "Mark all rows", false),
    ("Esc", "Clear marks", false),
    ("", "", false),
    ("", "Actions", true),
    ("d", "Remove marked (whole folders)", false),
    ("D", "Remove marked (depth-limited)", false),
    ("s", "Stop scan or removal", false),
    ("r", "Scan again", false),
    ("", "", false),
    ("", "Other", true),
    ("?", "Toggle this help", false),
    ("q Ctrl+C", "Quit", false),
];

/// Help overlay widget
pub struct HelpView<'a> {
    theme: &'a Theme,
}

impl<'a> HelpView<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let help_area = centered_rect(50, HELP_ITEMS.len() as u16 + 4, area);
        Clear.render(help_area, buf);

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.blue))
            .style(Style::default().bg(self.theme.bg_surface))
            .padding(Padding::uniform(1));

        let inner = block.inner(help_area);
        block.render(help_area, buf);

        let key_style = Style::default()
            .fg(self.theme.yellow)
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(self.theme.fg);
        let section_style = Style::default()
            .fg(self.theme.blue)
            .add_modifier(Modifier::BOLD);

        for (i, (key, desc, is_section)) in HELP_ITEMS.iter().enumerate() {
            if i >= inner.height as usize {
                break;
            }
            let y = inner.y + i as u16;

            if *is_section {
                buf.set_string(inner.x, y, *desc, section_style);
            } else if !key.is_empty() {
                buf.set_string(inner.x, y, format!("{:12}", key), key_style);
                buf.set_string(inner.x + 12, y, *desc, desc_style);
            }
        }
    }
}
