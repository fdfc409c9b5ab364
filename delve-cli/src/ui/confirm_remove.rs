use delve_core::{RemovalPolicy, format_size};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::PendingRemoval;

use super::layout::{centered_rect, truncate_left};
use super::theme::Theme;

const MAX_LISTED: usize = 5;

/// Short description of what a policy does to folders
pub fn policy_label(policy: RemovalPolicy) -> String {
    match policy {
        RemovalPolicy::Unlimited => "Folders are removed with everything inside".to_string(),
        RemovalPolicy::Limited { max_depth: None } => {
            "Folders are emptied completely, then removed".to_string()
        }
        RemovalPolicy::Limited { max_depth: Some(0) } => {
            "Folders are kept; only files and links are removed".to_string()
        }
        RemovalPolicy::Limited {
            max_depth: Some(depth),
        } => format!(
            "Files up to {} level{} deep are removed; emptied folders go too",
            depth,
            if depth == 1 { "" } else { "s" }
        ),
    }
}

/// Removal confirmation dialog
pub struct ConfirmRemoveView<'a> {
    pending: &'a PendingRemoval,
    theme: &'a Theme,
}

impl<'a> ConfirmRemoveView<'a> {
    pub fn new(pending: &'a PendingRemoval, theme: &'a Theme) -> Self {
        Self { pending, theme }
    }
}

impl Widget for ConfirmRemoveView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let entries = &self.pending.entries;
        let count = entries.len();
        let show_count = count.min(MAX_LISTED);
        let has_more = count > MAX_LISTED;

        // header + paths + "...and N more" + blank + policy + total + blank + hints
        let content_lines = 1 + show_count + usize::from(has_more) + 5;
        let dialog_area = centered_rect(64, content_lines as u16 + 4, area);

        Clear.render(dialog_area, buf);

        let block = Block::default()
            .title(" Remove? ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.red))
            .style(Style::default().bg(self.theme.bg_surface))
            .padding(Padding::uniform(1));

        let inner = block.inner(dialog_area);
        block.render(dialog_area, buf);

        if inner.width < 10 || inner.height < 2 {
            return;
        }

        let text_style = Style::default().fg(self.theme.fg);
        let path_style = Style::default()
            .fg(self.theme.yellow)
            .add_modifier(Modifier::BOLD);
        let dim_style = Style::default().fg(self.theme.fg_dim);
        let key_style = Style::default()
            .fg(self.theme.green)
            .add_modifier(Modifier::BOLD);

        let max_w = inner.width as usize - 2;
        let bottom = inner.y + inner.height;
        let mut row = inner.y;

        let header = format!("Remove {} item{}:", count, if count == 1 { "" } else { "s" });
        buf.set_string(inner.x, row, &header, text_style);
        row += 1;

        for entry in entries.iter().take(show_count) {
            if row >= bottom {
                break;
            }
            let display_path = truncate_left(&entry.path.to_string_lossy(), max_w);
            buf.set_string(inner.x + 1, row, &display_path, path_style);
            row += 1;
        }

        if has_more && row < bottom {
            let more_text = format!("  ...and {} more", count - MAX_LISTED);
            buf.set_string(inner.x, row, &more_text, dim_style);
            row += 1;
        }

        row += 1;
        if row < bottom {
            let label = truncate_left(&policy_label(self.pending.policy), max_w);
            buf.set_string(inner.x, row, &label, dim_style);
            row += 1;
        }
        if row < bottom {
            let total_str = format!("Matched files: {}", format_size(self.pending.total_size));
            buf.set_string(inner.x, row, &total_str, text_style);
            row += 1;
        }

        let hints_y = row.max(bottom.saturating_sub(1));
        buf.set_string(inner.x, hints_y, "[y]", key_style);
        buf.set_string(inner.x + 4, hints_y, "Yes, remove", text_style);
        buf.set_string(inner.x + 18, hints_y, "[n]", key_style);
        buf.set_string(inner.x + 22, hints_y, "Cancel", text_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_labels() {
        assert!(policy_label(RemovalPolicy::Unlimited).contains("everything"));
        assert!(policy_label(RemovalPolicy::limited(-1)).contains("completely"));
        assert!(policy_label(RemovalPolicy::limited(0)).contains("kept"));
        assert!(policy_label(RemovalPolicy::limited(1)).contains("1 level deep"));
        assert!(policy_label(RemovalPolicy::limited(3)).contains("3 levels"));
    }
}
