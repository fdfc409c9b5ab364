use std::collections::HashSet;

use delve_core::{EntryId, ItemKind, format_size};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::app::ResultRow;

use super::bar_chart::{percentage, render_bar};
use super::layout::truncate_left;
use super::theme::{Theme, kind_icon};

/// Flat list of found items in arrival order
pub struct ResultsView<'a> {
    rows: &'a [ResultRow],
    selected_index: usize,
    scroll_offset: usize,
    marked: &'a HashSet<EntryId>,
    largest: u64,
    theme: &'a Theme,
}

impl<'a> ResultsView<'a> {
    pub fn new(
        rows: &'a [ResultRow],
        selected_index: usize,
        scroll_offset: usize,
        marked: &'a HashSet<EntryId>,
        largest: u64,
        theme: &'a Theme,
    ) -> Self {
        Self {
            rows,
            selected_index,
            scroll_offset,
            marked,
            largest,
            theme,
        }
    }
}

impl Widget for ResultsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 40 {
            return;
        }

        if self.rows.is_empty() {
            let msg = "No matching items";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            buf.set_string(x, y, msg, Style::default().fg(self.theme.fg_dim));
            return;
        }

        let bar_width: usize = 16;
        let size_width: usize = 10;
        let right_width = bar_width + size_width + 2;
        let path_width = (area.width as usize).saturating_sub(right_width + 5);
        let right_x = area.x + area.width - right_width as u16;

        for (i, row) in self
            .rows
            .iter()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            let is_cursor = i + self.scroll_offset == self.selected_index;
            let is_marked = self.marked.contains(&row.id);

            let bg = if is_cursor {
                self.theme.selection_bg
            } else if is_marked {
                self.theme.bg_highlight
            } else {
                self.theme.bg
            };
            // Cursor row uses one style for every cell
            let styled = |fg: Color| {
                if is_cursor {
                    Style::default().bg(bg).fg(self.theme.selection_fg)
                } else {
                    Style::default().bg(bg).fg(fg)
                }
            };

            buf.set_string(area.x, y, " ".repeat(area.width as usize), styled(self.theme.fg));

            let mut x = area.x;
            if is_marked {
                buf.set_string(x, y, "▪", styled(self.theme.purple));
            }
            x += 2;

            buf.set_string(x, y, kind_icon(row.kind), styled(self.theme.kind_color(row.kind)));
            x += 2;

            let display_path = truncate_left(&row.relative_path, path_width);
            buf.set_string(x, y, &display_path, styled(self.theme.fg));

            // Directories and symlinks carry no size of their own
            if row.kind != ItemKind::File {
                continue;
            }

            let pct = percentage(row.size, self.largest);
            let bar = render_bar(pct, bar_width);
            buf.set_string(right_x, y, &bar, styled(self.theme.size_color(pct)));

            let size_str = format!("{:>9}", format_size(row.size));
            buf.set_string(
                right_x + bar_width as u16 + 1,
                y,
                &size_str,
                styled(self.theme.fg_muted),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn row(id: EntryId, name: &str, kind: ItemKind, size: u64) -> ResultRow {
        ResultRow {
            id,
            path: PathBuf::from("/data").join(name),
            relative_path: name.to_string(),
            kind,
            size,
        }
    }

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_rows_render_paths_and_sizes() {
        let rows = vec![
            row(0, "big.bin", ItemKind::File, 2048),
            row(1, "sub", ItemKind::Directory, 0),
        ];
        let marked = HashSet::from([1]);
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 3);
        let mut buf = Buffer::empty(area);

        ResultsView::new(&rows, 0, 0, &marked, 2048, &theme).render(area, &mut buf);

        let first = line(&buf, 0);
        assert!(first.contains("big.bin"));
        assert!(first.contains("2.0 KB"));
        let second = line(&buf, 1);
        assert!(second.starts_with("▪"));
        assert!(second.contains("sub"));
        assert!(!second.contains(" B"));
    }

    #[test]
    fn test_empty_results_message() {
        let theme = Theme::default();
        let marked = HashSet::new();
        let area = Rect::new(0, 0, 60, 5);
        let mut buf = Buffer::empty(area);

        ResultsView::new(&[], 0, 0, &marked, 0, &theme).render(area, &mut buf);

        assert!(line(&buf, 2).contains("No matching items"));
    }
}
