use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main application layout
pub struct AppLayout {
    pub header: Rect,
    pub summary: Rect,
    pub list: Rect,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Length(1), // Summary / status line
                Constraint::Min(5),    // Results list
                Constraint::Length(1), // Footer
            ])
            .split(area);

        Self {
            header: chunks[0],
            summary: chunks[1],
            list: chunks[2],
            footer: chunks[3],
        }
    }
}

/// Fixed-size rectangle centered in `area`, shrunk to leave a margin
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;

    Rect::new(x, y, width, height)
}

/// Keep the tail of `text` so it fits in `max_len` columns
pub fn truncate_left(text: &str, max_len: usize) -> String {
    let len = text.chars().count();
    if len <= max_len {
        return text.to_string();
    }
    if max_len <= 3 {
        return ".".repeat(max_len);
    }
    let tail: String = text.chars().skip(len - (max_len - 3)).collect();
    format!("...{}", tail)
}
