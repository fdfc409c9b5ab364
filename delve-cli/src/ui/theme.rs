use delve_core::ItemKind;
use ratatui::style::Color;

/// Catppuccin Mocha-inspired dark theme with 24-bit RGB colors
pub struct Theme {
    // Base colors
    pub bg: Color,
    pub bg_surface: Color,
    pub bg_highlight: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub fg_muted: Color,

    // Accent colors
    pub blue: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
    pub purple: Color,
    pub teal: Color,

    // UI elements
    pub border: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Rgb(30, 30, 46),           // Base
            bg_surface: Color::Rgb(49, 50, 68),   // Surface0
            bg_highlight: Color::Rgb(69, 71, 90), // Surface1
            fg: Color::Rgb(205, 214, 244),        // Text
            fg_dim: Color::Rgb(166, 173, 200),    // Subtext0
            fg_muted: Color::Rgb(127, 132, 156),  // Overlay0

            blue: Color::Rgb(137, 180, 250),   // Blue
            green: Color::Rgb(166, 227, 161),  // Green
            yellow: Color::Rgb(249, 226, 175), // Yellow
            red: Color::Rgb(243, 139, 168),    // Red
            purple: Color::Rgb(203, 166, 247), // Mauve
            teal: Color::Rgb(148, 226, 213),   // Teal

            border: Color::Rgb(88, 91, 112),         // Surface2
            selection_bg: Color::Rgb(137, 180, 250), // Blue
            selection_fg: Color::Rgb(30, 30, 46),    // Base
        }
    }
}

impl Theme {
    /// Bar color for a file's share of the largest match (0-100)
    pub fn size_color(&self, percentage: f64) -> Color {
        if percentage < 30.0 {
            self.green
        } else if percentage < 70.0 {
            self.yellow
        } else {
            self.red
        }
    }

    /// Icon color by entry kind
    pub fn kind_color(&self, kind: ItemKind) -> Color {
        match kind {
            ItemKind::Directory => self.yellow,
            ItemKind::Symlink => self.teal,
            ItemKind::File => self.fg_dim,
        }
    }
}

/// Short glyph shown before each row
pub fn kind_icon(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Directory => "▸",
        ItemKind::Symlink => "↪",
        ItemKind::File => "·",
    }
}
