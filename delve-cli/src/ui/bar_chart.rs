/// Unicode partial block characters for smooth bars
const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render a bar `width` cells wide, filled to `percentage`
pub fn render_bar(percentage: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    let filled = (percentage.clamp(0.0, 100.0) / 100.0) * width as f64;
    let full_blocks = (filled.floor() as usize).min(width);
    let partial = ((filled - full_blocks as f64) * 8.0).round() as usize;

    let mut bar: String = std::iter::repeat_n(BLOCKS[8], full_blocks).collect();
    if full_blocks < width && partial > 0 {
        bar.push(BLOCKS[partial.min(8)]);
    }

    let padding = width - bar.chars().count();
    bar.extend(std::iter::repeat_n(' ', padding));
    bar
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_always_fills_width() {
        for pct in [0.0, 12.5, 50.0, 99.9, 100.0, 250.0, -5.0] {
            assert_eq!(render_bar(pct, 10).chars().count(), 10);
        }
    }

    #[test]
    fn test_bar_extremes() {
        assert!(render_bar(0.0, 8).chars().all(|c| c == ' '));
        assert!(render_bar(100.0, 8).chars().all(|c| c == '█'));
        assert_eq!(render_bar(50.0, 4), "██  ");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(5, 0), 0.0);
    }
}
