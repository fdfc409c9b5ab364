const UNITS: [(&str, u64); 4] = [
    ("TB", 1 << 40),
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("KB", 1 << 10),
];

/// Format bytes into a human-readable string (e.g. "1.5 MB")
pub fn format_size(bytes: u64) -> String {
    UNITS
        .iter()
        .find(|(_, scale)| bytes >= *scale)
        .map(|(unit, scale)| format!("{:.1} {}", bytes as f64 / *scale as f64, unit))
        .unwrap_or_else(|| format!("{} B", bytes))
}

/// Format a count with thousand separators (e.g. 1,234,567)
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 << 30), "3.0 GB");
        assert_eq!(format_size(1 << 40), "1.0 TB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(98765), "98,765");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
