//! Human-readable byte sizes.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with two decimals, dividing by 1024 per unit step.
///
/// Zero is rendered as `"0 B"`; anything beyond terabytes is shown in PB.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} PB", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(format_size(0), "0 B");
    }

    #[test]
    fn test_bytes() {
        assert_eq!(format_size(1), "1.00 B");
        assert_eq!(format_size(1023), "1023.00 B");
    }

    #[test]
    fn test_unit_steps() {
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024u64.pow(3)), "3.00 GB");
        assert_eq!(format_size(2 * 1024u64.pow(4)), "2.00 TB");
    }

    #[test]
    fn test_caps_at_petabytes() {
        assert_eq!(format_size(1024u64.pow(5)), "1.00 PB");
        assert_eq!(format_size(2048 * 1024u64.pow(5)), "2048.00 PB");
    }
}
