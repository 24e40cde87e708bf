//! Shared formatting utilities for the rigdash views.

/// Format a chart axis value.
///
/// Integer values display without decimal places, others with one or two.
pub fn format_value(value: f64) -> String {
    if value.abs() >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else if (value * 10.0 - (value * 10.0).round()).abs() < 1e-9 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Format the age of the last snapshot.
///
/// Returns strings like "just now", "5s ago", "3m ago", "2h ago".
pub fn format_age(age_ms: i64) -> String {
    if age_ms < 1000 {
        "just now".to_string()
    } else if age_ms < 60_000 {
        format!("{}s ago", age_ms / 1000)
    } else if age_ms < 3_600_000 {
        format!("{}m ago", age_ms / 60_000)
    } else {
        format!("{}h ago", age_ms / 3_600_000)
    }
}

pub fn format_device_count(count: usize) -> String {
    match count {
        1 => "1 device".to_string(),
        n => format!("{} devices", n),
    }
}

/// Current Unix time in milliseconds.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(0.6 * 4.0), "2.4");
        assert_eq!(format_value(72.0), "72");
        assert_eq!(format_value(1.25), "1.25");
        assert_eq!(format_value(6000.0), "6.0K");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(0), "just now");
        assert_eq!(format_age(30_000), "30s ago");
        assert_eq!(format_age(300_000), "5m ago");
        assert_eq!(format_age(7_200_000), "2h ago");
    }

    #[test]
    fn test_format_device_count() {
        assert_eq!(format_device_count(0), "0 devices");
        assert_eq!(format_device_count(1), "1 device");
        assert_eq!(format_device_count(3), "3 devices");
    }
}
