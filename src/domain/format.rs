use super::task::TaskSession;

/// Format a second count as "MM:SS" (minutes are not capped, e.g. "125:07")
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Text shown under the dial: remaining time, or "+MM:SS" once in overtime
pub fn clock_display(remaining: u64, overtime: u64) -> String {
    if remaining > 0 {
        format_clock(remaining)
    } else {
        format!("+{}", format_clock(overtime))
    }
}

/// Format a cumulative duration as "Xh Ym" (omits 0 values, seconds truncated)
pub fn format_cumulative(total_ms: u64) -> String {
    if total_ms == 0 {
        return "0m".to_string();
    }

    let total_minutes = total_ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours == 0 {
        format!("{}m", minutes)
    } else if minutes == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

/// Total time across closed sessions, in milliseconds. Open sessions are ignored.
pub fn total_session_ms(sessions: &[TaskSession]) -> u64 {
    sessions
        .iter()
        .filter_map(|s| s.duration())
        .map(|d| d.num_milliseconds().max(0) as u64)
        .sum()
}

/// Cumulative time for a task as display text
pub fn cumulative_time(sessions: &[TaskSession]) -> String {
    format_cumulative(total_session_ms(sessions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(3661), "61:01");
        assert_eq!(format_clock(125 * 60 + 7), "125:07");
    }

    #[test]
    fn test_clock_display() {
        assert_eq!(clock_display(300, 0), "05:00");
        assert_eq!(clock_display(0, 5), "+00:05");
        // Exact boundary reads as zero overtime
        assert_eq!(clock_display(0, 0), "+00:00");
    }

    #[test]
    fn test_format_cumulative() {
        assert_eq!(format_cumulative(0), "0m");
        assert_eq!(format_cumulative(30 * 60_000), "30m");
        assert_eq!(format_cumulative(2 * 3_600_000), "2h");
        assert_eq!(format_cumulative(80 * 60_000), "1h 20m");
        // 59 seconds are truncated, never rounded up
        assert_eq!(format_cumulative(119_000), "1m");
        assert_eq!(format_cumulative(59_000), "0m");
    }

    #[test]
    fn test_total_session_ms_ignores_open_sessions() {
        let sessions = vec![
            TaskSession {
                start: at("2024-01-01T10:00:00Z"),
                end: Some(at("2024-01-01T10:20:00Z")),
            },
            TaskSession {
                start: at("2024-01-01T11:00:00Z"),
                end: None,
            },
            TaskSession {
                start: at("2024-01-01T12:00:00Z"),
                end: Some(at("2024-01-01T12:15:00Z")),
            },
        ];

        assert_eq!(total_session_ms(&sessions), 35 * 60_000);
        assert_eq!(cumulative_time(&sessions), "35m");
        assert_eq!(total_session_ms(&[]), 0);
    }
}
