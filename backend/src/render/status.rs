use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Footer shown under every map, e.g.
/// `Last refreshed: 2024-05-01 08:00:00 (Last updated 3 seconds ago)`.
///
/// Before the first refresh the current time is shown as "just now".
pub fn status_line(refreshed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match refreshed_at {
        Some(at) => {
            let seconds_ago = now.signed_duration_since(at).num_seconds().max(0);
            format!(
                "Last refreshed: {} (Last updated {} seconds ago)",
                at.format(TIMESTAMP_FORMAT),
                seconds_ago
            )
        }
        None => format!(
            "Last refreshed: {} (Last updated just now)",
            now.format(TIMESTAMP_FORMAT)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_line_counts_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let now = at + chrono::Duration::seconds(3);
        assert_eq!(
            status_line(Some(at), now),
            "Last refreshed: 2024-05-01 08:00:00 (Last updated 3 seconds ago)"
        );
    }

    #[test]
    fn test_status_line_before_first_refresh() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert_eq!(
            status_line(None, now),
            "Last refreshed: 2024-05-01 08:00:00 (Last updated just now)"
        );
    }

    #[test]
    fn test_clock_skew_never_goes_negative() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let at = now + chrono::Duration::seconds(2);
        assert!(status_line(Some(at), now).contains("Last updated 0 seconds ago"));
    }
}
