//! Playback clock formatting.

/// Format a millisecond count as `SS`, `MM:SS` or `HH:MM:SS`.
///
/// The hours field is dropped when it is zero, and the minutes field only
/// when hours and minutes are both zero. Every field is two digits wide;
/// sub-second remainders are truncated.
///
/// # Examples
///
/// ```
/// use lesson_tracker::time_format::format_time;
///
/// assert_eq!(format_time(0), "00");
/// assert_eq!(format_time(60_000), "01:00");
/// assert_eq!(format_time(3_661_000), "01:01:01");
/// ```
pub fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{:02}:{:02}", minutes, seconds)
    } else {
        format!("{:02}", seconds)
    }
}

/// Parse a clock typed by the user into milliseconds.
///
/// Accepts the forms [`format_time`] produces, plus unpadded fields:
/// `SS`, `MM:SS` or `HH:MM:SS`. Returns `None` for anything else.
pub fn parse_time(input: &str) -> Option<u64> {
    let fields: Vec<&str> = input.trim().split(':').collect();
    if fields.len() > 3 {
        return None;
    }

    let mut total_secs: u64 = 0;
    for (i, field) in fields.iter().enumerate() {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u64 = field.parse().ok()?;
        // Only the leading field may exceed 59
        if i > 0 && value > 59 {
            return None;
        }
        total_secs = total_secs.checked_mul(60)?.checked_add(value)?;
    }
    total_secs.checked_mul(1000)
}
