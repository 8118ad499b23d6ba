//! Display helpers for times and chapter names

/// Formats a millisecond offset for display next to a progress bar
///
/// When `duration_ms` is under an hour the hours are omitted (`MM:SS`),
/// otherwise `H:MM:SS` is used so that both labels line up.
pub fn format_time(ms: u64, duration_ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;

    if duration_ms / 1000 / 3600 == 0 {
        format!("{:02}:{:02}", minutes, seconds)
    } else {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Normalises a chapter name to `"N - Title"` where N is the 1-based index
///
/// A single leading zero is stripped first, so `"01 Intro"` at index 0
/// becomes `"1 - Intro"`.
pub fn chapter_display_name(index: usize, name: &str) -> String {
    let name = name.strip_prefix('0').unwrap_or(name);
    let number = (index + 1).to_string();
    let prefix = format!("{} - ", number);

    if name.starts_with(&prefix) {
        name.to_string()
    } else if let Some(rest) = name.strip_prefix(number.as_str()) {
        format!("{}{}", prefix, rest.trim_start())
    } else {
        format!("{}{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_short_duration() {
        assert_eq!(format_time(125_000, 600_000), "02:05");
        assert_eq!(format_time(0, 0), "00:00");
    }

    #[test]
    fn test_format_time_long_duration() {
        assert_eq!(format_time(3_665_000, 7_200_000), "1:01:05");
        assert_eq!(format_time(5_000, 3_600_000), "0:00:05");
    }

    #[test]
    fn test_chapter_name_already_formatted() {
        assert_eq!(chapter_display_name(2, "3 - Arrival"), "3 - Arrival");
    }

    #[test]
    fn test_chapter_name_number_without_separator() {
        assert_eq!(chapter_display_name(0, "01 Intro"), "1 - Intro");
        assert_eq!(chapter_display_name(4, "5Departure"), "5 - Departure");
    }

    #[test]
    fn test_chapter_name_without_number() {
        assert_eq!(chapter_display_name(0, "Prologue"), "1 - Prologue");
    }

    #[test]
    fn test_chapter_name_strips_one_leading_zero() {
        assert_eq!(chapter_display_name(9, "010 - End"), "10 - End");
    }
}
