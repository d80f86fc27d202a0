//! Human-readable elapsed time for run summaries

use std::time::Duration;

/// Threshold below which seconds are shown with two decimals
const SHORT_FORMAT_MAX: u64 = 100;
/// Threshold below which `M:SS.Xs` is used
const MEDIUM_FORMAT_MAX: u64 = 6000;

/// Format an elapsed duration
///
/// - `< 100s`: `X.XXs`
/// - `< 100m`: `M:SS.Xs`
/// - otherwise: `H:MM:SS`
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use photofix_common::human_time::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_millis(4500)), "4.50s");
/// assert_eq!(format_elapsed(Duration::from_secs(330)), "5:30.0s");
/// assert_eq!(format_elapsed(Duration::from_secs(7261)), "2:01:01");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();

    if secs < SHORT_FORMAT_MAX {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else if secs < MEDIUM_FORMAT_MAX {
        let minutes = secs / 60;
        let rem = elapsed.as_secs_f64() - (minutes * 60) as f64;
        format!("{}:{:04.1}s", minutes, rem)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}:{:02}:{:02}", hours, mins, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_format() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0.00s");
        assert_eq!(format_elapsed(Duration::from_secs(45)), "45.00s");
    }

    #[test]
    fn test_medium_format() {
        assert_eq!(format_elapsed(Duration::from_secs(100)), "1:40.0s");
        assert_eq!(format_elapsed(Duration::from_secs(120)), "2:00.0s");
    }

    #[test]
    fn test_long_format() {
        assert_eq!(format_elapsed(Duration::from_secs(6000)), "1:40:00");
        assert_eq!(format_elapsed(Duration::from_secs(3661 * 2)), "2:02:02");
    }
}
