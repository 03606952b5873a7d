use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::Local;

use crate::error::{ChatError, Result};

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%H:%M";

/// Rejects strftime strings chrono cannot render, such as `%Q`.
pub fn validate_timestamp_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ChatError::Config(format!(
            "Invalid timestamp format '{}'",
            format
        )));
    }
    Ok(())
}

/// Source of the wall-clock stamps shown next to transcript entries.
pub trait Clock: Send {
    fn timestamp(&self) -> String;
}

pub struct LocalClock {
    format: String,
}

impl LocalClock {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl Clock for LocalClock {
    fn timestamp(&self) -> String {
        let now = Local::now();
        let mut stamp = String::new();
        if write!(stamp, "{}", now.format(&self.format)).is_err() {
            stamp = now.format(DEFAULT_TIMESTAMP_FORMAT).to_string();
        }
        stamp
    }
}

/// Clock that always reports the same stamp.
#[cfg(test)]
pub struct FixedClock(pub &'static str);

#[cfg(test)]
impl Clock for FixedClock {
    fn timestamp(&self) -> String {
        self.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_local_clock_formats_hours_and_minutes() {
        let stamp = LocalClock::default().timestamp();
        let (hours, minutes) = stamp.split_once(':').unwrap();
        assert_eq!(hours.len(), 2);
        assert_eq!(minutes.len(), 2);
        assert!(hours.parse::<u8>().unwrap() < 24);
        assert!(minutes.parse::<u8>().unwrap() < 60);
    }

    #[test]
    fn test_invalid_format_falls_back_to_default() {
        let stamp = LocalClock::new("%Q").timestamp();
        assert_eq!(stamp.len(), 5);
        assert_eq!(stamp.as_bytes()[2], b':');
    }

    #[rstest]
    #[case("%H:%M", true)]
    #[case("%Y-%m-%d %H:%M:%S", true)]
    #[case("at %l%P", true)]
    #[case("%Q", false)]
    #[case("%H:%", false)]
    fn test_validate_timestamp_format(#[case] format: &str, #[case] valid: bool) {
        assert_eq!(validate_timestamp_format(format).is_ok(), valid);
    }
}
