use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Typed by the local user.
    Own,
    /// Received from the assistant.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub origin: Origin,
    pub timestamp: String,
    pub text: String,
    /// Inbound `type` tag such as `greeting` or `answer`.
    pub kind: Option<String>,
    pub lines: Vec<String>,
}

impl TranscriptEntry {
    /// Lines to display: the explicit `lines` when present, else `text` split on newlines.
    pub fn display_lines(&self) -> Vec<&str> {
        if self.lines.is_empty() {
            self.text.lines().collect()
        } else {
            self.lines.iter().map(String::as_str).collect()
        }
    }
}

/// The single in-flight status message. Never enters the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressIndicator {
    pub timestamp: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredValue {
    pub value: String,
    /// Always formatted with exactly three decimals.
    pub score: String,
}

impl ScoredValue {
    pub fn new(value: impl Into<String>, score: f64) -> Self {
        Self {
            value: value.into(),
            score: format_score(score),
        }
    }
}

/// Category to candidate values, in the order the server listed them.
pub type ScoredStateMap = IndexMap<String, Vec<ScoredValue>>;

/// Formats a score with exactly three decimals.
///
/// Exact halfway values round away from zero (`0.0625` gives `0.063`) and
/// negative zero prints as `0.000`. `{:.3}` alone rounds ties to even.
pub fn format_score(score: f64) -> String {
    // `-0.0 == 0.0`, so this also folds negative zero
    let score = if score == 0.0 { 0.0 } else { score };
    if !score.is_finite() {
        return format!("{:.3}", score);
    }

    // Exact decimal expansion; an f64 has at most 1074 fractional digits.
    let exact = format!("{:.1074}", score.abs());
    let Some((int_part, frac)) = exact.split_once('.') else {
        return format!("{:.3}", score);
    };
    let (kept, rest) = frac.split_at(3);
    let is_tie = rest.starts_with('5') && rest[1..].bytes().all(|b| b == b'0');
    if !is_tie {
        return format!("{:.3}", score);
    }

    let mut digits: Vec<u8> = int_part.bytes().chain(kept.bytes()).collect();
    let mut i = digits.len();
    loop {
        if i == 0 {
            digits.insert(0, b'1');
            break;
        }
        i -= 1;
        if digits[i] == b'9' {
            digits[i] = b'0';
        } else {
            digits[i] += 1;
            break;
        }
    }

    let digits = String::from_utf8_lossy(&digits);
    let (int_digits, frac_digits) = digits.split_at(digits.len() - 3);
    let sign = if score < 0.0 { "-" } else { "" };
    format!("{sign}{int_digits}.{frac_digits}")
}

/// Deployment flavour of the client; each adds features on top of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Transcript and progress only.
    Basic,
    /// Adds the scored state map and feedback controls.
    Feedback,
    /// Adds the accuracy estimate.
    #[default]
    Full,
}

impl Variant {
    pub fn features(self) -> Features {
        match self {
            Variant::Basic => Features {
                state_map: false,
                feedback: false,
                accuracy: false,
            },
            Variant::Feedback => Features {
                state_map: true,
                feedback: true,
                accuracy: false,
            },
            Variant::Full => Features {
                state_map: true,
                feedback: true,
                accuracy: true,
            },
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Basic => write!(f, "basic"),
            Variant::Feedback => write!(f, "feedback"),
            Variant::Full => write!(f, "full"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub state_map: bool,
    pub feedback: bool,
    pub accuracy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.5, "0.500")]
    #[case(0.33333, "0.333")]
    #[case(1.0, "1.000")]
    #[case(0.0, "0.000")]
    #[case(12.34567, "12.346")]
    #[case(0.0625, "0.063")]
    #[case(0.3125, "0.313")]
    #[case(0.9375, "0.938")]
    #[case(-0.0625, "-0.063")]
    #[case(-0.0, "0.000")]
    #[case(0.0005, "0.001")]
    fn test_format_score(#[case] score: f64, #[case] expected: &str) {
        assert_eq!(format_score(score), expected);
    }

    #[test]
    fn test_variants_are_cumulative() {
        let basic = Variant::Basic.features();
        assert!(!basic.state_map && !basic.feedback && !basic.accuracy);

        let feedback = Variant::Feedback.features();
        assert!(feedback.state_map && feedback.feedback && !feedback.accuracy);

        assert_eq!(
            Variant::Full.features(),
            Features {
                state_map: true,
                feedback: true,
                accuracy: true
            }
        );
        assert_eq!(Variant::default(), Variant::Full);
    }

    #[test]
    fn test_display_lines_prefers_explicit_lines() {
        let entry = TranscriptEntry {
            origin: Origin::Other,
            timestamp: "09:15".into(),
            text: "one\ntwo".into(),
            kind: None,
            lines: vec![],
        };
        assert_eq!(entry.display_lines(), vec!["one", "two"]);

        let entry = TranscriptEntry {
            lines: vec!["a".into(), "b".into(), "c".into()],
            ..entry
        };
        assert_eq!(entry.display_lines(), vec!["a", "b", "c"]);
    }
}
