use std::{fmt, str::FromStr};

use serde::Serialize;

/// Garment sizes the classifier predicts, ordered by code 1..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SizeLabel {
    #[serde(rename = "XXS")]
    Xxs,
    S,
    M,
    L,
    #[serde(rename = "XL")]
    Xl,
    #[serde(rename = "XXL")]
    Xxl,
    #[serde(rename = "XXXL")]
    Xxxl,
}

impl SizeLabel {
    pub const ALL: [SizeLabel; 7] = [
        SizeLabel::Xxs,
        SizeLabel::S,
        SizeLabel::M,
        SizeLabel::L,
        SizeLabel::Xl,
        SizeLabel::Xxl,
        SizeLabel::Xxxl,
    ];

    /// Used by `code_for` when a label is not recognised.
    pub const FALLBACK: SizeLabel = SizeLabel::M;

    pub fn code(self) -> i64 {
        match self {
            SizeLabel::Xxs => 1,
            SizeLabel::S => 2,
            SizeLabel::M => 3,
            SizeLabel::L => 4,
            SizeLabel::Xl => 5,
            SizeLabel::Xxl => 6,
            SizeLabel::Xxxl => 7,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(SizeLabel::Xxs),
            2 => Some(SizeLabel::S),
            3 => Some(SizeLabel::M),
            4 => Some(SizeLabel::L),
            5 => Some(SizeLabel::Xl),
            6 => Some(SizeLabel::Xxl),
            7 => Some(SizeLabel::Xxxl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeLabel::Xxs => "XXS",
            SizeLabel::S => "S",
            SizeLabel::M => "M",
            SizeLabel::L => "L",
            SizeLabel::Xl => "XL",
            SizeLabel::Xxl => "XXL",
            SizeLabel::Xxxl => "XXXL",
        }
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown size label: {0}")]
pub struct UnknownSizeLabel(pub String);

impl FromStr for SizeLabel {
    type Err = UnknownSizeLabel;

    /// Case-insensitive exact match; whitespace is not stripped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSizeLabel(s.to_string()))
    }
}

/// Label for a model output code. Codes outside 1..=7 render as
/// `Size_<code>` so a misbehaving model still yields something displayable.
pub fn label_for(code: i64) -> String {
    match SizeLabel::from_code(code) {
        Some(label) => label.as_str().to_string(),
        None => format!("Size_{code}"),
    }
}

/// Code for a label, case-insensitive.
///
/// Unrecognised labels map to M (3). This is a deliberate middle-of-range
/// fallback, not an error path: callers never see a failure here.
pub fn code_for(label: &str) -> i64 {
    label
        .parse::<SizeLabel>()
        .unwrap_or(SizeLabel::FALLBACK)
        .code()
}
