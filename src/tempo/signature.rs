// Time signature - the fixed set of meters offered by the practice metronome

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time signature (numerator/denominator)
/// Only the numerator drives scheduling, the denominator is display-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeSignature {
    TwoFour,
    ThreeFour,
    #[default]
    FourFour,
    SixEight,
}

/// Returned when a label is not one of the supported signatures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported time signature: {0}")]
pub struct SignatureParseError(pub String);

impl TimeSignature {
    /// Every supported signature, in display order
    pub const ALL: [TimeSignature; 4] = [
        TimeSignature::TwoFour,
        TimeSignature::ThreeFour,
        TimeSignature::FourFour,
        TimeSignature::SixEight,
    ];

    /// Number of beats per bar
    pub fn beats_per_bar(&self) -> u32 {
        match self {
            TimeSignature::TwoFour => 2,
            TimeSignature::ThreeFour => 3,
            TimeSignature::FourFour => 4,
            TimeSignature::SixEight => 6,
        }
    }

    /// Note value (4 = quarter note, 8 = eighth note)
    pub fn denominator(&self) -> u32 {
        match self {
            TimeSignature::SixEight => 8,
            _ => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeSignature::TwoFour => "2/4",
            TimeSignature::ThreeFour => "3/4",
            TimeSignature::FourFour => "4/4",
            TimeSignature::SixEight => "6/8",
        }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeSignature {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|sig| sig.label() == trimmed)
            .ok_or_else(|| SignatureParseError(trimmed.to_string()))
    }
}

impl TryFrom<String> for TimeSignature {
    type Error = SignatureParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSignature> for String {
    fn from(sig: TimeSignature) -> Self {
        sig.label().to_string()
    }
}
