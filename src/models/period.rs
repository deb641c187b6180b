use serde::{Deserialize, Serialize};

/// Phase of a match, in the only order a match can move through them
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    #[default]
    NotStarted,
    FirstHalf,
    HalfTime,
    SecondHalf,
    FullTime,
    ExtraFirst,
    ExtraHalf,
    ExtraSecond,
    MatchOver,
}

impl Period {
    /// All periods in match order
    pub const ORDER: [Period; 9] = [
        Period::NotStarted,
        Period::FirstHalf,
        Period::HalfTime,
        Period::SecondHalf,
        Period::FullTime,
        Period::ExtraFirst,
        Period::ExtraHalf,
        Period::ExtraSecond,
        Period::MatchOver,
    ];

    /// Whether events may be recorded during this period
    pub fn is_playing(&self) -> bool {
        matches!(
            self,
            Period::FirstHalf | Period::SecondHalf | Period::ExtraFirst | Period::ExtraSecond
        )
    }

    pub fn is_extra_time(&self) -> bool {
        matches!(
            self,
            Period::ExtraFirst | Period::ExtraHalf | Period::ExtraSecond
        )
    }

    /// Period entered by a manual start from this one, if any.
    ///
    /// Going from full time into extra time requires extra time to be configured.
    pub fn start_target(&self, extra_time: bool) -> Option<Period> {
        match self {
            Period::NotStarted => Some(Period::FirstHalf),
            Period::HalfTime => Some(Period::SecondHalf),
            Period::FullTime if extra_time => Some(Period::ExtraFirst),
            Period::ExtraHalf => Some(Period::ExtraSecond),
            _ => None,
        }
    }

    /// Period that follows this one when it is ended.
    ///
    /// Without extra time the three extra-time periods are skipped and the
    /// match goes straight to `MatchOver`.
    pub fn next(&self, extra_time: bool) -> Option<Period> {
        let index = Self::ORDER.iter().position(|p| p == self)?;
        let next = *Self::ORDER.get(index + 1)?;

        if next.is_extra_time() && !extra_time {
            Some(Period::MatchOver)
        } else {
            Some(next)
        }
    }

    /// Periods whose play begins as soon as the preceding break is ended
    pub fn auto_starts(&self) -> bool {
        matches!(self, Period::SecondHalf | Period::ExtraSecond)
    }

    pub fn is_terminal(&self) -> bool {
        *self == Period::MatchOver
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::NotStarted => "Not Started",
            Period::FirstHalf => "First Half",
            Period::HalfTime => "Half Time",
            Period::SecondHalf => "Second Half",
            Period::FullTime => "Full Time",
            Period::ExtraFirst => "Extra Time First Half",
            Period::ExtraHalf => "Extra Time Half Time",
            Period::ExtraSecond => "Extra Time Second Half",
            Period::MatchOver => "Match Over",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
