//! Day selection: resolving "Today" against a clock and building the
//! seven-slot day strip shown above the deal list.

use chrono::{DateTime, Datelike, FixedOffset, Utc, Weekday};
use serde::{Serialize, Serializer};

/// Label used for the current day in the day strip and as a selector value.
pub const TODAY_LABEL: &str = "Today";

const MONDAY_FIRST: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Source of the current moment, as observed in the market's timezone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn today(&self) -> Weekday {
        self.now().weekday()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

/// Wall clock shifted to a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    #[must_use]
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build from an offset in minutes east of UTC. Returns `None` when the
    /// offset is not within ±24h.
    #[must_use]
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Clock pinned to one moment.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Which day a discovery query asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DaySelector {
    #[default]
    Today,
    Day(Weekday),
}

impl DaySelector {
    /// Parse a selector case-insensitively. `None` for unrecognized input.
    ///
    /// Accepts `today`, full weekday names and chrono's three-letter forms.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(TODAY_LABEL) {
            return Some(Self::Today);
        }
        MONDAY_FIRST
            .iter()
            .find(|day| trimmed.eq_ignore_ascii_case(weekday_name(**day)))
            .copied()
            .or_else(|| trimmed.parse::<Weekday>().ok())
            .map(Self::Day)
    }

    /// The absolute weekday this selector names, given today's weekday.
    #[must_use]
    pub fn resolve(self, today: Weekday) -> Weekday {
        match self {
            Self::Today => today,
            Self::Day(day) => day,
        }
    }
}

impl Serialize for DaySelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Today => serializer.serialize_str(TODAY_LABEL),
            Self::Day(day) => serializer.serialize_str(weekday_name(*day)),
        }
    }
}

/// Full English name of a weekday.
#[must_use]
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Seven day labels for the day picker.
///
/// The strip opens on yesterday, except on Monday where it opens on today.
/// Today's slot reads [`TODAY_LABEL`].
#[must_use]
pub fn day_strip(today: Weekday) -> Vec<String> {
    let today_index = today.num_days_from_monday() as usize;
    let start = today_index.saturating_sub(1);

    (0..MONDAY_FIRST.len())
        .map(|offset| {
            let index = (start + offset) % MONDAY_FIRST.len();
            if index == today_index {
                TODAY_LABEL.to_string()
            } else {
                weekday_name(MONDAY_FIRST[index]).to_string()
            }
        })
        .collect()
}
