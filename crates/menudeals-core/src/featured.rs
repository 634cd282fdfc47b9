//! Per-weekday featured deal table.
//!
//! Loaded from YAML so operators can rotate promotions without a redeploy:
//!
//! ```yaml
//! days:
//!   monday: ["1", "2", "3"]
//!   wednesday: ["4", "11", "6"]
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::Weekday;
use serde::Deserialize;

use crate::config::read_yaml;
use crate::weekday::{weekday_name, DaySelector};
use crate::ConfigError;

/// Maximum number of deals pinned to the front of a day's list.
pub const MAX_FEATURED_PER_DAY: usize = 3;

#[derive(Debug, Deserialize)]
struct FeaturedFile {
    #[serde(default)]
    days: BTreeMap<String, Vec<String>>,
}

/// Ordered featured deal ids keyed by weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeaturedSchedule {
    by_day: HashMap<Weekday, Vec<String>>,
}

impl FeaturedSchedule {
    /// A schedule with no featured deals on any day.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build and validate a schedule from in-memory entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a day lists more than
    /// [`MAX_FEATURED_PER_DAY`] ids, a blank id, or the same id twice.
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (Weekday, Vec<String>)>,
    {
        let mut by_day = HashMap::new();
        for (day, ids) in entries {
            validate_day(day, &ids)?;
            if by_day.insert(day, ids).is_some() {
                return Err(ConfigError::Validation(format!(
                    "featured schedule lists {} more than once",
                    weekday_name(day)
                )));
            }
        }
        Ok(Self { by_day })
    }

    /// Featured ids for `day`, in display order. Empty when none configured.
    #[must_use]
    pub fn for_day(&self, day: Weekday) -> &[String] {
        self.by_day.get(&day).map_or(&[][..], Vec::as_slice)
    }
}

/// Load and validate the featured schedule from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, names an
/// unknown day, or fails validation.
pub fn load_featured(path: &Path) -> Result<FeaturedSchedule, ConfigError> {
    let file: FeaturedFile = read_yaml(path)?;
    let mut entries = Vec::with_capacity(file.days.len());
    for (raw_day, ids) in file.days {
        let day = match DaySelector::parse(&raw_day) {
            Some(DaySelector::Day(day)) => day,
            _ => {
                return Err(ConfigError::Validation(format!(
                    "featured schedule key '{raw_day}' is not a weekday name"
                )))
            }
        };
        entries.push((day, ids));
    }
    let schedule = FeaturedSchedule::from_entries(entries)?;
    tracing::debug!(path = %path.display(), days = schedule.by_day.len(), "loaded featured schedule");
    Ok(schedule)
}

fn validate_day(day: Weekday, ids: &[String]) -> Result<(), ConfigError> {
    if ids.len() > MAX_FEATURED_PER_DAY {
        return Err(ConfigError::Validation(format!(
            "{} has {} featured deals; at most {MAX_FEATURED_PER_DAY} allowed",
            weekday_name(day),
            ids.len()
        )));
    }

    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} has a blank featured deal id",
                weekday_name(day)
            )));
        }
        if !seen.insert(id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "{} lists featured deal '{id}' twice",
                weekday_name(day)
            )));
        }
    }
    Ok(())
}
