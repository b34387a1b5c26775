//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! projector and exporters. Nothing in this crate reads environment variables; the
//! binaries do that and hand the raw values to [`CardConfig::from_env_values`].

use crate::constants::{DEFAULT_CATEGORY, DEFAULT_DATE_FORMAT};
use crate::{CardError, CardResult};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt::Write;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardConfig {
    category: String,
    date_format: String,
}

impl CardConfig {
    /// Create a new `CardConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CardError::InvalidInput` if `category` is blank and
    /// `CardError::InvalidDateFormat` if `date_format` is not a valid strftime pattern.
    pub fn new(category: impl Into<String>, date_format: impl Into<String>) -> CardResult<Self> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(CardError::InvalidInput("category cannot be empty".into()));
        }

        let date_format = date_format.into();
        validate_date_format(&date_format)?;

        Ok(Self {
            category: category.trim().to_string(),
            date_format,
        })
    }

    /// Build a config from optional raw values, falling back to the defaults for
    /// missing or blank entries.
    pub fn from_env_values(
        category: Option<String>,
        date_format: Option<String>,
    ) -> CardResult<Self> {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self::new(
            non_blank(category).unwrap_or_else(|| DEFAULT_CATEGORY.into()),
            non_blank(date_format).unwrap_or_else(|| DEFAULT_DATE_FORMAT.into()),
        )
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Format a calendar date with the configured locale pattern.
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.into(),
            date_format: DEFAULT_DATE_FORMAT.into(),
        }
    }
}

fn validate_date_format(format: &str) -> CardResult<()> {
    if format.trim().is_empty() {
        return Err(CardError::InvalidDateFormat(format.into()));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(CardError::InvalidDateFormat(format.into()));
    }
    // A date has no time or offset, so `%H` or `%z` fail at render time.
    let sample = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN);
    let mut rendered = String::new();
    write!(rendered, "{}", sample.format(format))
        .map_err(|_| CardError::InvalidDateFormat(format.into()))
}
