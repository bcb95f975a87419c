//! User profile read model consumed by the notification backbone.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Notification-related preferences of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Preferred language code (e.g. `"en"`, `"ru"`).
    #[serde(default)]
    pub language: Option<String>,
    /// Expected life span in years.
    #[serde(default)]
    pub life_expectancy: Option<u32>,
    /// Whether periodic notifications are enabled.
    #[serde(default)]
    pub notifications_enabled: bool,
    /// Preferred notification weekday.
    #[serde(default)]
    pub notifications_day: Option<Weekday>,
    /// Preferred notification time of day.
    #[serde(default)]
    pub notifications_time: Option<NaiveTime>,
    /// IANA timezone name.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Current state of a user as seen by the notification backbone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Messaging platform user identifier.
    pub user_id: i64,
    /// Platform username.
    #[serde(default)]
    pub username: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Date of birth, if recorded.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Notification preferences.
    #[serde(default)]
    pub settings: UserSettings,
}

impl UserProfile {
    /// Creates a profile with no birth date and default settings.
    #[must_use]
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            username: None,
            first_name: None,
            birth_date: None,
            settings: UserSettings::default(),
        }
    }

    /// Returns the profile with `birth_date` set.
    #[must_use]
    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// Returns the profile with `language` set.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.settings.language = Some(language.into());
        self
    }

    /// Returns the profile with `life_expectancy` set.
    #[must_use]
    pub fn with_life_expectancy(mut self, years: u32) -> Self {
        self.settings.life_expectancy = Some(years);
        self
    }
}
