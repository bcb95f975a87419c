//! Notification payload generation.
//!
//! The service reads a user's profile, derives life statistics and renders
//! localized, transport-agnostic [`NotificationPayload`]s. It never delivers
//! anything itself; gateways do.

use std::sync::Arc;

use lifeweeks_core::clock::Clock;
use lifeweeks_core::error::DomainError;
use lifeweeks_core::i18n::{Localizer, Translator};
use lifeweeks_core::notification::{
    MESSAGE_TYPE_MILESTONE, MESSAGE_TYPE_WEEKLY_SUMMARY, NotificationPayload,
};
use lifeweeks_core::profile::UserProfile;
use lifeweeks_core::repository::UserProfileRepository;
use lifeweeks_core::statistics::{DEFAULT_LIFE_EXPECTANCY, LifeCalculator, LifeStatistics};
use serde_json::json;
use tracing::{error, instrument, warn};

use crate::domain::messages;

/// Defaults applied when a profile does not set a preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Language used when the profile has none.
    pub default_language: String,
    /// Life expectancy used when the profile has none.
    pub default_life_expectancy: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            default_language: "ru".to_owned(),
            default_life_expectancy: DEFAULT_LIFE_EXPECTANCY,
        }
    }
}

/// Builds notification payloads from user data.
#[derive(Clone)]
pub struct NotificationService {
    users: Arc<dyn UserProfileRepository>,
    calculator: Arc<dyn LifeCalculator>,
    localizer: Arc<dyn Localizer>,
    clock: Arc<dyn Clock>,
    settings: NotificationSettings,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl NotificationService {
    /// Creates a service over the given ports.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserProfileRepository>,
        calculator: Arc<dyn LifeCalculator>,
        localizer: Arc<dyn Localizer>,
        clock: Arc<dyn Clock>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            users,
            calculator,
            localizer,
            clock,
            settings,
        }
    }

    /// Builds the weekly life statistics summary for `user_id`.
    ///
    /// Returns `None` when the user does not exist, has no birth date, or
    /// generation fails for any other reason; the cause is logged.
    #[instrument(skip(self))]
    pub async fn generate_weekly_summary(&self, user_id: i64) -> Option<NotificationPayload> {
        match self.build_weekly_summary(user_id).await {
            Ok(payload) => Some(payload),
            Err(err) => {
                log_generation_failure("weekly summary", user_id, &err);
                None
            }
        }
    }

    /// Builds a milestone notification for `user_id`.
    ///
    /// Returns `None` when the user does not exist or generation fails.
    #[instrument(skip(self))]
    pub async fn generate_milestone_notification(
        &self,
        user_id: i64,
        milestone_type: &str,
        milestone_value: i64,
    ) -> Option<NotificationPayload> {
        match self
            .build_milestone(user_id, milestone_type, milestone_value)
            .await
        {
            Ok(payload) => Some(payload),
            Err(err) => {
                log_generation_failure("milestone", user_id, &err);
                None
            }
        }
    }

    async fn load_user(&self, user_id: i64) -> Result<UserProfile, DomainError> {
        self.users
            .get_user_profile(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))
    }

    fn language_of<'a>(&'a self, user: &'a UserProfile) -> &'a str {
        user.settings
            .language
            .as_deref()
            .filter(|language| !language.trim().is_empty())
            .unwrap_or(&self.settings.default_language)
    }

    async fn build_weekly_summary(&self, user_id: i64) -> Result<NotificationPayload, DomainError> {
        let user = self.load_user(user_id).await?;
        let birth_date = user
            .birth_date
            .ok_or(DomainError::MissingBirthDate(user_id))?;
        let language = self.language_of(&user);
        let life_expectancy = user
            .settings
            .life_expectancy
            .unwrap_or(self.settings.default_life_expectancy);

        let stats = self.calculator.calculate(birth_date, life_expectancy)?;

        let translator = Translator::new(self.localizer.as_ref(), language);
        let title = translator.text(messages::WEEKLY_TITLE, messages::WEEKLY_TITLE_DEFAULT);
        let body = translator.format(
            messages::WEEKLY_BODY,
            messages::WEEKLY_BODY_DEFAULT,
            &[
                (
                    "birth_date",
                    birth_date.format(messages::DATE_FORMAT).to_string(),
                ),
                ("age", stats.age.to_string()),
                ("life_expectancy", stats.life_expectancy.to_string()),
                ("lived_weeks", stats.total_weeks_lived.to_string()),
                ("remaining_weeks", stats.remaining_weeks.to_string()),
                ("total_weeks", stats.total_weeks_expected.to_string()),
                ("progress_percent", progress_percent(&stats).to_string()),
            ],
        );

        Ok(NotificationPayload::new(
            user_id,
            MESSAGE_TYPE_WEEKLY_SUMMARY,
            title,
            body,
            self.clock.now(),
        )
        .with_metadata("language", json!(language))
        .with_metadata(
            "stats",
            json!({
                "age": stats.age,
                "life_expectancy": stats.life_expectancy,
                "lived_weeks": stats.total_weeks_lived,
                "remaining_weeks": stats.remaining_weeks,
                "total_weeks": stats.total_weeks_expected,
                "progress_percent": stats.percentage_lived,
            }),
        ))
    }

    async fn build_milestone(
        &self,
        user_id: i64,
        milestone_type: &str,
        milestone_value: i64,
    ) -> Result<NotificationPayload, DomainError> {
        let user = self.load_user(user_id).await?;
        let language = self.language_of(&user);

        let translator = Translator::new(self.localizer.as_ref(), language);
        let title = translator.text(messages::MILESTONE_TITLE, messages::MILESTONE_TITLE_DEFAULT);
        let body = translator.format(
            messages::MILESTONE_BODY,
            messages::MILESTONE_BODY_DEFAULT,
            &[
                ("milestone_type", milestone_type.to_owned()),
                ("milestone_value", milestone_value.to_string()),
            ],
        );

        Ok(NotificationPayload::new(
            user_id,
            MESSAGE_TYPE_MILESTONE,
            title,
            body,
            self.clock.now(),
        )
        .with_metadata("milestone_type", json!(milestone_type))
        .with_metadata("milestone_value", json!(milestone_value))
        .with_metadata("language", json!(language)))
    }
}

/// Whole percent of life lived, truncated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn progress_percent(stats: &LifeStatistics) -> u32 {
    (stats.percentage_lived.clamp(0.0, 1.0) * 100.0) as u32
}

fn log_generation_failure(kind: &str, user_id: i64, err: &DomainError) {
    match err {
        DomainError::UserNotFound(_) | DomainError::MissingBirthDate(_) => {
            warn!(user_id, error = %err, "cannot generate {kind}");
        }
        _ => {
            error!(user_id, error = %err, "failed to generate {kind}");
        }
    }
}
