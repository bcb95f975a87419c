//! Translation context keys and their built-in (English) templates.
//!
//! Templates use `{name}` placeholders filled by
//! [`Translator::format`](lifeweeks_core::i18n::Translator::format).

/// Context key of the weekly summary title.
pub const WEEKLY_TITLE: &str = "notifications.weekly";

/// Default weekly summary title.
pub const WEEKLY_TITLE_DEFAULT: &str = "📊 Your weekly life statistics";

/// Context key of the weekly summary body.
pub const WEEKLY_BODY: &str = "weeks.statistics";

/// Default weekly summary body.
pub const WEEKLY_BODY_DEFAULT: &str = "📊 Your Life Statistics:\n\n\
    🎂 Birth Date: {birth_date}\n\
    📅 Age: {age} years\n\
    📈 Life Expectancy: {life_expectancy} years\n\
    🟩 Lived Weeks: {lived_weeks}\n\
    ⬜ Remaining Weeks: {remaining_weeks}\n\
    📊 Total Life Weeks: {total_weeks}\n\
    🎯 Progress: {progress_percent}%";

/// Context key of the milestone title.
pub const MILESTONE_TITLE: &str = "notifications.milestone";

/// Default milestone title.
pub const MILESTONE_TITLE_DEFAULT: &str = "🎉 Milestone reached!";

/// Context key of the milestone body.
pub const MILESTONE_BODY: &str = "notifications.milestone_body";

/// Default milestone body.
pub const MILESTONE_BODY_DEFAULT: &str =
    "Congratulations! You've reached a milestone: {milestone_type} = {milestone_value}";

/// Display format of dates inside message bodies.
pub const DATE_FORMAT: &str = "%d.%m.%Y";
