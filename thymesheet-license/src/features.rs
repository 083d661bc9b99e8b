//! Feature gating table.
//!
//! Every gated capability maps to the lowest tier that unlocks it. The table
//! is fixed at build time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level that gates features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Premium,
}

impl Tier {
    /// Returns true if this tier satisfies `required`.
    #[must_use]
    pub fn allows(self, required: Tier) -> bool {
        self >= required
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Free => "free",
            Self::Premium => "premium",
        })
    }
}

/// Error returned when a feature id is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature: {0}")]
pub struct UnknownFeature(pub String);

macro_rules! feature_table {
    ($($variant:ident => $id:literal, $tier:ident;)+) => {
        /// A gated application capability.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum Feature {
            $($variant,)+
        }

        impl Feature {
            /// Every feature, in table order.
            pub const ALL: &'static [Feature] = &[$(Feature::$variant,)+];

            /// The feature identifier used by host bridges.
            #[must_use]
            pub const fn id(self) -> &'static str {
                match self {
                    $(Feature::$variant => $id,)+
                }
            }

            /// The lowest tier that can use this feature.
            #[must_use]
            pub const fn required_tier(self) -> Tier {
                match self {
                    $(Feature::$variant => Tier::$tier,)+
                }
            }
        }

        impl FromStr for Feature {
            type Err = UnknownFeature;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($id => Ok(Feature::$variant),)+
                    other => Err(UnknownFeature(other.to_string())),
                }
            }
        }
    };
}

feature_table! {
    // Time tracking
    BasicTimer => "BASIC_TIMER", Free;
    ManualEntry => "MANUAL_ENTRY", Free;
    EditAnyEntry => "EDIT_ANY_ENTRY", Free;
    ViewAllHistory => "VIEW_ALL_HISTORY", Free;
    DeleteEntry => "DELETE_ENTRY", Free;
    Comments => "COMMENTS", Free;
    PauseResume => "PAUSE_RESUME", Free;

    // Projects
    ManualProjectAdd => "MANUAL_PROJECT_ADD", Free;
    EditDeleteProjects => "EDIT_DELETE_PROJECTS", Free;
    UnlimitedProjects => "UNLIMITED_PROJECTS", Free;
    FourLevelHierarchy => "FOUR_LEVEL_HIERARCHY", Free;
    ViewAllProjects => "VIEW_ALL_PROJECTS", Free;

    // Export
    BasicExport => "BASIC_EXPORT", Free;
    ExportDateFilter => "EXPORT_DATE_FILTER", Free;
    ExportProjectFilter => "EXPORT_PROJECT_FILTER", Free;

    // UI
    AllKeyboardShortcuts => "ALL_KEYBOARD_SHORTCUTS", Free;
    SystemTray => "SYSTEM_TRAY", Free;
    MinimizeToTray => "MINIMIZE_TO_TRAY", Free;
    RecentEntriesView => "RECENT_ENTRIES_VIEW", Free;

    // Data ownership
    UnlimitedHistory => "UNLIMITED_HISTORY", Free;
    LocalDataStorage => "LOCAL_DATA_STORAGE", Free;
    DataExport => "DATA_EXPORT", Free;

    // Imports
    CsvImport => "CSV_IMPORT", Premium;
    CsvLinking => "CSV_LINKING", Premium;

    // Search and filter
    SearchTimeEntries => "SEARCH_TIME_ENTRIES", Premium;
    FilterTimeEntries => "FILTER_TIME_ENTRIES", Premium;
    SearchProjects => "SEARCH_PROJECTS", Premium;
    FilterProjects => "FILTER_PROJECTS", Premium;

    // Widgets
    TimeSummaryWidget => "TIME_SUMMARY_WIDGET", Premium;
    DailyProgressWidget => "DAILY_PROGRESS_WIDGET", Premium;

    // Settings
    TimeRoundingSettings => "TIME_ROUNDING_SETTINGS", Premium;
    IdleDetectionSettings => "IDLE_DETECTION_SETTINGS", Premium;
    DailyGoalSettings => "DAILY_GOAL_SETTINGS", Premium;
    ActivityReminderSettings => "ACTIVITY_REMINDER_SETTINGS", Premium;
    FloatingTimerSettings => "FLOATING_TIMER_SETTINGS", Premium;
    BreakReminderSettings => "BREAK_REMINDER_SETTINGS", Premium;

    // Smart features
    IdleDetection => "IDLE_DETECTION", Premium;
    DailyGoals => "DAILY_GOALS", Premium;
    ActivityReminders => "ACTIVITY_REMINDERS", Premium;
    FloatingTimer => "FLOATING_TIMER", Premium;
    BreakReminders => "BREAK_REMINDERS", Premium;

    // Support
    PremiumSupport => "PREMIUM_SUPPORT", Premium;
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Lists the features unlocked at `tier`.
#[must_use]
pub fn available_features(tier: Tier) -> Vec<Feature> {
    Feature::ALL
        .iter()
        .copied()
        .filter(|f| tier.allows(f.required_tier()))
        .collect()
}
