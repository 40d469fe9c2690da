//! Progress status values and the bottom-up aggregation rules.

use serde::{Deserialize, Serialize};

/// Progress of a single learning item.
///
/// `Locked` doubles as a payload status string and as the orthogonal lock
/// overlay: a locked atom can sit in any underlying progress state, but it
/// is not actionable and counts as untouched for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
    Locked,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl ProgressStatus {
    /// Parse a status string from any backend version.
    ///
    /// Case, underscores, hyphens, and spaces are ignored, so
    /// `"not_started"`, `"notStarted"`, and `"Not Started"` all match.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "notstarted" | "unstarted" | "new" => Some(Self::NotStarted),
            "inprogress" | "started" | "active" => Some(Self::InProgress),
            "completed" | "complete" | "done" | "finished" => Some(Self::Completed),
            "failed" | "failure" => Some(Self::Failed),
            "locked" => Some(Self::Locked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Locked => "locked",
        }
    }

    /// Anything beyond untouched/locked counts as engagement.
    pub fn is_engaged(&self) -> bool {
        !matches!(self, Self::NotStarted | Self::Locked)
    }
}

/// Roll child statuses up into a parent status.
///
/// Completed iff every child is completed (an empty lesson is not
/// completed); in progress iff any child has moved past
/// not-started/locked; otherwise not started.
pub fn roll_up(statuses: &[ProgressStatus]) -> ProgressStatus {
    if statuses.is_empty() {
        return ProgressStatus::NotStarted;
    }
    if statuses.iter().all(|s| *s == ProgressStatus::Completed) {
        return ProgressStatus::Completed;
    }
    if statuses.iter().any(ProgressStatus::is_engaged) {
        return ProgressStatus::InProgress;
    }
    ProgressStatus::NotStarted
}

/// XP completion percentage, clamped to `[0, 100]`.
///
/// A non-positive target yields 0 rather than a division blowup.
pub fn xp_percentage(xp_current: f64, xp_target: f64) -> f64 {
    if xp_target <= 0.0 {
        return 0.0;
    }
    (xp_current / xp_target * 100.0).clamp(0.0, 100.0)
}

/// Capsule status when the server does not supply one: XP is the single
/// source of truth, never the child statuses.
pub fn derive_capsule_status(xp_current: f64, percentage: f64) -> ProgressStatus {
    if percentage >= 100.0 {
        ProgressStatus::Completed
    } else if xp_current > 0.0 {
        ProgressStatus::InProgress
    } else {
        ProgressStatus::NotStarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProgressStatus::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!(ProgressStatus::parse("not_started"), Some(NotStarted));
        assert_eq!(ProgressStatus::parse("notStarted"), Some(NotStarted));
        assert_eq!(ProgressStatus::parse("IN-PROGRESS"), Some(InProgress));
        assert_eq!(ProgressStatus::parse("Done"), Some(Completed));
        assert_eq!(ProgressStatus::parse("failure"), Some(Failed));
        assert_eq!(ProgressStatus::parse("locked"), Some(Locked));
        assert_eq!(ProgressStatus::parse("paused"), None);
        assert_eq!(ProgressStatus::parse(""), None);
    }

    #[test]
    fn test_roll_up_all_completed() {
        assert_eq!(roll_up(&[Completed, Completed]), Completed);
    }

    #[test]
    fn test_roll_up_untouched() {
        assert_eq!(roll_up(&[NotStarted, NotStarted]), NotStarted);
        assert_eq!(roll_up(&[NotStarted, Locked]), NotStarted);
    }

    #[test]
    fn test_roll_up_mixed_is_in_progress() {
        assert_eq!(roll_up(&[Completed, InProgress]), InProgress);
        assert_eq!(roll_up(&[Completed, NotStarted]), InProgress);
        assert_eq!(roll_up(&[Failed, NotStarted]), InProgress);
        assert_eq!(roll_up(&[Locked, InProgress]), InProgress);
    }

    #[test]
    fn test_roll_up_empty_is_not_started() {
        assert_eq!(roll_up(&[]), NotStarted);
    }

    #[test]
    fn test_xp_percentage_clamps() {
        assert_eq!(xp_percentage(3000.0, 6000.0), 50.0);
        assert_eq!(xp_percentage(9000.0, 6000.0), 100.0);
        assert_eq!(xp_percentage(0.0, 6000.0), 0.0);
        assert_eq!(xp_percentage(-50.0, 6000.0), 0.0);
        assert_eq!(xp_percentage(3000.0, 0.0), 0.0);
        assert_eq!(xp_percentage(3000.0, -10.0), 0.0);
    }

    #[test]
    fn test_derive_capsule_status() {
        assert_eq!(derive_capsule_status(6000.0, 100.0), Completed);
        assert_eq!(derive_capsule_status(10.0, 0.2), InProgress);
        assert_eq!(derive_capsule_status(0.0, 0.0), NotStarted);
    }
}
