use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Grades strictly above this value pass; a grade equal to it fails.
pub const PASS_THRESHOLD: u32 = 50;

/// Status label for an assignment a student has never been given.
pub const NOT_ASSIGNED_LABEL: &str = "Hasn't been assigned";

/// One student's copy of an assignment.
///
/// Assignment names are unique per student, not across the class. An
/// assignment only exists once something has referenced it (release, work,
/// submission or a manual grade), so a fresh one starts out `Released`.
///
/// # Invariants
/// - `grade` is set iff `status` is `Pass` or `Fail`.
/// - `submitted` never goes back to `false`; it blocks duplicate submission
///   independently of `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    name: String,
    status: AssignmentStatus,
    grade: Option<u32>,
    submitted: bool,
    updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: AssignmentStatus::Released,
            grade: None,
            submitted: false,
            updated_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> AssignmentStatus {
        self.status
    }

    pub fn grade(&self) -> Option<u32> {
        self.grade
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Record a grade and settle the assignment as `Pass` or `Fail`.
    ///
    /// Grades are not range-checked. Re-grading overwrites the previous grade.
    pub fn set_grade(&mut self, grade: u32) {
        self.grade = Some(grade);
        self.status = if grade > PASS_THRESHOLD {
            AssignmentStatus::Pass
        } else {
            AssignmentStatus::Fail
        };
        self.touch();
    }

    pub(crate) fn set_status(&mut self, status: AssignmentStatus) {
        self.status = status;
        self.touch();
    }

    /// Flip the submission flag. Returns `false` if it was already set.
    pub(crate) fn mark_submitted(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        self.submitted = true;
        self.status = AssignmentStatus::Submitted;
        self.touch();
        true
    }

    /// Status as reported to users: `"Pass"` and `"Fail"` are capitalised,
    /// in-progress states use their raw token.
    pub fn display_status(&self) -> String {
        match self.status {
            AssignmentStatus::Pass => "Pass".to_string(),
            AssignmentStatus::Fail => "Fail".to_string(),
            other => other.as_str().to_string(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Where an assignment sits in its lifecycle.
///
/// - `NotAssigned`: implicit starting point, never stored on a live assignment
/// - `Released`: handed out to the student
/// - `Working`: student has started, auto-submit is pending
/// - `Submitted`: handed in, grading is pending
/// - `FinalReminder`: escalation that forces submission
/// - `Pass` / `Fail`: graded, terminal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentStatus {
    NotAssigned,
    Released,
    Working,
    Submitted,
    FinalReminder,
    Pass,
    Fail,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAssigned => "not-assigned",
            Self::Released => "released",
            Self::Working => "working",
            Self::Submitted => "submitted",
            Self::FinalReminder => "final-reminder",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not-assigned" => Some(Self::NotAssigned),
            "released" => Some(Self::Released),
            "working" => Some(Self::Working),
            "submitted" => Some(Self::Submitted),
            "final-reminder" => Some(Self::FinalReminder),
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }

    /// Graded; nothing further can happen to the assignment.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Pass | Self::Fail)
    }

    /// Handed in or graded.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Submitted | Self::Pass | Self::Fail)
    }

    /// Handed out and still with the student.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Released | Self::Working)
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_assignment_is_released_and_ungraded() {
        let a = Assignment::new("HW1");
        assert_eq!(a.name(), "HW1");
        assert_eq!(a.status(), AssignmentStatus::Released);
        assert_eq!(a.grade(), None);
        assert!(!a.is_submitted());
    }

    #[test]
    fn fifty_fails_and_fifty_one_passes() {
        let mut a = Assignment::new("HW1");
        a.set_grade(50);
        assert_eq!(a.status(), AssignmentStatus::Fail);
        a.set_grade(51);
        assert_eq!(a.status(), AssignmentStatus::Pass);
        assert_eq!(a.grade(), Some(51));
    }

    #[test]
    fn grade_bounds_are_not_validated() {
        let mut a = Assignment::new("HW1");
        a.set_grade(0);
        assert_eq!(a.status(), AssignmentStatus::Fail);
        a.set_grade(250);
        assert_eq!(a.status(), AssignmentStatus::Pass);
    }

    #[test]
    fn mark_submitted_only_once() {
        let mut a = Assignment::new("HW1");
        assert!(a.mark_submitted());
        assert!(!a.mark_submitted());
        assert_eq!(a.status(), AssignmentStatus::Submitted);
    }

    #[test]
    fn display_status_capitalises_terminal_states_only() {
        let mut a = Assignment::new("HW1");
        assert_eq!(a.display_status(), "released");
        a.set_status(AssignmentStatus::FinalReminder);
        assert_eq!(a.display_status(), "final-reminder");
        a.set_grade(90);
        assert_eq!(a.display_status(), "Pass");
        a.set_grade(10);
        assert_eq!(a.display_status(), "Fail");
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            AssignmentStatus::NotAssigned,
            AssignmentStatus::Released,
            AssignmentStatus::Working,
            AssignmentStatus::Submitted,
            AssignmentStatus::FinalReminder,
            AssignmentStatus::Pass,
            AssignmentStatus::Fail,
        ] {
            assert_eq!(AssignmentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(AssignmentStatus::from_str("graded"), None);
    }

    #[test]
    fn serializes_as_kebab_case() {
        let json = serde_json::to_string(&AssignmentStatus::FinalReminder).unwrap();
        assert_eq!(json, "\"final-reminder\"");
    }
}
