use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assignment::Assignment;

/// Stable identity of a student handle.
///
/// Two students may share a name and email; the id is what tells them apart
/// when removing from a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub Uuid);

impl StudentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The identity fields of a student, as handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub full_name: String,
    pub email: String,
}

/// Point-in-time view of one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: StudentId,
    #[serde(flatten)]
    pub profile: StudentProfile,
    /// Mean of all graded assignments, `None` until something is graded.
    pub overall_grade: Option<f64>,
    pub assignments: Vec<Assignment>,
}

/// Point-in-time view of a whole roster, in roster order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassSummary {
    pub students: Vec<StudentSummary>,
}
