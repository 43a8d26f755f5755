use std::sync::Arc;

use futures::future::join_all;

use crate::lifecycle::Lifecycle;
use crate::models::ClassSummary;
use crate::observer::Observer;
use crate::roster::Student;

/// A roster of students with class-wide queries and bulk operations.
///
/// Duplicate names are allowed; removal goes by [`Student::id`].
pub struct ClassList {
    students: Vec<Student>,
    observer: Option<Arc<dyn Observer>>,
    lifecycle: Lifecycle,
}

impl ClassList {
    pub fn new(observer: Option<Arc<dyn Observer>>) -> Self {
        Self::with_lifecycle(observer, Lifecycle::default())
    }

    /// Roster whose [`enroll`](Self::enroll)ed students share `lifecycle`.
    pub fn with_lifecycle(observer: Option<Arc<dyn Observer>>, lifecycle: Lifecycle) -> Self {
        Self {
            students: Vec::new(),
            observer,
            lifecycle,
        }
    }

    /// Create a student wired to this class's observer and lifecycle, and
    /// add it to the roster.
    pub fn enroll(&mut self, full_name: impl Into<String>, email: impl Into<String>) -> Student {
        let student = Student::with_lifecycle(
            full_name,
            email,
            self.observer.clone(),
            self.lifecycle.clone(),
        );
        self.add_student(student.clone());
        student
    }

    pub fn add_student(&mut self, student: Student) {
        tracing::debug!(student = %student.id(), "Student added to roster");
        self.students.push(student);
    }

    /// Remove this exact student. Returns `false` if they were not on the
    /// roster.
    pub fn remove_student(&mut self, student: &Student) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id() != student.id());
        before != self.students.len()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// First student with this full name.
    pub fn find_student_by_name(&self, full_name: &str) -> Option<Student> {
        self.students
            .iter()
            .find(|s| s.full_name() == full_name)
            .cloned()
    }

    /// Names of students still owing the named assignment.
    ///
    /// Once anyone has submitted (or been graded on) the assignment, this is
    /// every student holding it in a not-yet-submitted state. Until then, it
    /// falls back to every student with any released or in-progress
    /// assignment at all, whatever its name.
    pub fn find_outstanding_assignments(&self, name: &str) -> Vec<String> {
        let mut someone_completed = false;
        let mut outstanding = Vec::new();

        for student in &self.students {
            let Some(assignment) = student.assignment(name) else {
                continue;
            };
            if assignment.status().is_completed() {
                someone_completed = true;
            } else {
                outstanding.push(student.full_name());
            }
        }

        if someone_completed {
            return outstanding;
        }

        self.students
            .iter()
            .filter(|s| s.has_assignment_in_progress())
            .map(Student::full_name)
            .collect()
    }

    /// Release every named assignment to every student on the roster.
    ///
    /// Each assignment is released by its own future and the returned future
    /// completes once all of them have.
    pub async fn release_assignments_parallel<S: AsRef<str>>(&self, names: &[S]) {
        let releases = names.iter().map(|name| {
            let name = name.as_ref().to_string();
            let students = self.students.clone();
            async move {
                for student in &students {
                    student.release(&name);
                }
                tracing::debug!(assignment = %name, students = students.len(), "Released to class");
            }
        });
        join_all(releases).await;
    }

    /// Send a final reminder for the named assignment to everyone who has it
    /// and has not been graded. Returns how many reminders went out.
    pub fn send_reminder(&self, name: &str) -> usize {
        let sent = self
            .students
            .iter()
            .filter(|s| s.send_reminder(name))
            .count();
        tracing::info!(assignment = name, sent, "Final reminders sent");
        sent
    }

    /// Distinct assignment names across the roster, in first-seen order.
    pub fn assignment_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for student in &self.students {
            for assignment in student.assignments() {
                if !names.iter().any(|n| n == assignment.name()) {
                    names.push(assignment.name().to_string());
                }
            }
        }
        names
    }

    /// True when no student has an auto-submit or grading callback pending.
    pub fn is_settled(&self) -> bool {
        self.lifecycle.scheduler().pending() == 0
            && self
                .students
                .iter()
                .all(|s| s.lifecycle().scheduler().pending() == 0)
    }

    pub fn summary(&self) -> ClassSummary {
        ClassSummary {
            students: self.students.iter().map(Student::summary).collect(),
        }
    }
}

impl std::fmt::Debug for ClassList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassList")
            .field("students", &self.students)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::lifecycle::{FixedGrader, ManualScheduler};

    fn class() -> ClassList {
        let lifecycle = Lifecycle::new(
            Arc::new(ManualScheduler::new()),
            Arc::new(FixedGrader(75)),
            &SimulationConfig::default(),
        );
        ClassList::with_lifecycle(None, lifecycle)
    }

    #[test]
    fn assignment_names_are_distinct_in_first_seen_order() {
        let mut class = class();
        let ada = class.enroll("Ada", "ada@example.com");
        let alan = class.enroll("Alan", "alan@example.com");
        ada.release("HW2");
        alan.release("HW1");
        alan.release("HW2");
        assert_eq!(class.assignment_names(), vec!["HW2", "HW1"]);
    }

    #[test]
    fn remove_student_reports_absence() {
        let mut class = class();
        let ada = class.enroll("Ada", "ada@example.com");
        assert!(class.remove_student(&ada));
        assert!(!class.remove_student(&ada));
        assert!(class.is_empty());
    }

    #[test]
    fn settled_tracks_pending_callbacks() {
        let mut class = class();
        let ada = class.enroll("Ada", "ada@example.com");
        assert!(class.is_settled());
        ada.start_working("HW1");
        assert!(!class.is_settled());
    }
}
