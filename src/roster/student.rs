use std::sync::{Arc, Mutex, MutexGuard};

use crate::lifecycle::Lifecycle;
use crate::models::{
    Assignment, AssignmentStatus, StudentId, StudentProfile, StudentSummary, NOT_ASSIGNED_LABEL,
};
use crate::observer::Observer;

/// A student and their assignments.
///
/// `Student` is a handle: clones share the same state, which is how deferred
/// auto-submit and grading callbacks reach back into the student. Identity is
/// the [`StudentId`], not the name.
///
/// Observer calls happen after the internal lock is dropped.
#[derive(Clone)]
pub struct Student {
    id: StudentId,
    state: Arc<Mutex<StudentState>>,
    observer: Option<Arc<dyn Observer>>,
    lifecycle: Lifecycle,
}

struct StudentState {
    profile: StudentProfile,
    /// Insertion ordered, names unique.
    assignments: Vec<Assignment>,
    overall_grade: Option<f64>,
}

impl StudentState {
    fn assignment(&self, name: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.name() == name)
    }

    fn assignment_mut(&mut self, name: &str) -> Option<&mut Assignment> {
        self.assignments.iter_mut().find(|a| a.name() == name)
    }

    fn get_or_create(&mut self, name: &str) -> &mut Assignment {
        let index = match self.assignments.iter().position(|a| a.name() == name) {
            Some(index) => index,
            None => {
                self.assignments.push(Assignment::new(name));
                self.assignments.len() - 1
            }
        };
        &mut self.assignments[index]
    }

    fn compute_overall_grade(&mut self) -> Option<f64> {
        let grades: Vec<u32> = self.assignments.iter().filter_map(|a| a.grade()).collect();
        self.overall_grade = if grades.is_empty() {
            None
        } else {
            let total: f64 = grades.iter().map(|&g| f64::from(g)).sum();
            Some(total / grades.len() as f64)
        };
        self.overall_grade
    }
}

type Transition = (StudentProfile, Assignment);

impl Student {
    /// Student with default timing: tokio timers and random grades.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        observer: Option<Arc<dyn Observer>>,
    ) -> Self {
        Self::with_lifecycle(full_name, email, observer, Lifecycle::default())
    }

    pub fn with_lifecycle(
        full_name: impl Into<String>,
        email: impl Into<String>,
        observer: Option<Arc<dyn Observer>>,
        lifecycle: Lifecycle,
    ) -> Self {
        Self {
            id: StudentId::new(),
            state: Arc::new(Mutex::new(StudentState {
                profile: StudentProfile {
                    full_name: full_name.into(),
                    email: email.into(),
                },
                assignments: Vec::new(),
                overall_grade: None,
            })),
            observer,
            lifecycle,
        }
    }

    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn profile(&self) -> StudentProfile {
        self.lock().profile.clone()
    }

    pub fn full_name(&self) -> String {
        self.lock().profile.full_name.clone()
    }

    pub fn email(&self) -> String {
        self.lock().profile.email.clone()
    }

    pub fn set_full_name(&self, full_name: impl Into<String>) {
        self.lock().profile.full_name = full_name.into();
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.lock().profile.email = email.into();
    }

    /// Snapshot of one assignment.
    pub fn assignment(&self, name: &str) -> Option<Assignment> {
        self.lock().assignment(name).cloned()
    }

    /// Snapshot of all assignments in the order they were first referenced.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.lock().assignments.clone()
    }

    /// True if any assignment is released or being worked on.
    pub fn has_assignment_in_progress(&self) -> bool {
        self.lock()
            .assignments
            .iter()
            .any(|a| a.status().is_in_progress())
    }

    /// `"Pass"`, `"Fail"`, the raw in-progress status, or
    /// `"Hasn't been assigned"`.
    pub fn assignment_status(&self, name: &str) -> String {
        self.lock()
            .assignment(name)
            .map(Assignment::display_status)
            .unwrap_or_else(|| NOT_ASSIGNED_LABEL.to_string())
    }

    /// Cached mean of graded assignments, `None` if nothing is graded.
    pub fn grade(&self) -> Option<f64> {
        self.lock().overall_grade
    }

    /// Recompute and cache the mean of graded assignments.
    pub fn compute_overall_grade(&self) -> Option<f64> {
        self.lock().compute_overall_grade()
    }

    /// Hand out an assignment. An existing assignment keeps its status but
    /// observers are still told about it.
    pub fn release(&self, name: &str) {
        let transition = {
            let mut state = self.lock();
            let created = state.assignment(name).is_none();
            let snapshot = state.get_or_create(name).clone();
            if created {
                tracing::debug!(student = %self.id, assignment = name, "Assignment released");
            }
            (state.profile.clone(), snapshot)
        };
        self.emit(transition);
    }

    /// Create the assignment if needed and, when a grade is given, grade it.
    ///
    /// Without a grade this only makes sure the assignment exists.
    pub fn update_assignment_status(&self, name: &str, grade: Option<u32>) {
        let transition = {
            let mut state = self.lock();
            let assignment = state.get_or_create(name);
            if let Some(grade) = grade {
                assignment.set_grade(grade);
            }
            let snapshot = assignment.clone();
            if grade.is_some() {
                state.compute_overall_grade();
            }
            (state.profile.clone(), snapshot)
        };
        self.emit(transition);
    }

    /// Start working on an assignment; it submits itself after the work delay.
    ///
    /// Assignments that are already submitted or graded are left alone.
    pub fn start_working(&self, name: &str) {
        let transition = {
            let mut state = self.lock();
            let assignment = state.get_or_create(name);
            if assignment.is_submitted() || assignment.status().is_terminal() {
                tracing::debug!(
                    student = %self.id,
                    assignment = name,
                    status = %assignment.status(),
                    "Ignoring start on finished assignment"
                );
                return;
            }
            assignment.set_status(AssignmentStatus::Working);
            let snapshot = assignment.clone();
            (state.profile.clone(), snapshot)
        };
        self.emit(transition);

        let student = self.clone();
        let name = name.to_string();
        self.lifecycle.scheduler().schedule(
            self.lifecycle.work_delay(),
            Box::new(move || student.auto_submit(&name)),
        );
    }

    /// Submit an assignment and schedule its grading.
    ///
    /// Safe to call repeatedly: only the first submission counts, so the
    /// auto-submit timer and a reminder can both call this.
    pub fn submit_assignment(&self, name: &str) {
        let transition = {
            let mut state = self.lock();
            let assignment = state.get_or_create(name);
            if assignment.status().is_terminal() {
                tracing::debug!(
                    student = %self.id,
                    assignment = name,
                    status = %assignment.status(),
                    "Ignoring submission of graded assignment"
                );
                return;
            }
            if !assignment.mark_submitted() {
                tracing::debug!(student = %self.id, assignment = name, "Already submitted");
                return;
            }
            let snapshot = assignment.clone();
            (state.profile.clone(), snapshot)
        };
        tracing::debug!(student = %self.id, assignment = name, "Assignment submitted");
        self.emit(transition);

        let student = self.clone();
        let name = name.to_string();
        self.lifecycle.scheduler().schedule(
            self.lifecycle.grading_delay(),
            Box::new(move || student.finish_grading(&name)),
        );
    }

    /// Escalate an ungraded assignment to a final reminder and force
    /// submission. Returns `false` if the assignment is missing or graded.
    pub fn send_reminder(&self, name: &str) -> bool {
        let transition = {
            let mut state = self.lock();
            let Some(assignment) = state.assignment_mut(name) else {
                return false;
            };
            if assignment.status().is_terminal() {
                return false;
            }
            assignment.set_status(AssignmentStatus::FinalReminder);
            let snapshot = assignment.clone();
            (state.profile.clone(), snapshot)
        };
        tracing::debug!(student = %self.id, assignment = name, "Final reminder sent");
        self.emit(transition);
        self.submit_assignment(name);
        true
    }

    pub fn summary(&self) -> StudentSummary {
        let state = self.lock();
        StudentSummary {
            id: self.id,
            profile: state.profile.clone(),
            overall_grade: state.overall_grade,
            assignments: state.assignments.clone(),
        }
    }

    /// Auto-submit callback. The assignment may have moved on since the timer
    /// was set, so eligibility is checked again here.
    fn auto_submit(&self, name: &str) {
        let eligible = self
            .lock()
            .assignment(name)
            .is_some_and(|a| !a.is_submitted() && !a.status().is_terminal());
        if eligible {
            self.submit_assignment(name);
        }
    }

    /// Grading callback, fires once per successful submission.
    fn finish_grading(&self, name: &str) {
        let grade = self.lifecycle.grader().grade();
        let transition = {
            let mut state = self.lock();
            let Some(assignment) = state.assignment_mut(name) else {
                return;
            };
            assignment.set_grade(grade);
            let snapshot = assignment.clone();
            let overall = state.compute_overall_grade();
            tracing::info!(
                student = %self.id,
                assignment = name,
                grade,
                status = %snapshot.status(),
                overall = ?overall,
                "Assignment graded"
            );
            (state.profile.clone(), snapshot)
        };
        self.emit(transition);
    }

    fn emit(&self, (profile, assignment): Transition) {
        if let Some(observer) = &self.observer {
            observer.notify(&profile, &assignment);
        }
    }

    fn lock(&self) -> MutexGuard<'_, StudentState> {
        self.state.lock().expect("student lock poisoned")
    }
}

impl PartialEq for Student {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Student {}

impl std::fmt::Debug for Student {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Student")
            .field("id", &self.id)
            .field("profile", &state.profile)
            .field("assignments", &state.assignments.len())
            .field("overall_grade", &state.overall_grade)
            .finish()
    }
}
