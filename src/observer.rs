//! Status-change notifications.
//!
//! A student calls its observer once per status transition, after its own
//! state has been updated. Observers cannot fail and a student with no
//! observer simply skips the call.

use crate::models::{Assignment, AssignmentStatus, StudentProfile};

/// Receives every assignment status transition.
pub trait Observer: Send + Sync {
    fn notify(&self, student: &StudentProfile, assignment: &Assignment);
}

impl<F> Observer for F
where
    F: Fn(&StudentProfile, &Assignment) + Send + Sync,
{
    fn notify(&self, student: &StudentProfile, assignment: &Assignment) {
        self(student, assignment)
    }
}

/// Human-readable message for a transition.
pub fn notification_message(student: &StudentProfile, assignment: &Assignment) -> String {
    let who = &student.full_name;
    let what = assignment.name();
    match assignment.status() {
        AssignmentStatus::Released => format!("{who}, {what} has been released."),
        AssignmentStatus::Working => format!("{who} is working on {what}."),
        AssignmentStatus::Submitted => format!("{who} has submitted {what}."),
        AssignmentStatus::FinalReminder => {
            format!("Hey {who}! This is your final reminder to submit {what}.")
        }
        AssignmentStatus::Pass => format!("{who} has passed {what}."),
        AssignmentStatus::Fail => format!("{who} has failed {what}."),
        other => format!("{who}, {what} is now {other}."),
    }
}

/// Prints each message to stdout and logs it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn notify(&self, student: &StudentProfile, assignment: &Assignment) {
        let message = notification_message(student, assignment);
        tracing::info!(
            student = %student.full_name,
            assignment = assignment.name(),
            status = %assignment.status(),
            "{}",
            message
        );
        println!("{}", message);
    }
}
