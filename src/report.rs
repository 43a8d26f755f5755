//! ASCII tree rendering for class rosters.

use crate::models::{Assignment, AssignmentStatus, ClassSummary, StudentSummary};

const RELEASED: char = '○';
const IN_PROGRESS: char = '◐';
const SUBMITTED: char = '◇';
const PASSED: char = '●';
const FAILED: char = '✗';

/// Get the status symbol for an assignment status.
fn status_symbol(status: AssignmentStatus) -> char {
    match status {
        AssignmentStatus::NotAssigned | AssignmentStatus::Released => RELEASED,
        AssignmentStatus::Working => IN_PROGRESS,
        AssignmentStatus::Submitted | AssignmentStatus::FinalReminder => SUBMITTED,
        AssignmentStatus::Pass => PASSED,
        AssignmentStatus::Fail => FAILED,
    }
}

/// Render a roster as ASCII art with status symbols.
///
/// Example output:
/// ```text
/// Class roster
/// ├── Ada Lovelace <ada@example.com> (avg 88.0)
/// │   ├── ● HW1 Pass (88)
/// │   └── ◐ HW2 working
/// └── Alan Turing <alan@example.com> (no grades)
///     └── ○ HW1 released
/// ```
pub fn render_report(title: &str, class: &ClassSummary) -> String {
    let mut output = String::new();
    output.push_str(title);
    output.push('\n');

    for (i, student) in class.students.iter().enumerate() {
        let is_last = i == class.students.len() - 1;
        render_student(&mut output, student, is_last);
    }
    output
}

fn render_student(output: &mut String, student: &StudentSummary, is_last: bool) {
    let branch = if is_last { "└── " } else { "├── " };
    output.push_str(branch);
    output.push_str(&format!(
        "{} <{}> ({})\n",
        student.profile.full_name,
        student.profile.email,
        overall_label(student.overall_grade)
    ));

    let child_prefix = if is_last { "    " } else { "│   " };
    for (i, assignment) in student.assignments.iter().enumerate() {
        let child_is_last = i == student.assignments.len() - 1;
        render_assignment(output, assignment, child_prefix, child_is_last);
    }
}

fn render_assignment(output: &mut String, assignment: &Assignment, prefix: &str, is_last: bool) {
    let branch = if is_last { "└── " } else { "├── " };
    output.push_str(prefix);
    output.push_str(branch);
    output.push(status_symbol(assignment.status()));
    output.push(' ');
    output.push_str(assignment.name());
    output.push(' ');
    output.push_str(&assignment.display_status());
    if let Some(grade) = assignment.grade() {
        output.push_str(&format!(" ({})", grade));
    }
    output.push('\n');
}

fn overall_label(overall: Option<f64>) -> String {
    match overall {
        Some(avg) => format!("avg {:.1}", avg),
        None => "no grades".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StudentId, StudentProfile};

    fn make_student(
        name: &str,
        overall: Option<f64>,
        assignments: Vec<Assignment>,
    ) -> StudentSummary {
        StudentSummary {
            id: StudentId::new(),
            profile: StudentProfile {
                full_name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            },
            overall_grade: overall,
            assignments,
        }
    }

    fn graded(name: &str, grade: u32) -> Assignment {
        let mut a = Assignment::new(name);
        a.set_grade(grade);
        a
    }

    #[test]
    fn test_empty_roster() {
        let output = render_report("Class roster", &ClassSummary::default());
        assert_eq!(output, "Class roster\n");
    }

    #[test]
    fn test_student_without_assignments() {
        let class = ClassSummary {
            students: vec![make_student("Ada", None, vec![])],
        };
        let output = render_report("Class roster", &class);
        assert_eq!(output, "Class roster\n└── Ada <ada@example.com> (no grades)\n");
    }

    #[test]
    fn test_nested_assignments() {
        let mut working = Assignment::new("HW2");
        working.set_status(AssignmentStatus::Working);

        let class = ClassSummary {
            students: vec![
                make_student("Ada", Some(88.0), vec![graded("HW1", 88), working]),
                make_student("Alan", Some(40.0), vec![graded("HW1", 40)]),
            ],
        };
        let output = render_report("Class roster", &class);
        let expected = "Class roster\n├── Ada <ada@example.com> (avg 88.0)\n│   ├── ● HW1 Pass (88)\n│   └── ◐ HW2 working\n└── Alan <alan@example.com> (avg 40.0)\n    └── ✗ HW1 Fail (40)\n";
        assert_eq!(output, expected);
    }
}
