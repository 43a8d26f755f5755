//! Live students and the class roster.
//!
//! [`Student`] owns its assignments and drives their state machine:
//!
//! ```text
//! released ──start_working──▶ working ──(work delay)──▶ submitted ──(grading delay)──▶ pass | fail
//!     │                          │                          ▲
//!     └──────send_reminder───────┴──▶ final-reminder ───────┘
//! ```
//!
//! [`ClassList`] fans operations out across students and answers roster-wide
//! questions such as who still owes an assignment.

mod class_list;
mod student;

pub use class_list::ClassList;
pub use student::Student;
