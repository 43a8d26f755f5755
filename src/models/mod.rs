//! Domain models for classtrack.
//!
//! # Core Concepts
//!
//! - [`Assignment`]: one student's copy of a piece of coursework, moving
//!   through [`AssignmentStatus`] from `released` to `pass`/`fail`.
//! - [`StudentProfile`]: the name and email observers see.
//! - [`StudentSummary`] / [`ClassSummary`]: serializable snapshots used for
//!   reports and JSON output.
//!
//! Live, mutable students and rosters are in [`crate::roster`].

mod assignment;
mod student;

pub use assignment::*;
pub use student::*;
