use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classtrack::lifecycle::{Lifecycle, ManualScheduler, RandomGrader};
use classtrack::report::render_report;
use classtrack::{ClassList, ConsoleObserver, Observer, SimulationConfig};

/// Roster used when no `--student` is given.
const DEFAULT_ROSTER: &[(&str, &str)] = &[
    ("Ada Lovelace", "ada@example.com"),
    ("Alan Turing", "alan@example.com"),
    ("Grace Hopper", "grace@example.com"),
];

const DEFAULT_ASSIGNMENTS: &[&str] = &["HW1", "HW2"];

/// How often to check whether deferred callbacks have drained.
const SETTLE_POLL: Duration = Duration::from_millis(25);

#[derive(Parser)]
#[command(name = "classtrack")]
#[command(about = "Simulate a class working through its assignments")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated term and print where everyone ended up
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Default)]
struct SimulateArgs {
    /// Student as "Full Name:email" (repeatable)
    #[arg(short, long = "student")]
    students: Vec<String>,

    /// Assignment to release to the whole class (repeatable)
    #[arg(short, long = "assignment")]
    assignments: Vec<String>,

    /// Assignment every student starts working on (repeatable)
    #[arg(short, long = "work")]
    work: Vec<String>,

    /// Send a final reminder for this assignment after work starts
    #[arg(short, long)]
    remind: Option<String>,

    /// Manually grade an assignment for a student, as "Full Name:assignment:grade"
    #[arg(short, long = "grade")]
    grades: Vec<String>,

    /// Seed for reproducible grades (overrides CLASSTRACK_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Run on a virtual clock instead of waiting for real timers
    #[arg(long)]
    instant: bool,

    /// Print the final roster as JSON instead of a tree
    #[arg(long)]
    json: bool,
}

/// Initialize tracing on stderr so stdout carries notifications and the report
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "classtrack=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Simulate(args)) => simulate(args).await,
        None => simulate(SimulateArgs::default()).await,
    }
}

async fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let mut config = SimulationConfig::from_env()?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let manual = args.instant.then(|| Arc::new(ManualScheduler::new()));
    let lifecycle = match &manual {
        Some(scheduler) => {
            let grader = match config.seed {
                Some(seed) => RandomGrader::seeded(seed),
                None => RandomGrader::new(),
            };
            Lifecycle::new(scheduler.clone(), Arc::new(grader), &config)
        }
        None => Lifecycle::from_config(&config),
    };

    let observer: Arc<dyn Observer> = Arc::new(ConsoleObserver);
    let mut class = ClassList::with_lifecycle(Some(observer), lifecycle);

    if args.students.is_empty() {
        for (name, email) in DEFAULT_ROSTER {
            class.enroll(*name, *email);
        }
    } else {
        for entry in &args.students {
            let (name, email) = parse_student(entry);
            class.enroll(name, email);
        }
    }

    let assignments: Vec<String> = if args.assignments.is_empty() {
        DEFAULT_ASSIGNMENTS.iter().map(|s| s.to_string()).collect()
    } else {
        args.assignments.clone()
    };
    let work = if args.work.is_empty() && args.assignments.is_empty() {
        vec![DEFAULT_ASSIGNMENTS[0].to_string()]
    } else {
        args.work.clone()
    };

    tracing::info!(
        students = class.len(),
        assignments = assignments.len(),
        instant = args.instant,
        "Starting simulation"
    );

    class.release_assignments_parallel(&assignments).await;

    for entry in &args.grades {
        apply_manual_grade(&class, entry);
    }

    for name in &work {
        for student in class.students() {
            student.start_working(name);
        }
    }

    if let Some(name) = &args.remind {
        class.send_reminder(name);
    }

    match &manual {
        Some(scheduler) => {
            scheduler.run_until_idle();
        }
        None => {
            while !class.is_settled() {
                tokio::time::sleep(SETTLE_POLL).await;
            }
        }
    }

    println!();
    for name in class.assignment_names() {
        let outstanding = class.find_outstanding_assignments(&name);
        if outstanding.is_empty() {
            println!("{}: nothing outstanding", name);
        } else {
            println!("{}: outstanding for {}", name, outstanding.join(", "));
        }
    }
    println!();

    let summary = class.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_report("Class roster", &summary));
    }

    Ok(())
}

/// Split "Full Name:email"; a missing email becomes empty.
fn parse_student(entry: &str) -> (String, String) {
    match entry.split_once(':') {
        Some((name, email)) => (name.trim().to_string(), email.trim().to_string()),
        None => (entry.trim().to_string(), String::new()),
    }
}

/// Apply "Full Name:assignment:grade". A grade that does not parse still
/// creates the assignment, just without grading it. Returns `false` when the
/// entry is malformed or names nobody on the roster.
fn apply_manual_grade(class: &ClassList, entry: &str) -> bool {
    let mut parts = entry.splitn(3, ':');
    let (Some(name), Some(assignment)) = (parts.next(), parts.next()) else {
        tracing::warn!(entry, "Expected \"Full Name:assignment:grade\", skipping");
        return false;
    };
    let (name, assignment) = (name.trim(), assignment.trim());
    if assignment.is_empty() {
        tracing::warn!(entry, "Missing assignment name, skipping");
        return false;
    }
    let Some(student) = class.find_student_by_name(name) else {
        tracing::warn!(student = name, "No such student, skipping grade");
        return false;
    };

    let raw = parts.next().unwrap_or("").trim();
    let grade = match raw.parse::<u32>() {
        Ok(grade) => Some(grade),
        Err(_) => {
            tracing::warn!(
                student = name,
                assignment,
                grade = raw,
                "Grade is not a number, leaving ungraded"
            );
            None
        }
    };
    student.update_assignment_status(assignment, grade);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use classtrack::lifecycle::FixedGrader;
    use classtrack::models::AssignmentStatus;

    fn class_with_ada() -> ClassList {
        let lifecycle = Lifecycle::new(
            Arc::new(ManualScheduler::new()),
            Arc::new(FixedGrader(70)),
            &SimulationConfig::default(),
        );
        let mut class = ClassList::with_lifecycle(None, lifecycle);
        class.enroll("Ada Lovelace", "ada@example.com");
        class
    }

    #[test]
    fn test_parse_student_with_email() {
        assert_eq!(
            parse_student(" Ada Lovelace : ada@example.com "),
            ("Ada Lovelace".to_string(), "ada@example.com".to_string())
        );
    }

    #[test]
    fn test_parse_student_without_email() {
        assert_eq!(
            parse_student("Grace Hopper"),
            ("Grace Hopper".to_string(), String::new())
        );
    }

    #[test]
    fn test_manual_grade_is_applied() {
        let class = class_with_ada();
        assert!(apply_manual_grade(&class, "Ada Lovelace:HW1:88"));

        let ada = class.find_student_by_name("Ada Lovelace").unwrap();
        assert_eq!(ada.assignment_status("HW1"), "Pass");
        assert_eq!(ada.grade(), Some(88.0));
    }

    #[test]
    fn test_non_numeric_grade_creates_ungraded_assignment() {
        let class = class_with_ada();
        assert!(apply_manual_grade(&class, "Ada Lovelace:HW1:excellent"));

        let ada = class.find_student_by_name("Ada Lovelace").unwrap();
        let hw1 = ada.assignment("HW1").expect("assignment created");
        assert_eq!(hw1.status(), AssignmentStatus::Released);
        assert_eq!(hw1.grade(), None);
        assert_eq!(ada.grade(), None);
    }

    #[test]
    fn test_missing_grade_creates_ungraded_assignment() {
        let class = class_with_ada();
        assert!(apply_manual_grade(&class, "Ada Lovelace:HW2"));

        let ada = class.find_student_by_name("Ada Lovelace").unwrap();
        assert_eq!(ada.assignment_status("HW2"), "released");
    }

    #[test]
    fn test_unknown_student_is_skipped() {
        let class = class_with_ada();
        assert!(!apply_manual_grade(&class, "Alan Turing:HW1:90"));
        assert!(class.find_student_by_name("Alan Turing").is_none());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let class = class_with_ada();
        assert!(!apply_manual_grade(&class, "Ada Lovelace"));
        assert!(!apply_manual_grade(&class, "Ada Lovelace: :90"));

        let ada = class.find_student_by_name("Ada Lovelace").unwrap();
        assert!(ada.assignments().is_empty());
    }
}
