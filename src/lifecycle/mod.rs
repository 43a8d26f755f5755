//! Timing and grading for the simulated assignment lifecycle.
//!
//! Two transitions are deferred rather than immediate:
//! - **auto-submit**: `work_delay` after a student starts working
//! - **grading**: `grading_delay` after a submission lands
//!
//! Both go through a [`Scheduler`], so tests can swap the tokio timer for a
//! [`ManualScheduler`] and step virtual time by hand. Grades come from a
//! [`Grader`].

mod grader;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

pub use grader::{FixedGrader, Grader, RandomGrader, MAX_GRADE};
pub use scheduler::{ManualScheduler, Scheduler, Task, TokioScheduler};

use crate::config::SimulationConfig;

/// Everything a student needs to run deferred transitions.
///
/// Cloning shares the same scheduler and grader.
#[derive(Clone)]
pub struct Lifecycle {
    scheduler: Arc<dyn Scheduler>,
    grader: Arc<dyn Grader>,
    work_delay: Duration,
    grading_delay: Duration,
}

impl Lifecycle {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        grader: Arc<dyn Grader>,
        config: &SimulationConfig,
    ) -> Self {
        Self {
            scheduler,
            grader,
            work_delay: config.work_delay,
            grading_delay: config.grading_delay,
        }
    }

    /// Tokio timers and a random grader, seeded if the config says so.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let grader = match config.seed {
            Some(seed) => RandomGrader::seeded(seed),
            None => RandomGrader::new(),
        };
        Self::new(Arc::new(TokioScheduler::new()), Arc::new(grader), config)
    }

    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn grader(&self) -> &Arc<dyn Grader> {
        &self.grader
    }

    pub fn work_delay(&self) -> Duration {
        self.work_delay
    }

    pub fn grading_delay(&self) -> Duration {
        self.grading_delay
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("work_delay", &self.work_delay)
            .field("grading_delay", &self.grading_delay)
            .field("pending", &self.scheduler.pending())
            .finish()
    }
}
