//! Simulation settings.
//!
//! Loaded from environment variables:
//! - `CLASSTRACK_WORK_DELAY_MS` - delay before a started assignment auto-submits (default: 500)
//! - `CLASSTRACK_GRADING_DELAY_MS` - delay between submission and grading (default: 500)
//! - `CLASSTRACK_SEED` - seed for the random grader (optional, unseeded if absent)

use std::time::Duration;

use thiserror::Error;

const DEFAULT_WORK_DELAY_MS: u64 = 500;
const DEFAULT_GRADING_DELAY_MS: u64 = 500;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// How long a student works before the assignment submits itself.
    pub work_delay: Duration,
    /// How long grading takes after submission.
    pub grading_delay: Duration,
    /// Seed for reproducible grades.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            work_delay: Duration::from_millis(DEFAULT_WORK_DELAY_MS),
            grading_delay: Duration::from_millis(DEFAULT_GRADING_DELAY_MS),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let work_delay = parse_u64(&lookup, "CLASSTRACK_WORK_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.work_delay);
        let grading_delay = parse_u64(&lookup, "CLASSTRACK_GRADING_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.grading_delay);
        let seed = parse_u64(&lookup, "CLASSTRACK_SEED")?;

        Ok(Self {
            work_delay,
            grading_delay,
            seed,
        })
    }

    /// Total simulated time for a started assignment to be graded.
    pub fn turnaround(&self) -> Duration {
        self.work_delay + self.grading_delay
    }
}

fn parse_u64<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}
