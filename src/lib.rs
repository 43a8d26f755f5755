pub mod config;
pub mod lifecycle;
pub mod models;
pub mod observer;
pub mod report;
pub mod roster;

pub use config::{ConfigError, SimulationConfig};
pub use lifecycle::Lifecycle;
pub use observer::{ConsoleObserver, Observer};
pub use roster::{ClassList, Student};
