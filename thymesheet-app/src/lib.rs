//! ThymeSheet host process support.
//!
//! - [`Coordinator`]: session state and background tasks of the running app
//! - [`RepeatingTask`]: cancellable periodic work
//! - [`AppConfig`]: file locations for the license engine
//! - [`logging`]: subscriber set-up for binaries

mod config;
mod coordinator;
pub mod logging;
mod scheduler;

pub use config::AppConfig;
pub use coordinator::{Coordinator, Notifier, TrackingState};
pub use scheduler::RepeatingTask;
