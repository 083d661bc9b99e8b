//! Host-side coordinator.
//!
//! Owns the in-memory session state of the running application and the
//! background tasks tied to it. Collaborators are passed in at construction.

use crate::scheduler::RepeatingTask;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thymesheet_license::{EntitlementEngine, Feature, TierState};
use tracing::{debug, info};

/// Delivers user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Shows a notification.
    fn notify(&self, title: &str, body: &str);
}

/// What the user is currently doing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingState {
    /// A timer is running.
    pub tracking: bool,
    /// Project the running timer is booked against.
    pub project: Option<String>,
}

/// Owns session state, the entitlement engine and background tasks.
pub struct Coordinator {
    engine: Arc<EntitlementEngine>,
    notifier: Arc<dyn Notifier>,
    tracking: Arc<Mutex<TrackingState>>,
    reminders: Option<RepeatingTask>,
}

impl Coordinator {
    /// Creates a coordinator with no timer running.
    #[must_use]
    pub fn new(engine: Arc<EntitlementEngine>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            engine,
            notifier,
            tracking: Arc::new(Mutex::new(TrackingState::default())),
            reminders: None,
        }
    }

    /// Returns the entitlement engine.
    #[must_use]
    pub fn engine(&self) -> &EntitlementEngine {
        &self.engine
    }

    /// Derives the license state.
    #[must_use]
    pub fn license_state(&self) -> TierState {
        self.engine.current_state()
    }

    /// Starts the timer against `project`.
    pub fn start_tracking(&self, project: impl Into<String>) {
        let mut state = lock(&self.tracking);
        state.tracking = true;
        state.project = Some(project.into());
    }

    /// Stops the timer.
    pub fn stop_tracking(&self) {
        let mut state = lock(&self.tracking);
        state.tracking = false;
        state.project = None;
    }

    /// Returns true while a timer runs.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        lock(&self.tracking).tracking
    }

    /// Returns a snapshot of the session state.
    #[must_use]
    pub fn tracking_state(&self) -> TrackingState {
        lock(&self.tracking).clone()
    }

    /// Starts reminding the user every `period` while no timer runs.
    ///
    /// Activity reminders are a premium feature: returns false without
    /// starting anything if the current tier lacks it. Any reminder task
    /// already running is replaced. Each tick re-checks the tier, so an
    /// expiring trial silences reminders without a restart.
    pub async fn start_activity_reminders(&mut self, period: Duration) -> bool {
        if !self.engine.can_access(Feature::ActivityReminders) {
            info!("Activity reminders need a premium license");
            return false;
        }

        self.stop_activity_reminders().await;

        let engine = self.engine.clone();
        let notifier = self.notifier.clone();
        let tracking = self.tracking.clone();
        self.reminders = Some(RepeatingTask::spawn(
            "activity-reminder",
            period,
            move || {
                if lock(&tracking).tracking {
                    return;
                }
                if !engine.can_access(Feature::ActivityReminders) {
                    debug!("Skipping activity reminder: feature no longer available");
                    return;
                }
                notifier.notify("ThymeSheet", "No timer is running. Start tracking?");
            },
        ));
        true
    }

    /// Returns true while activity reminders are scheduled.
    #[must_use]
    pub fn reminders_running(&self) -> bool {
        self.reminders.as_ref().is_some_and(RepeatingTask::is_running)
    }

    /// Stops activity reminders if they are running.
    pub async fn stop_activity_reminders(&mut self) {
        if let Some(task) = self.reminders.take() {
            task.stop().await;
        }
    }

    /// Stops all background tasks.
    pub async fn shutdown(&mut self) {
        self.stop_activity_reminders().await;
        info!("Coordinator shut down");
    }
}

fn lock(state: &Mutex<TrackingState>) -> MutexGuard<'_, TrackingState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
