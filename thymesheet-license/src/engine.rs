//! Entitlement engine: activation, tier derivation and feature gates.
//!
//! Every query reloads the record from disk and re-derives the state, so the
//! file stays the single source of truth. Storage and key failures never
//! escape as panics; queries degrade to a free-tier state instead.

use crate::checksum::{checksum_matches, LICENSE_SECRET};
use crate::device::{FingerprintSource, HardwareId, SystemFingerprint};
use crate::error::{LicenseError, LicenseResult};
use crate::features::{Feature, Tier};
use crate::key::{KeyKind, LicenseKey};
use crate::pool::KeyPool;
use crate::record::{LicenseRecord, LicenseType};
use crate::status::{ActivationResult, InvalidReason, TierState};
use crate::store::LicenseStore;
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Length of the trial window in days.
pub const TRIAL_DURATION_DAYS: i64 = 30;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
enum PoolSource {
    File(PathBuf),
    Memory(KeyPool),
}

impl PoolSource {
    fn load(&self) -> LicenseResult<KeyPool> {
        match self {
            Self::File(path) => KeyPool::load(path),
            Self::Memory(pool) => Ok(pool.clone()),
        }
    }
}

/// Derives and changes the license state of this installation.
pub struct EntitlementEngine {
    store: LicenseStore,
    pool: PoolSource,
    fingerprint: Arc<dyn FingerprintSource>,
    clock: Arc<dyn Clock>,
}

impl EntitlementEngine {
    /// Creates an engine over `store` using the system clock, this
    /// machine's fingerprint and an empty trial pool.
    #[must_use]
    pub fn new(store: LicenseStore) -> Self {
        Self {
            store,
            pool: PoolSource::Memory(KeyPool::default()),
            fingerprint: Arc::new(SystemFingerprint),
            clock: Arc::new(SystemClock),
        }
    }

    /// Reads trial keys from the pool file at `path` when a trial starts.
    #[must_use]
    pub fn with_pool_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pool = PoolSource::File(path.into());
        self
    }

    /// Uses an in-memory trial pool.
    #[must_use]
    pub fn with_pool(mut self, pool: KeyPool) -> Self {
        self.pool = PoolSource::Memory(pool);
        self
    }

    /// Replaces the hardware fingerprint source.
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: Arc<dyn FingerprintSource>) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the record store.
    #[must_use]
    pub fn store(&self) -> &LicenseStore {
        &self.store
    }

    /// Computes this machine's hardware id.
    #[must_use]
    pub fn hardware_id(&self) -> HardwareId {
        self.fingerprint.hardware_id()
    }

    /// Derives the current state from the record file and the clock.
    #[must_use]
    pub fn current_state(&self) -> TierState {
        match self.store.load() {
            Ok(None) => TierState::New,
            Ok(Some(record)) => {
                evaluate(&record, &self.fingerprint.hardware_id(), self.clock.now())
            }
            Err(LicenseError::RecordCorrupted(_)) => TierState::Error,
            Err(e) => {
                warn!(path = %self.store.path().display(), error = %e, "License record unreadable");
                TierState::Free
            }
        }
    }

    /// Returns the access tier of the current state.
    #[must_use]
    pub fn current_tier(&self) -> Tier {
        self.current_state().tier()
    }

    /// Starts a trial with a key drawn from the bundled pool.
    ///
    /// An existing record is overwritten, so calling this twice restarts the
    /// trial window. Hosts should only offer it in the [`TierState::New`]
    /// state.
    ///
    /// # Errors
    ///
    /// [`LicenseError::PoolExhausted`] if no key is available or the drawn
    /// key is not a trial key,
    /// [`LicenseError::PersistenceFailure`] if the record cannot be written.
    pub fn activate_trial(&self) -> LicenseResult<TierState> {
        let pool = self.pool.load()?;
        let raw = pool.draw(&mut rand::thread_rng())?;
        let key = validate_key(&raw)?;
        if key.kind() != Some(KeyKind::Trial) {
            warn!(key = %key, "Trial pool handed out a non-trial key");
            return Err(LicenseError::PoolExhausted);
        }

        if let Ok(Some(existing)) = self.store.load() {
            warn!(
                previous_key = %existing.license_key,
                "Starting a trial over an existing license record"
            );
        }

        let now = self.clock.now();
        let record = LicenseRecord {
            license_key: key.to_string(),
            license_type: Some(LicenseType::Trial),
            hardware_id: self.fingerprint.hardware_id(),
            activated_at: now,
            trial_ends_at: Some(trial_end(now)),
            upgraded_at: None,
        };
        self.store.save(&record)?;

        info!(trial_ends_at = %trial_end(now), "Trial activated");
        Ok(self.current_state())
    }

    /// Activates `candidate`, or upgrades the existing record to it.
    ///
    /// The candidate is trimmed and uppercased before parsing. The original
    /// activation time survives upgrades. Re-activating the same key on the
    /// same machine succeeds.
    ///
    /// # Errors
    ///
    /// [`LicenseError::MalformedKey`], [`LicenseError::InvalidChecksum`],
    /// [`LicenseError::AlreadyActivatedElsewhere`] if the stored record holds
    /// this key for another machine, or [`LicenseError::PersistenceFailure`].
    pub fn activate_or_upgrade(&self, candidate: &str) -> LicenseResult<TierState> {
        let key = validate_key(&LicenseKey::normalize(candidate)).inspect_err(|e| {
            warn!(error = %e, "License key rejected");
        })?;
        let key_text = key.to_string();
        let hardware_id = self.fingerprint.hardware_id();
        let now = self.clock.now();

        let prior = match self.store.load() {
            Ok(prior) => prior,
            Err(LicenseError::RecordCorrupted(_)) => None,
            Err(e) => return Err(e),
        };

        if let Some(prior) = &prior
            && prior.license_key == key_text
            && prior.hardware_id != hardware_id
        {
            warn!("License key is bound to another machine");
            return Err(LicenseError::AlreadyActivatedElsewhere);
        }

        let license_type = key.kind().map_or(LicenseType::Premium, LicenseType::from);
        let activated_at = prior.as_ref().map_or(now, |p| p.activated_at);
        let record = LicenseRecord {
            license_key: key_text,
            license_type: Some(license_type),
            hardware_id,
            activated_at,
            trial_ends_at: (license_type == LicenseType::Trial).then(|| trial_end(activated_at)),
            upgraded_at: prior.is_some().then_some(now),
        };
        self.store.save(&record)?;

        info!(license_type = ?license_type, upgraded = prior.is_some(), "License activated");
        Ok(self.current_state())
    }

    /// Returns true if the current tier unlocks `feature`.
    #[must_use]
    pub fn can_access(&self, feature: Feature) -> bool {
        match feature.required_tier() {
            Tier::Free => true,
            required => self.current_tier().allows(required),
        }
    }

    /// Looks up a feature by id. Unknown ids are never accessible.
    #[must_use]
    pub fn can_access_feature(&self, id: &str) -> bool {
        match id.parse::<Feature>() {
            Ok(feature) => self.can_access(feature),
            Err(e) => {
                warn!(feature = id, "{e}");
                false
            }
        }
    }

    /// Runs [`Self::activate_trial`] and shapes the outcome for host bridges.
    #[must_use]
    pub fn activate_trial_report(&self) -> ActivationResult {
        ActivationResult::from_outcome(self.activate_trial(), || self.current_state())
    }

    /// Runs [`Self::activate_or_upgrade`] and shapes the outcome for host
    /// bridges.
    #[must_use]
    pub fn activate_report(&self, candidate: &str) -> ActivationResult {
        ActivationResult::from_outcome(self.activate_or_upgrade(candidate), || {
            self.current_state()
        })
    }
}

/// Derives the state of a stored record for a machine at a point in time.
#[must_use]
pub fn evaluate(record: &LicenseRecord, hardware_id: &HardwareId, now: DateTime<Utc>) -> TierState {
    let key = match check_record(record, hardware_id) {
        Ok(key) => key,
        Err(LicenseError::HardwareMismatch) => {
            warn!("Stored license belongs to a different machine");
            return TierState::Invalid(InvalidReason::HardwareMismatch);
        }
        Err(LicenseError::InvalidChecksum) => return TierState::Invalid(InvalidReason::Checksum),
        Err(_) => return TierState::Invalid(InvalidReason::MalformedKey),
    };

    let is_trial = match key.kind() {
        Some(KeyKind::Premium) => false,
        Some(KeyKind::Trial) => true,
        None => record.license_type == Some(LicenseType::Trial),
    };

    if is_trial {
        trial_state(record.activated_at, now)
    } else {
        TierState::Premium
    }
}

/// Checks that a stored record is bound to `hardware_id` and holds a valid
/// key.
///
/// # Errors
///
/// [`LicenseError::HardwareMismatch`], [`LicenseError::MalformedKey`] or
/// [`LicenseError::InvalidChecksum`].
pub fn check_record(record: &LicenseRecord, hardware_id: &HardwareId) -> LicenseResult<LicenseKey> {
    if &record.hardware_id != hardware_id {
        return Err(LicenseError::HardwareMismatch);
    }
    validate_key(&record.license_key)
}

fn trial_state(activated_at: DateTime<Utc>, now: DateTime<Utc>) -> TierState {
    let ends_at = trial_end(activated_at);
    if now >= ends_at {
        return TierState::TrialExpired;
    }

    let remaining_ms = (ends_at - now).num_milliseconds();
    // Clock rollback can push the remainder past a full window.
    let days = ((remaining_ms + DAY_MILLIS - 1) / DAY_MILLIS).clamp(1, TRIAL_DURATION_DAYS);
    TierState::Trial {
        days_remaining: u32::try_from(days).unwrap_or(1),
    }
}

fn validate_key(text: &str) -> LicenseResult<LicenseKey> {
    let key = LicenseKey::parse(text)?;
    if !checksum_matches(&key, LICENSE_SECRET) {
        return Err(LicenseError::InvalidChecksum);
    }
    Ok(key)
}

fn trial_end(activated_at: DateTime<Utc>) -> DateTime<Utc> {
    activated_at + Duration::days(TRIAL_DURATION_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn trial_days_round_up() {
        let t0 = start();
        assert_eq!(trial_state(t0, t0), TierState::Trial { days_remaining: 30 });
        assert_eq!(
            trial_state(t0, t0 + Duration::hours(1)),
            TierState::Trial { days_remaining: 30 }
        );
        assert_eq!(
            trial_state(t0, t0 + Duration::days(1)),
            TierState::Trial { days_remaining: 29 }
        );
    }

    #[test]
    fn trial_expires_at_window_end() {
        let t0 = start();
        let last_minute = t0 + Duration::days(29) + Duration::hours(23) + Duration::minutes(59);
        assert_eq!(trial_state(t0, last_minute), TierState::Trial { days_remaining: 1 });
        assert_eq!(trial_state(t0, t0 + Duration::days(30)), TierState::TrialExpired);
    }

    #[test]
    fn clock_rollback_caps_remaining_days() {
        let t0 = start();
        assert_eq!(
            trial_state(t0, t0 - Duration::days(3)),
            TierState::Trial { days_remaining: 30 }
        );
    }
}
