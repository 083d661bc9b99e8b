//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use thymesheet_license::{
    Clock, EntitlementEngine, KeyPool, LicenseStore, MachineProfile,
};

/// Premium key valid under the shipped secret.
pub const PREMIUM_KEY: &str = "THYME-PREM-AB12-BA54";
/// Second premium key valid under the shipped secret.
pub const OTHER_PREMIUM_KEY: &str = "THYME-PREM-K9Z2-31B1";
/// Trial key valid under the shipped secret.
pub const TRIAL_KEY: &str = "THYME-TRIL-7QX3-3322";
/// Legacy-format key valid under the shipped secret.
pub const LEGACY_KEY: &str = "THYME-AB12-CD34-A00D";

/// A clock that only moves when told to.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.0.lock().unwrap() = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// 2024-03-01T09:30:00Z
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

/// A fixed machine identity.
pub fn machine(hostname: &str) -> Arc<MachineProfile> {
    Arc::new(MachineProfile {
        mac_address: Some("aa:bb:cc:dd:ee:ff".into()),
        platform: "linux".into(),
        hostname: hostname.into(),
    })
}

/// A license file path inside a fresh temp dir.
pub struct Sandbox {
    pub dir: TempDir,
    pub clock: Arc<FixedClock>,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            clock: FixedClock::at(epoch()),
        }
    }

    pub fn store(&self) -> LicenseStore {
        LicenseStore::new(self.dir.path().join("ThymeSheet").join("license.json"))
    }

    /// An engine for the named machine sharing this sandbox's file and clock.
    pub fn engine_on(&self, hostname: &str) -> EntitlementEngine {
        EntitlementEngine::new(self.store())
            .with_pool(KeyPool::new(vec![TRIAL_KEY.to_string()]))
            .with_fingerprint(machine(hostname))
            .with_clock(self.clock.clone())
    }

    pub fn engine(&self) -> EntitlementEngine {
        self.engine_on("machine-a")
    }
}
