//! Licensing and feature entitlements for ThymeSheet.
//!
//! This crate handles:
//! - License key grammar and checksum verification
//! - Hardware fingerprinting for machine binding
//! - The persisted license record
//! - Trial bootstrapping from a bundled key pool
//! - Tier derivation and feature gating
//!
//! # Design Principles
//!
//! - **Offline**: keys verify locally against a shared secret; there is no
//!   activation server
//! - **File is truth**: the record file is reloaded on every query
//! - **Fail restricted**: unreadable or invalid state degrades to the free
//!   tier instead of failing the host application
//! - **One key, one machine**: records are bound to a hardware fingerprint
//!
//! # License Key Format
//!
//! `THYME-{TRIL|PREM}-XXXX-CCCC`, or the legacy `THYME-XXXX-YYYY-CCCC`, where
//! `CCCC` is the first four hex digits of `SHA-256(secret ∥ payload)`.

mod checksum;
mod device;
mod engine;
mod error;
mod features;
mod key;
mod keygen;
mod pool;
mod record;
mod status;
mod store;

pub use checksum::{
    checksum_matches, expected_checksum, verify, verify_with_secret, CHECKSUM_LEN, LICENSE_SECRET,
};
pub use device::{
    first_hardware_address, FingerprintSource, HardwareId, InterfaceEntry, MachineProfile,
    SystemFingerprint,
};
pub use engine::{
    check_record, evaluate, Clock, EntitlementEngine, SystemClock, TRIAL_DURATION_DAYS,
};
pub use error::{LicenseError, LicenseResult};
pub use features::{available_features, Feature, Tier, UnknownFeature};
pub use key::{KeyBody, KeyKind, LicenseKey, PRODUCT_TAG, SEGMENT_LEN};
pub use keygen::{generate_key, generate_legacy_key, random_segment, tiered_key};
pub use pool::{KeyPool, KEY_POOL_FILE};
pub use record::{LicenseRecord, LicenseType};
pub use status::{ActivationResult, InvalidReason, TierState};
pub use store::LicenseStore;
