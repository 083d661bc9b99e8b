mod common;

use chrono::Duration;
use common::{epoch, PREMIUM_KEY, TRIAL_KEY};
use pretty_assertions::assert_eq;
use std::fs;
use thymesheet_license::{HardwareId, LicenseError, LicenseRecord, LicenseStore, LicenseType};

fn trial_record() -> LicenseRecord {
    LicenseRecord {
        license_key: TRIAL_KEY.into(),
        license_type: Some(LicenseType::Trial),
        hardware_id: HardwareId::from_raw("hw-1"),
        activated_at: epoch(),
        trial_ends_at: Some(epoch() + Duration::days(30)),
        upgraded_at: None,
    }
}

#[test]
fn missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = LicenseStore::new(dir.path().join("license.json"));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn save_creates_directory_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = LicenseStore::new(dir.path().join("nested").join("deeper").join("license.json"));

    store.save(&trial_record()).unwrap();
    assert!(store.path().exists());
    assert_eq!(store.load().unwrap(), Some(trial_record()));
}

#[test]
fn save_overwrites_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = LicenseStore::new(dir.path().join("license.json"));
    store.save(&trial_record()).unwrap();

    let premium = LicenseRecord {
        license_key: PREMIUM_KEY.into(),
        license_type: Some(LicenseType::Premium),
        trial_ends_at: None,
        upgraded_at: Some(epoch() + Duration::days(3)),
        ..trial_record()
    };
    store.save(&premium).unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(!raw.contains("trialEndsAt"));
    assert_eq!(store.load().unwrap(), Some(premium));
    assert!(!dir.path().join("license.json.tmp").exists());
}

#[test]
fn invalid_json_is_corrupted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("license.json");
    fs::write(&path, "{ not json").unwrap();

    let err = LicenseStore::new(&path).load().unwrap_err();
    assert!(matches!(err, LicenseError::RecordCorrupted(_)));
}

#[test]
fn wrong_shape_is_corrupted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("license.json");
    fs::write(&path, r#"{"licenseKey": 12}"#).unwrap();

    let err = LicenseStore::new(&path).load().unwrap_err();
    assert!(matches!(err, LicenseError::RecordCorrupted(_)));
}

#[test]
fn reads_records_written_by_earlier_releases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("license.json");
    fs::write(
        &path,
        r#"{
  "licenseKey": "THYME-AB12-CD34-A00D",
  "hardwareId": "hw-1",
  "activatedAt": "2024-03-01T09:30:00.000Z"
}"#,
    )
    .unwrap();

    let record = LicenseStore::new(&path).load().unwrap().unwrap();
    assert_eq!(record.license_type, None);
    assert_eq!(record.activated_at, epoch());
}

#[test]
fn directory_in_place_of_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LicenseStore::new(dir.path()).load().unwrap_err();
    assert!(matches!(err, LicenseError::PersistenceFailure(_)));
}

#[test]
fn default_path_ends_with_license_file() {
    let path = LicenseStore::default_path();
    assert!(path.ends_with("ThymeSheet/license.json"));
}
