use thymesheet_license::LicenseError;

#[test]
fn error_display_malformed_key() {
    let err = LicenseError::MalformedKey("expected 4 segments, found 2".into());
    let msg = format!("{err}");
    assert!(msg.contains("invalid license key format"));
    assert!(msg.contains("4 segments"));
}

#[test]
fn error_display_checksum() {
    assert!(format!("{}", LicenseError::InvalidChecksum).contains("checksum"));
}

#[test]
fn error_display_hardware() {
    assert!(format!("{}", LicenseError::HardwareMismatch).contains("different machine"));
    assert!(format!("{}", LicenseError::AlreadyActivatedElsewhere).contains("another machine"));
}

#[test]
fn error_display_corrupted() {
    let err = LicenseError::RecordCorrupted("expected value at line 1".into());
    assert!(format!("{err}").contains("corrupted"));
}

#[test]
fn error_display_pool() {
    assert!(format!("{}", LicenseError::PoolExhausted).contains("trial keys"));
}

#[test]
fn error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: LicenseError = io.into();
    assert!(matches!(err, LicenseError::PersistenceFailure(_)));
    assert!(format!("{err}").contains("storage"));
}

#[test]
fn error_codes_are_distinct() {
    let errors = [
        LicenseError::MalformedKey(String::new()),
        LicenseError::InvalidChecksum,
        LicenseError::HardwareMismatch,
        LicenseError::AlreadyActivatedElsewhere,
        LicenseError::RecordCorrupted(String::new()),
        LicenseError::PoolExhausted,
        LicenseError::PersistenceFailure(std::io::Error::other("x")),
    ];
    let mut codes: Vec<_> = errors.iter().map(LicenseError::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}
