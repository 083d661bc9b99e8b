//! Key generation for distribution and trial pools.

use crate::checksum::expected_checksum;
use crate::key::{KeyBody, KeyKind, LicenseKey, PRODUCT_TAG, SEGMENT_LEN};
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws one random `[A-Z0-9]{4}` segment.
pub fn random_segment<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SEGMENT_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Builds a tiered key for `payload`, signing it with `secret`.
#[must_use]
pub fn tiered_key(kind: KeyKind, payload: &str, secret: &str) -> String {
    let checksum = expected_checksum(secret, &[payload]);
    format!("{PRODUCT_TAG}-{}-{payload}-{checksum}", kind.tag())
}

/// Generates a fresh tiered key.
pub fn generate_key<R: Rng + ?Sized>(kind: KeyKind, secret: &str, rng: &mut R) -> LicenseKey {
    let payload = random_segment(rng);
    let checksum = expected_checksum(secret, &[&payload]);
    LicenseKey::assemble(KeyBody::Tiered { kind, payload }, checksum)
}

/// Generates a key in the legacy `THYME-XXXX-YYYY-CCCC` layout.
///
/// A legacy part that happens to read `TRIL` or `PREM` would parse as a
/// tiered key with a different checksum input, so those draws are retried.
pub fn generate_legacy_key<R: Rng + ?Sized>(secret: &str, rng: &mut R) -> LicenseKey {
    loop {
        let part1 = random_segment(rng);
        if KeyKind::from_tag(&part1).is_some() {
            continue;
        }
        let part2 = random_segment(rng);
        let checksum = expected_checksum(secret, &[&part1, &part2]);
        return LicenseKey::assemble(KeyBody::Legacy { part1, part2 }, checksum);
    }
}
