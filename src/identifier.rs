//! UUID-shaped identifier generation and validation.
//!
//! Two constructions are offered:
//!
//! - **v4**: sixteen bytes from the OS CSPRNG with the version and variant
//!   bits stamped in. This is a regular random UUID.
//! - **v1-like**: the current UNIX time in milliseconds, big-endian, in the
//!   first eight bytes, followed by eight random bytes, then the same bit
//!   stamping with version `1`.
//!
//! The v1-like layout is *not* RFC 4122 version 1. There is no 100ns epoch,
//! no clock sequence and no node id. Its only ordering guarantee is that the
//! first eight hex digits never decrease as the clock moves forward, which is
//! what existing clients sort on.
//!
//! ## Rendering
//!
//! Identifiers are rendered as 36 lowercase hex characters in the
//! `8-4-4-4-12` grouping, for example `0176bb3c-5e00-1a2b-9c3d-4e5f60718293`.

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-4][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("static uuid pattern compiles")
});

/// Byte offset of the version nibble.
const VERSION_BYTE: usize = 6;
/// Byte offset of the variant bits.
const VARIANT_BYTE: usize = 8;
/// Character offset of the version digit in the rendered form.
const VERSION_CHAR: usize = 14;

/// Generate a random (version 4) identifier.
pub fn generate_v4() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    stamp(&mut bytes, 4);
    render(&bytes)
}

/// Generate a time-prefixed (v1-like) identifier from the current clock.
pub fn generate_v1() -> String {
    generate_v1_at(Utc::now().timestamp_millis())
}

/// Generate a time-prefixed identifier for the given UNIX millisecond instant.
pub fn generate_v1_at(unix_millis: i64) -> String {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&unix_millis.to_be_bytes());
    OsRng.fill_bytes(&mut bytes[8..]);
    stamp(&mut bytes, 1);
    render(&bytes)
}

/// Returns true if `id` looks like a v1..v4 UUID with the RFC variant.
/// Case-insensitive.
pub fn is_valid(id: &str) -> bool {
    UUID_RE.is_match(id)
}

/// The version digit of a valid identifier, `None` otherwise.
pub fn version(id: &str) -> Option<u8> {
    if !is_valid(id) {
        return None;
    }
    id[VERSION_CHAR..=VERSION_CHAR]
        .parse::<u8>()
        .ok()
}

fn stamp(bytes: &mut [u8; 16], version: u8) {
    bytes[VERSION_BYTE] = (bytes[VERSION_BYTE] & 0x0f) | (version << 4);
    bytes[VARIANT_BYTE] = (bytes[VARIANT_BYTE] & 0x3f) | 0x80;
}

fn render(bytes: &[u8; 16]) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        hex::encode(&bytes[0..4]),
        hex::encode(&bytes[4..6]),
        hex::encode(&bytes[6..8]),
        hex::encode(&bytes[8..10]),
        hex::encode(&bytes[10..16]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v4_has_version_and_variant() {
        for _ in 0..64 {
            let id = generate_v4();
            assert_eq!(id.len(), 36);
            assert!(is_valid(&id), "{id}");
            assert_eq!(version(&id), Some(4));
            assert!(matches!(id.as_bytes()[19], b'8' | b'9' | b'a' | b'b'));
        }
    }

    #[test]
    fn v1_prefix_encodes_millis() {
        let millis: i64 = 1_609_459_200_000;
        let id = generate_v1_at(millis);
        assert!(is_valid(&id));
        assert_eq!(version(&id), Some(1));

        // bytes 0..4 are untouched by stamping
        let expected = hex::encode(&millis.to_be_bytes()[..4]);
        assert_eq!(&id[..8], expected);
    }

    #[test]
    fn v1_prefix_is_monotonic() {
        let earlier = generate_v1_at(1_000_000_000_000);
        let later = generate_v1_at(1_700_000_000_000);
        assert!(earlier[..8] <= later[..8]);

        let a = generate_v1();
        let b = generate_v1();
        assert!(a[..8] <= b[..8]);
    }

    #[test]
    fn version_of_invalid_is_none() {
        assert_eq!(version("invalid-uuid"), None);
        assert_eq!(version(""), None);
        // version 5 is outside the accepted range
        assert_eq!(version("123e4567-e89b-52d3-a456-426614174000"), None);
        // wrong variant
        assert_eq!(version("123e4567-e89b-12d3-c456-426614174000"), None);
    }

    #[test]
    fn validation_ignores_case() {
        assert!(is_valid("123E4567-E89B-12D3-A456-426614174000"));
        assert_eq!(version("123E4567-E89B-42D3-A456-426614174000"), Some(4));
    }
}
