//! Unique names for staging directories.
//!
//! A staging name is the destination path with `-tmp-copy-<time>-<token>`
//! appended, where `<time>` is the Unix time in milliseconds and `<token>` a
//! random value, both rendered in base 36.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Marker inserted between the destination path and the unique suffix.
pub const STAGING_MARKER: &str = "-tmp-copy-";

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Render `n` in lowercase base 36.
#[must_use]
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(13);
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();

    // Every byte comes from BASE36_DIGITS, which is ASCII.
    digits.into_iter().map(char::from).collect()
}

/// Random token for staging names, in base 36.
#[must_use]
pub fn random_token() -> String {
    to_base36(rand_u64())
}

/// Build the `-tmp-copy-<time>-<token>` suffix for the given instant.
#[must_use]
pub fn staging_suffix(now: SystemTime) -> String {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0);

    format!("{STAGING_MARKER}{}-{}", to_base36(millis), random_token())
}

/// Sibling staging path for `dest`: the same path with a unique suffix appended.
#[must_use]
pub fn staging_path(dest: &Path, now: SystemTime) -> PathBuf {
    let mut raw: OsString = dest.as_os_str().to_owned();
    raw.push(staging_suffix(now));
    PathBuf::from(raw)
}

#[allow(clippy::cast_possible_truncation)]
fn rand_u64() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let state = RandomState::new();
    let mut hasher = state.build_hasher();
    // Truncation is fine, this only seeds a name
    hasher.write_u64(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0),
    );
    hasher.write_u32(std::process::id());
    hasher.finish()
}
