//! Deterministic record identifiers.
use sha2::{Digest, Sha256};

/// Number of hex digits in a manifest record identifier.
pub const ID_LEN: usize = 24;

/// Derive a 24-digit uppercase hex identifier from `seed`.
///
/// The same seed always yields the same identifier, so a record that is
/// removed and re-added on the next run keeps its id. When the candidate is
/// already taken (`is_taken` returns `true`), the seed is suffixed with a
/// counter until a free id is found.
///
/// # Examples
///
/// ```
/// use native_assets_cli::xcode::id::generate_id;
///
/// let a = generate_id("PBXGroup:MyApp/Fonts", |_| false);
/// let b = generate_id("PBXGroup:MyApp/Fonts", |_| false);
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 24);
/// ```
#[must_use]
pub fn generate_id(seed: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = hash_id(seed);
    let mut attempt = 1u32;
    while is_taken(&candidate) {
        candidate = hash_id(&format!("{seed}#{attempt}"));
        attempt += 1;
    }
    candidate
}

fn hash_id(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    digest
        .iter()
        .take(ID_LEN / 2)
        .map(|b| format!("{b:02X}"))
        .collect()
}
