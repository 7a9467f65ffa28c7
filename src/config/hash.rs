//! Option fingerprints for change detection.
//!
//! The fingerprint is computed over resolved option values, so two raw
//! configurations that resolve identically (e.g. a value supplied explicitly
//! versus the same value taken from defaults) share a fingerprint.

use sha2::{Digest, Sha256};

use super::schema::ResolvedOptions;

/// Hasher for computing option fingerprints.
#[derive(Debug, Default)]
pub struct OptionHasher;

impl OptionHasher {
    /// Creates a new option hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes a fingerprint of every resolved option.
    #[must_use]
    pub fn fingerprint(&self, options: &ResolvedOptions) -> String {
        let mut hasher = Sha256::new();

        // Iteration order is the schema map's sorted order
        for (name, value) in options.present() {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            hasher.update(value.to_value().to_string().as_bytes());
            hasher.update([0u8]);
        }

        hex::encode(hasher.finalize())
    }

    /// Returns a short form of a fingerprint for display.
    #[must_use]
    pub fn short(fingerprint: &str) -> &str {
        fingerprint.get(..12).unwrap_or(fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionTable;

    fn fingerprint(raw: &OptionTable, defaults: &OptionTable) -> String {
        let resolved = ResolvedOptions::resolve_all(defaults, raw).unwrap();
        OptionHasher::new().fingerprint(&resolved)
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let raw = OptionTable::new().with("stage", "dev").with("domainName", "target");
        assert_eq!(fingerprint(&raw, &OptionTable::new()), fingerprint(&raw, &OptionTable::new()));
        assert_eq!(fingerprint(&raw, &OptionTable::new()).len(), 64);
    }

    #[test]
    fn test_fingerprint_sees_resolved_values() {
        let explicit = OptionTable::new()
            .with("stage", "dev")
            .with("domainName", "target")
            .with("dataNodeCount", 2);
        let defaulted = OptionTable::new().with("stage", "dev").with("domainName", "target");
        let defaults = OptionTable::new().with("dataNodeCount", 2);

        assert_eq!(fingerprint(&explicit, &OptionTable::new()), fingerprint(&defaulted, &defaults));

        let changed = explicit.with("dataNodeCount", 3);
        assert_ne!(fingerprint(&changed, &OptionTable::new()), fingerprint(&defaulted, &defaults));
    }

    #[test]
    fn test_short() {
        assert_eq!(OptionHasher::short("abcdef0123456789"), "abcdef012345");
        assert_eq!(OptionHasher::short("abc"), "abc");
    }
}
