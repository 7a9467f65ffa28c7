//! Closed-set string options.
//!
//! Each option type declares an explicit symbol table mapping accepted
//! strings to variants. Lookups are exact and case-sensitive.

use serde::Serialize;
use std::fmt;

use crate::error::ConfigError;

/// An option whose value is drawn from a fixed set of symbols.
pub trait EnumOption: Copy + 'static {
    /// Accepted symbols and the variant each resolves to.
    const SYMBOLS: &'static [(&'static str, Self)];

    /// Returns the canonical symbol for this variant.
    fn symbol(self) -> &'static str;
}

/// Resolves a closed-set option.
///
/// An absent or empty value resolves to `None`, which means "unset".
///
/// # Errors
///
/// Returns [`ConfigError::UnknownEnumValue`] if a non-empty value matches no
/// symbol.
pub fn resolve_enum<E: EnumOption>(name: &str, raw: Option<&str>) -> Result<Option<E>, ConfigError> {
    let Some(value) = raw.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    E::SYMBOLS
        .iter()
        .find(|(symbol, _)| *symbol == value)
        .map(|(_, variant)| Some(*variant))
        .ok_or_else(|| ConfigError::UnknownEnumValue {
            option: name.to_string(),
            value: value.to_string(),
            valid: E::SYMBOLS
                .iter()
                .map(|(symbol, _)| *symbol)
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Minimum TLS version accepted by a search domain endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TlsSecurityPolicy {
    /// TLS 1.0 and later.
    #[serde(rename = "Policy-Min-TLS-1-0-2019-07")]
    Tls1_0,
    /// TLS 1.2 and later.
    #[serde(rename = "Policy-Min-TLS-1-2-2019-07")]
    Tls1_2,
    /// TLS 1.2 and later, perfect forward secrecy ciphers only.
    #[serde(rename = "Policy-Min-TLS-1-2-PFS-2023-10")]
    Tls1_2Pfs,
}

impl EnumOption for TlsSecurityPolicy {
    const SYMBOLS: &'static [(&'static str, Self)] = &[
        ("TLS_1_0", Self::Tls1_0),
        ("TLS_1_2", Self::Tls1_2),
        ("TLS_1_2_PFS", Self::Tls1_2Pfs),
    ];

    fn symbol(self) -> &'static str {
        match self {
            Self::Tls1_0 => "TLS_1_0",
            Self::Tls1_2 => "TLS_1_2",
            Self::Tls1_2Pfs => "TLS_1_2_PFS",
        }
    }
}

/// Block-storage volume class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EbsVolumeType {
    /// Magnetic.
    Standard,
    /// Provisioned IOPS SSD.
    Io1,
    /// Provisioned IOPS SSD, second generation.
    Io2,
    /// General purpose SSD.
    Gp2,
    /// General purpose SSD, third generation.
    Gp3,
    /// Throughput optimized HDD.
    St1,
    /// Cold HDD.
    Sc1,
}

impl EnumOption for EbsVolumeType {
    const SYMBOLS: &'static [(&'static str, Self)] = &[
        ("STANDARD", Self::Standard),
        ("IO1", Self::Io1),
        ("IO2", Self::Io2),
        ("GP2", Self::Gp2),
        ("GP3", Self::Gp3),
        ("ST1", Self::St1),
        ("SC1", Self::Sc1),
        ("GENERAL_PURPOSE_SSD", Self::Gp2),
        ("GENERAL_PURPOSE_SSD_GP3", Self::Gp3),
        ("PROVISIONED_IOPS_SSD", Self::Io1),
        ("PROVISIONED_IOPS_SSD_IO2", Self::Io2),
        ("THROUGHPUT_OPTIMIZED_HDD", Self::St1),
        ("COLD_HDD", Self::Sc1),
        ("MAGNETIC", Self::Standard),
    ];

    fn symbol(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Io1 => "IO1",
            Self::Io2 => "IO2",
            Self::Gp2 => "GP2",
            Self::Gp3 => "GP3",
            Self::St1 => "ST1",
            Self::Sc1 => "SC1",
        }
    }
}

/// What happens to a resource when its unit is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalPolicy {
    /// Delete the resource.
    Destroy,
    /// Keep the resource orphaned.
    Retain,
    /// Snapshot, then delete.
    Snapshot,
    /// Retain on replacement or deletion, destroy on failed creation.
    RetainOnUpdateOrDelete,
}

impl EnumOption for RemovalPolicy {
    const SYMBOLS: &'static [(&'static str, Self)] = &[
        ("DESTROY", Self::Destroy),
        ("RETAIN", Self::Retain),
        ("SNAPSHOT", Self::Snapshot),
        ("RETAIN_ON_UPDATE_OR_DELETE", Self::RetainOnUpdateOrDelete),
    ];

    fn symbol(self) -> &'static str {
        match self {
            Self::Destroy => "DESTROY",
            Self::Retain => "RETAIN",
            Self::Snapshot => "SNAPSHOT",
            Self::RetainOnUpdateOrDelete => "RETAIN_ON_UPDATE_OR_DELETE",
        }
    }
}

impl fmt::Display for TlsSecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for EbsVolumeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbols_resolve() {
        assert_eq!(
            resolve_enum::<TlsSecurityPolicy>("tlsSecurityPolicy", Some("TLS_1_2")).unwrap(),
            Some(TlsSecurityPolicy::Tls1_2)
        );
        assert_eq!(
            resolve_enum::<EbsVolumeType>("ebsVolumeType", Some("GENERAL_PURPOSE_SSD_GP3")).unwrap(),
            Some(EbsVolumeType::Gp3)
        );
        assert_eq!(
            resolve_enum::<RemovalPolicy>("domainRemovalPolicy", Some("RETAIN")).unwrap(),
            Some(RemovalPolicy::Retain)
        );
    }

    #[test]
    fn test_empty_is_unset() {
        assert_eq!(resolve_enum::<TlsSecurityPolicy>("tlsSecurityPolicy", None).unwrap(), None);
        assert_eq!(resolve_enum::<RemovalPolicy>("domainRemovalPolicy", Some("")).unwrap(), None);
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        let err = resolve_enum::<EbsVolumeType>("ebsVolumeType", Some("gp3")).unwrap_err();
        match err {
            ConfigError::UnknownEnumValue { option, value, valid } => {
                assert_eq!(option, "ebsVolumeType");
                assert_eq!(value, "gp3");
                assert!(valid.contains("GP3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_every_variant_round_trips_through_its_symbol() {
        for (_, variant) in RemovalPolicy::SYMBOLS {
            assert_eq!(
                resolve_enum::<RemovalPolicy>("domainRemovalPolicy", Some(variant.symbol())).unwrap(),
                Some(*variant)
            );
        }
    }
}
