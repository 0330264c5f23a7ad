//! Certificate type names and identifiers.
//!
//! Static table; lookups that miss return [`CertificateType::Unknown`] or
//! `None` rather than an error.

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Certificate types a peer may present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CertificateType {
    /// No match.
    #[default]
    Unknown = 0,
    /// X.509 certificates.
    X509 = 1,
    /// OpenPGP keys.
    OpenPgp = 2,
}

const SUPPORTED: [CertificateType; 2] = [CertificateType::X509, CertificateType::OpenPgp];

impl CertificateType {
    /// Canonical name, or `None` for [`Unknown`](Self::Unknown).
    pub fn name(self) -> Option<&'static str> {
        match self {
            CertificateType::X509 => Some("X.509"),
            CertificateType::OpenPgp => Some("OPENPGP"),
            CertificateType::Unknown => None,
        }
    }

    /// Case-insensitive lookup. Accepts "X.509", "X509" and "OPENPGP".
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("X.509") || name.eq_ignore_ascii_case("X509") {
            CertificateType::X509
        } else if name.eq_ignore_ascii_case("OPENPGP") {
            CertificateType::OpenPgp
        } else {
            CertificateType::Unknown
        }
    }

    /// Supported types in preference order.
    pub fn list() -> &'static [CertificateType] {
        &SUPPORTED
    }

    /// Numeric identifier.
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// See [`CertificateType::name`].
pub fn name_for(ty: CertificateType) -> Option<&'static str> {
    ty.name()
}

/// See [`CertificateType::from_name`].
pub fn id_for(name: &str) -> CertificateType {
    CertificateType::from_name(name)
}

/// See [`CertificateType::list`].
pub fn list() -> &'static [CertificateType] {
    CertificateType::list()
}

impl FromStr for CertificateType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl std::fmt::Display for CertificateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name().unwrap_or("UNKNOWN"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(name_for(CertificateType::X509), Some("X.509"));
        assert_eq!(name_for(CertificateType::OpenPgp), Some("OPENPGP"));
        assert_eq!(name_for(CertificateType::Unknown), None);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(id_for("x509"), CertificateType::X509);
        assert_eq!(id_for("X.509"), CertificateType::X509);
        assert_eq!(id_for("x.509"), CertificateType::X509);
        assert_eq!(id_for("OpenPGP"), CertificateType::OpenPgp);
    }

    #[test]
    fn test_lookup_miss_is_unknown() {
        assert_eq!(id_for("bogus"), CertificateType::Unknown);
        assert_eq!(id_for(""), CertificateType::Unknown);
        assert_eq!(id_for("X.509 "), CertificateType::Unknown);
    }

    #[test]
    fn test_list_order() {
        assert_eq!(list(), &[CertificateType::X509, CertificateType::OpenPgp]);
    }

    #[test]
    fn test_names_round_trip_through_lookup() {
        for ty in list() {
            let name = ty.name().unwrap();
            assert_eq!(name.parse::<CertificateType>().unwrap(), *ty);
            assert_eq!(ty.to_string(), name);
        }
        assert_eq!(CertificateType::Unknown.to_string(), "UNKNOWN");
        assert_eq!(CertificateType::OpenPgp.id(), 2);
    }
}
