// ── Core identity types ──
//
// DeviceId, ProjectId and MacAddress form the foundation of every domain
// type. Ids are opaque v4 UUIDs assigned once; MAC addresses are only ever
// constructed through the canonicalizing parser.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::FieldError;

// ── Opaque ids ──────────────────────────────────────────────────────

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocate a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self {
                Self(u)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

define_id! {
    /// Stable identifier of a canonical device. Assigned at creation, never
    /// rewritten by later snapshots or edits.
    DeviceId
}

define_id! {
    /// Identifier of the project (site) that owns a set of devices.
    ProjectId
}

// ── MacAddress ──────────────────────────────────────────────────────

const MAC_HEX_DIGITS: usize = 12;

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
///
/// Gateways report MACs with dashes, dots, colons, no delimiter at all, and
/// mixed case. Every delimiter is discarded and exactly twelve hex digits must
/// remain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Canonicalize a MAC from any common format.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, FieldError> {
        let hex: String = raw
            .as_ref()
            .chars()
            .filter(char::is_ascii_hexdigit)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if hex.len() != MAC_HEX_DIGITS {
            return Err(FieldError::Mac);
        }

        let octets: Vec<&str> = (0..MAC_HEX_DIGITS)
            .step_by(2)
            .filter_map(|i| hex.get(i..i + 2))
            .collect();
        Ok(Self(octets.join(":")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn device_id_round_trips_through_display() {
        let id = DeviceId::new();
        let parsed: DeviceId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn device_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<DeviceId>().is_err());
    }

    #[test]
    fn mac_address_normalizes_dashes() {
        let mac = MacAddress::parse("AA-BB-CC-DD-EE-FF").unwrap();
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_address_normalizes_case() {
        let mac = MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap();
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_address_accepts_bare_and_dotted_forms() {
        let bare = MacAddress::parse("001122334455").unwrap();
        let dotted = MacAddress::parse("0011.2233.4455").unwrap();
        assert_eq!(bare, dotted);
        assert_eq!(bare.to_string(), "00:11:22:33:44:55");
    }

    #[test]
    fn mac_address_rejects_wrong_length() {
        assert_eq!(MacAddress::parse("00:11:22:33:44"), Err(FieldError::Mac));
        assert_eq!(
            MacAddress::parse("00:11:22:33:44:55:66"),
            Err(FieldError::Mac)
        );
        assert_eq!(MacAddress::parse(""), Err(FieldError::Mac));
    }

    #[test]
    fn mac_address_deserializes_through_parser() {
        let mac: MacAddress = serde_json::from_str("\"00-11-22-33-44-66\"").unwrap();
        assert_eq!(mac.as_str(), "00:11:22:33:44:66");
        assert!(serde_json::from_str::<MacAddress>("\"nope\"").is_err());
    }
}
