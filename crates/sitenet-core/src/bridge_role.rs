//! Wireless bridge role inference (access point vs. station).
//!
//! Gateway firmware reports the operating mode of a bridge in whichever field
//! it likes: a dedicated role field, a mode string, the model number, the
//! device name, or one of the status tags. The resolver walks those hints
//! from most to least trustworthy and returns the first one that says
//! anything recognisable.

use serde::{Deserialize, Serialize};

use crate::model::BridgeRole;

const AP_TOKENS: &[&str] = &["ap", "access", "accesspoint", "master"];
const ST_TOKENS: &[&str] = &["st", "sta", "station", "client", "subscriber", "slave"];
const ST_SUBSTRINGS: &[&str] = &["station", "sta", "client", "subscriber"];

/// Raw hint fields that may reveal a bridge's role, in no particular shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeHints<'a> {
    pub bridge_role: Option<&'a str>,
    pub mode: Option<&'a str>,
    pub role: Option<&'a str>,
    pub model: Option<&'a str>,
    pub name: Option<&'a str>,
    pub statuses: &'a [String],
}

impl<'a> BridgeHints<'a> {
    /// Candidates in priority order: explicit role, mode, role, model, name,
    /// then each status tag.
    fn candidates(self) -> impl Iterator<Item = &'a str> {
        [self.bridge_role, self.mode, self.role, self.model, self.name]
            .into_iter()
            .flatten()
            .chain(self.statuses.iter().map(String::as_str))
    }
}

/// Resolve the role of a bridge, or `None` when no hint is recognisable.
///
/// `None` means "not known yet", not an error.
pub fn resolve_bridge_role(hints: &BridgeHints<'_>) -> Option<BridgeRole> {
    hints.candidates().find_map(classify)
}

/// Role as shown on topology views, where "unknown" is a first-class value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DisplayRole {
    Ap,
    St,
    Unknown,
}

impl From<Option<BridgeRole>> for DisplayRole {
    fn from(role: Option<BridgeRole>) -> Self {
        match role {
            Some(BridgeRole::Ap) => Self::Ap,
            Some(BridgeRole::St) => Self::St,
            None => Self::Unknown,
        }
    }
}

/// Same inference as [`resolve_bridge_role`], with `Unknown` as the
/// no-match sentinel.
pub fn resolve_display_role(hints: &BridgeHints<'_>) -> DisplayRole {
    resolve_bridge_role(hints).into()
}

/// Classify a single candidate string: token match first, then substring
/// heuristics for run-together identifiers such as `APMode200`.
fn classify(candidate: &str) -> Option<BridgeRole> {
    let lower = candidate.to_lowercase();
    if lower.trim().is_empty() {
        return None;
    }

    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| AP_TOKENS.contains(t)) {
        return Some(BridgeRole::Ap);
    }
    if tokens.iter().any(|t| ST_TOKENS.contains(t)) {
        return Some(BridgeRole::St);
    }

    if has_standalone_ap(&lower) || lower.contains("apmode") || lower.contains("ap-") {
        return Some(BridgeRole::Ap);
    }
    if ST_SUBSTRINGS.iter().any(|s| lower.contains(s)) {
        return Some(BridgeRole::St);
    }
    None
}

/// `ap` with no letter directly before or after it (digits are fine, so
/// `ap1` and `2ap` both count).
fn has_standalone_ap(lower: &str) -> bool {
    let bytes = lower.as_bytes();
    lower.match_indices("ap").any(|(i, _)| {
        let before = i.checked_sub(1).and_then(|j| bytes.get(j));
        let after = bytes.get(i + 2);
        !before.is_some_and(u8::is_ascii_alphabetic) && !after.is_some_and(u8::is_ascii_alphabetic)
    })
}
