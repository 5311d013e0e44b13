//! Provider identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a regional forecast provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Fennoscandian meteorological service.
    Nordic,
    /// Iberian meteorological service (mainland and Canary Islands).
    Iberian,
    /// Worldwide fallback provider.
    Global,
}

impl ProviderId {
    /// Stable string form, used in log fields and the cache file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Nordic => "nordic",
            ProviderId::Iberian => "iberian",
            ProviderId::Global => "global",
        }
    }

    /// All known providers.
    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Nordic, ProviderId::Iberian, ProviderId::Global]
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_as_str() {
        for id in ProviderId::all() {
            assert_eq!(format!("{}", id), id.as_str());
        }
    }

    #[test]
    fn serde_roundtrip() {
        for id in ProviderId::all() {
            let json = serde_json::to_string(id).unwrap();
            let back: ProviderId = serde_json::from_str(&json).unwrap();
            assert_eq!(*id, back);
        }
    }
}
