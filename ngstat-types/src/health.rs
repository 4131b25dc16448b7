//! Health states derived from statistic values.

use std::fmt;

/// Three-level health grade of a statistic, or the absence of one.
///
/// Only some counter types can be graded. Everything else is
/// [`HealthState::Unclassified`] and is reported without a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HealthState {
    Ok,
    Warning,
    Critical,
    #[default]
    Unclassified,
}

impl HealthState {
    /// Wire name of the state, `None` when unclassified.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            HealthState::Ok => Some("ok"),
            HealthState::Warning => Some("warning"),
            HealthState::Critical => Some("critical"),
            HealthState::Unclassified => None,
        }
    }

    /// Returns true if no grade was computed.
    pub fn is_unclassified(&self) -> bool {
        matches!(self, HealthState::Unclassified)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(HealthState::Ok.as_str(), Some("ok"));
        assert_eq!(HealthState::Warning.as_str(), Some("warning"));
        assert_eq!(HealthState::Critical.as_str(), Some("critical"));
        assert_eq!(HealthState::Unclassified.as_str(), None);
    }

    #[test]
    fn test_default_is_unclassified() {
        assert!(HealthState::default().is_unclassified());
        assert!(!HealthState::Ok.is_unclassified());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthState::Warning).unwrap(),
            "\"warning\""
        );
        let state: HealthState = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(state, HealthState::Critical);
    }
}
