//! Health classification of statistic values.

use ngstat_types::HealthState;

/// Thresholds for `queued` counters.
///
/// `queued_warning` is expected to be below `queued_critical` but this is
/// not enforced; critical is always checked first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Queue depth at or above which a queue is in warning state.
    pub queued_warning: f64,
    /// Queue depth at or above which a queue is critical.
    pub queued_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            queued_warning: 300.0,
            queued_critical: 1000.0,
        }
    }
}

impl Thresholds {
    /// Returns false if the warning threshold is not below the critical one.
    pub fn is_ordered(&self) -> bool {
        self.queued_warning < self.queued_critical
    }

    /// Grade a counter value by its type.
    ///
    /// Only `dropped` and `queued` counters are graded; every other type is
    /// [`HealthState::Unclassified`].
    pub fn classify(&self, kind: &str, metric: f64) -> HealthState {
        match kind {
            "dropped" => dropped_state(metric),
            "queued" => self.queued_state(metric),
            _ => HealthState::Unclassified,
        }
    }

    fn queued_state(&self, metric: f64) -> HealthState {
        if metric >= self.queued_critical {
            HealthState::Critical
        } else if metric >= self.queued_warning {
            HealthState::Warning
        } else {
            HealthState::Ok
        }
    }
}

// Any drop at all is critical, including NaN and negative values.
fn dropped_state(metric: f64) -> HealthState {
    if metric == 0.0 {
        HealthState::Ok
    } else {
        HealthState::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped() {
        let t = Thresholds::default();
        assert_eq!(t.classify("dropped", 0.0), HealthState::Ok);
        assert_eq!(t.classify("dropped", -0.0), HealthState::Ok);
        assert_eq!(t.classify("dropped", 1.0), HealthState::Critical);
        assert_eq!(t.classify("dropped", 1000.0), HealthState::Critical);
        assert_eq!(t.classify("dropped", -3.0), HealthState::Critical);
        assert_eq!(t.classify("dropped", f64::NAN), HealthState::Critical);
        assert_eq!(t.classify("dropped", 1e-12), HealthState::Critical);
    }

    #[test]
    fn test_queued() {
        let t = Thresholds::default();
        assert_eq!(t.classify("queued", 0.0), HealthState::Ok);
        assert_eq!(t.classify("queued", 204.0), HealthState::Ok);
        assert_eq!(t.classify("queued", 299.9), HealthState::Ok);
        assert_eq!(t.classify("queued", 404.0), HealthState::Warning);
        assert_eq!(t.classify("queued", 999.0), HealthState::Warning);
        assert_eq!(t.classify("queued", 4040.0), HealthState::Critical);
    }

    #[test]
    fn test_queued_boundaries_are_inclusive() {
        let t = Thresholds::default();
        assert_eq!(t.classify("queued", 300.0), HealthState::Warning);
        assert_eq!(t.classify("queued", 1000.0), HealthState::Critical);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = Thresholds {
            queued_warning: 10.0,
            queued_critical: 20.0,
        };
        assert_eq!(t.classify("queued", 9.0), HealthState::Ok);
        assert_eq!(t.classify("queued", 10.0), HealthState::Warning);
        assert_eq!(t.classify("queued", 20.0), HealthState::Critical);
    }

    #[test]
    fn test_inverted_thresholds_check_critical_first() {
        let t = Thresholds {
            queued_warning: 1000.0,
            queued_critical: 300.0,
        };
        assert!(!t.is_ordered());
        assert_eq!(t.classify("queued", 500.0), HealthState::Critical);
        assert_eq!(t.classify("queued", 100.0), HealthState::Ok);
    }

    #[test]
    fn test_other_types_are_unclassified() {
        let t = Thresholds::default();
        for kind in ["processed", "written", "stamp", "memory_usage", "", "Dropped", "QUEUED"] {
            assert_eq!(t.classify(kind, 0.0), HealthState::Unclassified, "{kind}");
            assert_eq!(t.classify(kind, 5000.0), HealthState::Unclassified, "{kind}");
        }
    }

    #[test]
    fn test_default_thresholds() {
        let t = Thresholds::default();
        assert_eq!(t.queued_warning, 300.0);
        assert_eq!(t.queued_critical, 1000.0);
        assert!(t.is_ordered());
    }
}
