//! Events - what gets handed to the reporting sink.

use crate::HealthState;

/// A monitoring event produced for one statistic record.
///
/// # Example
///
/// ```rust
/// use ngstat_types::{Event, HealthState};
///
/// let event = Event::new("dst.riemann queued", 404.0, HealthState::Warning)
///     .with_host("log01")
///     .with_tags(["syslog-ng"]);
///
/// assert_eq!(event.host.as_deref(), Some("log01"));
/// assert_eq!(event.tags, vec!["syslog-ng".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Service name rendered from the record.
    pub service: String,

    /// Counter value.
    pub metric: f64,

    /// Health grade; omitted entirely when unclassified.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "HealthState::is_unclassified")
    )]
    pub state: HealthState,

    /// Host the statistic belongs to.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub host: Option<String>,

    /// Seconds the event stays valid downstream.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub ttl: Option<f32>,

    /// Free-form labels.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub tags: Vec<String>,
}

impl Event {
    /// Create an event without host, ttl or tags.
    pub fn new(service: impl Into<String>, metric: f64, state: HealthState) -> Self {
        Self {
            service: service.into(),
            metric,
            state,
            host: None,
            ttl: None,
            tags: Vec::new(),
        }
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the time-to-live in seconds.
    pub fn with_ttl(mut self, ttl: f32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Replace the tags.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_attributes() {
        let event = Event::new("svc", 1.0, HealthState::Critical);
        assert_eq!(event.host, None);
        assert_eq!(event.ttl, None);
        assert!(event.tags.is_empty());
    }

    #[test]
    fn test_builder_methods() {
        let event = Event::new("svc", 1.0, HealthState::Ok)
            .with_host("log01")
            .with_ttl(60.0)
            .with_tags(vec!["a", "b"]);
        assert_eq!(event.host.as_deref(), Some("log01"));
        assert_eq!(event.ttl, Some(60.0));
        assert_eq!(event.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_unclassified_state_is_omitted() {
        let event = Event::new("destination;d_mail;;a;processed", 531.0, HealthState::Unclassified);
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("state").is_none());
        assert!(json.get("host").is_none());
        assert!(json.get("tags").is_none());
        assert_eq!(json["metric"], 531.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_classified_state_is_serialized() {
        let event = Event::new("dst.riemann queued", 204.0, HealthState::Ok).with_ttl(10.0);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"service":"dst.riemann queued","metric":204.0,"state":"ok","ttl":10.0}"#
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_missing_state_deserializes_unclassified() {
        let event: Event = serde_json::from_str(r#"{"service":"x","metric":3.0}"#).unwrap();
        assert!(event.state.is_unclassified());
    }
}
