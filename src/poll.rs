//! One polling round over the control socket.

use ngstat_types::{Event, StatisticRecord};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::data::{parse_record, FilterSet, ServiceTemplate, Thresholds};
use crate::error::StatsError;
use crate::source::ControlSocket;

/// Host, ttl and tags copied onto every event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventAttributes {
    pub host: Option<String>,
    pub ttl: Option<f32>,
    pub tags: Vec<String>,
}

/// Turns one `STATS CSV` snapshot into events.
///
/// Holds only configuration; the connection is borrowed per call so the
/// caller decides when to open, reuse or drop it.
#[derive(Debug, Clone, Default)]
pub struct PollCycle {
    filters: FilterSet,
    thresholds: Thresholds,
    template: ServiceTemplate,
    attributes: EventAttributes,
}

impl PollCycle {
    pub fn new(filters: FilterSet, thresholds: Thresholds, template: ServiceTemplate) -> Self {
        Self {
            filters,
            thresholds,
            template,
            attributes: EventAttributes::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: EventAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn template(&self) -> &ServiceTemplate {
        &self.template
    }

    /// Request a snapshot and build one event per accepted record.
    ///
    /// Events are in daemon order. A malformed line aborts the round with
    /// no events; the rest of the response is drained first so the
    /// connection can be reused.
    pub async fn run<S>(&self, socket: &mut ControlSocket<S>) -> Result<Vec<Event>, StatsError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut lines = socket.request_stats().await?;
        let mut events = Vec::new();
        let mut seen = 0usize;

        while let Some(line) = lines.next_line().await {
            let line = line?;
            seen += 1;

            let record = match parse_record(&line) {
                Ok(record) => record,
                Err(e) => {
                    let discarded = lines.drain().await?;
                    debug!(discarded, "Discarded rest of response after malformed line");
                    return Err(e);
                }
            };

            if self.filters.accepts(&record) {
                events.push(self.event_for(&record));
            }
        }

        debug!(records = seen, events = events.len(), "Poll cycle complete");
        Ok(events)
    }

    /// Build the event for a single record.
    pub fn event_for(&self, record: &StatisticRecord) -> Event {
        let state = self.thresholds.classify(&record.kind, record.metric);
        let mut event = Event::new(self.template.render(record), record.metric, state);
        event.host = self.attributes.host.clone();
        event.ttl = self.attributes.ttl;
        event.tags = self.attributes.tags.clone();
        event
    }
}
