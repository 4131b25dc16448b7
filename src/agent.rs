//! Agent: connection ownership and the polling schedule.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::data::duration::format_duration;
use crate::error::StatsError;
use crate::output::Output;
use crate::poll::PollCycle;
use crate::source::{ControlSocket, Connector};

/// Polls the control socket and forwards events to an [`Output`].
///
/// The agent owns the connection between ticks. A tick that fails with a
/// connection-level error drops it, and the next tick reconnects. Ticks
/// never overlap.
#[derive(Debug)]
pub struct Agent {
    connector: Connector,
    socket: Option<ControlSocket>,
    cycle: PollCycle,
    output: Output,
    /// Message of the most recent failed tick, cleared on success.
    pub last_error: Option<String>,
}

impl Agent {
    pub fn new(connector: Connector, cycle: PollCycle, output: Output) -> Self {
        Self {
            connector,
            socket: None,
            cycle,
            output,
            last_error: None,
        }
    }

    /// Build an agent from resolved settings.
    ///
    /// Fails on an invalid template, timeout or output, so configuration
    /// mistakes surface before the first poll.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let cycle = settings.poll_cycle()?;
        let thresholds = cycle.thresholds();
        if !thresholds.is_ordered() {
            warn!(
                queued_warning = thresholds.queued_warning,
                queued_critical = thresholds.queued_critical,
                "queued_warning is not below queued_critical; warning state is unreachable"
            );
        }

        Ok(Self::new(settings.connector()?, cycle, settings.output()?))
    }

    /// Returns true if a connection is held for the next tick.
    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Run one poll and emit its events. Returns the number emitted.
    pub async fn tick(&mut self) -> Result<usize, StatsError> {
        let result = self.poll_and_emit().await;
        match &result {
            Ok(count) => {
                debug!(events = count, "Tick complete");
                self.last_error = None;
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
        result
    }

    async fn poll_and_emit(&mut self) -> Result<usize, StatsError> {
        let mut socket = match self.socket.take() {
            Some(socket) => socket,
            None => self.connector.connect().await?,
        };

        let result = self.cycle.run(&mut socket).await;

        match &result {
            Err(e) if e.breaks_connection() || socket.is_broken() => {
                info!("Dropping connection to {}: {}", socket.description(), e);
            }
            _ => self.socket = Some(socket),
        }

        let events = result?;
        self.output.emit(&events).await?;
        Ok(events.len())
    }

    /// Tick every `interval` until `shutdown` completes.
    ///
    /// Failed ticks are logged and retried on the next interval. Shutdown
    /// also interrupts a tick in flight; its connection is dropped.
    pub async fn run<F>(&mut self, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Polling {} every {}, emitting to {}",
            self.connector.path().display(),
            format_duration(interval),
            self.output
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("Shutting down during poll");
                            self.socket = None;
                            break;
                        }
                        result = self.tick() => {
                            if let Err(e) = result {
                                warn!("Poll failed: {}", e);
                            }
                        }
                    }
                }
            }
        }
    }
}
