use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use ngstat::config::Overrides;
use ngstat::{Agent, Settings};

#[derive(Parser, Debug)]
#[command(name = "ngstat")]
#[command(about = "Forward syslog-ng control socket statistics as monitoring events")]
struct Args {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the syslog-ng control socket
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Service name template, e.g. "%<source_name>s %<type>s"
    #[arg(long)]
    format: Option<String>,

    /// Only report these SourceName values (repeatable)
    #[arg(long = "source-name", value_name = "NAME")]
    source_name: Option<Vec<String>>,

    /// Only report these SourceId values (repeatable)
    #[arg(long = "source-id", value_name = "ID")]
    source_id: Option<Vec<String>>,

    /// Only report these SourceInstance values (repeatable)
    #[arg(long = "source-instance", value_name = "INSTANCE")]
    source_instance: Option<Vec<String>>,

    /// Only report these State values (repeatable)
    #[arg(long, value_name = "STATE")]
    state: Option<Vec<String>>,

    /// Only report these Type values (repeatable)
    #[arg(long = "type", value_name = "TYPE")]
    kind: Option<Vec<String>>,

    /// Queued messages warning threshold [default: 300]
    #[arg(long)]
    queued_warning: Option<f64>,

    /// Queued messages critical threshold [default: 1000]
    #[arg(long)]
    queued_critical: Option<f64>,

    /// Poll interval (e.g., "5s", "500ms") [default: 5s]
    #[arg(short, long)]
    interval: Option<String>,

    /// Give up on a response line after this long (e.g., "10s")
    #[arg(long)]
    read_timeout: Option<String>,

    /// Where to send events: stdout, file:PATH or tcp:HOST:PORT [default: stdout]
    #[arg(short, long)]
    output: Option<String>,

    /// Host attribute for every event
    #[arg(long)]
    event_host: Option<String>,

    /// Time-to-live in seconds for every event
    #[arg(long)]
    ttl: Option<f32>,

    /// Tag for every event (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Option<Vec<String>>,

    /// Poll once and exit
    #[arg(long)]
    once: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            socket: self.socket.clone(),
            format: self.format.clone(),
            interval: self.interval.clone(),
            read_timeout: self.read_timeout.clone(),
            queued_warning: self.queued_warning,
            queued_critical: self.queued_critical,
            output: self.output.clone(),
            source_name: self.source_name.clone(),
            source_id: self.source_id.clone(),
            source_instance: self.source_instance.clone(),
            state: self.state.clone(),
            kind: self.kind.clone(),
            host: self.event_host.clone(),
            ttl: self.ttl,
            tags: self.tags.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Events may go to stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load(args.config.as_deref(), args.overrides())?;
    let interval = settings.interval()?;
    let mut agent = Agent::from_settings(&settings)?;

    let rt = tokio::runtime::Runtime::new()?;

    if args.once {
        let count = rt.block_on(agent.tick()).context("poll failed")?;
        info!(events = count, "Poll complete");
        return Ok(());
    }

    rt.block_on(agent.run(interval, async {
        let _ = tokio::signal::ctrl_c().await;
    }));

    Ok(())
}
