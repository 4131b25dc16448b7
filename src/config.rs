//! Layered configuration.
//!
//! Settings are resolved from, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. an optional config file (TOML, YAML or JSON),
//! 3. `NGSTAT_*` environment variables,
//! 4. command-line overrides.
//!
//! # Example file
//!
//! ```toml
//! socket = "/var/lib/syslog-ng/syslog-ng.ctl"
//! format = "%<source_name>s %<type>s"
//! interval = "10s"
//! read_timeout = "5s"
//! queued_warning = 300
//! queued_critical = 1000
//! output = "tcp:riemann.example.com:5555"
//!
//! [filters]
//! type = ["dropped", "queued"]
//!
//! [event]
//! ttl = 60
//! tags = ["syslog-ng"]
//! ```
//!
//! Environment variables use `__` between nested keys and commas between
//! list items, e.g. `NGSTAT_FILTERS__SOURCE_NAME=dst.riemann,source`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use config::{Config, Environment, File};
use ngstat_types::StatField;
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::{Filter, FilterSet, ServiceTemplate, Thresholds, DEFAULT_TEMPLATE};
use crate::output::Output;
use crate::poll::{EventAttributes, PollCycle};
use crate::source::{Connector, DEFAULT_SOCKET_PATH};

/// Prefix of environment variables read by [`Settings::load`].
pub const ENV_PREFIX: &str = "NGSTAT";

/// Fully resolved agent settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Path of the daemon's control socket.
    pub socket: PathBuf,
    /// Service name template.
    pub format: String,
    /// Time between polls.
    pub interval: String,
    /// Upper bound for reading one response line. Unset blocks forever.
    #[serde(default)]
    pub read_timeout: Option<String>,
    pub queued_warning: f64,
    pub queued_critical: f64,
    /// `stdout`, `file:PATH` or `tcp:HOST:PORT`.
    pub output: String,
    #[serde(default)]
    pub filters: FilterSettings,
    #[serde(default)]
    pub event: EventSettings,
}

/// Per-column allow-lists. Missing or empty lists accept everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterSettings {
    #[serde(default, with = "string_list")]
    pub source_name: Option<Vec<String>>,
    #[serde(default, with = "string_list")]
    pub source_id: Option<Vec<String>>,
    #[serde(default, with = "string_list")]
    pub source_instance: Option<Vec<String>>,
    #[serde(default, with = "string_list")]
    pub state: Option<Vec<String>>,
    #[serde(rename = "type", default, with = "string_list")]
    pub kind: Option<Vec<String>>,
}

/// Attributes attached to every event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventSettings {
    pub host: Option<String>,
    pub ttl: Option<f32>,
    #[serde(default, deserialize_with = "string_list::deserialize_vec")]
    pub tags: Vec<String>,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub socket: Option<PathBuf>,
    pub format: Option<String>,
    pub interval: Option<String>,
    pub read_timeout: Option<String>,
    pub queued_warning: Option<f64>,
    pub queued_critical: Option<f64>,
    pub output: Option<String>,
    pub source_name: Option<Vec<String>>,
    pub source_id: Option<Vec<String>>,
    pub source_instance: Option<Vec<String>>,
    pub state: Option<Vec<String>>,
    pub kind: Option<Vec<String>>,
    pub host: Option<String>,
    pub ttl: Option<f32>,
    pub tags: Option<Vec<String>>,
}

impl Settings {
    /// Load settings from defaults, an optional file, the environment and
    /// command-line overrides.
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        Self::load_with_env(config_path, overrides, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(
        config_path: Option<&Path>,
        overrides: Overrides,
        env: Environment,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("socket", DEFAULT_SOCKET_PATH)?
            .set_default("format", DEFAULT_TEMPLATE)?
            .set_default("interval", "5s")?
            .set_default("queued_warning", 300.0)?
            .set_default("queued_critical", 1000.0)?
            .set_default("output", "stdout")?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        // Values stay strings; lists are split while deserializing.
        builder = builder.add_source(
            env.prefix_separator("_")
                .separator("__")
                .ignore_empty(true),
        );

        let config = builder
            .set_override_option("socket", overrides.socket.map(|p| p.display().to_string()))?
            .set_override_option("format", overrides.format)?
            .set_override_option("interval", overrides.interval)?
            .set_override_option("read_timeout", overrides.read_timeout)?
            .set_override_option("queued_warning", overrides.queued_warning)?
            .set_override_option("queued_critical", overrides.queued_critical)?
            .set_override_option("output", overrides.output)?
            .set_override_option("filters.source_name", overrides.source_name)?
            .set_override_option("filters.source_id", overrides.source_id)?
            .set_override_option("filters.source_instance", overrides.source_instance)?
            .set_override_option("filters.state", overrides.state)?
            .set_override_option("filters.type", overrides.kind)?
            .set_override_option("event.host", overrides.host)?
            .set_override_option("event.ttl", overrides.ttl.map(f64::from))?
            .set_override_option("event.tags", overrides.tags)?
            .build()
            .context("failed to load configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Poll interval; must be non-zero.
    pub fn interval(&self) -> Result<Duration> {
        let interval = parse_duration(&self.interval)
            .with_context(|| format!("invalid interval '{}'", self.interval))?;
        if interval.is_zero() {
            bail!("interval must be greater than zero");
        }
        Ok(interval)
    }

    pub fn read_timeout(&self) -> Result<Option<Duration>> {
        self.read_timeout
            .as_deref()
            .map(|s| parse_duration(s).with_context(|| format!("invalid read_timeout '{}'", s)))
            .transpose()
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            queued_warning: self.queued_warning,
            queued_critical: self.queued_critical,
        }
    }

    /// Compile the service name template.
    pub fn template(&self) -> Result<ServiceTemplate> {
        ServiceTemplate::parse(&self.format)
            .with_context(|| format!("invalid format '{}'", self.format))
    }

    pub fn filter_set(&self) -> FilterSet {
        let f = &self.filters;
        FilterSet::new()
            .with(StatField::SourceName, Filter::from_values(f.source_name.clone()))
            .with(StatField::SourceId, Filter::from_values(f.source_id.clone()))
            .with(StatField::SourceInstance, Filter::from_values(f.source_instance.clone()))
            .with(StatField::State, Filter::from_values(f.state.clone()))
            .with(StatField::Type, Filter::from_values(f.kind.clone()))
    }

    pub fn output(&self) -> Result<Output> {
        self.output.parse().map_err(|e: String| anyhow!(e))
    }

    pub fn connector(&self) -> Result<Connector> {
        Ok(Connector::new(&self.socket, self.read_timeout()?))
    }

    /// Build the poll cycle, compiling the template eagerly.
    pub fn poll_cycle(&self) -> Result<PollCycle> {
        let attributes = EventAttributes {
            host: self.event.host.clone(),
            ttl: self.event.ttl,
            tags: self.event.tags.clone(),
        };
        Ok(PollCycle::new(self.filter_set(), self.thresholds(), self.template()?)
            .with_attributes(attributes))
    }
}

/// Lists given either as a sequence (config files) or as one
/// comma-separated string (environment). Scalars such as `42` or `true`
/// are read back as their text.
mod string_list {
    use std::fmt;

    use serde::de::{self, SeqAccess, Visitor};
    use serde::Deserializer;

    struct StringList;

    impl<'de> Visitor<'de> for StringList {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a list of strings or a comma-separated string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.split(',').map(str::to_string).collect())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut values = Vec::new();
            while let Some(value) = seq.next_element::<String>()? {
                values.push(value);
            }
            Ok(values)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StringList).map(Some)
    }

    pub fn deserialize_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StringList)
    }
}
