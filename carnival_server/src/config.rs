//! Server configuration, merged from `CARNIVAL_*` / `REPLICATE_*` environment variables.

use anyhow::{Context, bail};
use carnival::AxisOrder;
use carnival::core_modules::coordinate_mapper::GRID_SIZE;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:4167";
pub const DEFAULT_API_BASE: &str = "https://api.replicate.com";
pub const DEFAULT_MNIST_MODEL: &str =
    "carnival/mnist:13e8796f49cc21ed91f8b3075584b62f230de87d21ac809729d1cc1e8a1f8893";
pub const DEFAULT_LATENT_MODEL: &str = "carnival/feature-hunt";

/// A hosted model as `owner/name` with an optional `:version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl FromStr for ModelRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, version) = match s.trim().split_once(':') {
            Some((path, version)) if !version.is_empty() => (path, Some(version.to_string())),
            Some((path, _)) => (path, None),
            None => (s.trim(), None),
        };
        let Some((owner, name)) = path.split_once('/') else {
            bail!("model reference '{s}' is not of the form owner/name[:version]");
        };
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("model reference '{s}' is not of the form owner/name[:version]");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version,
        })
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

/// How to reach the hosted models.
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub api_base: String,
    /// `None` leaves the server up but every inference call fails.
    pub api_token: Option<String>,
    pub mnist_model: ModelRef,
    pub latent_model: ModelRef,
    /// Pair order the MNIST predictor reads its `drawn_coords` in.
    pub axis_order: AxisOrder,
    pub poll_interval: Duration,
    pub max_polls: u32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub grid_size: u32,
    pub replicate: ReplicateConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mnist_model = get("CARNIVAL_MNIST_MODEL")
            .unwrap_or_else(|| DEFAULT_MNIST_MODEL.to_string())
            .parse()
            .context("CARNIVAL_MNIST_MODEL")?;
        let latent_model = get("CARNIVAL_LATENT_MODEL")
            .unwrap_or_else(|| DEFAULT_LATENT_MODEL.to_string())
            .parse()
            .context("CARNIVAL_LATENT_MODEL")?;
        let axis_order = match get("CARNIVAL_AXIS_ORDER") {
            Some(raw) => raw.parse::<AxisOrder>().map_err(anyhow::Error::msg).context("CARNIVAL_AXIS_ORDER")?,
            None => AxisOrder::default(),
        };
        let poll_interval_ms: u64 = match get("CARNIVAL_POLL_INTERVAL_MS") {
            Some(raw) => raw.trim().parse().context("CARNIVAL_POLL_INTERVAL_MS")?,
            None => 500,
        };
        let max_polls: u32 = match get("CARNIVAL_MAX_POLLS") {
            Some(raw) => raw.trim().parse().context("CARNIVAL_MAX_POLLS")?,
            None => 120,
        };

        Ok(Self {
            bind_addr: get("CARNIVAL_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            grid_size: GRID_SIZE,
            replicate: ReplicateConfig {
                api_base: get("REPLICATE_API_BASE")
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                api_token: get("REPLICATE_API_TOKEN"),
                mnist_model,
                latent_model,
                axis_order,
                poll_interval: Duration::from_millis(poll_interval_ms),
                max_polls: max_polls.max(1),
            },
        })
    }
}
