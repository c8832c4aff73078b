//! Engine configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

pub const ENV_SEED: &str = "BLOCKFALL_SEED";
pub const ENV_EVENT_LOG: &str = "BLOCKFALL_EVENT_LOG";
pub const ENV_MAX_PIECES: &str = "BLOCKFALL_MAX_PIECES";
pub const ENV_COMMAND_BUFFER: &str = "BLOCKFALL_COMMAND_BUFFER";

const DEFAULT_MAX_PIECES: u32 = 500;
const DEFAULT_COMMAND_BUFFER: usize = 64;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// RNG seed for the piece sequence
    pub seed: u32,
    /// JSON-lines event log; None disables logging to file
    pub event_log: Option<PathBuf>,
    /// Piece budget for the headless runner
    pub max_pieces: u32,
    /// Capacity of the bounded command channel (at least 1)
    pub command_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            event_log: None,
            max_pieces: DEFAULT_MAX_PIECES,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl EngineConfig {
    /// Create from `BLOCKFALL_*` environment variables.
    ///
    /// Unset variables fall back to defaults (the seed to one derived from the
    /// clock); set-but-invalid numbers are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seed = parse_var(&lookup, ENV_SEED)?.unwrap_or_else(clock_seed);

        let event_log = lookup(ENV_EVENT_LOG)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let max_pieces = parse_var(&lookup, ENV_MAX_PIECES)?.unwrap_or(DEFAULT_MAX_PIECES);

        let command_buffer = parse_var::<usize, _>(&lookup, ENV_COMMAND_BUFFER)?
            .unwrap_or(DEFAULT_COMMAND_BUFFER)
            .max(1);

        Ok(Self {
            seed,
            event_log,
            max_pieces,
            command_buffer,
        })
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_event_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.event_log = Some(path.into());
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .with_context(|| format!("invalid {}: {:?}", key, raw))
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_secs() as u32) ^ d.subsec_nanos())
        .unwrap_or(1)
}
