//! Shred settings with config file and environment variable support.
//!
//! [`ShredOptions`] holds everything about a shred except the target path.
//! [`ShredOptions::DEFAULT`] is what [`crate::shred`] uses.
//!
//! ## Environment Variables
//!
//! - `SHREDDER_CONFIG`: Config file path when none is given explicitly
//! - `SHREDDER_ITERATIONS`: Override number of overwrite passes
//! - `SHREDDER_DELETE`: Override deletion after overwriting (`true`/`false`)
//! - `SHREDDER_EXACT`: Override exact mode (`true`/`false`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable names for configuration overrides
pub const ENV_CONFIG_PATH: &str = "SHREDDER_CONFIG";
pub const ENV_ITERATIONS: &str = "SHREDDER_ITERATIONS";
pub const ENV_DELETE: &str = "SHREDDER_DELETE";
pub const ENV_EXACT: &str = "SHREDDER_EXACT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShredOptions {
    /// Number of overwrite passes
    pub iterations: u32,
    /// Remove the file after overwriting
    pub delete: bool,
    /// Do not round file sizes up to the next full block
    pub exact: bool,
}

impl Default for ShredOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ShredOptions {
    /// Three passes, rounded up to the next full block, then delete.
    pub const DEFAULT: Self = Self {
        iterations: 3,
        delete: true,
        exact: false,
    };

    pub fn new(iterations: u32, delete: bool, exact: bool) -> Self {
        Self {
            iterations,
            delete,
            exact,
        }
    }

    /// Load options with environment variable overrides
    /// Priority: ENV vars > config file > defaults
    ///
    /// The result is not validated: callers merge their own overrides first
    /// and call [`ShredOptions::validate`] on the final value.
    pub fn load_with_env(path: Option<&str>) -> Result<Self> {
        let config_path = path
            .map(String::from)
            .or_else(|| env::var(ENV_CONFIG_PATH).ok());

        let mut opts = match config_path {
            Some(ref p) if Path::new(p).exists() => {
                info!(path = p, "loading config from file");
                let s = fs::read_to_string(p)
                    .with_context(|| format!("reading config file {}", p))?;
                serde_json::from_str(&s).with_context(|| format!("parsing config file {}", p))?
            }
            Some(ref p) if path.is_some() => {
                anyhow::bail!("config file {} does not exist", p);
            }
            _ => {
                debug!("using default configuration");
                ShredOptions::default()
            }
        };

        opts.apply_env_overrides()?;
        Ok(opts)
    }

    /// Apply command line overrides on top of loaded options.
    pub fn with_overrides(mut self, iterations: Option<u32>, keep: bool, exact: bool) -> Self {
        if let Some(iterations) = iterations {
            self.iterations = iterations;
        }
        if keep {
            self.delete = false;
        }
        if exact {
            self.exact = true;
        }
        self
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = env::var(ENV_ITERATIONS) {
            self.iterations = value
                .trim()
                .parse()
                .with_context(|| {
                    format!("{} must be a positive integer, got {:?}", ENV_ITERATIONS, value)
                })?;
            debug!(iterations = self.iterations, "overriding iterations from environment");
        }

        if let Ok(value) = env::var(ENV_DELETE) {
            self.delete = parse_bool(ENV_DELETE, &value)?;
            debug!(delete = self.delete, "overriding delete from environment");
        }

        if let Ok(value) = env::var(ENV_EXACT) {
            self.exact = parse_bool(ENV_EXACT, &value)?;
            debug!(exact = self.exact, "overriding exact from environment");
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            anyhow::bail!("iterations must be at least 1");
        }

        // Exact mode only changes what is left on disk, which deletion removes.
        if self.exact && self.delete {
            warn!("exact mode has no visible effect when the file is deleted afterwards");
        }

        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{} must be a boolean, got {:?}", name, value),
    }
}
