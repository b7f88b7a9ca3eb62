use std::path::{Path, PathBuf};

use config::{File, FileFormat};
use snafu::ResultExt;

use crate::common::{key_file_or_string, ConfigNotFoundSnafu, ConfigParseSnafu, ConfigSnafu, Result};

pub const CONFIG_FILE_NAME: &str = "update_dns.conf";

/// Forces dry-run when set to anything truthy.
pub const DRY_RUN_ENV: &str = "DYNDNS_DRY_RUN";

pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_IP_URL: &str = "https://ipv4.icanhazip.com";

fn default_api_url() -> url::Url {
    url::Url::parse(DEFAULT_API_URL).expect("DEFAULT_API_URL should be a valid URL")
}

fn default_ip_url() -> url::Url {
    url::Url::parse(DEFAULT_IP_URL).expect("DEFAULT_IP_URL should be a valid URL")
}

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    /// Cloudflare API token, or `@path` to a file holding it.
    pub token: String,
    pub zone: String,
    pub hostname: String,
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_api_url")]
    pub api_url: url::Url,
    #[serde(default = "default_ip_url")]
    pub ip_url: url::Url,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("hostname", &self.hostname)
            .field("dry_run", &self.dry_run)
            .field("api_url", &self.api_url.as_str())
            .field("ip_url", &self.ip_url.as_str())
            .finish()
    }
}

impl Config {
    /// Headers sent with every provider request.
    pub fn auth_headers(&self) -> [(&'static str, String); 2] {
        [
            ("Authorization", format!("Bearer {}", self.token)),
            ("Content-Type", "application/json".to_string()),
        ]
    }

    /// Parse a single TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Config = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .context(ConfigParseSnafu { path })?;

        config.token = key_file_or_string(config.token, "token")?;

        for (prefix, value) in [("zone", &config.zone), ("hostname", &config.hostname)] {
            if value.trim().is_empty() {
                return ConfigSnafu {
                    message: "must not be empty",
                    prefix,
                }
                .fail();
            }
        }

        Ok(config)
    }

    /// Load the first candidate that exists. Later candidates are never
    /// considered, even when the first one fails to parse.
    pub fn discover(candidates: &[PathBuf]) -> Result<(PathBuf, Self)> {
        for path in candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration");
                let config = Self::load(path)?;
                return Ok((path.clone(), config));
            }
            tracing::trace!(path = %path.display(), "Configuration candidate not present");
        }

        ConfigNotFoundSnafu {
            searched: candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
        .fail()
    }

    /// Default search path, most specific first.
    pub fn default_candidates(home: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(4);
        if let Some(home) = home {
            candidates.push(home.join(CONFIG_FILE_NAME));
        }
        candidates.push(Path::new("/etc").join(CONFIG_FILE_NAME));
        candidates.push(Path::new("/data").join(CONFIG_FILE_NAME));
        candidates.push(PathBuf::from(CONFIG_FILE_NAME));
        candidates
    }

    /// Overrides only ever turn dry-run on.
    pub fn force_dry_run(mut self, force: bool) -> Self {
        if force {
            self.dry_run = true;
        }
        self
    }
}

/// Interpret an environment flag. Unset, empty and the usual spellings of
/// "no" are false.
pub fn env_flag(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        ),
    }
}
