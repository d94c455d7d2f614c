//! Configuration for the drift spool loader.
//!
//! Loaded once at startup from a YAML file (with environment variable
//! interpolation) and immutable for the process lifetime. Deployments with
//! compiled-in settings construct the same [`Config`] value directly; there
//! is no second code path.

mod vars;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{
    ConfigError, EmptyDomainSnafu, EmptyExtensionsSnafu, EmptyRemoteDirSnafu,
    EnvInterpolationSnafu, HomeDirUnavailableSnafu, InvalidDomainSnafu, ReadFileSnafu,
    YamlParseSnafu,
};

pub use vars::{interpolate, InterpolationResult};

/// Local working directory and remote endpoint base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Working directory holding pending/success/error/log. A relative name
    /// is resolved under the home directory.
    #[serde(default = "default_base_dir")]
    pub dir: String,
    /// Base URL of the remote gateway, including any path prefix
    /// (e.g. "http://namenode:9870/webhdfs/v1").
    pub domain: String,
}

/// Remote filesystem target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HdfsConfig {
    /// Acting user, sent as `user.name` on create and `Hdfs-User` on the
    /// data write.
    #[serde(default)]
    pub user: Option<String>,
    /// Remote directory files are written into.
    pub dir: String,
}

/// Credential attached to create requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InternalConfig {
    /// Authorization header value, sent verbatim.
    #[serde(default)]
    pub key: Option<String>,
}

/// Scanning behavior for the pending directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// File-name extensions accepted for upload, compared case-insensitively.
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            accepted_extensions: default_accepted_extensions(),
        }
    }
}

/// Upload protocol knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Whether the remote create may replace an existing file.
    #[serde(default)]
    pub overwrite: bool,
    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds, applied to each phase.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether to serve the Prometheus endpoint.
    #[serde(default)]
    pub enabled: bool,
    /// Address the endpoint binds to.
    #[serde(default = "default_metrics_address")]
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: default_metrics_address(),
        }
    }
}

fn default_base_dir() -> String {
    "drift".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_accepted_extensions() -> Vec<String> {
    vec![".xml".to_string()]
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    300
}

fn default_metrics_address() -> String {
    "0.0.0.0:9090".to_string()
}

/// Main configuration for drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Local working directory and remote endpoint.
    pub base: BaseConfig,
    /// Remote filesystem target.
    pub hdfs: HdfsConfig,
    /// Credential configuration.
    #[serde(default)]
    pub internal: InternalConfig,
    /// Pending-directory scanning behavior.
    #[serde(default)]
    pub source: SourceConfig,
    /// Upload protocol configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).context(ReadFileSnafu)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let result = interpolate(contents);
        ensure!(
            result.is_ok(),
            EnvInterpolationSnafu {
                message: result.errors.join("\n"),
            }
        );

        let config: Config = serde_yaml::from_str(&result.text).context(YamlParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate mandatory fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(!self.base.domain.is_empty(), EmptyDomainSnafu);
        Url::parse(&self.base.domain).context(InvalidDomainSnafu {
            domain: &self.base.domain,
        })?;
        ensure!(!self.hdfs.dir.is_empty(), EmptyRemoteDirSnafu);
        ensure!(
            !self.source.accepted_extensions.is_empty(),
            EmptyExtensionsSnafu
        );
        Ok(())
    }

    /// Resolve the local working directory.
    ///
    /// Absolute paths are taken as-is; relative names live under the home
    /// directory.
    pub fn local_base(&self) -> Result<PathBuf, ConfigError> {
        let dir = Path::new(&self.base.dir);
        if dir.is_absolute() {
            return Ok(dir.to_path_buf());
        }
        let home = dirs::home_dir().context(HomeDirUnavailableSnafu {
            dir: &self.base.dir,
        })?;
        Ok(home.join(dir))
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.source.poll_interval_secs)
    }
}
