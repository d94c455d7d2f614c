//! Error types for the drift spool loader.

use snafu::prelude::*;
use std::path::PathBuf;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[snafu(display("Failed to read configuration file"))]
    ReadFile { source: std::io::Error },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML configuration"))]
    YamlParse { source: serde_yaml::Error },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// Remote endpoint base is empty.
    #[snafu(display("base.domain cannot be empty"))]
    EmptyDomain,

    /// Remote endpoint base does not parse as a URL.
    #[snafu(display("base.domain is not a valid URL: {domain}"))]
    InvalidDomain {
        domain: String,
        source: url::ParseError,
    },

    /// Remote target directory is empty.
    #[snafu(display("hdfs.dir cannot be empty"))]
    EmptyRemoteDir,

    /// Accepted-extension set is empty.
    #[snafu(display("accepted_extensions cannot be empty"))]
    EmptyExtensions,

    /// Relative base.dir with no home directory to resolve it under.
    #[snafu(display("Could not determine a home directory to resolve base.dir {dir:?}"))]
    HomeDirUnavailable { dir: String },
}

/// Errors that can occur while operating on the spool directories.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SpoolError {
    /// Failed to create a working directory.
    #[snafu(display("Failed to create directory {}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to list the pending directory.
    #[snafu(display("Failed to list pending directory {}", path.display()))]
    List {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a pending file's contents.
    #[snafu(display("Failed to read {}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to move a file to its outcome directory.
    #[snafu(display("Failed to move {} to {}", from.display(), to.display()))]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Errors from the two-phase upload protocol.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum UploadError {
    /// Failed to build the HTTP client.
    #[snafu(display("Failed to build HTTP client"))]
    Client { source: reqwest::Error },

    /// Connection-level failure on either phase.
    #[snafu(display("HTTP transport failure: {source}"))]
    Transport { source: reqwest::Error },

    /// The create request did not answer with a redirect.
    #[snafu(display("Gateway did not redirect (expected 307, got {status})"))]
    NoRedirect { status: u16 },

    /// The redirect carried no usable Location header.
    #[snafu(display("Redirect response carried no Location header"))]
    MissingLocation,

    /// The data write was not accepted.
    #[snafu(display("Data write rejected (expected 201, got {status})"))]
    UploadRejected { status: u16 },
}

/// Errors that can occur during metrics initialization.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MetricsError {
    /// Failed to initialize Prometheus recorder.
    #[snafu(display("Failed to initialize Prometheus recorder"))]
    PrometheusInit {
        source: metrics_exporter_prometheus::BuildError,
    },
}

/// Top-level pipeline errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    /// Configuration error.
    #[snafu(display("Configuration error: {source}"))]
    Config { source: ConfigError },

    /// Spool directory error.
    #[snafu(display("Spool error: {source}"))]
    Spool { source: SpoolError },

    /// Upload protocol error.
    #[snafu(display("Upload error: {source}"))]
    Upload { source: UploadError },

    /// Metrics error.
    #[snafu(display("Metrics error: {source}"))]
    Metrics { source: MetricsError },
}

impl From<ConfigError> for PipelineError {
    fn from(source: ConfigError) -> Self {
        PipelineError::Config { source }
    }
}

impl From<SpoolError> for PipelineError {
    fn from(source: SpoolError) -> Self {
        PipelineError::Spool { source }
    }
}

impl From<UploadError> for PipelineError {
    fn from(source: UploadError) -> Self {
        PipelineError::Upload { source }
    }
}

impl From<MetricsError> for PipelineError {
    fn from(source: MetricsError) -> Self {
        PipelineError::Metrics { source }
    }
}
