//! drift: ships files from a local spool directory to a WebHDFS-compatible
//! gateway.
//!
//! The tool polls a pending directory on a fixed interval. Each discovered
//! file is checked against an accepted-extension set, uploaded over the
//! two-phase redirect protocol (create at the gateway, PUT the content to
//! the returned location), and then moved into a success or error
//! directory. That relocation is the only durable record of processing.

pub mod classify;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod polling;
pub mod signal;
pub mod spool;
pub mod upload;

// Re-export commonly used items
pub use config::Config;
pub use error::{PipelineError, UploadError};
pub use logging::init_tracing;
pub use pipeline::{run_pipeline, Outcome, Processor};
pub use spool::Spool;
pub use upload::UploadClient;
