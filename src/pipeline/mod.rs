//! The ingestion pipeline: spool scanning, upload, and outcome relocation.
//!
//! Implements the [`PollingProcessor`] trait: `prepare` lists the pending
//! directory, `process` walks the discovered files sequentially. Each file
//! is classified, uploaded if eligible, and then committed to its outcome
//! directory; the failure of one file never affects the others.
//!
//! Crash semantics are at-least-once: a crash between a successful upload
//! and the relocation leaves the file in `pending/`, so the next run
//! uploads it again.

use async_trait::async_trait;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::classify::{Classification, Classifier};
use crate::config::Config;
use crate::emit;
use crate::error::PipelineError;
use crate::metrics::events::{
    FailureStage, FileDelivered, FileFailed, FileRejected, FilesDiscovered, UploadCompleted,
};
use crate::polling::{run_polling_loop, IterationResult, PollingProcessor};
use crate::signal;
use crate::spool::{Disposition, PendingFile, Spool};
use crate::upload::UploadClient;

/// Outcome of processing one pending file.
#[derive(Debug)]
pub enum Outcome {
    /// Both protocol phases completed; the file content is remote.
    Delivered { remote_path: String },
    /// Classification turned the file away without opening it.
    Rejected { reason: String },
    /// Reading or uploading failed.
    Failed { error: PipelineError },
}

impl Outcome {
    /// The terminal directory this outcome commits to.
    fn disposition(&self) -> Disposition {
        match self {
            Outcome::Delivered { .. } => Disposition::Success,
            Outcome::Rejected { .. } | Outcome::Failed { .. } => Disposition::Error,
        }
    }
}

/// Per-iteration counters, logged when the iteration completes.
#[derive(Debug, Default)]
struct TickStats {
    delivered: usize,
    rejected: usize,
    failed: usize,
}

/// The spool loader pipeline processor.
pub struct Processor {
    classifier: Classifier,
    client: UploadClient,
    spool: Spool,
    shutdown: CancellationToken,
}

impl Processor {
    /// Build a processor from configuration.
    pub fn new(
        config: &Config,
        spool: Spool,
        shutdown: CancellationToken,
    ) -> Result<Self, PipelineError> {
        let classifier = Classifier::new(&config.source.accepted_extensions);
        let client = UploadClient::new(config)?;
        Ok(Self {
            classifier,
            client,
            spool,
            shutdown,
        })
    }

    /// Run one file through classify, read, and upload.
    async fn process_file(&self, file: &PendingFile) -> Outcome {
        if let Classification::Ineligible { reason } = self.classifier.classify(&file.name) {
            warn!(file = %file.name, %reason, "File rejected");
            emit!(FileRejected);
            return Outcome::Rejected { reason };
        }

        info!(file = %file.name, "Processing file");

        let content = match self.spool.read(file).await {
            Ok(content) => content,
            Err(e) => {
                error!(file = %file.name, error = %e, "Failed to read file");
                emit!(FileFailed {
                    stage: FailureStage::Read,
                });
                return Outcome::Failed { error: e.into() };
            }
        };

        let bytes = content.len() as u64;
        let start = Instant::now();
        match self.client.upload(&file.name, content).await {
            Ok(remote_path) => {
                emit!(UploadCompleted {
                    duration: start.elapsed(),
                });
                emit!(FileDelivered { bytes });
                Outcome::Delivered { remote_path }
            }
            Err(e) => {
                error!(file = %file.name, error = %e, "Upload failed");
                emit!(FileFailed {
                    stage: FailureStage::Upload,
                });
                Outcome::Failed { error: e.into() }
            }
        }
    }

    /// Commit the outcome by relocating the file.
    async fn commit(&self, file: &PendingFile, outcome: &Outcome) {
        match self.spool.commit(file, outcome.disposition()).await {
            Ok(dest) => match outcome {
                Outcome::Delivered { remote_path } => {
                    info!(file = %file.name, remote = %remote_path, "File delivered");
                }
                Outcome::Rejected { .. } | Outcome::Failed { .. } => {
                    info!(file = %file.name, dest = %dest.display(), "File moved to error directory");
                }
            },
            Err(e) => {
                // The file stays in pending for manual recovery.
                error!(file = %file.name, error = %e, "Failed to relocate file; leaving in place");
                emit!(FileFailed {
                    stage: FailureStage::Relocate,
                });
            }
        }
    }
}

#[async_trait]
impl PollingProcessor for Processor {
    type State = Vec<PendingFile>;
    type Error = PipelineError;

    async fn prepare(&mut self) -> Result<Option<Self::State>, Self::Error> {
        info!(path = %self.spool.pending_dir().display(), "Checking pending directory");

        let pending = self.spool.list_pending().await?;
        if pending.is_empty() {
            return Ok(None);
        }

        info!(files = pending.len(), "Found files to process");
        emit!(FilesDiscovered {
            count: pending.len() as u64,
        });
        Ok(Some(pending))
    }

    async fn process(&mut self, files: Self::State) -> Result<IterationResult, Self::Error> {
        let mut stats = TickStats::default();

        for file in &files {
            if self.shutdown.is_cancelled() {
                info!("Shutdown requested, stopping iteration");
                return Ok(IterationResult::Shutdown);
            }

            let outcome = self.process_file(file).await;
            match &outcome {
                Outcome::Delivered { .. } => stats.delivered += 1,
                Outcome::Rejected { .. } => stats.rejected += 1,
                Outcome::Failed { .. } => stats.failed += 1,
            }
            self.commit(file, &outcome).await;
        }

        info!(
            delivered = stats.delivered,
            rejected = stats.rejected,
            failed = stats.failed,
            "Iteration complete"
        );
        Ok(IterationResult::ProcessedItems)
    }
}

/// Run the pipeline with the given configuration until a shutdown signal.
pub async fn run_pipeline(config: Config, spool: Spool) -> Result<(), PipelineError> {
    let shutdown = CancellationToken::new();

    // Set up signal handler for graceful shutdown
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signal::shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let poll_interval = config.poll_interval();
    let mut processor = Processor::new(&config, spool, shutdown.clone())?;

    run_polling_loop(&mut processor, poll_interval, shutdown).await;
    Ok(())
}
