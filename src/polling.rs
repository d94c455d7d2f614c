//! Generic polling loop: prepare, process, sleep, repeat.
//!
//! The timer re-arms only after an iteration returns, so two iterations can
//! never overlap; a slow iteration delays the next poll instead of racing
//! it. Iteration errors are logged and contained — once the loop is running,
//! only cancellation ends it.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Result of a single processing iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationResult {
    /// Items were processed.
    ProcessedItems,
    /// No items were available to process.
    NoItems,
    /// Shutdown was requested.
    Shutdown,
}

/// Trait for implementing a polling-based processor.
#[async_trait]
pub trait PollingProcessor {
    /// The state type prepared for each iteration.
    type State: Send;
    /// The error type for this processor.
    type Error: std::error::Error + Send;

    /// Set up state for an iteration.
    ///
    /// Returns `None` if there is no work to do this tick.
    async fn prepare(&mut self) -> Result<Option<Self::State>, Self::Error>;

    /// Process the prepared state.
    async fn process(&mut self, state: Self::State) -> Result<IterationResult, Self::Error>;
}

/// Run a polling loop with the given processor until shutdown.
pub async fn run_polling_loop<P: PollingProcessor>(
    processor: &mut P,
    poll_interval: Duration,
    shutdown: CancellationToken,
) {
    loop {
        // Race preparation against the shutdown signal
        let prepared = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("Shutdown requested during preparation");
                return;
            }

            result = processor.prepare() => result,
        };

        let result = match prepared {
            Ok(Some(state)) => match processor.process(state).await {
                Ok(result) => result,
                Err(e) => {
                    error!(error = %e, "Iteration failed; retrying on next poll");
                    IterationResult::ProcessedItems
                }
            },
            Ok(None) => {
                info!("No items to process");
                IterationResult::NoItems
            }
            Err(e) => {
                error!(error = %e, "Failed to prepare iteration; retrying on next poll");
                IterationResult::NoItems
            }
        };

        match result {
            IterationResult::Shutdown => break,
            IterationResult::NoItems => {
                info!(
                    "No new items, waiting {}s before next poll",
                    poll_interval.as_secs()
                );
            }
            IterationResult::ProcessedItems => {
                info!(
                    "Iteration complete, waiting {}s before next poll",
                    poll_interval.as_secs()
                );
            }
        }

        // Wait for the poll interval or shutdown
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown requested during poll wait");
                break;
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
