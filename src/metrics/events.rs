//! Internal events for metrics emission.
//!
//! Each event struct represents a measurable occurrence in the pipeline and
//! implements [`InternalEvent`], which records the corresponding Prometheus
//! metric.

use metrics::{counter, histogram};
use std::time::Duration;
use tracing::trace;

/// Trait for internal events that can be emitted as metrics.
pub trait InternalEvent {
    /// Emit this event as a metric.
    fn emit(self);
}

/// Event emitted when a tick finds files in the pending directory.
pub struct FilesDiscovered {
    pub count: u64,
}

impl InternalEvent for FilesDiscovered {
    fn emit(self) {
        trace!(count = self.count, "Files discovered");
        counter!("drift_files_discovered_total").increment(self.count);
    }
}

/// Event emitted when a file is delivered to the remote filesystem.
pub struct FileDelivered {
    pub bytes: u64,
}

impl InternalEvent for FileDelivered {
    fn emit(self) {
        trace!(bytes = self.bytes, "File delivered");
        counter!("drift_files_delivered_total").increment(1);
        counter!("drift_bytes_uploaded_total").increment(self.bytes);
    }
}

/// Event emitted when a file is rejected by classification.
pub struct FileRejected;

impl InternalEvent for FileRejected {
    fn emit(self) {
        trace!("File rejected");
        counter!("drift_files_rejected_total").increment(1);
    }
}

/// Stage at which a file failure occurred.
#[derive(Debug, Clone, Copy)]
pub enum FailureStage {
    Read,
    Upload,
    Relocate,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Read => "read",
            FailureStage::Upload => "upload",
            FailureStage::Relocate => "relocate",
        }
    }
}

/// Event emitted when a file fails processing.
pub struct FileFailed {
    pub stage: FailureStage,
}

impl InternalEvent for FileFailed {
    fn emit(self) {
        trace!(stage = self.stage.as_str(), "File failed");
        counter!("drift_files_failed_total", "stage" => self.stage.as_str()).increment(1);
    }
}

/// Event emitted when an upload completes.
pub struct UploadCompleted {
    pub duration: Duration,
}

impl InternalEvent for UploadCompleted {
    fn emit(self) {
        trace!(duration_ms = self.duration.as_millis() as u64, "Upload completed");
        histogram!("drift_upload_duration_seconds").record(self.duration.as_secs_f64());
    }
}
