//! Progress events emitted by the pipeline
//!
//! Every resolution step and every download step emits exactly one
//! index-bearing event, in manifest order. Indices are 1-based.

use tokio::sync::mpsc;

/// Phases of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolving,
    Downloading,
    Merging,
}

/// Events that drive the progress display
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A phase is about to process `total` items
    PhaseStarted { phase: Phase, total: usize },
    /// A manifest entry resolved to an artifact
    Resolved {
        index: usize,
        total: usize,
        file_name: String,
        size_bytes: u64,
    },
    /// A manifest entry could not be looked up and was dropped
    LookupFailed {
        index: usize,
        total: usize,
        project_id: u64,
        file_id: u64,
        error: String,
    },
    /// The file on disk already matches; no download
    ExistingValid {
        index: usize,
        total: usize,
        file_name: String,
    },
    /// The file on disk does not match and will be replaced
    ExistingInvalid {
        index: usize,
        total: usize,
        file_name: String,
    },
    /// A download attempt is starting
    Downloading {
        index: usize,
        total: usize,
        file_name: String,
        size_bytes: u64,
    },
    /// A download finished
    Downloaded {
        index: usize,
        total: usize,
        file_name: String,
        bytes: u64,
    },
    /// A download failed and was abandoned
    DownloadFailed {
        index: usize,
        total: usize,
        file_name: String,
        error: String,
    },
    /// The overlay was copied into the destination
    OverlayMerged { files_copied: usize },
}

/// Cloneable handle for emitting pipeline events
///
/// Emission never fails: with no receiver attached, or after it is dropped,
/// events are discarded.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl ProgressReporter {
    /// Create a reporter with its receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A reporter that discards everything
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
