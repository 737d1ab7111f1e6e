//! Shared error types for the services crate.

use thiserror::Error;

use screen_core::evaluator::EvaluateError;
use storage::repository::StorageError;

/// Errors emitted by the transcription collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranscribeError {
    #[error("transcription is not configured")]
    Disabled,
    #[error("transcription returned an empty response")]
    EmptyResponse,
    #[error("transcription request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the audio capture pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("capture already in progress")]
    AlreadyRecording,
    #[error("no capture in progress")]
    NotRecording,
    #[error("no recorded audio to transcribe")]
    NothingRecorded,
}

/// Errors emitted by `QuestionRunner`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunnerError {
    #[error("question already submitted")]
    AlreadySubmitted,
    #[error("runner was disposed")]
    Disposed,
    #[error("no recorded attempt to submit")]
    NothingRecorded,
    #[error(transparent)]
    Evaluate(#[from] EvaluateError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
