#![forbid(unsafe_code)]

pub mod capture;
pub mod error;
pub mod progress_service;
pub mod question_runner;
pub mod transcription;

pub use screen_core::Clock;

pub use capture::{AudioBlob, CaptureDevice, CapturePipeline, InMemoryDevice};
pub use error::{CaptureError, ProgressError, RunnerError, TranscribeError};
pub use progress_service::{ProgressService, ScorePoint};
pub use question_runner::{QuestionRunner, RunnerPhase, TickOutcome};
pub use transcription::{HttpTranscriber, Transcriber, TranscriberConfig};
