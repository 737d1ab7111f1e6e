//! Audio capture pipeline for spoken answers.
//!
//! The pipeline owns one capture device at a time, buffers a single take,
//! and hands the result to the transcription collaborator. A recorded
//! attempt must stay scoreable whatever happens downstream, so transcription
//! failures fold into `TranscriptionOutcome::Unavailable` instead of
//! propagating.

use tracing::{debug, warn};

use screen_core::model::TranscriptionOutcome;

use crate::error::CaptureError;
use crate::transcription::Transcriber;

//
// ─── AUDIO BLOB ────────────────────────────────────────────────────────────────
//

/// Finalized audio from one recording take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioBlob {
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

//
// ─── CAPTURE DEVICE ────────────────────────────────────────────────────────────
//

/// Microphone-like device the pipeline records through.
///
/// Implementations wrap a real input device; `InMemoryDevice` serves tests
/// and prototyping.
pub trait CaptureDevice: Send {
    /// Begin buffering audio.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::DeviceUnavailable` when the device is denied
    /// or missing; the pipeline stays unstarted in that case.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Finalize buffered audio into one blob and release the device.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::NotRecording` when no capture is running.
    fn stop(&mut self) -> Result<AudioBlob, CaptureError>;
}

/// Fixed-sample device implementation for testing and prototyping.
#[derive(Debug, Clone)]
pub struct InMemoryDevice {
    sample: Vec<u8>,
    recording: bool,
}

impl InMemoryDevice {
    #[must_use]
    pub fn new(sample: Vec<u8>) -> Self {
        Self {
            sample,
            recording: false,
        }
    }
}

impl CaptureDevice for InMemoryDevice {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.recording = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<AudioBlob, CaptureError> {
        if !self.recording {
            return Err(CaptureError::NotRecording);
        }
        self.recording = false;
        Ok(AudioBlob::new(self.sample.clone(), "audio/webm"))
    }
}

//
// ─── PIPELINE ──────────────────────────────────────────────────────────────────
//

#[derive(Debug)]
enum CaptureState {
    Idle,
    Recording { seconds: u32 },
    Recorded { blob: AudioBlob },
}

/// Orchestrates one question's recording take and its transcription.
///
/// The device and its buffer are exclusively owned by one pipeline
/// instance; re-recording replaces the previous take entirely.
pub struct CapturePipeline {
    device: Box<dyn CaptureDevice>,
    state: CaptureState,
    transcript: Option<TranscriptionOutcome>,
}

impl CapturePipeline {
    #[must_use]
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self {
            device,
            state: CaptureState::Idle,
            transcript: None,
        }
    }

    /// Acquire the device and begin recording, discarding any previous take.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::AlreadyRecording` for a re-entrant start and
    /// passes device acquisition failures through; in both cases the
    /// pipeline state is unchanged.
    pub fn start_capture(&mut self) -> Result<(), CaptureError> {
        if matches!(self.state, CaptureState::Recording { .. }) {
            return Err(CaptureError::AlreadyRecording);
        }
        self.device.start()?;
        self.state = CaptureState::Recording { seconds: 0 };
        self.transcript = None;
        Ok(())
    }

    /// Advance the recording counter by one second.
    ///
    /// The counter feeds UI feedback only; it has no correctness effect.
    /// Returns the updated count, or 0 when not recording.
    pub fn tick_recording(&mut self) -> u32 {
        if let CaptureState::Recording { seconds } = &mut self.state {
            *seconds += 1;
            *seconds
        } else {
            0
        }
    }

    #[must_use]
    pub fn recording_seconds(&self) -> u32 {
        match self.state {
            CaptureState::Recording { seconds } => seconds,
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        matches!(self.state, CaptureState::Recording { .. })
    }

    /// Stop recording and buffer the take.
    ///
    /// From this point an attempt exists regardless of what transcription
    /// does with it.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::NotRecording` when no capture is running.
    /// A device failure on stop loses the take and resets the pipeline.
    pub fn stop_capture(&mut self) -> Result<(), CaptureError> {
        if !self.is_recording() {
            return Err(CaptureError::NotRecording);
        }
        match self.device.stop() {
            Ok(blob) => {
                debug!(bytes = blob.len(), "capture finalized");
                self.state = CaptureState::Recorded { blob };
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "capture device failed on stop, take lost");
                self.state = CaptureState::Idle;
                Err(err)
            }
        }
    }

    /// True once a take has been buffered.
    #[must_use]
    pub fn has_recording(&self) -> bool {
        matches!(self.state, CaptureState::Recorded { .. })
    }

    /// Hand the buffered take to the transcriber.
    ///
    /// Success with non-empty text becomes `Transcribed`; failure or an
    /// empty result becomes `Unavailable`. Transcription errors are never
    /// propagated, so the attempt stays scoreable either way.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::NothingRecorded` when no take is buffered.
    pub async fn transcribe(
        &mut self,
        transcriber: &dyn Transcriber,
    ) -> Result<&TranscriptionOutcome, CaptureError> {
        let CaptureState::Recorded { blob } = &self.state else {
            return Err(CaptureError::NothingRecorded);
        };

        let outcome = match transcriber.transcribe(blob).await {
            Ok(text) if !text.trim().is_empty() => TranscriptionOutcome::Transcribed(text),
            Ok(_) => {
                warn!("transcription returned empty text, keeping attempt");
                TranscriptionOutcome::Unavailable
            }
            Err(err) => {
                warn!(error = %err, "transcription failed, keeping attempt");
                TranscriptionOutcome::Unavailable
            }
        };

        Ok(self.transcript.insert(outcome))
    }

    #[must_use]
    pub fn transcript(&self) -> Option<&TranscriptionOutcome> {
        self.transcript.as_ref()
    }

    /// Force-stop any in-flight recording and drop buffered audio.
    ///
    /// The question runner's dispose path calls this so no capture from a
    /// previous question can outlive it.
    pub fn force_stop(&mut self) {
        if self.is_recording() {
            if let Err(err) = self.device.stop() {
                warn!(error = %err, "capture device failed during force-stop");
            }
        }
        self.state = CaptureState::Idle;
        self.transcript = None;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
