//! Per-question presentation and countdown state machine.
//!
//! One runner is created per question and fully discarded afterwards; no
//! state is shared across questions. Timers are explicit inputs: the
//! repeating countdown arrives as `tick()` calls and the one-shot stimulus
//! exposure as `hide_stimulus()`. Cancellation is `dispose()`: after it,
//! no tick or submission from a stale driver can act on the runner.

use chrono::{DateTime, Duration, Utc};

use screen_core::evaluator;
use screen_core::model::{Question, ResponseVerdict, TranscriptionOutcome};
use screen_core::time::Clock;

use crate::capture::CapturePipeline;
use crate::error::RunnerError;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of one question instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerPhase {
    /// Stimulus visible under a timed-exposure window.
    Presenting,
    /// Stimulus settled (hidden, or never time-limited); countdown running.
    Answering,
    /// Terminal: exactly one verdict has been produced.
    Submitted,
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Countdown still running.
    Counting { remaining_seconds: u32 },
    /// Countdown reached zero and the question auto-submitted.
    AutoSubmitted(ResponseVerdict),
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Drives one question from presentation to a single terminal submission.
///
/// Manual submission and timeout submission are mutually exclusive: both
/// move the runner to `Submitted`, and every entry point checks that phase
/// first. Response time is wall clock from question entry to submission,
/// never from capture start.
pub struct QuestionRunner {
    question: Question,
    clock: Clock,
    started_at: DateTime<Utc>,
    hide_at: Option<DateTime<Utc>>,
    remaining_seconds: u32,
    phase: RunnerPhase,
    capture: Option<CapturePipeline>,
    disposed: bool,
}

impl QuestionRunner {
    /// Enter a question: countdown armed, stimulus shown, exposure window
    /// computed from the question's display time.
    #[must_use]
    pub fn start(question: Question, clock: Clock) -> Self {
        let started_at = clock.now();
        let hide_at = question
            .stimulus_display_ms()
            .map(|ms| started_at + Duration::milliseconds(i64::from(ms)));
        let phase = if hide_at.is_some() {
            RunnerPhase::Presenting
        } else {
            RunnerPhase::Answering
        };
        let remaining_seconds = question.time_limit_seconds();

        Self {
            question,
            clock,
            started_at,
            hide_at,
            remaining_seconds,
            phase,
            capture: None,
            disposed: false,
        }
    }

    /// Attach a capture pipeline for a voice-response question.
    #[must_use]
    pub fn with_capture(mut self, capture: CapturePipeline) -> Self {
        self.capture = Some(capture);
        self
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Whether the stimulus is currently shown.
    ///
    /// Questions without an exposure window keep it visible for the whole
    /// answering phase.
    #[must_use]
    pub fn stimulus_visible(&self) -> bool {
        match self.hide_at {
            Some(_) => self.phase == RunnerPhase::Presenting,
            None => self.phase != RunnerPhase::Submitted,
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Capture pipeline access while the question is still answerable.
    pub fn capture_mut(&mut self) -> Option<&mut CapturePipeline> {
        if self.disposed || self.phase == RunnerPhase::Submitted {
            return None;
        }
        self.capture.as_mut()
    }

    fn ensure_active(&self) -> Result<(), RunnerError> {
        if self.disposed {
            return Err(RunnerError::Disposed);
        }
        if self.phase == RunnerPhase::Submitted {
            return Err(RunnerError::AlreadySubmitted);
        }
        Ok(())
    }

    /// One second of countdown.
    ///
    /// A fixed clock is advanced by one second per tick so deterministic
    /// tests model the cadence; the real clock ignores the advance. When
    /// the countdown reaches zero the question auto-submits: a captured
    /// transcription outcome is submitted as a voice answer, otherwise a
    /// timeout answer.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::AlreadySubmitted` or `RunnerError::Disposed`
    /// when a stale driver ticks a finished runner.
    pub fn tick(&mut self) -> Result<TickOutcome, RunnerError> {
        self.ensure_active()?;

        self.clock.advance(Duration::seconds(1));
        let now = self.clock.now();
        self.apply_hide(now);

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            let verdict = self.auto_submit(now)?;
            return Ok(TickOutcome::AutoSubmitted(verdict));
        }

        Ok(TickOutcome::Counting {
            remaining_seconds: self.remaining_seconds,
        })
    }

    /// The one-shot exposure timer's input; also applied lazily on ticks.
    ///
    /// Quietly does nothing on a finished runner; a cancelled timer that
    /// fires anyway must not act.
    pub fn hide_stimulus(&mut self) {
        if self.disposed || self.phase == RunnerPhase::Submitted {
            return;
        }
        let now = self.clock.now();
        self.apply_hide(now);
    }

    fn apply_hide(&mut self, now: DateTime<Utc>) {
        if self.phase == RunnerPhase::Presenting
            && self.hide_at.is_some_and(|hide_at| now >= hide_at)
        {
            self.phase = RunnerPhase::Answering;
        }
    }

    /// Submit a selected option, cancelling the countdown.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::AlreadySubmitted`/`Disposed` for a finished
    /// runner and propagates evaluator errors.
    pub fn submit_choice(&mut self, option: &str) -> Result<ResponseVerdict, RunnerError> {
        self.ensure_active()?;
        let now = self.clock.now();
        let verdict = evaluator::evaluate(Some(option), &self.question, self.elapsed_seconds(now))?;
        self.finish();
        Ok(verdict)
    }

    /// Submit the recorded attempt, cancelling the countdown.
    ///
    /// The transcript outcome is submitted as-is; a take that was never
    /// transcribed goes through as `Unavailable` so the attempt still
    /// scores.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::NothingRecorded` when no take has been
    /// captured, `RunnerError::AlreadySubmitted`/`Disposed` for a finished
    /// runner, and propagates evaluator errors.
    pub fn submit_voice(&mut self) -> Result<ResponseVerdict, RunnerError> {
        self.ensure_active()?;
        let Some(capture) = &self.capture else {
            return Err(RunnerError::NothingRecorded);
        };
        if !capture.has_recording() {
            return Err(RunnerError::NothingRecorded);
        }

        let outcome = capture
            .transcript()
            .cloned()
            .unwrap_or(TranscriptionOutcome::Unavailable);
        let now = self.clock.now();
        let verdict =
            evaluator::evaluate_voice(&outcome, &self.question, self.elapsed_seconds(now))?;
        self.finish();
        Ok(verdict)
    }

    /// Cancellation contract for question replacement and teardown: all
    /// timers are dead after this (ticks and submissions error) and any
    /// in-flight capture is force-stopped. No verdict is produced.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(capture) = &mut self.capture {
            capture.force_stop();
        }
    }

    fn auto_submit(&mut self, now: DateTime<Utc>) -> Result<ResponseVerdict, RunnerError> {
        let elapsed = self.elapsed_seconds(now);
        let outcome = self.capture.as_ref().and_then(|c| c.transcript().cloned());

        let verdict = match outcome {
            Some(outcome) => evaluator::evaluate_voice(&outcome, &self.question, elapsed)?,
            None => evaluator::evaluate(None, &self.question, elapsed)?,
        };
        self.finish();
        Ok(verdict)
    }

    fn finish(&mut self) {
        self.phase = RunnerPhase::Submitted;
        if let Some(capture) = &mut self.capture {
            capture.force_stop();
        }
    }

    fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        let millis = now.signed_duration_since(self.started_at).num_milliseconds();

        // NOTE: `num_milliseconds()` returns `i64`. Converting to `f64` may
        // lose precision for extremely large durations, but a question lasts
        // seconds, not centuries.
        #[allow(clippy::cast_precision_loss)]
        let millis_f = millis as f64;

        millis_f / 1000.0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use screen_core::model::{
        CorrectAnswer, Domain, ErrorPatternKind, QuestionId, Stimulus, TIMEOUT_ANSWER,
        UNTRANSCRIBED_ANSWER,
    };
    use screen_core::time::fixed_clock;

    use crate::capture::{AudioBlob, InMemoryDevice};
    use crate::error::TranscribeError;
    use crate::transcription::Transcriber;

    struct StubTranscriber {
        text: Option<String>,
    }

    #[async_trait]
    impl Transcriber for StubTranscriber {
        async fn transcribe(&self, _audio: &AudioBlob) -> Result<String, TranscribeError> {
            self.text.clone().ok_or(TranscribeError::EmptyResponse)
        }
    }

    fn choice_question() -> Question {
        Question::new(
            QuestionId::new("ns1"),
            Stimulus::Text("34".into()),
            "Which number did you see?",
            CorrectAnswer::Text("34".into()),
            Domain::NumberSense,
        )
        .with_options(vec!["34".into(), "43".into(), "54".into()])
    }

    fn voice_question() -> Question {
        Question::new(
            QuestionId::new("pd1"),
            Stimulus::Text("blorf".into()),
            "Read this word aloud",
            CorrectAnswer::Text("blorf".into()),
            Domain::Phonological,
        )
    }

    fn voice_runner() -> QuestionRunner {
        QuestionRunner::start(voice_question(), fixed_clock())
            .with_capture(CapturePipeline::new(Box::new(InMemoryDevice::new(vec![7]))))
    }

    #[test]
    fn correct_choice_submits_immediately() {
        let mut runner = QuestionRunner::start(choice_question(), fixed_clock());
        assert_eq!(runner.phase(), RunnerPhase::Answering);

        let verdict = runner.submit_choice("34").unwrap();
        assert!(verdict.is_correct());
        assert!(verdict.error_pattern().is_none());
        assert_eq!(runner.phase(), RunnerPhase::Submitted);
    }

    #[test]
    fn wrong_choice_is_classified() {
        let mut runner = QuestionRunner::start(choice_question(), fixed_clock());
        let verdict = runner.submit_choice("43").unwrap();

        assert!(!verdict.is_correct());
        assert_eq!(
            verdict.error_pattern().unwrap().kind,
            ErrorPatternKind::Reversal
        );
    }

    #[test]
    fn countdown_auto_submits_timeout() {
        let mut runner = QuestionRunner::start(choice_question(), fixed_clock());

        for expected in (1..30).rev() {
            let outcome = runner.tick().unwrap();
            assert_eq!(
                outcome,
                TickOutcome::Counting {
                    remaining_seconds: expected
                }
            );
        }

        let TickOutcome::AutoSubmitted(verdict) = runner.tick().unwrap() else {
            panic!("countdown should auto-submit on the final tick");
        };
        assert_eq!(verdict.raw_answer(), TIMEOUT_ANSWER);
        assert!(!verdict.is_correct());
        assert!(verdict.error_pattern().is_none());
        assert_eq!(verdict.response_time_seconds(), 30.0);
    }

    #[test]
    fn manual_submit_cancels_the_countdown() {
        let mut runner = QuestionRunner::start(choice_question(), fixed_clock());
        runner.tick().unwrap();
        runner.submit_choice("34").unwrap();

        let err = runner.tick().unwrap_err();
        assert!(matches!(err, RunnerError::AlreadySubmitted));

        let err = runner.submit_choice("34").unwrap_err();
        assert!(matches!(err, RunnerError::AlreadySubmitted));
    }

    #[test]
    fn timed_exposure_hides_the_stimulus() {
        let question = choice_question().with_stimulus_display_ms(2000);
        let mut runner = QuestionRunner::start(question, fixed_clock());

        assert_eq!(runner.phase(), RunnerPhase::Presenting);
        assert!(runner.stimulus_visible());

        runner.tick().unwrap();
        assert_eq!(runner.phase(), RunnerPhase::Presenting);

        runner.tick().unwrap();
        assert_eq!(runner.phase(), RunnerPhase::Answering);
        assert!(!runner.stimulus_visible());
    }

    #[tokio::test]
    async fn voice_flow_submits_transcribed_answer() {
        let mut runner = voice_runner();
        let transcriber = StubTranscriber {
            text: Some("Blorf".into()),
        };

        let capture = runner.capture_mut().unwrap();
        capture.start_capture().unwrap();
        capture.tick_recording();
        capture.stop_capture().unwrap();
        capture.transcribe(&transcriber).await.unwrap();

        let verdict = runner.submit_voice().unwrap();
        assert!(verdict.is_correct());
        assert_eq!(verdict.raw_answer(), "Blorf");
    }

    #[tokio::test]
    async fn untranscribed_take_still_scores() {
        let mut runner = voice_runner();
        let transcriber = StubTranscriber { text: None };

        let capture = runner.capture_mut().unwrap();
        capture.start_capture().unwrap();
        capture.stop_capture().unwrap();
        capture.transcribe(&transcriber).await.unwrap();

        let verdict = runner.submit_voice().unwrap();
        assert!(!verdict.is_correct());
        assert_eq!(verdict.raw_answer(), UNTRANSCRIBED_ANSWER);
        assert!(verdict.error_pattern().is_some());
    }

    #[tokio::test]
    async fn timeout_submits_transcript_when_one_exists() {
        let mut runner = voice_runner();
        let transcriber = StubTranscriber {
            text: Some("blorf".into()),
        };

        let capture = runner.capture_mut().unwrap();
        capture.start_capture().unwrap();
        capture.stop_capture().unwrap();
        capture.transcribe(&transcriber).await.unwrap();

        let verdict = loop {
            match runner.tick().unwrap() {
                TickOutcome::Counting { .. } => {}
                TickOutcome::AutoSubmitted(verdict) => break verdict,
            }
        };

        assert!(verdict.is_correct());
        assert_eq!(verdict.raw_answer(), "blorf");
        assert_eq!(verdict.response_time_seconds(), 30.0);
    }

    #[test]
    fn submit_voice_without_a_take_errors() {
        let mut runner = voice_runner();
        let err = runner.submit_voice().unwrap_err();
        assert!(matches!(err, RunnerError::NothingRecorded));
    }

    #[test]
    fn dispose_stops_capture_and_kills_timers() {
        let mut runner = voice_runner();
        runner.capture_mut().unwrap().start_capture().unwrap();

        runner.dispose();
        assert!(runner.is_disposed());
        assert!(runner.capture_mut().is_none());

        let err = runner.tick().unwrap_err();
        assert!(matches!(err, RunnerError::Disposed));
        let err = runner.submit_voice().unwrap_err();
        assert!(matches!(err, RunnerError::Disposed));
    }

    #[test]
    fn hide_timer_firing_after_submission_is_inert() {
        let question = choice_question().with_stimulus_display_ms(2000);
        let mut runner = QuestionRunner::start(question, fixed_clock());
        runner.submit_choice("34").unwrap();

        runner.hide_stimulus();
        assert_eq!(runner.phase(), RunnerPhase::Submitted);
    }
}
