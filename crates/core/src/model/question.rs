use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// Countdown length used when a question does not specify one.
pub const DEFAULT_TIME_LIMIT_SECONDS: u32 = 30;

//
// ─── DOMAIN ────────────────────────────────────────────────────────────────────
//

/// Cognitive domain a question probes.
///
/// The domain steers two things: which error-pattern rules apply to an
/// incorrect answer, and how the test bank groups questions into sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Exact numeric comparison and digit reading.
    NumberSense,
    /// Quantity estimation from briefly shown patterns.
    ApproximateNumber,
    /// Ordering and pattern-continuation tasks.
    SequentialLogic,
    /// Sound-to-letter mapping, pseudoword decoding.
    Phonological,
    /// Passage reading with comprehension questions.
    ReadingComprehension,
    /// Short-term recall of shown material.
    WorkingMemory,
}

impl Domain {
    /// True for domains whose answers carry numeric meaning.
    ///
    /// Magnitude classification only applies to these.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Domain::NumberSense | Domain::ApproximateNumber)
    }
}

//
// ─── STIMULUS ──────────────────────────────────────────────────────────────────
//

/// Prompt material shown or spoken to the test-taker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stimulus {
    /// A single word, digit string, or dot pattern.
    Text(String),
    /// An ordered set of tokens presented side by side.
    Tokens(Vec<String>),
    /// A long reading passage.
    Passage(String),
}

//
// ─── CORRECT ANSWER ────────────────────────────────────────────────────────────
//

/// Expected answer for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectAnswer {
    Text(String),
    /// Ordered tokens whose space-joined form is the canonical answer.
    Tokens(Vec<String>),
}

impl CorrectAnswer {
    /// Canonical single-string form used for all comparisons.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            CorrectAnswer::Text(s) => s.clone(),
            CorrectAnswer::Tokens(tokens) => tokens.join(" "),
        }
    }
}

impl From<&str> for CorrectAnswer {
    fn from(s: &str) -> Self {
        CorrectAnswer::Text(s.to_owned())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Immutable question definition supplied by the external test bank.
///
/// The engine treats bank data as trusted input: a question with, say, an
/// empty correct answer is an upstream contract violation, not something
/// this type defends against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    stimulus: Stimulus,
    instruction: String,
    options: Option<Vec<String>>,
    correct_answer: CorrectAnswer,
    time_limit_seconds: u32,
    domain: Domain,
    stimulus_display_ms: Option<u32>,
}

impl Question {
    /// Create a question with the default time limit and no options
    /// (an open/voice-response question until options are attached).
    #[must_use]
    pub fn new(
        id: QuestionId,
        stimulus: Stimulus,
        instruction: impl Into<String>,
        correct_answer: CorrectAnswer,
        domain: Domain,
    ) -> Self {
        Self {
            id,
            stimulus,
            instruction: instruction.into(),
            options: None,
            correct_answer,
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
            domain,
            stimulus_display_ms: None,
        }
    }

    /// Attach ordered choice options, making this a selection question.
    #[must_use]
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    /// Override the countdown length in seconds.
    #[must_use]
    pub fn with_time_limit(mut self, seconds: u32) -> Self {
        self.time_limit_seconds = seconds;
        self
    }

    /// Show the stimulus only for the given window before hiding it
    /// (timed-exposure tasks such as dot estimation).
    #[must_use]
    pub fn with_stimulus_display_ms(mut self, ms: u32) -> Self {
        self.stimulus_display_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn stimulus(&self) -> &Stimulus {
        &self.stimulus
    }

    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    #[must_use]
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &CorrectAnswer {
        &self.correct_answer
    }

    #[must_use]
    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit_seconds
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    #[must_use]
    pub fn stimulus_display_ms(&self) -> Option<u32> {
        self.stimulus_display_ms
    }

    /// Whether this question expects a spoken response (no options to pick).
    #[must_use]
    pub fn is_voice(&self) -> bool {
        self.options.is_none()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
