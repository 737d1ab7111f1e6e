use serde::{Deserialize, Serialize};

/// Result of handing a recorded attempt to the transcription collaborator.
///
/// Both variants are scoreable: `Unavailable` still reaches the evaluator
/// as the untranscribed sentinel so a recorded attempt is never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptionOutcome {
    /// The collaborator returned usable text.
    Transcribed(String),
    /// Transcription failed or produced nothing usable.
    Unavailable,
}

impl TranscriptionOutcome {
    /// The transcript text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            TranscriptionOutcome::Transcribed(text) => Some(text),
            TranscriptionOutcome::Unavailable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_present_only_when_transcribed() {
        assert_eq!(
            TranscriptionOutcome::Transcribed("cat".into()).text(),
            Some("cat")
        );
        assert_eq!(TranscriptionOutcome::Unavailable.text(), None);
    }
}
