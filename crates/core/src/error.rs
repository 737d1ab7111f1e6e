use thiserror::Error;

use crate::evaluator::EvaluateError;
use crate::model::session::TestSessionError;
use crate::model::verdict::VerdictError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Evaluate(#[from] EvaluateError),
    #[error(transparent)]
    Verdict(#[from] VerdictError),
    #[error(transparent)]
    Session(#[from] TestSessionError),
}
