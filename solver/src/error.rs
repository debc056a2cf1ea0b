/// Errors surfaced by a solving cycle.
///
/// The solver never retries on its own: a `BoardInconsistency` means the
/// snapshot is stale or misread and the caller should capture a fresh one.
/// `NoMoveAvailable` is a valid terminal state, not a failure of the engine.
/// Enumeration-cap overruns are deliberately *not* represented here; they are
/// handled inside the probability engine with a fallback estimate and a
/// warning log.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("inconsistent board snapshot: {detail}")]
    BoardInconsistency { detail: String },
    #[error("no move available")]
    NoMoveAvailable,
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),
}

impl SolverError {
    pub fn inconsistency(detail: impl Into<String>) -> Self {
        SolverError::BoardInconsistency {
            detail: detail.into(),
        }
    }
}
