// error.rs: Error types for the assistant workflows.

use nt_goals::GoalsError;
use nt_meals::MealError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistError {
    /// The meal analysis provider rejected or could not be reached.
    #[error("meal analysis failed: {0}")]
    Analysis(String),

    /// The analysis provider did not answer in time.
    #[error("meal analysis timed out after {secs}s")]
    AnalysisTimeout { secs: u64 },

    /// The diet chat provider rejected or could not be reached.
    #[error("diet chat failed: {0}")]
    Chat(String),

    #[error(transparent)]
    Meal(#[from] MealError),

    #[error(transparent)]
    Goals(#[from] GoalsError),

    /// A shared store mutex was poisoned by a panicking holder.
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
}
