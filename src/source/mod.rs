pub mod catalogue;
#[cfg(feature = "network")]
pub mod remote;

use thiserror::Error;

use crate::session::problem::Problem;

pub use catalogue::CatalogueSource;
#[cfg(feature = "network")]
pub use remote::RemoteSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no problems are available")]
    EmptyCatalogue,
    #[error("problem catalogue is invalid: {0}")]
    InvalidCatalogue(String),
    #[cfg(feature = "network")]
    #[error("could not fetch a problem: {0}")]
    Api(#[from] crate::api::ApiError),
}

/// Supplies practice problems. `next_problem` may block on I/O; the session
/// always calls it from a worker thread.
pub trait ProblemSource: Send + Sync {
    fn next_problem(&self) -> Result<Problem, SourceError>;

    /// Text a reset attempt starts from.
    fn reset_text(&self, problem: &Problem) -> String {
        problem.original_text().to_string()
    }

    /// Short label for the header.
    fn describe(&self) -> String;
}
