#[cfg(feature = "network")]
pub mod http;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{debug, warn};

use crate::session::result::AttemptRecord;

#[cfg(feature = "network")]
pub use http::HttpReporter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    Recorded,
    Skipped,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[cfg(feature = "network")]
    #[error(transparent)]
    Api(#[from] crate::api::ApiError),
    #[error("reporter unavailable: {0}")]
    Unavailable(String),
}

/// Sends finished attempts to the collector.
pub trait AttemptReporter: Send + Sync {
    fn submit(&self, record: &AttemptRecord) -> Result<ReportOutcome, ReportError>;
}

/// Reporter for offline practice.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl AttemptReporter for NullReporter {
    fn submit(&self, _record: &AttemptRecord) -> Result<ReportOutcome, ReportError> {
        Ok(ReportOutcome::Skipped)
    }
}

/// Fire-and-forget submission. Runs on its own thread, logs the outcome and
/// never reports back to the caller; the handle exists for tests.
pub fn dispatch(reporter: Arc<dyn AttemptReporter>, record: AttemptRecord) -> JoinHandle<()> {
    thread::spawn(move || match reporter.submit(&record) {
        Ok(outcome) => debug!(problem_id = record.problem_id, ?outcome, "attempt reported"),
        Err(err) => warn!(problem_id = record.problem_id, error = %err, "failed to report attempt"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Failing;

    impl AttemptReporter for Failing {
        fn submit(&self, _record: &AttemptRecord) -> Result<ReportOutcome, ReportError> {
            Err(ReportError::Unavailable("collector down".into()))
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<AttemptRecord>>);

    impl AttemptReporter for Recording {
        fn submit(&self, record: &AttemptRecord) -> Result<ReportOutcome, ReportError> {
            self.0.lock().unwrap().push(record.clone());
            Ok(ReportOutcome::Recorded)
        }
    }

    fn record() -> AttemptRecord {
        AttemptRecord {
            problem_id: 5,
            time_seconds: 3.25,
            key_strokes: 9,
            ccpm: 120,
        }
    }

    #[test]
    fn test_failure_does_not_propagate() {
        let handle = dispatch(Arc::new(Failing), record());
        assert!(handle.join().is_ok());
    }

    #[test]
    fn test_dispatch_submits_record() {
        let reporter = Arc::new(Recording::default());
        dispatch(reporter.clone(), record()).join().unwrap();
        assert_eq!(reporter.0.lock().unwrap().as_slice(), &[record()]);
    }

    #[test]
    fn test_null_reporter_skips() {
        assert_eq!(NullReporter.submit(&record()).unwrap(), ReportOutcome::Skipped);
    }
}
