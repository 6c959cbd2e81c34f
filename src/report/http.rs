use crate::api::ApiClient;
use crate::report::{AttemptReporter, ReportError, ReportOutcome};
use crate::session::result::AttemptRecord;

pub const ATTEMPTS_ENDPOINT: &str = "/api/attempts";

pub struct HttpReporter {
    client: ApiClient,
}

impl HttpReporter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl AttemptReporter for HttpReporter {
    fn submit(&self, record: &AttemptRecord) -> Result<ReportOutcome, ReportError> {
        if !self.client.has_session() {
            return Ok(ReportOutcome::Skipped);
        }
        let created: Option<serde_json::Value> = self.client.post_json(ATTEMPTS_ENDPOINT, record)?;
        Ok(match created {
            Some(_) => ReportOutcome::Recorded,
            None => ReportOutcome::Skipped,
        })
    }
}
