use serde::Deserialize;
use tracing::debug;

use crate::api::ApiClient;
use crate::session::problem::{PersonalBest, PopulationStats, Problem, ProblemRef, UserStanding};
use crate::source::{ProblemSource, SourceError};

pub const RANDOM_PROBLEM_ENDPOINT: &str = "/api/problems/random";

/// Body of `GET /api/problems/random`.
#[derive(Debug, Deserialize)]
pub struct ProblemResponse {
    pub id: i64,
    pub problem_id: String,
    pub original_text: String,
    pub modified_text: String,
    #[serde(default)]
    pub best_time: Option<f64>,
    #[serde(default)]
    pub best_key_strokes: Option<u32>,
    #[serde(default)]
    pub best_ccpm: Option<u32>,
    #[serde(default)]
    pub time_histogram: Option<Vec<u32>>,
    #[serde(default)]
    pub strokes_histogram: Option<Vec<u32>>,
    #[serde(default)]
    pub ccpm_histogram: Option<Vec<u32>>,
}

impl ProblemResponse {
    /// `authenticated` says whether the request carried a session; the
    /// backend omits bests for guests, but an absent best on its own does not
    /// mean the user is signed out.
    pub fn into_problem(self, authenticated: bool) -> Problem {
        let standing = if authenticated {
            UserStanding::Authenticated(PersonalBest {
                time_secs: self.best_time,
                key_strokes: self.best_key_strokes,
                ccpm: self.best_ccpm,
            })
        } else {
            UserStanding::Guest
        };
        let population = PopulationStats {
            time: self.time_histogram.unwrap_or_default(),
            key_strokes: self.strokes_histogram.unwrap_or_default(),
            ccpm: self.ccpm_histogram.unwrap_or_default(),
        };
        Problem::new(self.problem_id, self.original_text, self.modified_text)
            .with_reference(ProblemRef::Persisted(self.id))
            .with_standing(standing)
            .with_population(population)
    }
}

pub struct RemoteSource {
    client: ApiClient,
}

impl RemoteSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl ProblemSource for RemoteSource {
    fn next_problem(&self) -> Result<Problem, SourceError> {
        let response: ProblemResponse = self.client.get_json(RANDOM_PROBLEM_ENDPOINT)?;
        debug!(id = response.id, problem_id = %response.problem_id, "fetched problem");
        Ok(response.into_problem(self.client.has_session()))
    }

    fn describe(&self) -> String {
        self.client.url("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use std::time::Duration;

    const FULL: &str = r#"{
        "id": 42,
        "name": "rename",
        "problem_id": "01235",
        "original_text": "let x=1;",
        "modified_text": "let total=1;",
        "best_time": 9.5,
        "best_key_strokes": 14,
        "best_ccpm": 70,
        "time_histogram": [1, 2, 3],
        "strokes_histogram": null,
        "ccpm_histogram": [4]
    }"#;

    #[test]
    fn test_full_response_maps_to_persisted_problem() {
        let response: ProblemResponse = serde_json::from_str(FULL).unwrap();
        let problem = response.into_problem(true);
        assert_eq!(problem.reference(), ProblemRef::Persisted(42));
        assert_eq!(problem.problem_id(), "01235");
        assert_eq!(problem.original_text(), "let x=1;");
        let best = problem.standing().best().unwrap();
        assert_eq!(best.time_secs, Some(9.5));
        assert_eq!(best.key_strokes, Some(14));
        assert_eq!(problem.population().time, vec![1, 2, 3]);
        assert!(problem.population().key_strokes.is_empty());
    }

    #[test]
    fn test_minimal_response_for_guest() {
        let json = r#"{"id": 1, "problem_id": "p", "original_text": "a", "modified_text": "b"}"#;
        let response: ProblemResponse = serde_json::from_str(json).unwrap();
        let problem = response.into_problem(false);
        assert_eq!(problem.standing(), &UserStanding::Guest);
        assert_eq!(problem.reference().backend_id(), Some(1));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let json = r#"{"id": 1, "problem_id": "p", "original_text": "a"}"#;
        assert!(serde_json::from_str::<ProblemResponse>(json).is_err());
    }

    #[test]
    fn test_unreachable_backend_is_source_error() {
        let client = ApiClient::new("http://127.0.0.1:9", None, Duration::from_millis(500)).unwrap();
        let source = RemoteSource::new(client);
        let err = source.next_problem().unwrap_err();
        assert!(matches!(err, SourceError::Api(ApiError::Transport(_))));
    }
}
