use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rust_embed::Embed;
use serde::Deserialize;

use crate::session::problem::{PopulationStats, Problem};
use crate::source::{ProblemSource, SourceError};

#[derive(Embed)]
#[folder = "assets/catalogue/"]
struct CatalogueAssets;

const CATALOGUE_FILE: &str = "problems.json";

#[derive(Deserialize)]
struct CatalogueFile {
    problems: Vec<CatalogueEntry>,
}

#[derive(Deserialize)]
struct CatalogueEntry {
    problem_id: String,
    original_text: String,
    modified_text: String,
    #[serde(default)]
    population: PopulationStats,
}

impl From<CatalogueEntry> for Problem {
    fn from(entry: CatalogueEntry) -> Self {
        Problem::new(entry.problem_id, entry.original_text, entry.modified_text)
            .with_population(entry.population)
    }
}

/// Fixed local catalogue; every draw is uniform over all problems. Local
/// problems are never persisted, so attempts on them are not reported.
pub struct CatalogueSource {
    problems: Vec<Problem>,
    rng: Mutex<SmallRng>,
}

impl CatalogueSource {
    pub fn new(problems: Vec<Problem>) -> Self {
        Self {
            problems,
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    pub fn with_seed(problems: Vec<Problem>, seed: u64) -> Self {
        Self {
            problems,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    /// The catalogue bundled into the binary.
    pub fn embedded() -> Result<Self, SourceError> {
        let file = CatalogueAssets::get(CATALOGUE_FILE)
            .ok_or_else(|| SourceError::InvalidCatalogue(format!("{CATALOGUE_FILE} missing")))?;
        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| SourceError::InvalidCatalogue(e.to_string()))?;
        Self::from_json(content)
    }

    pub fn from_json(content: &str) -> Result<Self, SourceError> {
        let file: CatalogueFile = serde_json::from_str(content)
            .map_err(|e| SourceError::InvalidCatalogue(e.to_string()))?;
        Ok(Self::new(file.problems.into_iter().map(Problem::from).collect()))
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

impl ProblemSource for CatalogueSource {
    fn next_problem(&self) -> Result<Problem, SourceError> {
        if self.problems.is_empty() {
            return Err(SourceError::EmptyCatalogue);
        }
        let idx = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(0..self.problems.len())
        };
        Ok(self.problems[idx].clone())
    }

    fn describe(&self) -> String {
        format!("local catalogue ({} problems)", self.problems.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::problem::ProblemRef;
    use std::collections::HashSet;

    #[test]
    fn test_embedded_catalogue_loads() {
        let source = CatalogueSource::embedded().unwrap();
        assert!(!source.is_empty());
        for problem in &source.problems {
            assert!(!problem.problem_id().is_empty());
            assert_eq!(problem.reference(), ProblemRef::Anonymous);
        }
    }

    #[test]
    fn test_embedded_problem_ids_are_unique() {
        let source = CatalogueSource::embedded().unwrap();
        let ids: HashSet<&str> = source.problems.iter().map(|p| p.problem_id()).collect();
        assert_eq!(ids.len(), source.len());
    }

    #[test]
    fn test_empty_catalogue_is_error() {
        let source = CatalogueSource::new(Vec::new());
        assert!(matches!(source.next_problem(), Err(SourceError::EmptyCatalogue)));
    }

    #[test]
    fn test_draws_cover_catalogue() {
        let problems = vec![
            Problem::new("a", "1", "2"),
            Problem::new("b", "3", "4"),
            Problem::new("c", "5", "6"),
        ];
        let source = CatalogueSource::with_seed(problems, 42);
        let seen: HashSet<String> = (0..200)
            .map(|_| source.next_problem().unwrap().problem_id().to_string())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_reset_text_is_original() {
        let source = CatalogueSource::new(vec![Problem::new("a", "orig", "target")]);
        let problem = source.next_problem().unwrap();
        assert_eq!(source.reset_text(&problem), "orig");
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = CatalogueSource::from_json("{\"problems\": 3}").err().unwrap();
        assert!(matches!(err, SourceError::InvalidCatalogue(_)));
    }

    #[test]
    fn test_population_is_optional() {
        let json = r#"{"problems":[{"problem_id":"x","original_text":"a","modified_text":"b"}]}"#;
        let source = CatalogueSource::from_json(json).unwrap();
        assert_eq!(source.len(), 1);
        assert!(source.problems[0].population().time.is_empty());
    }
}
