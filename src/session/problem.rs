use serde::{Deserialize, Serialize};

/// Whether a problem exists on the backend and can have attempts reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemRef {
    Anonymous,
    Persisted(i64),
}

impl ProblemRef {
    pub fn backend_id(self) -> Option<i64> {
        match self {
            ProblemRef::Anonymous => None,
            ProblemRef::Persisted(id) => Some(id),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalBest {
    pub time_secs: Option<f64>,
    pub key_strokes: Option<u32>,
    pub ccpm: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UserStanding {
    Guest,
    Authenticated(PersonalBest),
}

impl UserStanding {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, UserStanding::Authenticated(_))
    }

    pub fn best(&self) -> Option<&PersonalBest> {
        match self {
            UserStanding::Guest => None,
            UserStanding::Authenticated(best) => Some(best),
        }
    }
}

/// Population histograms supplied alongside a problem. Only the statistics
/// view reads these.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    #[serde(default)]
    pub time: Vec<u32>,
    #[serde(default)]
    pub key_strokes: Vec<u32>,
    #[serde(default)]
    pub ccpm: Vec<u32>,
}

/// One practice exercise. The texts are fixed at construction; resetting an
/// attempt copies `original_text` rather than touching the problem.
#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    problem_id: String,
    original_text: String,
    modified_text: String,
    reference: ProblemRef,
    standing: UserStanding,
    population: PopulationStats,
}

impl Problem {
    pub fn new(
        problem_id: impl Into<String>,
        original_text: impl Into<String>,
        modified_text: impl Into<String>,
    ) -> Self {
        Self {
            problem_id: problem_id.into(),
            original_text: original_text.into(),
            modified_text: modified_text.into(),
            reference: ProblemRef::Anonymous,
            standing: UserStanding::Guest,
            population: PopulationStats::default(),
        }
    }

    pub fn with_reference(mut self, reference: ProblemRef) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_standing(mut self, standing: UserStanding) -> Self {
        self.standing = standing;
        self
    }

    pub fn with_population(mut self, population: PopulationStats) -> Self {
        self.population = population;
        self
    }

    pub fn problem_id(&self) -> &str {
        &self.problem_id
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn modified_text(&self) -> &str {
        &self.modified_text
    }

    pub fn reference(&self) -> ProblemRef {
        self.reference
    }

    pub fn standing(&self) -> &UserStanding {
        &self.standing
    }

    pub fn population(&self) -> &PopulationStats {
        &self.population
    }
}
