use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::problem::{PersonalBest, Problem};

/// Everything the statistics view needs once an attempt completes.
#[derive(Clone, Debug)]
pub struct CompletionSnapshot {
    pub problem: Problem,
    pub elapsed_secs: f64,
    pub keystrokes: u32,
    pub speed_ccpm: u32,
    pub completion_percent: u8,
    pub is_logged_in: bool,
    pub completed_at: DateTime<Utc>,
}

impl CompletionSnapshot {
    /// True when this attempt matches or beats the stored best for the
    /// metric. Lower is better for time and strokes, higher for CCPM.
    pub fn beats_best_time(&self) -> bool {
        self.best(|b| b.time_secs)
            .is_some_and(|best| self.elapsed_secs <= best)
    }

    pub fn beats_best_key_strokes(&self) -> bool {
        self.best(|b| b.key_strokes)
            .is_some_and(|best| self.keystrokes <= best)
    }

    pub fn beats_best_ccpm(&self) -> bool {
        self.best(|b| b.ccpm).is_some_and(|best| self.speed_ccpm >= best)
    }

    fn best<V>(&self, field: impl Fn(&PersonalBest) -> Option<V>) -> Option<V> {
        self.problem.standing().best().and_then(field)
    }
}

/// Wire body for a finished attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub problem_id: i64,
    pub time_seconds: f64,
    pub key_strokes: u32,
    pub ccpm: u32,
}

impl AttemptRecord {
    /// Only persisted problems attempted by a signed-in user are reported.
    pub fn from_snapshot(snapshot: &CompletionSnapshot) -> Option<Self> {
        if !snapshot.is_logged_in {
            return None;
        }
        let problem_id = snapshot.problem.reference().backend_id()?;
        Some(Self {
            problem_id,
            time_seconds: snapshot.elapsed_secs,
            key_strokes: snapshot.keystrokes,
            ccpm: snapshot.speed_ccpm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::problem::{ProblemRef, UserStanding};

    fn snapshot(problem: Problem, is_logged_in: bool) -> CompletionSnapshot {
        CompletionSnapshot {
            problem,
            elapsed_secs: 12.0,
            keystrokes: 20,
            speed_ccpm: 60,
            completion_percent: 100,
            is_logged_in,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_problem_has_no_record() {
        let snap = snapshot(Problem::new("p", "a", "b"), true);
        assert!(AttemptRecord::from_snapshot(&snap).is_none());
    }

    #[test]
    fn test_guest_has_no_record() {
        let problem = Problem::new("p", "a", "b").with_reference(ProblemRef::Persisted(3));
        let snap = snapshot(problem, false);
        assert!(AttemptRecord::from_snapshot(&snap).is_none());
    }

    #[test]
    fn test_record_for_persisted_problem() {
        let problem = Problem::new("p", "a", "b")
            .with_reference(ProblemRef::Persisted(3))
            .with_standing(UserStanding::Authenticated(PersonalBest::default()));
        let snap = snapshot(problem, true);
        let record = AttemptRecord::from_snapshot(&snap).unwrap();
        assert_eq!(record.problem_id, 3);
        assert_eq!(record.key_strokes, 20);
        assert_eq!(record.ccpm, 60);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["time_seconds"], 12.0);
    }

    #[test]
    fn test_best_comparisons() {
        let best = PersonalBest {
            time_secs: Some(15.0),
            key_strokes: Some(10),
            ccpm: Some(60),
        };
        let problem = Problem::new("p", "a", "b").with_standing(UserStanding::Authenticated(best));
        let snap = snapshot(problem, true);
        assert!(snap.beats_best_time());
        assert!(!snap.beats_best_key_strokes());
        assert!(snap.beats_best_ccpm());

        let guest = snapshot(Problem::new("p", "a", "b"), false);
        assert!(!guest.beats_best_time());
    }
}
