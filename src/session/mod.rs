pub mod attempt;
pub mod clock;
pub mod event;
pub mod keys;
pub mod problem;
pub mod result;

pub use attempt::{AttemptSession, Phase, SessionOptions};
pub use clock::{ManualTime, MonotonicTime, SessionClock, TimeSource};
pub use event::{AttemptToken, Dispatch, SessionEvent};
pub use keys::{Hotkey, Key, KeyOutcome, KeyPress, Modifiers};
pub use problem::{PersonalBest, PopulationStats, Problem, ProblemRef, UserStanding};
pub use result::{AttemptRecord, CompletionSnapshot};
