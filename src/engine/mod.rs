pub mod diff;
pub mod metrics;

pub use diff::{DiffSpan, SpanKind, count_changed_characters, diff_chars};
pub use metrics::{Metrics, completion_percent, is_normalized_equal, speed_ccpm};
