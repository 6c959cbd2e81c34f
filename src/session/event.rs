use std::sync::mpsc;

use crate::session::problem::Problem;
use crate::source::SourceError;

/// Generation stamp carried by every asynchronous event. The session bumps
/// its generation whenever an attempt is replaced, so events from a previous
/// attempt compare unequal and are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttemptToken(pub(crate) u64);

#[derive(Debug)]
pub enum SessionEvent {
    Tick(AttemptToken),
    ProblemLoaded {
        token: AttemptToken,
        result: Result<Problem, SourceError>,
    },
}

/// Posts events from worker threads back to the thread that owns the session.
pub trait Dispatch: Clone + Send + 'static {
    /// Returns `false` once the receiving side is gone.
    fn dispatch(&self, event: SessionEvent) -> bool;
}

impl<E> Dispatch for mpsc::Sender<E>
where
    E: From<SessionEvent> + Send + 'static,
{
    fn dispatch(&self, event: SessionEvent) -> bool {
        self.send(E::from(event)).is_ok()
    }
}
