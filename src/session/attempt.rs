use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, trace, warn};

use crate::engine::metrics::{Metrics, is_normalized_equal};
use crate::report::{self, AttemptReporter};
use crate::session::clock::{MonotonicTime, SessionClock, TimeSource};
use crate::session::event::{AttemptToken, Dispatch, SessionEvent};
use crate::session::keys::{self, Hotkey, KeyOutcome, KeyPress};
use crate::session::problem::Problem;
use crate::session::result::{AttemptRecord, CompletionSnapshot};
use crate::source::{ProblemSource, SourceError};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_SKIP_COOLDOWN: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Loading,
    /// No attempt in progress. `error` is set when the last load failed.
    Idle { error: Option<String> },
    Running,
    Paused,
    Completed,
}

#[derive(Clone, Copy, Debug)]
pub struct SessionOptions {
    /// `None` disables the background ticker; the owner then has to call
    /// [`AttemptSession::refresh`] itself.
    pub tick_interval: Option<Duration>,
    pub skip_cooldown: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_interval: Some(DEFAULT_TICK_INTERVAL),
            skip_cooldown: DEFAULT_SKIP_COOLDOWN,
        }
    }
}

/// One practice attempt from load to completion.
///
/// The session is owned by a single thread. Problem fetches, attempt reports
/// and clock ticks run elsewhere and come back through [`Dispatch`] as
/// [`SessionEvent`]s, which the owner feeds to [`AttemptSession::handle`].
/// Every event carries the [`AttemptToken`] that was current when it was
/// scheduled; anything older than the current generation is dropped.
pub struct AttemptSession<D: Dispatch, T: TimeSource = MonotonicTime> {
    source: Arc<dyn ProblemSource>,
    reporter: Arc<dyn AttemptReporter>,
    dispatch: D,
    time: T,
    clock: SessionClock<T>,
    options: SessionOptions,
    phase: Phase,
    problem: Option<Problem>,
    current_text: String,
    keystrokes: u32,
    metrics: Metrics,
    generation: u64,
    editor_epoch: u64,
    editor_focused: bool,
    last_skip: Option<Instant>,
    snapshot: Option<CompletionSnapshot>,
    closed: bool,
}

impl<D: Dispatch> AttemptSession<D, MonotonicTime> {
    pub fn new(
        source: Arc<dyn ProblemSource>,
        reporter: Arc<dyn AttemptReporter>,
        dispatch: D,
        options: SessionOptions,
    ) -> Self {
        Self::with_time(source, reporter, dispatch, MonotonicTime, options)
    }
}

impl<D: Dispatch, T: TimeSource> AttemptSession<D, T> {
    pub fn with_time(
        source: Arc<dyn ProblemSource>,
        reporter: Arc<dyn AttemptReporter>,
        dispatch: D,
        time: T,
        options: SessionOptions,
    ) -> Self {
        let clock = SessionClock::new(time.clone(), options.tick_interval);
        Self {
            source,
            reporter,
            dispatch,
            time,
            clock,
            options,
            phase: Phase::Idle { error: None },
            problem: None,
            current_text: String::new(),
            keystrokes: 0,
            metrics: Metrics::default(),
            generation: 0,
            editor_epoch: 0,
            editor_focused: true,
            last_skip: None,
            snapshot: None,
            closed: false,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    pub fn keystrokes(&self) -> u32 {
        self.keystrokes
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Changes whenever the editing surface must be rebuilt with
    /// [`current_text`](Self::current_text).
    pub fn editor_epoch(&self) -> u64 {
        self.editor_epoch
    }

    pub fn token(&self) -> AttemptToken {
        AttemptToken(self.generation)
    }

    /// Set once the attempt completes; cleared by reset, skip and load.
    pub fn snapshot(&self) -> Option<&CompletionSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Requests a new problem. The fetch runs on a worker thread and resolves
    /// through [`SessionEvent::ProblemLoaded`].
    pub fn load(&mut self) {
        if self.closed || self.phase == Phase::Loading {
            return;
        }
        self.clock.reset();
        self.generation += 1;
        self.phase = Phase::Loading;
        self.problem = None;
        self.snapshot = None;
        self.current_text.clear();
        self.keystrokes = 0;
        self.metrics = Metrics::default();

        let token = self.token();
        let source = Arc::clone(&self.source);
        let dispatch = self.dispatch.clone();
        debug!(?token, "loading problem");
        thread::spawn(move || {
            let result = source.next_problem();
            if !dispatch.dispatch(SessionEvent::ProblemLoaded { token, result }) {
                trace!(?token, "session gone before problem arrived");
            }
        });
    }

    pub fn handle(&mut self, event: SessionEvent) {
        if self.closed {
            trace!(?event, "session closed, dropping event");
            return;
        }
        match event {
            SessionEvent::Tick(token) => self.on_tick(token),
            SessionEvent::ProblemLoaded { token, result } => self.on_problem_loaded(token, result),
        }
    }

    fn on_problem_loaded(&mut self, token: AttemptToken, result: Result<Problem, SourceError>) {
        if token != self.token() || self.phase != Phase::Loading {
            trace!(?token, "dropping stale problem");
            return;
        }
        match result {
            Ok(problem) => {
                info!(problem_id = problem.problem_id(), "problem loaded");
                self.current_text = self.source.reset_text(&problem);
                self.problem = Some(problem);
                self.begin_attempt();
            }
            Err(err) => {
                warn!(error = %err, "failed to load problem");
                self.phase = Phase::Idle {
                    error: Some(err.to_string()),
                };
            }
        }
    }

    pub fn on_tick(&mut self, token: AttemptToken) {
        if token != self.token() || self.phase != Phase::Running {
            trace!(?token, "dropping stale tick");
            return;
        }
        self.refresh();
    }

    /// Recomputes elapsed time and metrics, completing the attempt if the
    /// text already matches.
    pub fn refresh(&mut self) {
        if !matches!(self.phase, Phase::Running | Phase::Paused) {
            return;
        }
        self.recompute();
        self.check_completion();
    }

    /// Full replacement text from the editing surface.
    pub fn on_edit(&mut self, text: impl Into<String>) {
        if !matches!(self.phase, Phase::Running | Phase::Paused) {
            return;
        }
        self.current_text = text.into();
        self.recompute();
        self.check_completion();
    }

    /// Hotkeys are handled before stroke counting, so Ctrl+S skips without
    /// being counted.
    pub fn on_key(&mut self, press: &KeyPress) -> KeyOutcome {
        if self.closed {
            return KeyOutcome::Ignored;
        }
        if let Some(hotkey) = keys::hotkey(press) {
            match hotkey {
                Hotkey::Reset => self.reset(),
                Hotkey::Skip => {
                    self.skip();
                }
            }
            return KeyOutcome::Hotkey(hotkey);
        }
        if !keys::counts_as_stroke(press) || self.phase != Phase::Running || !self.editor_focused {
            return KeyOutcome::Ignored;
        }
        self.keystrokes += 1;
        KeyOutcome::Counted
    }

    /// Losing focus pauses the attempt and stops stroke counting; regaining
    /// it resumes.
    pub fn set_editor_focus(&mut self, focused: bool) {
        self.editor_focused = focused;
        if focused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn editor_focused(&self) -> bool {
        self.editor_focused
    }

    pub fn pause(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.clock.pause();
        self.recompute();
        self.phase = Phase::Paused;
        debug!(elapsed = self.clock.elapsed_secs(), "attempt paused");
    }

    pub fn resume(&mut self) {
        if self.phase != Phase::Paused {
            return;
        }
        self.phase = Phase::Running;
        self.start_clock();
        debug!("attempt resumed");
    }

    /// No-op unless an attempt is in progress.
    pub fn complete(&mut self) {
        if !matches!(self.phase, Phase::Running | Phase::Paused) {
            return;
        }
        let Some(problem) = self.problem.clone() else {
            return;
        };
        self.clock.pause();
        self.recompute();
        self.phase = Phase::Completed;

        let snapshot = CompletionSnapshot {
            is_logged_in: problem.standing().is_authenticated(),
            problem,
            elapsed_secs: self.clock.elapsed_secs(),
            keystrokes: self.keystrokes,
            speed_ccpm: self.metrics.speed_ccpm,
            completion_percent: self.metrics.completion_percent,
            completed_at: Utc::now(),
        };
        info!(
            problem_id = snapshot.problem.problem_id(),
            elapsed = snapshot.elapsed_secs,
            keystrokes = snapshot.keystrokes,
            ccpm = snapshot.speed_ccpm,
            "attempt completed"
        );
        if let Some(record) = AttemptRecord::from_snapshot(&snapshot) {
            report::dispatch(Arc::clone(&self.reporter), record);
        }
        self.snapshot = Some(snapshot);
    }

    /// Restarts the current problem from its original text.
    pub fn reset(&mut self) {
        if self.closed {
            return;
        }
        let Some(problem) = self.problem.as_ref() else {
            return;
        };
        self.clock.reset();
        self.current_text = self.source.reset_text(problem);
        info!(problem_id = problem.problem_id(), "attempt reset");
        self.begin_attempt();
    }

    /// Discards the current problem and loads another. Calls within the
    /// cooldown of an accepted skip, or while a load is pending, are ignored.
    pub fn skip(&mut self) -> bool {
        if self.closed || self.phase == Phase::Loading {
            return false;
        }
        let now = self.time.now();
        if let Some(last) = self.last_skip
            && now.saturating_duration_since(last) < self.options.skip_cooldown
        {
            debug!("skip ignored during cooldown");
            return false;
        }
        self.last_skip = Some(now);
        info!("skipping problem");
        self.load();
        true
    }

    /// Detaches the session: the clock stops and every later event is
    /// dropped.
    pub fn teardown(&mut self) {
        self.closed = true;
        self.generation += 1;
        self.clock.reset();
        debug!("session torn down");
    }

    fn begin_attempt(&mut self) {
        self.generation += 1;
        self.editor_epoch += 1;
        self.keystrokes = 0;
        self.snapshot = None;
        self.clock.reset();
        self.recompute();
        self.phase = Phase::Running;
        if self.editor_focused {
            self.start_clock();
        } else {
            self.phase = Phase::Paused;
        }
    }

    fn start_clock(&mut self) {
        let token = self.token();
        let dispatch = self.dispatch.clone();
        self.clock.start(move || dispatch.dispatch(SessionEvent::Tick(token)));
    }

    fn recompute(&mut self) {
        if let Some(problem) = &self.problem {
            self.metrics = Metrics::compute(
                &self.current_text,
                problem.original_text(),
                problem.modified_text(),
                self.clock.elapsed_secs(),
            );
        }
    }

    fn check_completion(&mut self) {
        let done = self
            .problem
            .as_ref()
            .is_some_and(|p| is_normalized_equal(&self.current_text, p.modified_text()));
        if done {
            self.complete();
        }
    }
}
