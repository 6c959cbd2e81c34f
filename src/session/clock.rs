use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Where the clock reads "now" from.
pub trait TimeSource: Clone + Send + 'static {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicTime;

impl TimeSource for MonotonicTime {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced time for tests.
#[derive(Clone, Debug)]
pub struct ManualTime {
    now: Arc<Mutex<Instant>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Background thread calling `on_tick` every interval until dropped or until
/// the callback reports its receiver is gone.
struct Ticker {
    alive: Arc<AtomicBool>,
}

impl Ticker {
    fn spawn<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let alive = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&alive);
        thread::spawn(move || {
            loop {
                thread::sleep(interval);
                if !flag.load(Ordering::Acquire) || !on_tick() {
                    return;
                }
            }
        });
        Self { alive }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// Stopwatch for one attempt. Elapsed time is always derived from absolute
/// instants, never summed from ticks.
pub struct SessionClock<T: TimeSource = MonotonicTime> {
    time: T,
    accumulated: Duration,
    resumed_at: Option<Instant>,
    tick_interval: Option<Duration>,
    ticker: Option<Ticker>,
}

impl<T: TimeSource> SessionClock<T> {
    pub fn new(time: T, tick_interval: Option<Duration>) -> Self {
        Self {
            time,
            accumulated: Duration::ZERO,
            resumed_at: None,
            tick_interval,
            ticker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    /// Starts or resumes the clock. `on_tick` runs on the ticker thread and
    /// should only post a message; returning `false` stops the ticker.
    pub fn start<F>(&mut self, on_tick: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        if self.is_running() {
            return;
        }
        self.resumed_at = Some(self.time.now());
        self.ticker = self
            .tick_interval
            .filter(|interval| !interval.is_zero())
            .map(|interval| Ticker::spawn(interval, on_tick));
    }

    pub fn pause(&mut self) {
        self.ticker = None;
        if let Some(resumed_at) = self.resumed_at.take() {
            self.accumulated += self.time.now().saturating_duration_since(resumed_at);
        }
    }

    pub fn reset(&mut self) {
        self.ticker = None;
        self.resumed_at = None;
        self.accumulated = Duration::ZERO;
    }

    pub fn elapsed(&self) -> Duration {
        match self.resumed_at {
            Some(resumed_at) => {
                self.accumulated + self.time.now().saturating_duration_since(resumed_at)
            }
            None => self.accumulated,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}
