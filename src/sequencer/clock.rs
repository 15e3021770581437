// Transport clock - Tick scheduling from tempo and swing
// Drives step advancement; one clock thread, one tick in flight at a time

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lowest accepted tempo in BPM
pub const MIN_BPM: u32 = 20;
/// Highest accepted tempo in BPM
pub const MAX_BPM: u32 = 300;

/// Straight-time swing value (no swing)
pub const SWING_CENTER: u8 = 50;

/// Granularity of the clock thread's cancellable sleep
const SLEEP_SLICE: Duration = Duration::from_millis(1);

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Shared clock state
/// Thread-safe via atomics: the UI thread reads the playhead and writes
/// tempo/swing without ever touching the engine lock.
#[derive(Debug)]
pub struct ClockShared {
    running: AtomicBool,
    bpm: AtomicU32,
    swing: AtomicU8,
    tick_count: AtomicU64,
    current_step: AtomicU32,
}

impl ClockShared {
    pub fn new(bpm: u32) -> Arc<Self> {
        Arc::new(Self {
            running: AtomicBool::new(false),
            bpm: AtomicU32::new(bpm.clamp(MIN_BPM, MAX_BPM)),
            swing: AtomicU8::new(SWING_CENTER),
            tick_count: AtomicU64::new(0),
            current_step: AtomicU32::new(0),
        })
    }

    pub fn state(&self) -> ClockState {
        if self.running.load(Ordering::Relaxed) {
            ClockState::Running
        } else {
            ClockState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn bpm(&self) -> u32 {
        self.bpm.load(Ordering::Relaxed)
    }

    /// Set the tempo, clamped to 20-300 BPM
    /// Takes effect when the next tick interval is computed.
    pub fn set_bpm(&self, bpm: i32) {
        let clamped = bpm.clamp(MIN_BPM as i32, MAX_BPM as i32) as u32;
        self.bpm.store(clamped, Ordering::Relaxed);
    }

    pub fn swing(&self) -> u8 {
        self.swing.load(Ordering::Relaxed)
    }

    /// Set the swing amount, clamped to 0-100 (50 = straight)
    pub fn set_swing(&self, swing: i32) {
        let clamped = swing.clamp(0, 100) as u8;
        self.swing.store(clamped, Ordering::Relaxed);
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    pub fn current_step(&self) -> u32 {
        self.current_step.load(Ordering::Relaxed)
    }

    pub(crate) fn set_current_step(&self, step: u32) {
        self.current_step.store(step, Ordering::Relaxed);
    }

    pub(crate) fn advance_tick(&self) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset playhead and tick counter to zero
    pub(crate) fn reset_position(&self) {
        self.tick_count.store(0, Ordering::Relaxed);
        self.current_step.store(0, Ordering::Relaxed);
    }
}

/// Nominal tick interval at a given tempo: one sixteenth note
pub fn nominal_interval(bpm: u32) -> Duration {
    Duration::from_secs_f64(60.0 / bpm as f64 / 4.0)
}

/// Interval for one tick under swing
///
/// Consecutive ticks form pairs sharing a two-tick time budget: the even
/// tick of a pair takes `2 * base * swing/100`, the odd tick the rest.
/// Swing redistributes time inside the pair and never changes the
/// total cycle duration. 50 yields straight sixteenths; above 50 gives
/// the classic long-short feel, below 50 short-long.
pub fn tick_interval(bpm: u32, swing: u8, tick: u64) -> Duration {
    let base = 60.0 / bpm as f64 / 4.0;
    let fraction = swing.min(100) as f64 / 100.0;

    let seconds = if tick % 2 == 0 {
        2.0 * base * fraction
    } else {
        2.0 * base * (1.0 - fraction)
    };

    Duration::from_secs_f64(seconds)
}

/// Transport clock
///
/// Owns the clock thread. Each iteration runs exactly one tick callback,
/// then sleeps until a deadline recomputed *from now* with the tempo and
/// swing read at that moment; a tempo change therefore lands on the next
/// boundary without restarting the cycle. Sleeping happens in small
/// slices so `stop` cancels a pending tick within a couple milliseconds.
pub struct TransportClock {
    shared: Arc<ClockShared>,
    handle: Option<JoinHandle<()>>,
}

impl TransportClock {
    pub fn new(shared: Arc<ClockShared>) -> Self {
        Self {
            shared,
            handle: None,
        }
    }

    pub fn shared(&self) -> Arc<ClockShared> {
        Arc::clone(&self.shared)
    }

    /// Start emitting ticks; no-op when already running
    ///
    /// `on_tick` receives the tick index and the interval that tick
    /// spans. It runs on the clock thread, never concurrently with
    /// itself: the next tick is scheduled only after it returns.
    pub fn start<F>(&mut self, mut on_tick: F)
    where
        F: FnMut(u64, Duration) + Send + 'static,
    {
        if self.shared.is_running() {
            return;
        }
        self.reap();

        self.shared.running.store(true, Ordering::Relaxed);
        let shared = Arc::clone(&self.shared);

        self.handle = Some(thread::spawn(move || {
            while shared.is_running() {
                let tick = shared.tick_count();
                let interval = tick_interval(shared.bpm(), shared.swing(), tick);

                let tick_started = Instant::now();
                on_tick(tick, interval);

                let deadline = tick_started + interval;
                loop {
                    if !shared.is_running() {
                        return;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    thread::sleep((deadline - now).min(SLEEP_SLICE));
                }
            }
        }));
    }

    /// Stop the clock and cancel any pending tick
    ///
    /// Blocks until the clock thread has exited, so no tick callback is
    /// in flight once this returns. The playhead is reset by the caller.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        self.reap();
    }

    fn reap(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TransportClock {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        self.reap();
    }
}
