//! The poll-and-dispatch task.
//!
//! # Loop
//!
//! ```text
//! ┌─► play_completed()?   ── true ─► dispatch(PlayCompleted)
//! │   record_completed()? ── true ─► dispatch(RecordCompleted)
//! │   select(Timer::after(interval), stop.wait())
//! └───────── timer ──────────┘            └── stop ─► return source
//! ```
//!
//! Both flags are checked on every iteration, play first, with no
//! short-circuit, so both callbacks can fire in the same tick.
//!
//! # Flag contract
//!
//! The poller does not de-duplicate. With a clear-on-read driver each
//! completion is reported once; with a level-triggered driver the callback
//! fires on every poll until the driver lowers the flag. The mode reported
//! by [`SoundStatus::flag_mode`] is logged when the task starts.
//!
//! # Shared state
//!
//! The registry is written by registration calls from other tasks and read
//! by the poll task. Each access is one short critical section; the entry is
//! copied out before the callback runs, so callbacks execute with no lock
//! held and may re-register themselves. Displaced entries are dropped after
//! the critical section, so argument types may query the poller from `Drop`.
//! `A::clone` runs while the registry is borrowed and must not touch the poller.

use core::cell::{Cell, RefCell};

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

use platform::config::SOUND_POLL_INTERVAL_MS;
use platform::SoundStatus;

use crate::callback::{Callback, CallbackError};
use crate::event::EventKind;
use crate::registry::{CallbackRegistry, Outcome};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Poll task configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Sleep between two iterations.
    pub interval: Duration,
}

impl PollerConfig {
    /// 50 ms between polls (20 Hz).
    pub const DEFAULT: Self = Self {
        interval: Duration::from_millis(SOUND_POLL_INTERVAL_MS),
    };

    /// Poll every `ms` milliseconds.
    pub const fn with_interval_ms(ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(ms),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Called for every callback that returns an error, after it is counted.
pub type FailureHook = fn(EventKind, CallbackError);

/// Result of one poll iteration. `None` means the flag read `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Dispatch result for [`EventKind::PlayCompleted`]
    pub play: Option<Outcome>,
    /// Dispatch result for [`EventKind::RecordCompleted`]
    pub record: Option<Outcome>,
}

impl PollReport {
    /// Dispatch result for `kind`, if its flag was up.
    pub fn outcome(&self, kind: EventKind) -> Option<Outcome> {
        match kind {
            EventKind::PlayCompleted => self.play,
            EventKind::RecordCompleted => self.record,
        }
    }

    /// Returns `true` if neither flag was up.
    pub fn is_idle(&self) -> bool {
        self.play.is_none() && self.record.is_none()
    }
}

/// Running counters. All saturate at `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollStats {
    /// Completed poll iterations
    pub polls: u32,
    /// Callbacks that returned `Ok`
    pub delivered: u32,
    /// Flags that were up with no callback registered
    pub unhandled: u32,
    /// Callbacks that returned an error
    pub failures: u32,
}

/// Returned by [`EventPoller::run`] when the poller already has a task.
///
/// Carries the status source back to the caller.
pub struct AlreadyRunning<S>(pub S);

impl<S> AlreadyRunning<S> {
    /// Take back the status source.
    pub fn into_inner(self) -> S {
        self.0
    }
}

impl<S> core::fmt::Debug for AlreadyRunning<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AlreadyRunning(..)")
    }
}

impl<S> core::fmt::Display for AlreadyRunning<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sound event poller is already running")
    }
}

// ---------------------------------------------------------------------------
// EventPoller
// ---------------------------------------------------------------------------

/// Samples the codec completion flags and calls the registered callbacks.
///
/// `A` is the type of the arguments bound at registration. `new` is `const`
/// so the poller can live in a `static` shared by the poll task and the
/// tasks that register callbacks.
pub struct EventPoller<A> {
    config: PollerConfig,
    registry: Mutex<CriticalSectionRawMutex, RefCell<CallbackRegistry<A>>>,
    failure_hook: Mutex<CriticalSectionRawMutex, Cell<Option<FailureHook>>>,
    stats: Mutex<CriticalSectionRawMutex, Cell<PollStats>>,
    running: Mutex<CriticalSectionRawMutex, Cell<bool>>,
    stop: Signal<CriticalSectionRawMutex, ()>,
}

impl<A> EventPoller<A> {
    /// Create a poller with an empty registry. Nothing runs until [`run`](Self::run).
    pub const fn new(config: PollerConfig) -> Self {
        Self {
            config,
            registry: Mutex::new(RefCell::new(CallbackRegistry::new())),
            failure_hook: Mutex::new(Cell::new(None)),
            stats: Mutex::new(Cell::new(PollStats {
                polls: 0,
                delivered: 0,
                unhandled: 0,
                failures: 0,
            })),
            running: Mutex::new(Cell::new(false)),
            stop: Signal::new(),
        }
    }

    /// The configuration this poller was built with.
    pub fn config(&self) -> PollerConfig {
        self.config
    }

    /// Replace the callback for `kind`. `None` disables notification.
    pub fn register(&self, kind: EventKind, callback: Option<Callback<A>>) {
        // Dropped after the critical section ends.
        let _previous = self
            .registry
            .lock(|registry| registry.borrow_mut().register(kind, callback));
    }

    /// Replace the callback for [`EventKind::PlayCompleted`].
    pub fn register_play_completed(&self, callback: Option<Callback<A>>) {
        self.register(EventKind::PlayCompleted, callback);
    }

    /// Replace the callback for [`EventKind::RecordCompleted`].
    pub fn register_record_completed(&self, callback: Option<Callback<A>>) {
        self.register(EventKind::RecordCompleted, callback);
    }

    /// Remove the callback for `kind`.
    pub fn clear(&self, kind: EventKind) {
        // Dropped after the critical section ends.
        let _previous = self
            .registry
            .lock(|registry| registry.borrow_mut().clear(kind));
    }

    /// Returns `true` if a callback is registered for `kind`.
    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.registry
            .lock(|registry| registry.borrow().is_registered(kind))
    }

    /// Install or remove the failure hook.
    pub fn set_failure_hook(&self, hook: Option<FailureHook>) {
        self.failure_hook.lock(|h| h.set(hook));
    }

    /// Snapshot of the running counters.
    pub fn stats(&self) -> PollStats {
        self.stats.lock(Cell::get)
    }

    /// Returns `true` while a [`run`](Self::run) future is alive.
    pub fn is_running(&self) -> bool {
        self.running.lock(Cell::get)
    }

    /// Ask the running task to return after its current iteration.
    ///
    /// The task wakes immediately if it is sleeping. A stop requested while
    /// no task is running is discarded by the next [`run`](Self::run).
    pub fn stop(&self) {
        self.stop.signal(());
    }

    fn update_stats(&self, f: impl FnOnce(&mut PollStats)) {
        self.stats.lock(|cell| {
            let mut stats = cell.get();
            f(&mut stats);
            cell.set(stats);
        });
    }

    fn note(&self, kind: EventKind, outcome: Outcome) {
        match outcome {
            Outcome::Delivered => {
                self.update_stats(|s| s.delivered = s.delivered.saturating_add(1));
                #[cfg(feature = "defmt")]
                defmt::debug!("sound event {=str} delivered", kind.name());
                #[cfg(feature = "tracing")]
                tracing::debug!(kind = kind.name(), "sound event delivered");
            }
            Outcome::NoCallback => {
                self.update_stats(|s| s.unhandled = s.unhandled.saturating_add(1));
                #[cfg(feature = "defmt")]
                defmt::trace!("sound event {=str} has no callback", kind.name());
                #[cfg(feature = "tracing")]
                tracing::trace!(kind = kind.name(), "sound event has no callback");
            }
            Outcome::Failed(error) => {
                self.update_stats(|s| s.failures = s.failures.saturating_add(1));
                #[cfg(feature = "defmt")]
                defmt::warn!("sound event {=str} callback failed: {}", kind.name(), error);
                #[cfg(feature = "tracing")]
                tracing::warn!(kind = kind.name(), %error, "sound event callback failed");
                if let Some(hook) = self.failure_hook.lock(Cell::get) {
                    hook(kind, error);
                }
            }
        }
    }
}

impl<A: Clone> EventPoller<A> {
    /// Call the callback registered for `kind`, if any.
    ///
    /// A callback error is counted, logged and passed to the failure hook;
    /// it never propagates to the caller.
    ///
    /// The entry is cloned while the registry is borrowed, so `A::clone`
    /// must not call back into this poller.
    pub fn invoke_if_present(&self, kind: EventKind) -> Outcome {
        let entry = self
            .registry
            .lock(|registry| registry.borrow().entry(kind).cloned());
        let outcome = match entry {
            Some(entry) => Outcome::of(entry.invoke()),
            None => Outcome::NoCallback,
        };
        self.note(kind, outcome);
        outcome
    }

    /// One iteration: query play, dispatch, query record, dispatch. No sleep.
    pub fn poll_once<S: SoundStatus>(&self, source: &mut S) -> PollReport {
        let play = source
            .play_completed()
            .then(|| self.invoke_if_present(EventKind::PlayCompleted));
        let record = source
            .record_completed()
            .then(|| self.invoke_if_present(EventKind::RecordCompleted));
        self.update_stats(|s| s.polls = s.polls.saturating_add(1));
        PollReport { play, record }
    }

    /// The task body: poll, sleep for the configured interval, repeat.
    ///
    /// Owns `source` until [`stop`](Self::stop) is called, then returns it.
    /// Only one `run` may be active per poller.
    ///
    /// # Errors
    ///
    /// [`AlreadyRunning`] if another `run` future for this poller is alive.
    pub async fn run<S: SoundStatus>(&self, mut source: S) -> Result<S, AlreadyRunning<S>> {
        // Claim the task slot and discard stale stops in one critical section,
        // so a stop sent after `is_running()` turns true is never reset.
        let claimed = self.running.lock(|running| {
            if running.replace(true) {
                return false;
            }
            self.stop.reset();
            true
        });
        if !claimed {
            return Err(AlreadyRunning(source));
        }
        let _running = RunningGuard(&self.running);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "sound event poller {=str} started: every {=u64} ms, {=str} flags",
            platform::config::APP_VERSION,
            self.config.interval.as_millis(),
            source.flag_mode().name()
        );
        #[cfg(feature = "tracing")]
        tracing::info!(
            version = platform::config::APP_VERSION,
            interval_ms = self.config.interval.as_millis(),
            flag_mode = source.flag_mode().name(),
            "sound event poller started"
        );

        loop {
            self.poll_once(&mut source);
            if let Either::Second(()) =
                select(Timer::after(self.config.interval), self.stop.wait()).await
            {
                break;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("sound event poller stopped");
        #[cfg(feature = "tracing")]
        tracing::info!("sound event poller stopped");

        Ok(source)
    }
}

impl<A> Default for EventPoller<A> {
    fn default() -> Self {
        Self::new(PollerConfig::DEFAULT)
    }
}

/// Clears the running flag when the `run` future finishes or is dropped.
struct RunningGuard<'a>(&'a Mutex<CriticalSectionRawMutex, Cell<bool>>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.lock(|running| running.set(false));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CallbackResult;
    use platform::mocks::MockSound;
    use platform::FlagMode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn ok() -> CallbackResult {
        Ok(())
    }

    fn fail() -> CallbackResult {
        Err(CallbackError::Code(7))
    }

    #[test]
    fn test_default_config_polls_at_20_hz() {
        assert_eq!(PollerConfig::default().interval, Duration::from_millis(50));
        assert_eq!(PollerConfig::with_interval_ms(5).interval, Duration::from_millis(5));
    }

    #[test]
    fn test_new_poller_is_idle_and_empty() {
        let poller: EventPoller<()> = EventPoller::default();
        assert!(!poller.is_running());
        assert_eq!(poller.stats(), PollStats::default());
        for kind in EventKind::ALL {
            assert!(!poller.is_registered(kind));
        }
    }

    #[test]
    fn test_low_flags_dispatch_nothing() {
        let poller: EventPoller<()> = EventPoller::default();
        poller.register_play_completed(Some(Callback::Plain(ok)));
        let mut sound = MockSound::new();

        let report = poller.poll_once(&mut sound);

        assert!(report.is_idle());
        assert_eq!(poller.stats().polls, 1);
        assert_eq!(poller.stats().delivered, 0);
    }

    #[test]
    fn test_both_flags_checked_every_iteration() {
        let poller: EventPoller<()> = EventPoller::default();
        let mut sound = MockSound::new();
        sound.finish_playback();

        let report = poller.poll_once(&mut sound);

        assert_eq!(report.play, Some(Outcome::NoCallback));
        assert_eq!(report.record, None);
        assert_eq!(sound.play_reads(), 1);
        assert_eq!(sound.record_reads(), 1);
        assert_eq!(poller.stats().unhandled, 1);
    }

    #[test]
    fn test_failing_callback_does_not_stop_polling() {
        static HOOK_CALLS: AtomicU32 = AtomicU32::new(0);
        fn hook(kind: EventKind, error: CallbackError) {
            assert_eq!(kind, EventKind::RecordCompleted);
            assert_eq!(error, CallbackError::Code(7));
            HOOK_CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let poller: EventPoller<()> = EventPoller::default();
        poller.register_record_completed(Some(Callback::Plain(fail)));
        poller.set_failure_hook(Some(hook));
        let mut sound = MockSound::new();
        sound.script_record(&[true, true]).unwrap();

        let first = poller.poll_once(&mut sound);
        let second = poller.poll_once(&mut sound);

        assert_eq!(first.record, Some(Outcome::Failed(CallbackError::Code(7))));
        assert_eq!(second.outcome(EventKind::RecordCompleted), first.record);
        assert_eq!(HOOK_CALLS.load(Ordering::SeqCst), 2);
        assert_eq!(poller.stats().failures, 2);
        assert_eq!(poller.stats().polls, 2);
    }

    #[test]
    fn test_level_flag_fires_every_poll() {
        let poller: EventPoller<()> = EventPoller::default();
        poller.register_play_completed(Some(Callback::Plain(ok)));
        let mut sound = MockSound::with_mode(FlagMode::Level);
        sound.finish_playback();

        for _ in 0..3 {
            assert_eq!(poller.poll_once(&mut sound).play, Some(Outcome::Delivered));
        }
        sound.clear_play();
        assert!(poller.poll_once(&mut sound).is_idle());
        assert_eq!(poller.stats().delivered, 3);
    }

    #[test]
    fn test_callback_may_reregister_itself() {
        static POLLER: EventPoller<u32> = EventPoller::new(PollerConfig::DEFAULT);
        static SEEN: AtomicU32 = AtomicU32::new(0);
        fn once(generation: &u32) -> CallbackResult {
            SEEN.fetch_add(*generation, Ordering::SeqCst);
            POLLER.register_play_completed(None);
            Ok(())
        }

        POLLER.register_play_completed(Some(Callback::with_args(once, 5)));
        let mut sound = MockSound::new();
        sound.script_play(&[true, true]).unwrap();

        assert_eq!(POLLER.poll_once(&mut sound).play, Some(Outcome::Delivered));
        assert_eq!(POLLER.poll_once(&mut sound).play, Some(Outcome::NoCallback));
        assert_eq!(SEEN.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_clear_removes_callback() {
        let poller: EventPoller<()> = EventPoller::default();
        poller.register_record_completed(Some(Callback::Plain(ok)));
        poller.clear(EventKind::RecordCompleted);
        assert!(!poller.is_registered(EventKind::RecordCompleted));
        assert_eq!(
            poller.invoke_if_present(EventKind::RecordCompleted),
            Outcome::NoCallback
        );
    }

    #[test]
    fn test_displaced_args_drop_outside_the_lock() {
        static DROP_POLLER: EventPoller<Tracked> = EventPoller::new(PollerConfig::DEFAULT);
        static REGISTERED_AT_DROP: std::sync::Mutex<Vec<(u8, bool)>> =
            std::sync::Mutex::new(Vec::new());

        #[derive(Clone)]
        struct Tracked(u8);

        impl Drop for Tracked {
            fn drop(&mut self) {
                let registered = DROP_POLLER.is_registered(EventKind::PlayCompleted);
                REGISTERED_AT_DROP
                    .lock()
                    .unwrap()
                    .push((self.0, registered));
            }
        }

        fn noted(_: &Tracked) -> CallbackResult {
            Ok(())
        }

        DROP_POLLER.register_play_completed(Some(Callback::with_args(noted, Tracked(1))));
        DROP_POLLER.register_play_completed(Some(Callback::with_args(noted, Tracked(2))));
        DROP_POLLER.register_play_completed(None);
        DROP_POLLER.register_play_completed(Some(Callback::with_args(noted, Tracked(3))));
        DROP_POLLER.clear(EventKind::PlayCompleted);

        assert_eq!(
            *REGISTERED_AT_DROP.lock().unwrap(),
            vec![(1, true), (2, false), (3, false)]
        );
    }
}
