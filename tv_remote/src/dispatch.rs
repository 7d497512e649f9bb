//! Cooldown-gated command dispatch.
//!
//! A [`Dispatcher`] owns the time of its last executed command.  Each call
//! to [`Dispatcher::dispatch`]:
//!
//! 1. suppresses the gesture if the previous command is less than one
//!    cooldown old,
//! 2. suppresses it if the gesture has no mapped command,
//! 3. presses the key `repeats` times with a short gap between presses,
//! 4. records `now` as the last command time.
//!
//! Only step 4 mutates state, and only after every press succeeded.  A
//! failed injection leaves the gate open so the next frame can retry.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use hand_pose::Gesture;
use tracing::{debug, info, warn};

use crate::command::{Action, CommandMapping};
use crate::inject::{InjectError, KeyInjector};

/// Seconds since some fixed origin (usually session start).
pub type Timestamp = Duration;

pub const COMMAND_COOLDOWN: Duration = Duration::from_secs(1);
pub const REPEAT_DELAY:     Duration = Duration::from_millis(100);

/// Timing knobs; the defaults are the production values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchTiming {
    /// Minimum gap between two executed commands.
    pub cooldown:     Duration,
    /// Gap between key presses of one repeated command.
    pub repeat_delay: Duration,
}

impl Default for DispatchTiming {
    fn default() -> Self {
        DispatchTiming {
            cooldown:     COMMAND_COOLDOWN,
            repeat_delay: REPEAT_DELAY,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DispatchResult
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuppressReason {
    /// Previous command is younger than the cooldown.
    Cooldown,
    /// No gesture, or the gesture has no command.
    Unmapped,
}

impl SuppressReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SuppressReason::Cooldown => "cooldown",
            SuppressReason::Unmapped => "unmapped",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchResult {
    Executed { action: Action, repeats: u32 },
    Suppressed(SuppressReason),
    /// The OS refused a key press.  Not fatal; the gate stays open.
    Failed(InjectError),
}

impl DispatchResult {
    pub fn is_executed(&self) -> bool {
        matches!(self, DispatchResult::Executed { .. })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Dispatcher
// ════════════════════════════════════════════════════════════════════════════

pub struct Dispatcher<I: KeyInjector> {
    mapping:      CommandMapping,
    injector:     I,
    timing:       DispatchTiming,
    last_command: Option<Timestamp>,
}

impl<I: KeyInjector> Dispatcher<I> {
    pub fn new(injector: I) -> Self {
        Self::with_config(injector, CommandMapping::standard(), DispatchTiming::default())
    }

    pub fn with_config(injector: I, mapping: CommandMapping, timing: DispatchTiming) -> Self {
        Dispatcher {
            mapping,
            injector,
            timing,
            last_command: None,
        }
    }

    /// Time of the last executed command, if any.
    pub fn last_command(&self) -> Option<Timestamp> { self.last_command }

    pub fn mapping(&self)  -> &CommandMapping { &self.mapping }
    pub fn injector(&self) -> &I              { &self.injector }

    fn cooling_down(&self, now: Timestamp) -> bool {
        match self.last_command {
            Some(last) => now.saturating_sub(last) < self.timing.cooldown,
            None => false,
        }
    }

    pub fn dispatch(&mut self, gesture: Option<Gesture>, now: Timestamp) -> DispatchResult {
        if self.cooling_down(now) {
            debug!(?gesture, "suppressed: cooldown");
            return DispatchResult::Suppressed(SuppressReason::Cooldown);
        }

        let Some(command) = gesture.and_then(|g| self.mapping.get(g)) else {
            return DispatchResult::Suppressed(SuppressReason::Unmapped);
        };

        for i in 0..command.repeats {
            if i > 0 && !self.timing.repeat_delay.is_zero() {
                thread::sleep(self.timing.repeat_delay);
            }
            if let Err(e) = self.injector.press(command.action) {
                warn!(
                    backend = self.injector.name(),
                    "{e} (press {} of {})", i + 1, command.repeats
                );
                return DispatchResult::Failed(e);
            }
        }

        self.last_command = Some(now);
        info!(
            "{} → {} ×{}",
            gesture.map_or("none", |g| g.as_str()),
            command.action,
            command.repeats
        );
        DispatchResult::Executed { action: command.action, repeats: command.repeats }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SharedDispatcher - one gate for several call sites
// ════════════════════════════════════════════════════════════════════════════

/// A dispatcher shared between call sites that must respect a single
/// cooldown.  The whole check-press-update sequence runs under one lock.
pub struct SharedDispatcher<I: KeyInjector> {
    inner: Arc<Mutex<Dispatcher<I>>>,
}

impl<I: KeyInjector> Clone for SharedDispatcher<I> {
    fn clone(&self) -> Self {
        SharedDispatcher { inner: Arc::clone(&self.inner) }
    }
}

impl<I: KeyInjector> SharedDispatcher<I> {
    pub fn new(dispatcher: Dispatcher<I>) -> Self {
        SharedDispatcher { inner: Arc::new(Mutex::new(dispatcher)) }
    }

    pub fn dispatch(&self, gesture: Option<Gesture>, now: Timestamp) -> DispatchResult {
        // A panic elsewhere cannot leave the timestamp half-written.
        let mut d = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        d.dispatch(gesture, now)
    }

    pub fn last_command(&self) -> Option<Timestamp> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).last_command()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every press; fails the presses whose 1-based number is in `fail_on`.
    #[derive(Default)]
    struct Recorder {
        pressed: Vec<Action>,
        attempts: usize,
        fail_on: Vec<usize>,
    }

    impl KeyInjector for Recorder {
        fn press(&mut self, action: Action) -> Result<(), InjectError> {
            self.attempts += 1;
            if self.fail_on.contains(&self.attempts) {
                return Err(InjectError::Press { action, message: "no display".into() });
            }
            self.pressed.push(action);
            Ok(())
        }
        fn name(&self) -> &'static str { "recorder" }
    }

    fn fast() -> DispatchTiming {
        DispatchTiming { repeat_delay: Duration::ZERO, ..DispatchTiming::default() }
    }

    fn dispatcher(rec: Recorder) -> Dispatcher<Recorder> {
        Dispatcher::with_config(rec, CommandMapping::standard(), fast())
    }

    fn secs(s: f64) -> Timestamp { Duration::from_secs_f64(s) }

    #[test]
    fn cooldown_scenario() {
        let mut d = dispatcher(Recorder::default());
        assert_eq!(
            d.dispatch(Some(Gesture::ThumbsUp), secs(0.0)),
            DispatchResult::Executed { action: Action::VolumeUp, repeats: 1 }
        );
        assert_eq!(
            d.dispatch(Some(Gesture::ThumbsDown), secs(0.5)),
            DispatchResult::Suppressed(SuppressReason::Cooldown)
        );
        assert_eq!(
            d.dispatch(Some(Gesture::Stop), secs(1.1)),
            DispatchResult::Executed { action: Action::PlayPause, repeats: 1 }
        );
        assert_eq!(d.injector().pressed, vec![Action::VolumeUp, Action::PlayPause]);
    }

    #[test]
    fn swipe_presses_five_times() {
        let mut d = dispatcher(Recorder::default());
        let r = d.dispatch(Some(Gesture::LeftSwipe), secs(3.0));
        assert_eq!(r, DispatchResult::Executed { action: Action::SeekBack, repeats: 5 });
        assert_eq!(d.injector().pressed, vec![Action::SeekBack; 5]);
        assert_eq!(d.last_command(), Some(secs(3.0)));
    }

    #[test]
    fn no_gesture_is_unmapped_and_keeps_gate() {
        let mut d = dispatcher(Recorder::default());
        assert_eq!(d.dispatch(None, secs(0.0)), DispatchResult::Suppressed(SuppressReason::Unmapped));
        assert_eq!(d.last_command(), None);
        assert!(d.dispatch(Some(Gesture::ThumbsUp), secs(0.1)).is_executed());
    }

    #[test]
    fn unmapped_gesture_is_suppressed() {
        let rec = Recorder::default();
        let mapping = CommandMapping::standard().without(Gesture::Stop);
        let mut d = Dispatcher::with_config(rec, mapping, fast());
        assert_eq!(
            d.dispatch(Some(Gesture::Stop), secs(0.0)),
            DispatchResult::Suppressed(SuppressReason::Unmapped)
        );
        assert!(d.injector().pressed.is_empty());
    }

    #[test]
    fn cooldown_is_checked_before_mapping() {
        let mut d = dispatcher(Recorder::default());
        d.dispatch(Some(Gesture::ThumbsUp), secs(0.0));
        assert_eq!(d.dispatch(None, secs(0.2)), DispatchResult::Suppressed(SuppressReason::Cooldown));
    }

    #[test]
    fn suppressed_call_does_not_move_the_gate() {
        let mut d = dispatcher(Recorder::default());
        d.dispatch(Some(Gesture::ThumbsUp), secs(0.0));
        d.dispatch(Some(Gesture::ThumbsUp), secs(0.9));
        assert_eq!(d.last_command(), Some(secs(0.0)));
        assert!(d.dispatch(Some(Gesture::ThumbsUp), secs(1.0)).is_executed());
    }

    #[test]
    fn failed_injection_leaves_gate_open() {
        let rec = Recorder { fail_on: vec![1], ..Recorder::default() };
        let mut d = dispatcher(rec);
        let r = d.dispatch(Some(Gesture::ThumbsUp), secs(5.0));
        assert!(matches!(r, DispatchResult::Failed(InjectError::Press { action: Action::VolumeUp, .. })));
        assert_eq!(d.last_command(), None);

        // Retry straight away succeeds.
        assert!(d.dispatch(Some(Gesture::ThumbsUp), secs(5.0)).is_executed());
        assert_eq!(d.injector().pressed, vec![Action::VolumeUp]);
    }

    #[test]
    fn failure_mid_burst_stops_the_burst() {
        let rec = Recorder { fail_on: vec![3], ..Recorder::default() };
        let mut d = dispatcher(rec);
        let r = d.dispatch(Some(Gesture::RightSwipe), secs(0.0));
        assert!(matches!(r, DispatchResult::Failed(_)));
        assert_eq!(d.injector().pressed.len(), 2);
        assert_eq!(d.injector().attempts, 3);
        assert_eq!(d.last_command(), None);
    }

    #[test]
    fn executed_commands_are_a_cooldown_apart() {
        let mut d = dispatcher(Recorder::default());
        let mut executed = Vec::new();
        for step in 0..200u32 {
            let now = Duration::from_millis(u64::from(step) * 137);
            let gesture = Gesture::ALL[(step as usize * 7) % Gesture::ALL.len()];
            if d.dispatch(Some(gesture), now).is_executed() {
                executed.push(now);
            }
        }
        assert!(executed.len() > 10);
        for pair in executed.windows(2) {
            assert!(pair[1] - pair[0] >= COMMAND_COOLDOWN, "{:?}", pair);
        }
    }

    #[test]
    fn repeat_delay_spaces_presses() {
        let timing = DispatchTiming { repeat_delay: Duration::from_millis(5), ..DispatchTiming::default() };
        let mut d = Dispatcher::with_config(Recorder::default(), CommandMapping::standard(), timing);
        let start = std::time::Instant::now();
        d.dispatch(Some(Gesture::RightSwipe), secs(0.0));
        // Four gaps between five presses.
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn shared_dispatcher_serializes_threads() {
        let shared = SharedDispatcher::new(dispatcher(Recorder::default()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = shared.clone();
                thread::spawn(move || s.dispatch(Some(Gesture::ThumbsUp), secs(2.0)))
            })
            .collect();
        let executed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(DispatchResult::is_executed)
            .count();
        assert_eq!(executed, 1);
        assert_eq!(shared.last_command(), Some(secs(2.0)));
    }
}
