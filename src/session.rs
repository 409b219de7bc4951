//! Session orchestration.
//!
//! [`Session`] is the host-side owner of everything that changes while the
//! user types: the typing state, the phase, the clock and the store. It
//! feeds the pure reducer and sampler with fresh inputs on every call.

use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::reducer::{reduce, Keystroke, TypingState};
use crate::sampler::{self, StatsSnapshot};
use crate::store::Store;
use crate::target::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Complete,
}

/// Session time, advanced by the host. With a budget it behaves as a
/// countdown and elapsed time is `budget - time_left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionClock {
    budget: Option<Duration>,
    elapsed: Duration,
}

impl SessionClock {
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            budget,
            elapsed: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
        if let Some(budget) = self.budget {
            self.elapsed = self.elapsed.min(budget);
        }
    }

    pub fn time_left(&self) -> Option<Duration> {
        self.budget.map(|b| b.saturating_sub(self.elapsed))
    }

    pub fn elapsed(&self) -> Duration {
        match (self.budget, self.time_left()) {
            (Some(budget), Some(left)) => budget - left,
            _ => self.elapsed,
        }
    }

    pub fn seconds_elapsed(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    pub fn is_expired(&self) -> bool {
        self.time_left() == Some(Duration::ZERO)
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// Lets a sample through once `interval` of session time has passed since
/// the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleThrottle {
    interval: Duration,
    last_fired: Duration,
}

impl SampleThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: Duration::ZERO,
        }
    }

    pub fn ready(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_fired) >= self.interval {
            self.last_fired = now;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.last_fired = Duration::ZERO;
    }
}

#[derive(Debug)]
pub struct Session<S: Store> {
    target: Target,
    state: TypingState,
    phase: SessionPhase,
    clock: SessionClock,
    throttle: SampleThrottle,
    latest: Option<StatsSnapshot>,
    store: S,
}

impl<S: Store> Session<S> {
    pub fn new(
        target: Target,
        store: S,
        budget: Option<Duration>,
        sample_interval: Duration,
    ) -> Self {
        Self {
            target,
            state: TypingState::new(),
            phase: SessionPhase::NotStarted,
            clock: SessionClock::new(budget),
            throttle: SampleThrottle::new(sample_interval),
            latest: None,
            store,
        }
    }

    pub fn from_config(target: Target, store: S, cfg: &Config) -> Self {
        Self::new(
            target,
            store,
            cfg.number_of_secs.map(Duration::from_secs),
            Duration::from_millis(cfg.sample_interval_ms),
        )
    }

    pub fn handle_keystroke(&mut self, key: Keystroke) {
        if self.phase == SessionPhase::Complete {
            return;
        }
        let max_line_length = self.store.settings().max_line_length;
        let next = reduce(&self.state, self.target.chars(), key, max_line_length);
        if next == self.state {
            return;
        }
        if self.phase == SessionPhase::NotStarted {
            self.phase = SessionPhase::InProgress;
            info!(target_len = self.target.len(), "session started");
        }

        let buffer_changed = next.buffer != self.state.buffer;
        self.state = next;

        if buffer_changed {
            self.check_completion();
        }
    }

    /// Advance session time by `dt`. Samples when the throttle allows and
    /// completes the session when the time budget runs out.
    pub fn on_tick(&mut self, dt: Duration) {
        if self.phase != SessionPhase::InProgress {
            return;
        }
        self.clock.advance(dt);

        if self.clock.is_expired() {
            info!("time budget exhausted");
            self.finish();
        } else if self.throttle.ready(self.clock.elapsed()) {
            self.sample_now();
        }
    }

    /// Run the sampler against the current state and push the result to
    /// the store. Returns `None` (keeping the previous snapshot) when no
    /// time has elapsed.
    pub fn sample_now(&mut self) -> Option<StatsSnapshot> {
        let elapsed = self.clock.seconds_elapsed();
        let snapshot = sampler::sample(
            self.target.chars(),
            &self.state.buffer,
            elapsed,
            self.state.errors,
        )?;

        self.store.append_sample(
            elapsed,
            snapshot.wpm,
            snapshot.raw_wpm,
            self.state.errors,
        );
        self.store.set_accuracy(snapshot.accuracy);
        self.store.set_character_counts(snapshot.counts);
        debug!(
            elapsed,
            wpm = snapshot.wpm,
            accuracy = snapshot.accuracy,
            errors = self.state.errors,
            "sampled"
        );

        self.latest = Some(snapshot);
        Some(snapshot)
    }

    /// Completes the session if the buffer matches the target exactly.
    pub fn check_completion(&mut self) -> bool {
        if self.phase == SessionPhase::InProgress
            && sampler::is_complete(self.target.chars(), &self.state.buffer)
        {
            self.finish();
        }
        self.phase == SessionPhase::Complete
    }

    fn finish(&mut self) {
        self.sample_now();
        self.phase = SessionPhase::Complete;
        let elapsed = self.clock.seconds_elapsed();
        self.store.set_complete(elapsed);
        info!(
            elapsed,
            errors = self.state.errors,
            wpm = ?self.latest.map(|s| s.wpm),
            "session complete"
        );
    }

    /// Start over on the same target.
    pub fn restart(&mut self) {
        self.state = TypingState::new();
        self.phase = SessionPhase::NotStarted;
        self.clock.reset();
        self.throttle.reset();
        self.latest = None;
        self.store.clear();
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &TypingState {
        &self.state
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn latest(&self) -> Option<&StatsSnapshot> {
        self.latest.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn time_left(&self) -> Option<Duration> {
        self.clock.time_left()
    }

    pub fn seconds_elapsed(&self) -> f64 {
        self.clock.seconds_elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Settings};

    const TICK: Duration = Duration::from_millis(100);

    fn session(target: &str, budget: Option<u64>) -> Session<MemoryStore> {
        Session::new(
            Target::new(target).unwrap(),
            MemoryStore::default(),
            budget.map(Duration::from_secs),
            Duration::from_secs(1),
        )
    }

    fn type_str(s: &mut Session<MemoryStore>, input: &str) {
        for c in input.chars() {
            s.handle_keystroke(Keystroke::Char(c));
        }
    }

    #[test]
    fn clock_counts_down_against_budget() {
        let mut clock = SessionClock::new(Some(Duration::from_secs(2)));
        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.time_left(), Some(Duration::from_millis(1500)));
        assert_eq!(clock.seconds_elapsed(), 0.5);
        assert!(!clock.is_expired());

        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.time_left(), Some(Duration::ZERO));
        assert_eq!(clock.seconds_elapsed(), 2.0);
        assert!(clock.is_expired());
    }

    #[test]
    fn untimed_clock_never_expires() {
        let mut clock = SessionClock::new(None);
        clock.advance(Duration::from_secs(3600));
        assert_eq!(clock.time_left(), None);
        assert!(!clock.is_expired());
        assert_eq!(clock.seconds_elapsed(), 3600.0);
    }

    #[test]
    fn throttle_fires_once_per_interval() {
        let mut throttle = SampleThrottle::new(Duration::from_secs(1));
        let fired = (1..=25)
            .filter(|i| throttle.ready(TICK * *i))
            .count();
        assert_eq!(fired, 2);
    }

    #[test]
    fn first_keystroke_starts_session() {
        let mut s = session("abc", None);
        assert_eq!(s.phase(), SessionPhase::NotStarted);

        s.on_tick(TICK);
        assert_eq!(s.seconds_elapsed(), 0.0, "clock idles before first key");

        s.handle_keystroke(Keystroke::Char('a'));
        assert_eq!(s.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn keystroke_without_effect_does_not_start_session() {
        let mut s = session("abc", Some(5));
        for key in [Keystroke::Backspace, Keystroke::Left, Keystroke::Right] {
            s.handle_keystroke(key);
        }
        assert_eq!(s.phase(), SessionPhase::NotStarted);

        s.on_tick(TICK);
        assert_eq!(s.time_left(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn exact_match_completes() {
        let mut s = session("abc", None);
        type_str(&mut s, "ab");
        s.on_tick(Duration::from_secs(3));
        type_str(&mut s, "c");

        assert_eq!(s.phase(), SessionPhase::Complete);
        assert_eq!(s.store().completed_after(), Some(3.0));
        let snap = s.latest().unwrap();
        assert_eq!(snap.accuracy, 100.0);
        assert_eq!(snap.counts.correct, 3);
    }

    #[test]
    fn mismatch_never_completes() {
        let mut s = session("abc", None);
        type_str(&mut s, "abd");
        for _ in 0..100 {
            s.on_tick(TICK);
        }
        assert_eq!(s.phase(), SessionPhase::InProgress);
        assert_eq!(s.store().completed_after(), None);

        s.handle_keystroke(Keystroke::Backspace);
        type_str(&mut s, "c");
        assert_eq!(s.phase(), SessionPhase::Complete);
        assert_eq!(s.state().errors, 1);
    }

    #[test]
    fn completion_before_any_elapsed_time_skips_sample() {
        let mut s = session("hi", None);
        type_str(&mut s, "hi");
        assert_eq!(s.phase(), SessionPhase::Complete);
        assert!(s.latest().is_none());
        assert!(s.store().samples().is_empty());
        assert_eq!(s.store().completed_after(), Some(0.0));
    }

    #[test]
    fn samples_once_per_second_of_ticks() {
        let mut s = session("hello world", None);
        type_str(&mut s, "hello");
        for _ in 0..9 {
            s.on_tick(TICK);
        }
        assert!(s.store().samples().is_empty());

        s.on_tick(TICK);
        assert_eq!(s.store().samples().len(), 1);
        // 5 chars in 1s = 60 wpm
        assert_eq!(s.store().samples()[0].wpm, 60);
        assert_eq!(s.store().samples()[0].t, 1.0);

        for _ in 0..10 {
            s.on_tick(TICK);
        }
        assert_eq!(s.store().samples().len(), 2);
    }

    #[test]
    fn time_budget_completes_with_final_sample() {
        let mut s = session("a long snippet", Some(2));
        type_str(&mut s, "a lo");
        for _ in 0..30 {
            s.on_tick(TICK);
        }
        assert_eq!(s.phase(), SessionPhase::Complete);
        assert_eq!(s.time_left(), Some(Duration::ZERO));
        assert_eq!(s.store().completed_after(), Some(2.0));
        // one throttled sample at 1s plus the final one at 2s
        assert_eq!(s.store().samples().len(), 2);
        assert_eq!(s.latest().unwrap().counts.missed, 10);
    }

    #[test]
    fn keystrokes_ignored_after_completion() {
        let mut s = session("ab", None);
        s.handle_keystroke(Keystroke::Char('a'));
        s.on_tick(Duration::from_secs(1));
        s.handle_keystroke(Keystroke::Char('b'));
        assert_eq!(s.phase(), SessionPhase::Complete);

        s.handle_keystroke(Keystroke::Char('x'));
        s.handle_keystroke(Keystroke::Backspace);
        assert_eq!(s.state().text(), "ab");
        assert_eq!(s.state().errors, 0);
    }

    #[test]
    fn errors_feed_accuracy() {
        let mut s = session("hello", None);
        type_str(&mut s, "helL");
        s.on_tick(Duration::from_secs(6));
        type_str(&mut s, "o");
        s.sample_now();
        let snap = s.latest().unwrap();
        assert_eq!(snap.counts.correct, 4);
        assert!((snap.accuracy - 66.67).abs() < 0.01);
        assert!((s.store().accuracy() - 66.67).abs() < 0.01);
    }

    #[test]
    fn wrap_uses_store_settings() {
        let store = MemoryStore::new(Settings {
            show_errors: true,
            max_line_length: 5,
        });
        let mut s = Session::new(
            Target::new("abcdefgh").unwrap(),
            store,
            None,
            Duration::from_secs(1),
        );
        type_str(&mut s, "abcde");
        assert_eq!(s.state().text(), "abcd\ne");
        assert_eq!(s.state().cursor, 6);
    }

    #[test]
    fn restart_clears_everything() {
        let mut s = session("abc", Some(10));
        type_str(&mut s, "ax");
        s.on_tick(Duration::from_secs(2));
        assert!(!s.store().samples().is_empty());

        s.restart();

        assert_eq!(s.phase(), SessionPhase::NotStarted);
        assert!(s.state().is_empty());
        assert_eq!(s.state().errors, 0);
        assert_eq!(s.time_left(), Some(Duration::from_secs(10)));
        assert!(s.latest().is_none());
        assert!(s.store().samples().is_empty());
        assert_eq!(s.target().as_str(), "abc");
    }

    #[test]
    fn from_config_uses_budget_and_interval() {
        let cfg = Config {
            number_of_secs: Some(30),
            ..Config::default()
        };
        let s = Session::from_config(Target::new("x").unwrap(), MemoryStore::default(), &cfg);
        assert_eq!(s.time_left(), Some(Duration::from_secs(30)));
        assert_eq!(SessionPhase::InProgress.to_string(), "InProgress");
    }
}
