//! In-memory login throttling.
//!
//! Two independent limits guard `/auth/login`:
//! - every client address may make a bounded number of attempts per window,
//!   and is blocked for a while once it goes over;
//! - a username that collects too many failures is locked, and the address
//!   that made the last failure is blocked as well.
//!
//! State lives in process memory and is lost on restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::{
    LOGIN_ADDRESS_BLOCK_SECONDS, LOGIN_ATTEMPTS_PER_ADDRESS, LOGIN_ATTEMPT_WINDOW_SECONDS,
    LOGIN_FAILURE_WINDOW_SECONDS, LOGIN_MAX_FAILURES, LOGIN_USER_LOCK_SECONDS,
};
use crate::errors::AppError;

/// Limits applied by [`LoginThrottle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub attempts_per_address: usize,
    pub attempt_window: Duration,
    pub max_failures: usize,
    pub failure_window: Duration,
    pub user_lock: Duration,
    pub address_block: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            attempts_per_address: LOGIN_ATTEMPTS_PER_ADDRESS,
            attempt_window: Duration::from_secs(LOGIN_ATTEMPT_WINDOW_SECONDS),
            max_failures: LOGIN_MAX_FAILURES,
            failure_window: Duration::from_secs(LOGIN_FAILURE_WINDOW_SECONDS),
            user_lock: Duration::from_secs(LOGIN_USER_LOCK_SECONDS),
            address_block: Duration::from_secs(LOGIN_ADDRESS_BLOCK_SECONDS),
        }
    }
}

/// A refused attempt and how long until the block lifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocked {
    pub retry_after: Duration,
}

impl Blocked {
    /// Whole seconds for a `Retry-After` header, never zero.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        let rounded = if self.retry_after.subsec_nanos() > 0 { secs + 1 } else { secs };
        rounded.max(1)
    }
}

impl From<Blocked> for AppError {
    fn from(blocked: Blocked) -> Self {
        AppError::TooManyAttempts {
            retry_after: blocked.retry_after_secs(),
        }
    }
}

/// Timestamps inside a sliding window plus an optional block.
#[derive(Debug, Default)]
struct Tracker {
    hits: Vec<Instant>,
    blocked_until: Option<Instant>,
}

impl Tracker {
    fn blocked(&mut self, now: Instant) -> Option<Blocked> {
        match self.blocked_until {
            Some(until) if until > now => Some(Blocked {
                retry_after: until - now,
            }),
            Some(_) => {
                self.blocked_until = None;
                None
            }
            None => None,
        }
    }

    /// Record a hit and return how many fall inside `window`.
    fn hit(&mut self, now: Instant, window: Duration) -> usize {
        self.hits
            .retain(|at| now.checked_duration_since(*at).is_some_and(|age| age < window));
        self.hits.push(now);
        self.hits.len()
    }

    fn block(&mut self, now: Instant, duration: Duration) -> Blocked {
        let until = now + duration;
        self.blocked_until = Some(self.blocked_until.map_or(until, |current| current.max(until)));
        Blocked {
            retry_after: duration,
        }
    }

    fn is_idle(&self, now: Instant, window: Duration) -> bool {
        self.blocked_until.map_or(true, |until| until <= now)
            && self
                .hits
                .iter()
                .all(|at| now.checked_duration_since(*at).is_some_and(|age| age >= window))
    }
}

#[derive(Debug, Default)]
struct State {
    addresses: HashMap<String, Tracker>,
    users: HashMap<String, Tracker>,
}

/// Shared login throttle, one per process.
#[derive(Debug, Default)]
pub struct LoginThrottle {
    policy: ThrottlePolicy,
    state: Mutex<State>,
}

/// Usernames are compared trimmed and lowercased.
fn user_key(username: &str) -> String {
    username.trim().to_lowercase()
}

impl LoginThrottle {
    pub fn new(policy: ThrottlePolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // Every update leaves the maps consistent, so a poisoned lock is safe
        // to keep using.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count an attempt from `address`, refusing it when the address is
    /// blocked or over its attempt budget.
    pub fn admit_address(&self, address: &str) -> Result<(), Blocked> {
        self.admit_address_at(address, Instant::now())
    }

    /// Refuse when `username` is locked.
    pub fn check_user(&self, username: &str) -> Result<(), Blocked> {
        self.check_user_at(username, Instant::now())
    }

    /// Record a failed login. Returns the lock when this failure triggered
    /// one.
    pub fn record_failure(&self, address: &str, username: &str) -> Option<Blocked> {
        self.record_failure_at(address, username, Instant::now())
    }

    /// Forget the failures of `username` after a successful login.
    pub fn record_success(&self, username: &str) {
        self.state().users.remove(&user_key(username));
    }

    pub(crate) fn admit_address_at(&self, address: &str, now: Instant) -> Result<(), Blocked> {
        let policy = self.policy;
        let mut state = self.state();
        state.prune(now, &policy);

        let tracker = state.addresses.entry(address.to_string()).or_default();
        if let Some(blocked) = tracker.blocked(now) {
            return Err(blocked);
        }
        if tracker.hit(now, policy.attempt_window) > policy.attempts_per_address {
            tracing::warn!(%address, "Login attempt budget exceeded, blocking address");
            return Err(tracker.block(now, policy.address_block));
        }
        Ok(())
    }

    pub(crate) fn check_user_at(&self, username: &str, now: Instant) -> Result<(), Blocked> {
        match self.state().users.get_mut(&user_key(username)) {
            Some(tracker) => tracker.blocked(now).map_or(Ok(()), Err),
            None => Ok(()),
        }
    }

    pub(crate) fn record_failure_at(
        &self,
        address: &str,
        username: &str,
        now: Instant,
    ) -> Option<Blocked> {
        let policy = self.policy;
        let mut state = self.state();

        let user = state.users.entry(user_key(username)).or_default();
        if user.hit(now, policy.failure_window) < policy.max_failures {
            return None;
        }

        let locked = user.block(now, policy.user_lock);
        state
            .addresses
            .entry(address.to_string())
            .or_default()
            .block(now, policy.address_block);
        tracing::warn!(%address, username = %user_key(username), "Too many failed logins, locking account");
        Some(locked)
    }
}

impl State {
    /// Drop trackers with nothing left to remember.
    fn prune(&mut self, now: Instant, policy: &ThrottlePolicy) {
        self.addresses
            .retain(|_, t| !t.is_idle(now, policy.attempt_window));
        self.users
            .retain(|_, t| !t.is_idle(now, policy.failure_window));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ThrottlePolicy {
        ThrottlePolicy {
            attempts_per_address: 3,
            attempt_window: Duration::from_secs(60),
            max_failures: 2,
            failure_window: Duration::from_secs(900),
            user_lock: Duration::from_secs(900),
            address_block: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_address_over_budget_is_blocked() {
        let throttle = LoginThrottle::new(policy());
        let start = Instant::now();

        for i in 0..3 {
            assert!(throttle
                .admit_address_at("10.0.0.1", start + Duration::from_secs(i))
                .is_ok());
        }
        let blocked = throttle
            .admit_address_at("10.0.0.1", start + Duration::from_secs(3))
            .unwrap_err();
        assert_eq!(blocked.retry_after_secs(), 300);

        // Other addresses are unaffected.
        assert!(throttle.admit_address_at("10.0.0.2", start).is_ok());
    }

    #[test]
    fn test_address_block_lifts() {
        let throttle = LoginThrottle::new(policy());
        let start = Instant::now();
        for _ in 0..4 {
            let _ = throttle.admit_address_at("10.0.0.1", start);
        }

        let later = start + Duration::from_secs(100);
        let blocked = throttle.admit_address_at("10.0.0.1", later).unwrap_err();
        assert_eq!(blocked.retry_after_secs(), 200);

        assert!(throttle
            .admit_address_at("10.0.0.1", start + Duration::from_secs(301))
            .is_ok());
    }

    #[test]
    fn test_attempts_outside_window_do_not_count() {
        let throttle = LoginThrottle::new(policy());
        let start = Instant::now();

        for minute in 0..10 {
            let at = start + Duration::from_secs(minute * 61);
            assert!(throttle.admit_address_at("10.0.0.1", at).is_ok());
        }
    }

    #[test]
    fn test_repeated_failures_lock_user_and_address() {
        let throttle = LoginThrottle::new(policy());
        let now = Instant::now();

        assert!(throttle.record_failure_at("10.0.0.1", "LGomez", now).is_none());
        let locked = throttle
            .record_failure_at("10.0.0.1", " lgomez ", now)
            .unwrap();
        assert_eq!(locked.retry_after_secs(), 900);

        assert!(throttle.check_user_at("lgomez", now).is_err());
        assert!(throttle.admit_address_at("10.0.0.1", now).is_err());
        assert!(throttle.check_user_at("otro", now).is_ok());
    }

    #[test]
    fn test_success_clears_failures() {
        let throttle = LoginThrottle::new(policy());
        let now = Instant::now();

        throttle.record_failure_at("10.0.0.1", "lgomez", now);
        throttle.record_success("LGOMEZ");

        assert!(throttle.record_failure_at("10.0.0.1", "lgomez", now).is_none());
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let blocked = Blocked {
            retry_after: Duration::from_millis(1500),
        };
        assert_eq!(blocked.retry_after_secs(), 2);
        let blocked = Blocked {
            retry_after: Duration::ZERO,
        };
        assert_eq!(blocked.retry_after_secs(), 1);
    }
}
