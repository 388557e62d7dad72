//! Bounded retry with a fixed wait between attempts
//!
//! Every loop here blocks the calling thread; checkout is sequential by
//! nature, so a retry never overlaps another git command.

use std::thread;
use std::time::Duration;

/// Outcome of a single failed attempt
#[derive(Debug)]
pub enum AttemptError<E> {
    /// The attempt failed but another one may succeed
    Retry(E),
    /// The attempt failed for good, remaining attempts are skipped
    Abort(E),
}

impl<E> AttemptError<E> {
    pub fn into_inner(self) -> E {
        match self {
            AttemptError::Retry(err) | AttemptError::Abort(err) => err,
        }
    }
}

/// Retry policy: how many attempts and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    attempts: u32,
    wait: Duration,
}

impl Retry {
    /// Create a policy making at most `attempts` attempts (at least one)
    pub fn times(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
            wait: Duration::ZERO,
        }
    }

    /// Set the fixed wait between attempts
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run `action` until it succeeds or the attempts are used up
    ///
    /// The action receives the zero based attempt index. The error of the
    /// last attempt is returned.
    pub fn run<T, E>(&self, mut action: impl FnMut(u32) -> Result<T, E>) -> Result<T, E> {
        self.run_with_abort(|attempt| action(attempt).map_err(AttemptError::Retry))
    }

    /// Like [`Retry::run`], but the action may abort the remaining attempts
    pub fn run_with_abort<T, E>(
        &self,
        mut action: impl FnMut(u32) -> Result<T, AttemptError<E>>,
    ) -> Result<T, E> {
        let mut attempt = 0;
        loop {
            if attempt > 0 && !self.wait.is_zero() {
                thread::sleep(self.wait);
            }

            match action(attempt) {
                Ok(value) => return Ok(value),
                Err(AttemptError::Abort(err)) => return Err(err),
                Err(AttemptError::Retry(err)) => {
                    attempt += 1;
                    if attempt >= self.attempts {
                        return Err(err);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_succeeds_first_attempt() {
        let mut calls = 0;
        let result: Result<u32, &str> = Retry::times(3).run(|attempt| {
            calls += 1;
            Ok(attempt)
        });
        assert_eq!(result, Ok(0));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_run_returns_last_error_after_budget() {
        let mut calls = 0;
        let result: Result<(), String> = Retry::times(2).run(|attempt| {
            calls += 1;
            Err(format!("attempt {attempt} failed"))
        });
        assert_eq!(result, Err("attempt 1 failed".to_string()));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_run_recovers_on_second_attempt() {
        let result: Result<&str, &str> = Retry::times(2).run(|attempt| {
            if attempt == 0 { Err("transient") } else { Ok("done") }
        });
        assert_eq!(result, Ok("done"));
    }

    #[test]
    fn test_run_with_abort_stops_immediately() {
        let mut calls = 0;
        let result: Result<(), &str> = Retry::times(5).run_with_abort(|_| {
            calls += 1;
            Err(AttemptError::Abort("fatal"))
        });
        assert_eq!(result, Err("fatal"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let mut calls = 0;
        let _: Result<(), ()> = Retry::times(0).run(|_| {
            calls += 1;
            Err(())
        });
        assert_eq!(calls, 1);
        assert_eq!(Retry::times(0).attempts(), 1);
    }
}
