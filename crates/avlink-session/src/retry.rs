use std::time::Duration;

use tracing::warn;

/// Default number of readiness polls before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// Default pause between readiness polls.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Bounded poll-and-retry policy for channel readiness. This is the only
/// timeout primitive in the session layer; do not convert call sites to
/// unbounded polling.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Diagnostic context reported when readiness never held. A soft condition,
/// expected during reconnect races; not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotReadyReport {
    pub attempts: u32,
    pub state: String,
    pub identity: Option<String>,
}

/// Result of a readiness-guarded operation.
#[derive(Debug)]
pub enum ReadyOutcome<T> {
    /// The predicate held and the operation ran exactly once.
    Ran(T),
    /// Polls were exhausted; the operation never ran.
    NotReady(NotReadyReport),
}

impl<T> ReadyOutcome<T> {
    pub fn ran(self) -> Option<T> {
        match self {
            ReadyOutcome::Ran(value) => Some(value),
            ReadyOutcome::NotReady(_) => None,
        }
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, ReadyOutcome::NotReady(_))
    }
}

/// Poll `ready` against `target` up to `policy.max_retries` times with
/// `policy.delay` between polls; run `op` exactly once, the moment the
/// predicate holds. Exhaustion reports diagnostics from `diagnostics`
/// instead of executing `op`.
pub fn run_when_ready<C: ?Sized, T>(
    policy: &RetryPolicy,
    target: &mut C,
    ready: impl Fn(&C) -> bool,
    diagnostics: impl Fn(&C) -> (String, Option<String>),
    op: impl FnOnce(&mut C) -> T,
) -> ReadyOutcome<T> {
    run_with_sleep(policy, target, ready, diagnostics, op, |delay| {
        std::thread::sleep(delay)
    })
}

fn run_with_sleep<C: ?Sized, T>(
    policy: &RetryPolicy,
    target: &mut C,
    ready: impl Fn(&C) -> bool,
    diagnostics: impl Fn(&C) -> (String, Option<String>),
    op: impl FnOnce(&mut C) -> T,
    mut sleep: impl FnMut(Duration),
) -> ReadyOutcome<T> {
    let polls = policy.max_retries.max(1);
    for attempt in 0..polls {
        if ready(target) {
            return ReadyOutcome::Ran(op(target));
        }
        if attempt + 1 < polls {
            sleep(policy.delay);
        }
    }

    let (state, identity) = diagnostics(target);
    warn!(attempts = polls, state, ?identity, "channel never became ready");
    ReadyOutcome::NotReady(NotReadyReport {
        attempts: polls,
        state,
        identity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        polls: u32,
        ready_on: u32,
        ops: u32,
    }

    fn guard(policy: &RetryPolicy, probe: &mut Probe) -> (ReadyOutcome<u32>, u32) {
        let mut sleeps = 0;
        let outcome = run_with_sleep(
            policy,
            probe,
            |p| p.polls >= p.ready_on,
            |p| (format!("polls={}", p.polls), None),
            |p| {
                p.ops += 1;
                p.ops
            },
            |_| sleeps += 1,
        );
        (outcome, sleeps)
    }

    // The predicate closure cannot mutate, so poll counting happens here.
    fn counting_guard(policy: &RetryPolicy, ready_on: u32) -> (ReadyOutcome<u32>, u32, u32) {
        use std::cell::Cell;
        let polls = Cell::new(0u32);
        let mut ops = 0u32;
        let mut sleeps = 0u32;
        let outcome = run_with_sleep(
            policy,
            &mut ops,
            |_| {
                polls.set(polls.get() + 1);
                polls.get() >= ready_on
            },
            |_| ("exhausted".to_string(), Some("id-1".to_string())),
            |ops| {
                *ops += 1;
                *ops
            },
            |_| sleeps += 1,
        );
        (outcome, polls.get(), sleeps)
    }

    #[test]
    fn ready_on_third_poll_runs_once_after_two_delays() {
        let (outcome, polls, sleeps) = counting_guard(&RetryPolicy::default(), 3);
        assert_eq!(polls, 3);
        assert_eq!(sleeps, 2);
        assert!(matches!(outcome, ReadyOutcome::Ran(1)));
    }

    #[test]
    fn immediately_ready_runs_with_zero_delays() {
        let (outcome, polls, sleeps) = counting_guard(&RetryPolicy::default(), 1);
        assert_eq!(polls, 1);
        assert_eq!(sleeps, 0);
        assert!(matches!(outcome, ReadyOutcome::Ran(1)));
    }

    #[test]
    fn exhaustion_reports_diagnostics_and_never_runs_op() {
        let (outcome, polls, sleeps) = counting_guard(&RetryPolicy::default(), 100);
        assert_eq!(polls, 5);
        assert_eq!(sleeps, 4);
        match outcome {
            ReadyOutcome::NotReady(report) => {
                assert_eq!(report.attempts, 5);
                assert_eq!(report.state, "exhausted");
                assert_eq!(report.identity.as_deref(), Some("id-1"));
            }
            ReadyOutcome::Ran(_) => panic!("op must not run when never ready"),
        }
    }

    #[test]
    fn target_state_drives_the_predicate() {
        let mut probe = Probe {
            polls: 2,
            ready_on: 2,
            ops: 0,
        };
        let (outcome, sleeps) = guard(&RetryPolicy::default(), &mut probe);
        assert_eq!(sleeps, 0);
        assert_eq!(outcome.ran(), Some(1));
        assert_eq!(probe.ops, 1);
    }

    #[test]
    fn zero_retry_policy_still_polls_once() {
        let policy = RetryPolicy {
            max_retries: 0,
            delay: Duration::from_millis(1),
        };
        let (outcome, polls, sleeps) = counting_guard(&policy, 1);
        assert_eq!(polls, 1);
        assert_eq!(sleeps, 0);
        assert!(matches!(outcome, ReadyOutcome::Ran(_)));
    }
}
