//! Bounded fixed-interval polling for resource state convergence
//!
//! Cloud deletions and state transitions are asynchronous and eventually
//! consistent; the poller re-queries at a fixed interval until a condition
//! holds or the round budget runs out. Exhaustion is reported, never
//! fatal: the subsequent delete step is attempted regardless and carries
//! its own failure policy.

use crate::api::CloudApi;
use crate::config::PollConfig;
use crate::model::InstanceState;
use anyhow::Result;
use std::future::Future;
use tracing::{debug, warn};

/// How a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The condition held before the budget ran out
    Converged,
    /// The round budget was exhausted with the condition still false
    Exhausted,
}

impl PollOutcome {
    pub fn converged(self) -> bool {
        self == PollOutcome::Converged
    }
}

/// Poll `check` at a fixed interval until it returns true or the round
/// budget is exhausted.
///
/// The first check runs immediately, so a condition that already holds
/// costs exactly one query and no sleep. A check error propagates; the
/// caller decides whether the surrounding stage tolerates it.
pub async fn poll_until<F, Fut>(config: &PollConfig, what: &str, mut check: F) -> Result<PollOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for round in 0..config.max_rounds {
        if round > 0 {
            tokio::time::sleep(config.interval).await;
        }

        if check().await? {
            debug!(what = %what, rounds = round + 1, "Condition converged");
            return Ok(PollOutcome::Converged);
        }

        debug!(what = %what, round = round + 1, "Condition not met, waiting");
    }

    warn!(
        what = %what,
        rounds = config.max_rounds,
        "Polling budget exhausted, proceeding anyway"
    );
    Ok(PollOutcome::Exhausted)
}

/// Wait until every instance in `ids` reports `target`.
///
/// An empty set returns immediately without issuing any query. Instances
/// that vanish from the describe response count as converged (already
/// gone). Transient describe errors are logged and treated as
/// not-yet-converged rather than aborting the wait.
pub async fn wait_for_instance_state<A: CloudApi>(
    api: &A,
    ids: &[String],
    target: InstanceState,
    config: &PollConfig,
) -> PollOutcome {
    if ids.is_empty() {
        return PollOutcome::Converged;
    }

    let outcome = poll_until(config, &format!("instances {}", target), || async move {
        match api.describe_instances(ids).await {
            Ok(current) => {
                let all_there = ids.iter().all(|id| {
                    current
                        .iter()
                        .find(|i| &i.id == id)
                        .is_none_or(|i| i.state == target)
                });
                Ok(all_there)
            }
            Err(e) => {
                warn!(error = ?e, "Instance state query failed, retrying");
                Ok(false)
            }
        }
    })
    .await;

    // poll_until only errors if the check does, and this check never does
    outcome.unwrap_or(PollOutcome::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_config(max_rounds: u32) -> PollConfig {
        PollConfig {
            interval: Duration::ZERO,
            max_rounds,
        }
    }

    #[tokio::test]
    async fn already_true_condition_polls_exactly_once() {
        let calls = AtomicU32::new(0);
        let outcome = poll_until(&fast_config(10), "noop", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(true) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Converged);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn converges_after_a_few_rounds() {
        let calls = AtomicU32::new(0);
        let outcome = poll_until(&fast_config(10), "slow", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n >= 2) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Converged);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_is_not_an_error() {
        let outcome = poll_until(&fast_config(3), "never", || async { Ok(false) })
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::Exhausted);
    }

    #[tokio::test]
    async fn check_error_propagates() {
        let result = poll_until(&fast_config(3), "broken", || async {
            anyhow::bail!("provider unreachable")
        })
        .await;
        assert!(result.is_err());
    }
}
