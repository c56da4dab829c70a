//! Configuration types for a teardown run

use crate::model::VpcId;
use std::time::Duration;

/// Default pause between paced mutations, letting requests register with
/// the provider before the next dependent call.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(5);

/// Default interval between polling rounds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default polling round budget. The cap is a retry budget, not a
/// wall-clock deadline; the exact value is not load-bearing.
pub const DEFAULT_MAX_POLL_ROUNDS: u32 = 420;

/// Bounded fixed-interval polling parameters.
///
/// Tests inject a zero interval and a small round cap.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between polling rounds
    pub interval: Duration,
    /// Maximum number of rounds before giving up (exhaustion is logged,
    /// never fatal)
    pub max_rounds: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_rounds: DEFAULT_MAX_POLL_ROUNDS,
        }
    }
}

/// Immutable input to one sequencer invocation
#[derive(Debug, Clone)]
pub struct TeardownRequest {
    /// The VPC to tear down
    pub vpc_id: VpcId,
    /// Proceed even if live instances exist, terminating them
    pub terminate_instances: bool,
}

impl TeardownRequest {
    pub fn new(vpc_id: impl Into<VpcId>, terminate_instances: bool) -> Self {
        Self {
            vpc_id: vpc_id.into(),
            terminate_instances,
        }
    }
}

/// Tunables for one sequencer invocation
#[derive(Debug, Clone)]
pub struct TeardownOptions {
    /// Polling parameters for state convergence waits
    pub poll: PollConfig,
    /// Pacing pause between dependent mutations
    pub pause: Duration,
}

impl Default for TeardownOptions {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            pause: DEFAULT_PAUSE,
        }
    }
}
