//! Precondition guard: refuse teardown while live instances exist
//!
//! The single abort point of the pipeline. Everything downstream is
//! best-effort or propagates on its own terms; the guard is the only
//! check that stops a run before any mutation is issued.

use crate::api::CloudApi;
use crate::model::{InstanceState, VpcId};
use anyhow::Result;
use std::fmt;

/// Why teardown was refused.
#[derive(Debug, Clone)]
pub struct Refusal {
    pub vpc_id: VpcId,
    /// Instances blocking the run, running ones first
    pub blocking_instances: Vec<String>,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Instances still exist in {} ({}); teardown will not be executed. \
             Pass terminate_instances=true to proceed.",
            self.vpc_id,
            self.blocking_instances.join(", ")
        )
    }
}

/// Check whether teardown may proceed.
///
/// Read-only: queries running and stopped instances in the VPC. With the
/// terminate override set, always proceeds. Returns `Some(Refusal)` when
/// live instances block the run.
pub async fn can_proceed<A: CloudApi>(
    api: &A,
    vpc_id: &VpcId,
    terminate_instances: bool,
) -> Result<Option<Refusal>> {
    if terminate_instances {
        return Ok(None);
    }

    let running = api
        .list_instances_in_state(vpc_id, InstanceState::Running)
        .await?;
    let stopped = api
        .list_instances_in_state(vpc_id, InstanceState::Stopped)
        .await?;

    if running.is_empty() && stopped.is_empty() {
        return Ok(None);
    }

    let blocking_instances = running
        .iter()
        .chain(stopped.iter())
        .map(|i| i.id.clone())
        .collect();

    Ok(Some(Refusal {
        vpc_id: vpc_id.clone(),
        blocking_instances,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusal_message_names_vpc_and_instances() {
        let refusal = Refusal {
            vpc_id: VpcId::new("vpc-123"),
            blocking_instances: vec!["i-1".to_string(), "i-2".to_string()],
        };
        let message = refusal.to_string();
        assert!(message.contains("vpc-123"));
        assert!(message.contains("i-1"));
        assert!(message.contains("terminate_instances=true"));
    }
}
