//! EC2 instance lifecycle operations

use super::Ec2Client;
use crate::aws::filter::Ec2Filter;
use crate::model::{InstanceState, InstanceSummary, VpcId};
use anyhow::{Context, Result};
use aws_sdk_ec2::types::{Instance, InstanceStateName};
use tracing::{debug, info};

fn convert_state(state: Option<&InstanceStateName>) -> InstanceState {
    match state {
        Some(InstanceStateName::Pending) => InstanceState::Pending,
        Some(InstanceStateName::Running) => InstanceState::Running,
        Some(InstanceStateName::Stopping) => InstanceState::Stopping,
        Some(InstanceStateName::Stopped) => InstanceState::Stopped,
        Some(InstanceStateName::ShuttingDown) => InstanceState::ShuttingDown,
        Some(InstanceStateName::Terminated) => InstanceState::Terminated,
        _ => InstanceState::Unknown,
    }
}

fn convert_instance(instance: &Instance) -> Option<InstanceSummary> {
    Some(InstanceSummary {
        id: instance.instance_id()?.to_string(),
        state: convert_state(instance.state().and_then(|s| s.name())),
    })
}

impl Ec2Client {
    async fn describe_with_filters(&self, filters: Vec<Ec2Filter<'_>>) -> Result<Vec<InstanceSummary>> {
        let mut request = self.client.describe_instances();
        for filter in filters {
            request = request.filters(filter.build());
        }

        let response = request.send().await.context("Failed to describe instances")?;

        Ok(response
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .filter_map(convert_instance)
            .collect())
    }

    /// List all instances in the VPC, whatever their state
    pub async fn list_instances(&self, vpc_id: &VpcId) -> Result<Vec<InstanceSummary>> {
        self.describe_with_filters(vec![Ec2Filter::VpcId(vpc_id.as_str())])
            .await
    }

    /// List instances in the VPC currently in the given state
    pub async fn list_instances_in_state(
        &self,
        vpc_id: &VpcId,
        state: InstanceState,
    ) -> Result<Vec<InstanceSummary>> {
        self.describe_with_filters(vec![
            Ec2Filter::VpcId(vpc_id.as_str()),
            Ec2Filter::InstanceStateName(state),
        ])
        .await
    }

    /// Describe specific instances by id
    pub async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<InstanceSummary>> {
        if instance_ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .describe_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .context("Failed to describe instances")?;

        Ok(response
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .filter_map(convert_instance)
            .collect())
    }

    /// Stop instances in a single API call; `force` skips the ACPI stop
    pub async fn stop_instances(&self, instance_ids: &[String], force: bool) -> Result<()> {
        if instance_ids.is_empty() {
            return Ok(());
        }

        info!(count = instance_ids.len(), force, "Stopping instances");

        self.client
            .stop_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .force(force)
            .send()
            .await
            .context("Failed to stop instances")?;

        Ok(())
    }

    /// Terminate instances in a single API call
    pub async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        if instance_ids.is_empty() {
            return Ok(());
        }

        info!(count = instance_ids.len(), "Terminating instances");

        self.client
            .terminate_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .context("Failed to terminate instances")?;

        debug!(instance_ids = ?instance_ids, "Termination requested");
        Ok(())
    }
}
