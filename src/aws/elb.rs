//! Classic load balancer management
//!
//! The provider exposes no load-balancer-to-VPC relation; the sequencer
//! correlates balancers to the VPC by subnet intersection, so this client
//! only needs to list names with subnet sets and delete by name.

use crate::api::LoadBalancerApi;
use crate::aws::context::AwsContext;
use crate::model::LoadBalancerSummary;
use anyhow::{Context, Result};
use aws_sdk_elasticloadbalancing::Client;
use tracing::info;

/// Classic ELB client scoped to one region
pub struct ElbClient {
    client: Client,
}

impl ElbClient {
    /// Create a new ELB client (loads AWS config from environment)
    pub async fn new(region: &str) -> Result<Self> {
        let ctx = AwsContext::new(region).await;
        Ok(Self::from_context(&ctx))
    }

    /// Create an ELB client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.elb_client(),
        }
    }
}

impl LoadBalancerApi for ElbClient {
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancerSummary>> {
        let response = self
            .client
            .describe_load_balancers()
            .send()
            .await
            .context("Failed to describe load balancers")?;

        Ok(response
            .load_balancer_descriptions()
            .iter()
            .filter_map(|lb| {
                Some(LoadBalancerSummary {
                    name: lb.load_balancer_name()?.to_string(),
                    subnet_ids: lb.subnets().to_vec(),
                })
            })
            .collect())
    }

    async fn delete_load_balancer(&self, name: &str) -> Result<()> {
        info!(name = %name, "Deleting load balancer");

        self.client
            .delete_load_balancer()
            .load_balancer_name(name)
            .send()
            .await
            .context("Failed to delete load balancer")?;

        Ok(())
    }
}
