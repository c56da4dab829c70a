//! EC2 resource management
//!
//! One client, with lifecycle operations split across submodules:
//! instances, network plumbing (addresses, interfaces, gateways), routing
//! (peering, endpoints, route tables, subnets, the VPC), and security
//! groups. `operations` binds the client to the `CloudApi` trait.

mod instance;
mod network;
mod operations;
mod routing;
mod security_group;

use crate::aws::context::AwsContext;
use anyhow::Result;
use aws_sdk_ec2::Client;

/// EC2 client scoped to one region
pub struct Ec2Client {
    pub(crate) client: Client,
}

impl Ec2Client {
    /// Create a new EC2 client (loads AWS config from environment)
    pub async fn new(region: &str) -> Result<Self> {
        let ctx = AwsContext::new(region).await;
        Ok(Self::from_context(&ctx))
    }

    /// Create an EC2 client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
        }
    }
}
