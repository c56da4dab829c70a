//! AWS client modules
//!
//! Wrappers around AWS SDK clients:
//! - EC2: instances, addresses, gateways, routing, security groups, the VPC
//! - ELB: classic load balancers (the optional load-balancer capability)

pub mod context;
pub mod ec2;
pub mod elb;
pub mod error;
pub mod filter;

pub use context::AwsContext;
pub use ec2::Ec2Client;
pub use elb::ElbClient;
pub use error::{CloudError, classify_anyhow_error, classify_cloud_error, ignore_not_found};
