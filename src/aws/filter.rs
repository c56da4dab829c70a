//! Typed EC2 query filters
//!
//! Every list operation is scoped by attribute-name/value predicates; the
//! provider takes stringly-keyed filter dictionaries, so the names live
//! in exactly one place here.

use crate::model::InstanceState;
use aws_sdk_ec2::types::Filter;

/// A single typed filter predicate for an EC2 describe call.
#[derive(Debug, Clone, Copy)]
pub enum Ec2Filter<'a> {
    /// Resources belonging to a VPC (`vpc-id`)
    VpcId(&'a str),
    /// Internet gateways attached to a VPC (`attachment.vpc-id`)
    AttachmentVpcId(&'a str),
    /// Peering connections requested by a VPC (`requester-vpc-info.vpc-id`)
    RequesterVpcId(&'a str),
    /// Instances in a lifecycle state (`instance-state-name`)
    InstanceStateName(InstanceState),
    /// Addresses associated with an instance (`instance-id`)
    InstanceId(&'a str),
    /// Resources in a subnet (`subnet-id`)
    SubnetId(&'a str),
    /// Endpoints in a state (`vpc-endpoint-state`)
    EndpointState(&'a str),
}

impl Ec2Filter<'_> {
    /// Build the SDK filter value.
    pub fn build(self) -> Filter {
        let (name, value) = match self {
            Ec2Filter::VpcId(v) => ("vpc-id", v.to_string()),
            Ec2Filter::AttachmentVpcId(v) => ("attachment.vpc-id", v.to_string()),
            Ec2Filter::RequesterVpcId(v) => ("requester-vpc-info.vpc-id", v.to_string()),
            Ec2Filter::InstanceStateName(s) => ("instance-state-name", s.as_str().to_string()),
            Ec2Filter::InstanceId(v) => ("instance-id", v.to_string()),
            Ec2Filter::SubnetId(v) => ("subnet-id", v.to_string()),
            Ec2Filter::EndpointState(v) => ("vpc-endpoint-state", v.to_string()),
        };
        Filter::builder().name(name).values(value).build()
    }
}
