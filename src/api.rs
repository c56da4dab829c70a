//! Cloud resource API traits consumed by the teardown sequencer
//!
//! These traits abstract the provider client operations so orchestration
//! logic can be unit tested against an in-memory fake without hitting
//! real AWS. `Ec2Client` implements `CloudApi`; `ElbClient` implements
//! `LoadBalancerApi`.

use crate::model::{
    AddressSummary, InstanceState, InstanceSummary, InternetGatewaySummary, LoadBalancerSummary,
    RouteTableSummary, RuleGrant, SecurityGroupRule, SecurityGroupSummary, VpcId,
};
use anyhow::Result;
use std::future::Future;

/// Operations against the cloud provider, all scoped by typed filters.
///
/// Every `list_*` operation re-queries current membership so the effects
/// of prior teardown stages are visible; nothing is cached here.
pub trait CloudApi: Send + Sync {
    /// List all instances in the VPC, whatever their state
    fn list_instances(
        &self,
        vpc_id: &VpcId,
    ) -> impl Future<Output = Result<Vec<InstanceSummary>>> + Send;

    /// List instances in the VPC currently in the given state
    fn list_instances_in_state(
        &self,
        vpc_id: &VpcId,
        state: InstanceState,
    ) -> impl Future<Output = Result<Vec<InstanceSummary>>> + Send;

    /// Describe specific instances by id (for state polling)
    fn describe_instances(
        &self,
        instance_ids: &[String],
    ) -> impl Future<Output = Result<Vec<InstanceSummary>>> + Send;

    /// Stop instances; `force` requests an immediate stop when ACPI stop
    /// did not take
    fn stop_instances(
        &self,
        instance_ids: &[String],
        force: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Terminate instances
    fn terminate_instances(
        &self,
        instance_ids: &[String],
    ) -> impl Future<Output = Result<()>> + Send;

    /// List peering connections where this VPC is the requester
    fn list_peering_connections(
        &self,
        vpc_id: &VpcId,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Delete a peering connection
    fn delete_peering_connection(&self, peering_id: &str)
    -> impl Future<Output = Result<()>> + Send;

    /// Find an available VPC endpoint for this VPC, if any
    fn find_available_endpoint(
        &self,
        vpc_id: &VpcId,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Delete a VPC endpoint
    fn delete_endpoint(&self, endpoint_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// List Elastic IP addresses associated with an instance
    fn list_addresses(
        &self,
        instance_id: &str,
    ) -> impl Future<Output = Result<Vec<AddressSummary>>> + Send;

    /// Disassociate an Elastic IP from whatever it is attached to
    fn disassociate_address(&self, association_id: &str)
    -> impl Future<Output = Result<()>> + Send;

    /// Release an Elastic IP allocation back to the provider
    fn release_address(&self, allocation_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// List network interface ids in the VPC
    fn list_network_interfaces(
        &self,
        vpc_id: &VpcId,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Delete a network interface
    fn delete_network_interface(&self, nic_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// List internet gateways attached to the VPC
    fn list_internet_gateways(
        &self,
        vpc_id: &VpcId,
    ) -> impl Future<Output = Result<Vec<InternetGatewaySummary>>> + Send;

    /// Detach an internet gateway from a VPC
    fn detach_internet_gateway(
        &self,
        gateway_id: &str,
        vpc_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a detached internet gateway
    fn delete_internet_gateway(&self, gateway_id: &str)
    -> impl Future<Output = Result<()>> + Send;

    /// List subnet ids in the VPC
    fn list_subnets(&self, vpc_id: &VpcId) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Find the NAT gateway keyed by (vpc, subnet), if any
    fn find_nat_gateway(
        &self,
        vpc_id: &VpcId,
        subnet_id: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Delete a NAT gateway
    fn delete_nat_gateway(&self, nat_gateway_id: &str)
    -> impl Future<Output = Result<()>> + Send;

    /// List route tables in the VPC with routes and associations
    fn list_route_tables(
        &self,
        vpc_id: &VpcId,
    ) -> impl Future<Output = Result<Vec<RouteTableSummary>>> + Send;

    /// Delete one route from a route table by destination CIDR
    fn delete_route(
        &self,
        route_table_id: &str,
        destination: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Disassociate a route table from a subnet
    fn disassociate_route_table(
        &self,
        association_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a route table
    fn delete_route_table(&self, route_table_id: &str)
    -> impl Future<Output = Result<()>> + Send;

    /// Delete a subnet
    fn delete_subnet(&self, subnet_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// List security groups in the VPC with their rule lists
    fn list_security_groups(
        &self,
        vpc_id: &VpcId,
    ) -> impl Future<Output = Result<Vec<SecurityGroupSummary>>> + Send;

    /// Revoke one ingress grant from a security group
    fn revoke_ingress(
        &self,
        group_id: &str,
        rule: &SecurityGroupRule,
        grant: &RuleGrant,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Revoke one egress grant from a security group
    fn revoke_egress(
        &self,
        group_id: &str,
        rule: &SecurityGroupRule,
        grant: &RuleGrant,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a security group
    fn delete_security_group(&self, group_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Re-resolve the VPC by id; false once it no longer exists
    fn vpc_exists(&self, vpc_id: &VpcId) -> impl Future<Output = Result<bool>> + Send;

    /// Delete the VPC itself
    fn delete_vpc(&self, vpc_id: &VpcId) -> impl Future<Output = Result<()>> + Send;
}

/// Load balancer management, an optional capability.
///
/// The provider exposes no load-balancer-to-VPC relation; correlation is
/// by intersecting the balancer's subnet set with the VPC's subnets.
pub trait LoadBalancerApi: Send + Sync {
    /// List every load balancer in the region with its subnet ids
    fn list_load_balancers(&self)
    -> impl Future<Output = Result<Vec<LoadBalancerSummary>>> + Send;

    /// Delete a load balancer by name
    fn delete_load_balancer(&self, name: &str) -> impl Future<Output = Result<()>> + Send;
}
