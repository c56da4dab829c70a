//! `CloudApi` binding for the EC2 client
//!
//! Forwards the trait surface to the inherent methods defined in the
//! sibling modules; the trait exists so orchestration logic can be unit
//! tested without hitting real AWS.

use super::Ec2Client;
use crate::api::CloudApi;
use crate::model::{
    AddressSummary, InstanceState, InstanceSummary, InternetGatewaySummary, RouteTableSummary,
    RuleGrant, SecurityGroupRule, SecurityGroupSummary, VpcId,
};
use anyhow::Result;

impl CloudApi for Ec2Client {
    async fn list_instances(&self, vpc_id: &VpcId) -> Result<Vec<InstanceSummary>> {
        Ec2Client::list_instances(self, vpc_id).await
    }

    async fn list_instances_in_state(
        &self,
        vpc_id: &VpcId,
        state: InstanceState,
    ) -> Result<Vec<InstanceSummary>> {
        Ec2Client::list_instances_in_state(self, vpc_id, state).await
    }

    async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<InstanceSummary>> {
        Ec2Client::describe_instances(self, instance_ids).await
    }

    async fn stop_instances(&self, instance_ids: &[String], force: bool) -> Result<()> {
        Ec2Client::stop_instances(self, instance_ids, force).await
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        Ec2Client::terminate_instances(self, instance_ids).await
    }

    async fn list_peering_connections(&self, vpc_id: &VpcId) -> Result<Vec<String>> {
        Ec2Client::list_peering_connections(self, vpc_id).await
    }

    async fn delete_peering_connection(&self, peering_id: &str) -> Result<()> {
        Ec2Client::delete_peering_connection(self, peering_id).await
    }

    async fn find_available_endpoint(&self, vpc_id: &VpcId) -> Result<Option<String>> {
        Ec2Client::find_available_endpoint(self, vpc_id).await
    }

    async fn delete_endpoint(&self, endpoint_id: &str) -> Result<()> {
        Ec2Client::delete_endpoint(self, endpoint_id).await
    }

    async fn list_addresses(&self, instance_id: &str) -> Result<Vec<AddressSummary>> {
        Ec2Client::list_addresses(self, instance_id).await
    }

    async fn disassociate_address(&self, association_id: &str) -> Result<()> {
        Ec2Client::disassociate_address(self, association_id).await
    }

    async fn release_address(&self, allocation_id: &str) -> Result<()> {
        Ec2Client::release_address(self, allocation_id).await
    }

    async fn list_network_interfaces(&self, vpc_id: &VpcId) -> Result<Vec<String>> {
        Ec2Client::list_network_interfaces(self, vpc_id).await
    }

    async fn delete_network_interface(&self, nic_id: &str) -> Result<()> {
        Ec2Client::delete_network_interface(self, nic_id).await
    }

    async fn list_internet_gateways(&self, vpc_id: &VpcId) -> Result<Vec<InternetGatewaySummary>> {
        Ec2Client::list_internet_gateways(self, vpc_id).await
    }

    async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<()> {
        Ec2Client::detach_internet_gateway(self, gateway_id, vpc_id).await
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> Result<()> {
        Ec2Client::delete_internet_gateway(self, gateway_id).await
    }

    async fn list_subnets(&self, vpc_id: &VpcId) -> Result<Vec<String>> {
        Ec2Client::list_subnets(self, vpc_id).await
    }

    async fn find_nat_gateway(&self, vpc_id: &VpcId, subnet_id: &str) -> Result<Option<String>> {
        Ec2Client::find_nat_gateway(self, vpc_id, subnet_id).await
    }

    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> Result<()> {
        Ec2Client::delete_nat_gateway(self, nat_gateway_id).await
    }

    async fn list_route_tables(&self, vpc_id: &VpcId) -> Result<Vec<RouteTableSummary>> {
        Ec2Client::list_route_tables(self, vpc_id).await
    }

    async fn delete_route(&self, route_table_id: &str, destination: &str) -> Result<()> {
        Ec2Client::delete_route(self, route_table_id, destination).await
    }

    async fn disassociate_route_table(&self, association_id: &str) -> Result<()> {
        Ec2Client::disassociate_route_table(self, association_id).await
    }

    async fn delete_route_table(&self, route_table_id: &str) -> Result<()> {
        Ec2Client::delete_route_table(self, route_table_id).await
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<()> {
        Ec2Client::delete_subnet(self, subnet_id).await
    }

    async fn list_security_groups(&self, vpc_id: &VpcId) -> Result<Vec<SecurityGroupSummary>> {
        Ec2Client::list_security_groups(self, vpc_id).await
    }

    async fn revoke_ingress(
        &self,
        group_id: &str,
        rule: &SecurityGroupRule,
        grant: &RuleGrant,
    ) -> Result<()> {
        Ec2Client::revoke_ingress(self, group_id, rule, grant).await
    }

    async fn revoke_egress(
        &self,
        group_id: &str,
        rule: &SecurityGroupRule,
        grant: &RuleGrant,
    ) -> Result<()> {
        Ec2Client::revoke_egress(self, group_id, rule, grant).await
    }

    async fn delete_security_group(&self, group_id: &str) -> Result<()> {
        Ec2Client::delete_security_group(self, group_id).await
    }

    async fn vpc_exists(&self, vpc_id: &VpcId) -> Result<bool> {
        Ec2Client::vpc_exists(self, vpc_id).await
    }

    async fn delete_vpc(&self, vpc_id: &VpcId) -> Result<()> {
        Ec2Client::delete_vpc(self, vpc_id).await
    }
}
