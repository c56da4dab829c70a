//! In-memory fake cloud for driving the teardown sequencer in tests
//!
//! Implements `CloudApi`/`LoadBalancerApi` over a mutable resource model
//! and records every mutating call so tests can assert on what was (and
//! was not) issued, and in what order.

use anyhow::{Result, anyhow, bail};
use std::collections::HashMap;
use std::sync::Mutex;
use vpc_teardown::api::{CloudApi, LoadBalancerApi};
use vpc_teardown::model::{
    AddressSummary, InstanceState, InstanceSummary, InternetGatewaySummary, LoadBalancerSummary,
    RouteSummary, RouteTableAssociation, RouteTableSummary, RuleGrant, SecurityGroupRule,
    SecurityGroupSummary, VpcId,
};

#[derive(Debug, Clone)]
pub struct FakeInstance {
    pub id: String,
    pub state: InstanceState,
}

/// The mutable resource model behind the fake
#[derive(Debug, Default)]
pub struct CloudState {
    pub vpc_exists: bool,
    pub instances: Vec<FakeInstance>,
    /// Addresses keyed by instance id
    pub addresses: HashMap<String, Vec<AddressSummary>>,
    pub peering_connections: Vec<String>,
    pub endpoint: Option<String>,
    pub network_interfaces: Vec<String>,
    pub internet_gateways: Vec<InternetGatewaySummary>,
    pub subnets: Vec<String>,
    /// NAT gateways keyed by subnet id
    pub nat_gateways: HashMap<String, String>,
    pub route_tables: Vec<RouteTableSummary>,
    pub security_groups: Vec<SecurityGroupSummary>,
}

#[derive(Default)]
pub struct FakeCloud {
    pub state: Mutex<CloudState>,
    /// Every mutating call, in issue order
    pub mutations: Mutex<Vec<String>>,
}

impl FakeCloud {
    pub fn new(state: CloudState) -> Self {
        Self {
            state: Mutex::new(state),
            mutations: Mutex::new(Vec::new()),
        }
    }

    pub fn mutation_log(&self) -> Vec<String> {
        self.mutations.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.mutations.lock().unwrap().push(entry);
    }

    /// Position of the first log entry starting with `prefix`
    pub fn first_index_of(&self, prefix: &str) -> Option<usize> {
        self.mutation_log()
            .iter()
            .position(|m| m.starts_with(prefix))
    }

    /// Advance transitional instance states one step, as the provider
    /// would between polls
    fn settle_instances(state: &mut CloudState) {
        for instance in &mut state.instances {
            instance.state = match instance.state {
                InstanceState::Stopping => InstanceState::Stopped,
                InstanceState::ShuttingDown => InstanceState::Terminated,
                other => other,
            };
        }
    }
}

impl CloudApi for FakeCloud {
    async fn list_instances(&self, _vpc_id: &VpcId) -> Result<Vec<InstanceSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .instances
            .iter()
            .map(|i| InstanceSummary {
                id: i.id.clone(),
                state: i.state,
            })
            .collect())
    }

    async fn list_instances_in_state(
        &self,
        _vpc_id: &VpcId,
        target: InstanceState,
    ) -> Result<Vec<InstanceSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .instances
            .iter()
            .filter(|i| i.state == target)
            .map(|i| InstanceSummary {
                id: i.id.clone(),
                state: i.state,
            })
            .collect())
    }

    async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<InstanceSummary>> {
        let mut state = self.state.lock().unwrap();
        let current: Vec<InstanceSummary> = state
            .instances
            .iter()
            .filter(|i| instance_ids.contains(&i.id))
            .map(|i| InstanceSummary {
                id: i.id.clone(),
                state: i.state,
            })
            .collect();
        Self::settle_instances(&mut state);
        Ok(current)
    }

    async fn stop_instances(&self, instance_ids: &[String], force: bool) -> Result<()> {
        self.record(format!(
            "{} {}",
            if force { "force_stop" } else { "stop" },
            instance_ids.join(",")
        ));
        let mut state = self.state.lock().unwrap();
        for instance in &mut state.instances {
            if instance_ids.contains(&instance.id) && !instance.state.is_settled() {
                instance.state = InstanceState::Stopping;
            }
        }
        Ok(())
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        self.record(format!("terminate {}", instance_ids.join(",")));
        let mut state = self.state.lock().unwrap();
        for instance in &mut state.instances {
            if instance_ids.contains(&instance.id) && instance.state != InstanceState::Terminated {
                instance.state = InstanceState::ShuttingDown;
            }
        }
        Ok(())
    }

    async fn list_peering_connections(&self, _vpc_id: &VpcId) -> Result<Vec<String>> {
        Ok(self.state.lock().unwrap().peering_connections.clone())
    }

    async fn delete_peering_connection(&self, peering_id: &str) -> Result<()> {
        self.record(format!("delete_peering {peering_id}"));
        self.state
            .lock()
            .unwrap()
            .peering_connections
            .retain(|p| p != peering_id);
        Ok(())
    }

    async fn find_available_endpoint(&self, _vpc_id: &VpcId) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().endpoint.clone())
    }

    async fn delete_endpoint(&self, endpoint_id: &str) -> Result<()> {
        self.record(format!("delete_endpoint {endpoint_id}"));
        self.state.lock().unwrap().endpoint = None;
        Ok(())
    }

    async fn list_addresses(&self, instance_id: &str) -> Result<Vec<AddressSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .addresses
            .get(instance_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn disassociate_address(&self, association_id: &str) -> Result<()> {
        self.record(format!("disassociate_address {association_id}"));
        let mut state = self.state.lock().unwrap();
        for addresses in state.addresses.values_mut() {
            for address in addresses.iter_mut() {
                if address.association_id.as_deref() == Some(association_id) {
                    address.association_id = None;
                }
            }
        }
        Ok(())
    }

    async fn release_address(&self, allocation_id: &str) -> Result<()> {
        self.record(format!("release_address {allocation_id}"));
        let mut state = self.state.lock().unwrap();
        for addresses in state.addresses.values_mut() {
            addresses.retain(|a| a.allocation_id.as_deref() != Some(allocation_id));
        }
        Ok(())
    }

    async fn list_network_interfaces(&self, _vpc_id: &VpcId) -> Result<Vec<String>> {
        Ok(self.state.lock().unwrap().network_interfaces.clone())
    }

    async fn delete_network_interface(&self, nic_id: &str) -> Result<()> {
        self.record(format!("delete_nic {nic_id}"));
        self.state
            .lock()
            .unwrap()
            .network_interfaces
            .retain(|n| n != nic_id);
        Ok(())
    }

    async fn list_internet_gateways(
        &self,
        _vpc_id: &VpcId,
    ) -> Result<Vec<InternetGatewaySummary>> {
        Ok(self.state.lock().unwrap().internet_gateways.clone())
    }

    async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<()> {
        self.record(format!("detach_igw {gateway_id} {vpc_id}"));
        let mut state = self.state.lock().unwrap();
        for gateway in &mut state.internet_gateways {
            if gateway.id == gateway_id {
                gateway.attached_vpcs.retain(|v| v != vpc_id);
            }
        }
        Ok(())
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> Result<()> {
        self.record(format!("delete_igw {gateway_id}"));
        let mut state = self.state.lock().unwrap();
        let gateway = state
            .internet_gateways
            .iter()
            .find(|g| g.id == gateway_id)
            .ok_or_else(|| anyhow!("InvalidInternetGatewayID.NotFound: {gateway_id}"))?;
        if !gateway.attached_vpcs.is_empty() {
            bail!("DependencyViolation: gateway {gateway_id} still attached");
        }
        state.internet_gateways.retain(|g| g.id != gateway_id);
        Ok(())
    }

    async fn list_subnets(&self, _vpc_id: &VpcId) -> Result<Vec<String>> {
        Ok(self.state.lock().unwrap().subnets.clone())
    }

    async fn find_nat_gateway(&self, _vpc_id: &VpcId, subnet_id: &str) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().nat_gateways.get(subnet_id).cloned())
    }

    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> Result<()> {
        self.record(format!("delete_nat {nat_gateway_id}"));
        self.state
            .lock()
            .unwrap()
            .nat_gateways
            .retain(|_, id| id.as_str() != nat_gateway_id);
        Ok(())
    }

    async fn list_route_tables(&self, _vpc_id: &VpcId) -> Result<Vec<RouteTableSummary>> {
        Ok(self.state.lock().unwrap().route_tables.clone())
    }

    async fn delete_route(&self, route_table_id: &str, destination: &str) -> Result<()> {
        self.record(format!("delete_route {route_table_id} {destination}"));
        let mut state = self.state.lock().unwrap();
        for table in &mut state.route_tables {
            if table.id == route_table_id {
                table.routes.retain(|r| r.destination != destination);
            }
        }
        Ok(())
    }

    async fn disassociate_route_table(&self, association_id: &str) -> Result<()> {
        self.record(format!("disassociate_rt {association_id}"));
        let mut state = self.state.lock().unwrap();
        for table in &mut state.route_tables {
            table.associations.retain(|a| a.id != association_id);
        }
        Ok(())
    }

    async fn delete_route_table(&self, route_table_id: &str) -> Result<()> {
        self.record(format!("delete_route_table {route_table_id}"));
        self.state
            .lock()
            .unwrap()
            .route_tables
            .retain(|t| t.id != route_table_id);
        Ok(())
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<()> {
        self.record(format!("delete_subnet {subnet_id}"));
        self.state.lock().unwrap().subnets.retain(|s| s != subnet_id);
        Ok(())
    }

    async fn list_security_groups(&self, _vpc_id: &VpcId) -> Result<Vec<SecurityGroupSummary>> {
        Ok(self.state.lock().unwrap().security_groups.clone())
    }

    async fn revoke_ingress(
        &self,
        group_id: &str,
        _rule: &SecurityGroupRule,
        grant: &RuleGrant,
    ) -> Result<()> {
        self.record(format!(
            "revoke_ingress {group_id} {}",
            grant_label(grant)
        ));
        Ok(())
    }

    async fn revoke_egress(
        &self,
        group_id: &str,
        _rule: &SecurityGroupRule,
        grant: &RuleGrant,
    ) -> Result<()> {
        self.record(format!("revoke_egress {group_id} {}", grant_label(grant)));
        Ok(())
    }

    async fn delete_security_group(&self, group_id: &str) -> Result<()> {
        self.record(format!("delete_sg {group_id}"));
        self.state
            .lock()
            .unwrap()
            .security_groups
            .retain(|g| g.id != group_id);
        Ok(())
    }

    async fn vpc_exists(&self, _vpc_id: &VpcId) -> Result<bool> {
        Ok(self.state.lock().unwrap().vpc_exists)
    }

    async fn delete_vpc(&self, vpc_id: &VpcId) -> Result<()> {
        self.record(format!("delete_vpc {vpc_id}"));
        let mut state = self.state.lock().unwrap();
        if !state.vpc_exists {
            bail!("InvalidVpcID.NotFound: {vpc_id}");
        }
        if !state.security_groups.iter().all(|g| g.name == "default") {
            bail!("DependencyViolation: {vpc_id} still has security groups");
        }
        state.vpc_exists = false;
        Ok(())
    }
}

fn grant_label(grant: &RuleGrant) -> String {
    grant
        .group_id
        .clone()
        .or_else(|| grant.cidr_ip.clone())
        .unwrap_or_else(|| "-".to_string())
}

/// Fake load balancer capability. A deleted balancer keeps showing up in
/// listings for `lingering_listings` more rounds, as the provider's
/// asynchronous removal does.
pub struct FakeLoadBalancers {
    balancers: Mutex<Vec<(LoadBalancerSummary, Option<u32>)>>,
    pub deleted: Mutex<Vec<String>>,
    pub lingering_listings: u32,
}

impl FakeLoadBalancers {
    pub fn new(balancers: Vec<LoadBalancerSummary>, lingering_listings: u32) -> Self {
        Self {
            balancers: Mutex::new(balancers.into_iter().map(|b| (b, None)).collect()),
            deleted: Mutex::new(Vec::new()),
            lingering_listings,
        }
    }

    /// Names of balancers the provider would still list
    pub fn remaining_names(&self) -> Vec<String> {
        self.balancers
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, gone_in)| gone_in.is_none_or(|n| n > 0))
            .map(|(b, _)| b.name.clone())
            .collect()
    }
}

impl LoadBalancerApi for FakeLoadBalancers {
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancerSummary>> {
        let mut balancers = self.balancers.lock().unwrap();
        let listing = balancers
            .iter()
            .filter(|(_, gone_in)| gone_in.is_none_or(|n| n > 0))
            .map(|(b, _)| b.clone())
            .collect();
        for (_, gone_in) in balancers.iter_mut() {
            if let Some(n) = gone_in {
                *n = n.saturating_sub(1);
            }
        }
        Ok(listing)
    }

    async fn delete_load_balancer(&self, name: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(name.to_string());
        let mut balancers = self.balancers.lock().unwrap();
        for (balancer, gone_in) in balancers.iter_mut() {
            if balancer.name == name {
                *gone_in = Some(self.lingering_listings);
            }
        }
        Ok(())
    }
}

/// No load-balancer capability configured; stage 15 must be skipped.
pub struct NoLoadBalancers;

impl LoadBalancerApi for NoLoadBalancers {
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancerSummary>> {
        bail!("no load balancer capability")
    }

    async fn delete_load_balancer(&self, _name: &str) -> Result<()> {
        bail!("no load balancer capability")
    }
}

/// Builders for common fixtures

pub fn instance(id: &str, state: InstanceState) -> FakeInstance {
    FakeInstance {
        id: id.to_string(),
        state,
    }
}

pub fn address(allocation_id: &str, association_id: Option<&str>) -> AddressSummary {
    AddressSummary {
        allocation_id: Some(allocation_id.to_string()),
        association_id: association_id.map(str::to_string),
    }
}

pub fn route(destination: &str, gateway_id: Option<&str>) -> RouteSummary {
    RouteSummary {
        destination: destination.to_string(),
        gateway_id: gateway_id.map(str::to_string),
    }
}

pub fn association(id: &str, subnet_id: Option<&str>, main: bool) -> RouteTableAssociation {
    RouteTableAssociation {
        id: id.to_string(),
        subnet_id: subnet_id.map(str::to_string),
        main,
    }
}

pub fn security_group(id: &str, name: &str, grants_to: &[&str]) -> SecurityGroupSummary {
    let grants = grants_to
        .iter()
        .map(|g| RuleGrant {
            group_id: Some(g.to_string()),
            cidr_ip: None,
        })
        .collect();
    SecurityGroupSummary {
        id: id.to_string(),
        name: name.to_string(),
        ingress: vec![SecurityGroupRule {
            protocol: Some("tcp".to_string()),
            from_port: Some(22),
            to_port: Some(22),
            grants,
        }],
        egress: vec![SecurityGroupRule {
            protocol: Some("-1".to_string()),
            from_port: None,
            to_port: None,
            grants: vec![RuleGrant {
                group_id: None,
                cidr_ip: Some("0.0.0.0/0".to_string()),
            }],
        }],
    }
}

pub fn fast_options() -> vpc_teardown::config::TeardownOptions {
    vpc_teardown::config::TeardownOptions {
        poll: vpc_teardown::config::PollConfig {
            interval: std::time::Duration::ZERO,
            max_rounds: 20,
        },
        pause: std::time::Duration::ZERO,
    }
}
