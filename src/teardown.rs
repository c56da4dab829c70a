//! Teardown sequencer: the ordered stage pipeline over one VPC
//!
//! Stages execute strictly in order; the order encodes the dependency
//! graph, so nothing is deleted while something still depends on it.
//! Within a stage, resources form an unordered batch. Each stage
//! re-discovers membership so the effects of prior stages are visible.

use crate::api::{CloudApi, LoadBalancerApi};
use crate::config::{TeardownOptions, TeardownRequest};
use crate::guard;
use crate::model::{InstanceState, InstanceSummary, VpcId};
use crate::policy::{self, Severity};
use crate::wait::{self, PollOutcome};
use anyhow::{Context, Result};
use futures::future::try_join_all;
use std::collections::HashSet;
use tracing::{error, info};

/// Tear down the VPC named in `request` and every resource attached to it.
///
/// Returns `Ok(())` on completion, including a guard refusal (logged, no
/// mutations) and a failed final VPC delete (logged at error). Returns
/// `Err` only when a stage whose success later stages depend on fails.
pub async fn run<A, L>(
    api: &A,
    load_balancers: Option<&L>,
    request: &TeardownRequest,
    opts: &TeardownOptions,
) -> Result<()>
where
    A: CloudApi,
    L: LoadBalancerApi,
{
    let vpc_id = &request.vpc_id;

    if let Some(refusal) = guard::can_proceed(api, vpc_id, request.terminate_instances).await? {
        error!(vpc_id = %vpc_id, "{refusal}");
        return Ok(());
    }

    info!(vpc_id = %vpc_id, "Deleting VPC");

    // Snapshot of instances at the start of the run; address release
    // later iterates the same set.
    let instances = api.list_instances(vpc_id).await?;
    info!(count = instances.len(), "Retiring instances");

    retire_instances(api, &instances, opts).await;

    remove_peering_connections(api, vpc_id).await?;

    policy::best_effort(
        remove_vpc_endpoint(api, vpc_id).await,
        "vpc endpoint cleanup",
    );

    release_addresses(api, &instances, opts).await?;

    flush_network_interfaces(api, vpc_id).await?;

    remove_internet_gateways(api, vpc_id, opts).await?;
    pause(opts).await;

    policy::best_effort(
        remove_nat_gateways(api, vpc_id).await,
        "nat gateway cleanup",
    );

    flush_routes(api, vpc_id).await?;

    if let Some(lb) = load_balancers {
        remove_load_balancers(api, lb, vpc_id, opts).await?;
    }

    remove_route_tables_and_subnets(api, vpc_id).await?;
    pause(opts).await;

    revoke_security_group_rules(api, vpc_id).await?;
    remove_security_groups(api, vpc_id).await?;

    policy::attempt(
        api.delete_vpc(vpc_id).await,
        &format!("delete vpc {vpc_id}"),
        Severity::Error,
    );

    Ok(())
}

/// Short pacing pause between a mutation and the next dependent call.
async fn pause(opts: &TeardownOptions) {
    tokio::time::sleep(opts.pause).await;
}

/// Stop, force-stop, then terminate every instance that needs it, polling
/// for convergence between phases. Every mutation here is tolerant: an
/// instance that disappears or was already settled must not abort the run.
async fn retire_instances<A: CloudApi>(
    api: &A,
    instances: &[InstanceSummary],
    opts: &TeardownOptions,
) {
    let to_stop: Vec<String> = instances
        .iter()
        .filter(|i| !i.state.is_settled())
        .map(|i| i.id.clone())
        .collect();

    if !to_stop.is_empty() {
        policy::tolerate(api.stop_instances(&to_stop, false).await, "stop instances");
        pause(opts).await;
        // ACPI stop may not take; force-stop the same set
        policy::tolerate(
            api.stop_instances(&to_stop, true).await,
            "force-stop instances",
        );
    }

    wait::wait_for_instance_state(api, &to_stop, InstanceState::Stopped, &opts.poll).await;

    let to_terminate: Vec<String> = instances
        .iter()
        .filter(|i| i.state != InstanceState::Terminated)
        .map(|i| i.id.clone())
        .collect();

    if !to_terminate.is_empty() {
        policy::tolerate(
            api.terminate_instances(&to_terminate).await,
            "terminate instances",
        );
    }

    wait::wait_for_instance_state(api, &to_terminate, InstanceState::Terminated, &opts.poll).await;
}

/// Delete peering connections where this VPC is the requester. Later
/// stages depend on these being gone, so failures propagate.
async fn remove_peering_connections<A: CloudApi>(api: &A, vpc_id: &VpcId) -> Result<()> {
    for peering_id in api.list_peering_connections(vpc_id).await? {
        info!(peering_id = %peering_id, "Deleting peering connection");
        api.delete_peering_connection(&peering_id)
            .await
            .with_context(|| format!("Failed to delete peering connection {peering_id}"))?;
    }
    Ok(())
}

/// Delete the available VPC endpoint, if one exists. Wrapped as a
/// best-effort block by the caller: endpoints may be unavailable or
/// unversioned in some deployments.
async fn remove_vpc_endpoint<A: CloudApi>(api: &A, vpc_id: &VpcId) -> Result<()> {
    if let Some(endpoint_id) = api.find_available_endpoint(vpc_id).await? {
        info!(endpoint_id = %endpoint_id, "Deleting VPC endpoint");
        api.delete_endpoint(&endpoint_id).await?;
    }
    Ok(())
}

/// Disassociate and release every Elastic IP associated with the
/// originally discovered instances. Each half is independently tolerant;
/// the disassociate-then-release chain per address stays sequential.
async fn release_addresses<A: CloudApi>(
    api: &A,
    instances: &[InstanceSummary],
    opts: &TeardownOptions,
) -> Result<()> {
    for instance in instances {
        let addresses = api.list_addresses(&instance.id).await?;
        for address in &addresses {
            if let Some(association_id) = &address.association_id {
                policy::tolerate(
                    api.disassociate_address(association_id).await,
                    "disassociate address",
                );
            }
            pause(opts).await;
            if let Some(allocation_id) = &address.allocation_id {
                policy::tolerate(
                    api.release_address(allocation_id).await,
                    "release address",
                );
            }
        }
        pause(opts).await;
    }
    Ok(())
}

/// Delete every network interface left in the VPC. Subnet and security
/// group deletion depend on this; failures propagate. Interfaces have no
/// ordering dependency on each other, so the batch runs concurrently.
async fn flush_network_interfaces<A: CloudApi>(api: &A, vpc_id: &VpcId) -> Result<()> {
    let nics = api.list_network_interfaces(vpc_id).await?;
    if nics.is_empty() {
        return Ok(());
    }

    info!(count = nics.len(), "Deleting network interfaces");
    try_join_all(nics.iter().map(|nic_id| async move {
        api.delete_network_interface(nic_id)
            .await
            .with_context(|| format!("Failed to delete network interface {nic_id}"))
    }))
    .await?;
    Ok(())
}

/// Detach and delete every internet gateway attached to the VPC.
/// Failures propagate: route and subnet deletion depend on this.
async fn remove_internet_gateways<A: CloudApi>(
    api: &A,
    vpc_id: &VpcId,
    opts: &TeardownOptions,
) -> Result<()> {
    for gateway in api.list_internet_gateways(vpc_id).await? {
        for attached_vpc in &gateway.attached_vpcs {
            info!(gateway_id = %gateway.id, vpc_id = %attached_vpc, "Detaching internet gateway");
            api.detach_internet_gateway(&gateway.id, attached_vpc)
                .await
                .with_context(|| format!("Failed to detach internet gateway {}", gateway.id))?;
            pause(opts).await;
        }
        info!(gateway_id = %gateway.id, "Deleting internet gateway");
        api.delete_internet_gateway(&gateway.id)
            .await
            .with_context(|| format!("Failed to delete internet gateway {}", gateway.id))?;
    }
    Ok(())
}

/// Delete the NAT gateway of each subnet, if present. The provider keys
/// NAT gateways by (vpc, subnet); there is no collection listing. Wrapped
/// as a best-effort block by the caller.
async fn remove_nat_gateways<A: CloudApi>(api: &A, vpc_id: &VpcId) -> Result<()> {
    for subnet_id in api.list_subnets(vpc_id).await? {
        if let Some(nat_gateway_id) = api.find_nat_gateway(vpc_id, &subnet_id).await? {
            info!(nat_gateway_id = %nat_gateway_id, "Deleting NAT gateway");
            api.delete_nat_gateway(&nat_gateway_id).await?;
        }
    }
    Ok(())
}

/// Delete every non-local route on every route table. Each deletion is
/// independently tolerant; the implicit `local` route cannot be deleted
/// and is skipped.
async fn flush_routes<A: CloudApi>(api: &A, vpc_id: &VpcId) -> Result<()> {
    for table in api.list_route_tables(vpc_id).await? {
        for route in table.routes.iter().filter(|r| !r.is_local()) {
            policy::tolerate(
                api.delete_route(&table.id, &route.destination).await,
                &format!("delete route {}", route.destination),
            );
        }
    }
    Ok(())
}

/// Delete every load balancer whose subnet set intersects the VPC's, then
/// poll until none remain. Subnet intersection is the only available
/// correlation to the VPC, so membership is re-filtered on every round.
async fn remove_load_balancers<A, L>(
    api: &A,
    lb: &L,
    vpc_id: &VpcId,
    opts: &TeardownOptions,
) -> Result<()>
where
    A: CloudApi,
    L: LoadBalancerApi,
{
    let subnets: HashSet<String> = api.list_subnets(vpc_id).await?.into_iter().collect();
    if subnets.is_empty() {
        return Ok(());
    }

    let in_vpc = |balancer: &crate::model::LoadBalancerSummary| {
        balancer.subnet_ids.iter().any(|s| subnets.contains(s))
    };

    for balancer in lb.list_load_balancers().await? {
        if in_vpc(&balancer) {
            info!(name = %balancer.name, "Deleting load balancer");
            lb.delete_load_balancer(&balancer.name)
                .await
                .with_context(|| format!("Failed to delete load balancer {}", balancer.name))?;
            pause(opts).await;
        }
    }

    let in_vpc = &in_vpc;
    let outcome = wait::poll_until(&opts.poll, "load balancers removed", || async move {
        let remaining: Vec<String> = lb
            .list_load_balancers()
            .await?
            .into_iter()
            .filter(|b| in_vpc(b))
            .map(|b| b.name)
            .collect();
        if !remaining.is_empty() {
            info!(remaining = ?remaining, "Waiting for load balancers to be removed");
        }
        Ok(remaining.is_empty())
    })
    .await?;

    if outcome == PollOutcome::Exhausted {
        info!("Load balancers still listed, proceeding");
    }
    Ok(())
}

/// Disassociate non-main route-table associations, delete route tables
/// without a main association, then delete every subnet. The main
/// association is never touched: removing it would leave the VPC without
/// an implicit route table. Failures propagate.
async fn remove_route_tables_and_subnets<A: CloudApi>(api: &A, vpc_id: &VpcId) -> Result<()> {
    // Re-resolve the VPC; it may have been deleted out from under us
    if !api.vpc_exists(vpc_id).await? {
        return Ok(());
    }

    for table in api.list_route_tables(vpc_id).await? {
        for association in &table.associations {
            if association.main || association.subnet_id.is_none() {
                continue;
            }
            api.disassociate_route_table(&association.id)
                .await
                .with_context(|| {
                    format!("Failed to disassociate route table association {}", association.id)
                })?;
        }
    }

    for table in api.list_route_tables(vpc_id).await? {
        if table.has_main_association() {
            continue;
        }
        info!(route_table_id = %table.id, "Deleting route table");
        api.delete_route_table(&table.id)
            .await
            .with_context(|| format!("Failed to delete route table {}", table.id))?;
    }

    for subnet_id in api.list_subnets(vpc_id).await? {
        info!(subnet_id = %subnet_id, "Deleting subnet");
        api.delete_subnet(&subnet_id)
            .await
            .with_context(|| format!("Failed to delete subnet {subnet_id}"))?;
    }

    Ok(())
}

/// Revoke every ingress and egress grant on every security group. Groups
/// may reference each other as grant sources; unwinding the
/// cross-references first is what makes the deletes below possible.
/// Failures propagate.
async fn revoke_security_group_rules<A: CloudApi>(api: &A, vpc_id: &VpcId) -> Result<()> {
    for group in api.list_security_groups(vpc_id).await? {
        for rule in &group.ingress {
            for grant in &rule.grants {
                api.revoke_ingress(&group.id, rule, grant)
                    .await
                    .with_context(|| format!("Failed to revoke ingress on {}", group.id))?;
            }
        }
        for rule in &group.egress {
            for grant in &rule.grants {
                api.revoke_egress(&group.id, rule, grant)
                    .await
                    .with_context(|| format!("Failed to revoke egress on {}", group.id))?;
            }
        }
    }
    Ok(())
}

/// Delete every security group except the provider-managed "default" one,
/// tolerantly per group.
async fn remove_security_groups<A: CloudApi>(api: &A, vpc_id: &VpcId) -> Result<()> {
    for group in api.list_security_groups(vpc_id).await? {
        if group.is_default() {
            continue;
        }
        info!(group_id = %group.id, name = %group.name, "Deleting security group");
        policy::tolerate(
            api.delete_security_group(&group.id).await,
            &format!("delete security group {}", group.id),
        );
    }
    Ok(())
}

/// What a teardown run would delete, without mutating anything.
#[derive(Debug, Default)]
pub struct TeardownPlan {
    pub instances: Vec<String>,
    pub peering_connections: Vec<String>,
    pub network_interfaces: Vec<String>,
    pub internet_gateways: Vec<String>,
    pub nat_gateways: Vec<String>,
    pub route_tables: Vec<String>,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub load_balancers: Vec<String>,
}

impl TeardownPlan {
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
            && self.peering_connections.is_empty()
            && self.network_interfaces.is_empty()
            && self.internet_gateways.is_empty()
            && self.nat_gateways.is_empty()
            && self.route_tables.is_empty()
            && self.subnets.is_empty()
            && self.security_groups.is_empty()
            && self.load_balancers.is_empty()
    }
}

/// Discover everything a teardown of `vpc_id` would touch. Read-only.
pub async fn plan<A, L>(api: &A, load_balancers: Option<&L>, vpc_id: &VpcId) -> Result<TeardownPlan>
where
    A: CloudApi,
    L: LoadBalancerApi,
{
    let mut plan = TeardownPlan {
        instances: api
            .list_instances(vpc_id)
            .await?
            .into_iter()
            .filter(|i| i.state != InstanceState::Terminated)
            .map(|i| format!("{} ({})", i.id, i.state))
            .collect(),
        peering_connections: api.list_peering_connections(vpc_id).await?,
        network_interfaces: api.list_network_interfaces(vpc_id).await?,
        internet_gateways: api
            .list_internet_gateways(vpc_id)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect(),
        route_tables: api
            .list_route_tables(vpc_id)
            .await?
            .into_iter()
            .filter(|t| !t.has_main_association())
            .map(|t| t.id)
            .collect(),
        subnets: api.list_subnets(vpc_id).await?,
        security_groups: api
            .list_security_groups(vpc_id)
            .await?
            .into_iter()
            .filter(|g| !g.is_default())
            .map(|g| format!("{} ({})", g.id, g.name))
            .collect(),
        ..Default::default()
    };

    for subnet_id in &plan.subnets {
        if let Some(nat_gateway_id) = api.find_nat_gateway(vpc_id, subnet_id).await? {
            plan.nat_gateways.push(nat_gateway_id);
        }
    }

    if let Some(lb) = load_balancers {
        let subnets: HashSet<&String> = plan.subnets.iter().collect();
        plan.load_balancers = lb
            .list_load_balancers()
            .await?
            .into_iter()
            .filter(|b| b.subnet_ids.iter().any(|s| subnets.contains(s)))
            .map(|b| b.name)
            .collect();
    }

    Ok(plan)
}
