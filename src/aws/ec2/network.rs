//! Addresses, network interfaces, internet gateways, NAT gateways

use super::Ec2Client;
use crate::aws::error::ignore_not_found;
use crate::aws::filter::Ec2Filter;
use crate::model::{AddressSummary, InternetGatewaySummary, VpcId};
use anyhow::{Context, Result};
use tracing::{debug, info};

impl Ec2Client {
    /// List Elastic IP addresses associated with an instance
    pub async fn list_addresses(&self, instance_id: &str) -> Result<Vec<AddressSummary>> {
        let response = self
            .client
            .describe_addresses()
            .filters(Ec2Filter::InstanceId(instance_id).build())
            .send()
            .await
            .context("Failed to describe addresses")?;

        Ok(response
            .addresses()
            .iter()
            .map(|a| AddressSummary {
                allocation_id: a.allocation_id().map(str::to_string),
                association_id: a.association_id().map(str::to_string),
            })
            .collect())
    }

    /// Disassociate an Elastic IP from whatever it is attached to
    pub async fn disassociate_address(&self, association_id: &str) -> Result<()> {
        info!(association_id = %association_id, "Disassociating Elastic IP");

        self.client
            .disassociate_address()
            .association_id(association_id)
            .send()
            .await
            .context("Failed to disassociate address")?;

        Ok(())
    }

    /// Release an Elastic IP allocation.
    ///
    /// Already-released addresses are treated as success.
    pub async fn release_address(&self, allocation_id: &str) -> Result<()> {
        info!(allocation_id = %allocation_id, "Releasing Elastic IP");

        let result = self
            .client
            .release_address()
            .allocation_id(allocation_id)
            .send()
            .await;

        match ignore_not_found(result).context("Failed to release address")? {
            Some(_) => info!(allocation_id = %allocation_id, "Released Elastic IP"),
            None => debug!(allocation_id = %allocation_id, "Elastic IP already released"),
        }
        Ok(())
    }

    /// List network interface ids in the VPC
    pub async fn list_network_interfaces(&self, vpc_id: &VpcId) -> Result<Vec<String>> {
        let response = self
            .client
            .describe_network_interfaces()
            .filters(Ec2Filter::VpcId(vpc_id.as_str()).build())
            .send()
            .await
            .context("Failed to describe network interfaces")?;

        Ok(response
            .network_interfaces()
            .iter()
            .filter_map(|nic| nic.network_interface_id().map(str::to_string))
            .collect())
    }

    /// Delete a network interface
    pub async fn delete_network_interface(&self, nic_id: &str) -> Result<()> {
        info!(nic_id = %nic_id, "Deleting network interface");

        self.client
            .delete_network_interface()
            .network_interface_id(nic_id)
            .send()
            .await
            .context("Failed to delete network interface")?;

        Ok(())
    }

    /// List internet gateways attached to the VPC, with their attachments
    pub async fn list_internet_gateways(
        &self,
        vpc_id: &VpcId,
    ) -> Result<Vec<InternetGatewaySummary>> {
        let response = self
            .client
            .describe_internet_gateways()
            .filters(Ec2Filter::AttachmentVpcId(vpc_id.as_str()).build())
            .send()
            .await
            .context("Failed to describe internet gateways")?;

        Ok(response
            .internet_gateways()
            .iter()
            .filter_map(|gw| {
                Some(InternetGatewaySummary {
                    id: gw.internet_gateway_id()?.to_string(),
                    attached_vpcs: gw
                        .attachments()
                        .iter()
                        .filter_map(|a| a.vpc_id().map(str::to_string))
                        .collect(),
                })
            })
            .collect())
    }

    /// Detach an internet gateway from a VPC
    pub async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<()> {
        info!(gateway_id = %gateway_id, vpc_id = %vpc_id, "Detaching internet gateway");

        self.client
            .detach_internet_gateway()
            .internet_gateway_id(gateway_id)
            .vpc_id(vpc_id)
            .send()
            .await
            .context("Failed to detach internet gateway")?;

        Ok(())
    }

    /// Delete a detached internet gateway
    pub async fn delete_internet_gateway(&self, gateway_id: &str) -> Result<()> {
        info!(gateway_id = %gateway_id, "Deleting internet gateway");

        self.client
            .delete_internet_gateway()
            .internet_gateway_id(gateway_id)
            .send()
            .await
            .context("Failed to delete internet gateway")?;

        Ok(())
    }

    /// Find the NAT gateway keyed by (vpc, subnet), if any.
    ///
    /// The provider keys NAT gateways per subnet; a (vpc-id, subnet-id)
    /// filter pair narrows the listing to at most one live gateway.
    pub async fn find_nat_gateway(
        &self,
        vpc_id: &VpcId,
        subnet_id: &str,
    ) -> Result<Option<String>> {
        let response = self
            .client
            .describe_nat_gateways()
            .filter(Ec2Filter::VpcId(vpc_id.as_str()).build())
            .filter(Ec2Filter::SubnetId(subnet_id).build())
            .send()
            .await
            .context("Failed to describe NAT gateways")?;

        Ok(response
            .nat_gateways()
            .iter()
            .filter_map(|nat| nat.nat_gateway_id().map(str::to_string))
            .next())
    }

    /// Delete a NAT gateway (deletion completes asynchronously)
    pub async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> Result<()> {
        info!(nat_gateway_id = %nat_gateway_id, "Deleting NAT gateway");

        self.client
            .delete_nat_gateway()
            .nat_gateway_id(nat_gateway_id)
            .send()
            .await
            .context("Failed to delete NAT gateway")?;

        Ok(())
    }
}
