//! Peering connections, VPC endpoints, route tables, subnets, the VPC

use super::Ec2Client;
use crate::aws::error::ignore_not_found;
use crate::aws::filter::Ec2Filter;
use crate::model::{RouteSummary, RouteTableAssociation, RouteTableSummary, VpcId};
use anyhow::{Context, Result};
use tracing::{debug, info};

impl Ec2Client {
    /// List peering connections where this VPC is the requester
    pub async fn list_peering_connections(&self, vpc_id: &VpcId) -> Result<Vec<String>> {
        let response = self
            .client
            .describe_vpc_peering_connections()
            .filters(Ec2Filter::RequesterVpcId(vpc_id.as_str()).build())
            .send()
            .await
            .context("Failed to describe peering connections")?;

        Ok(response
            .vpc_peering_connections()
            .iter()
            .filter_map(|p| p.vpc_peering_connection_id().map(str::to_string))
            .collect())
    }

    /// Delete a peering connection
    pub async fn delete_peering_connection(&self, peering_id: &str) -> Result<()> {
        info!(peering_id = %peering_id, "Deleting peering connection");

        self.client
            .delete_vpc_peering_connection()
            .vpc_peering_connection_id(peering_id)
            .send()
            .await
            .context("Failed to delete peering connection")?;

        Ok(())
    }

    /// Find an available VPC endpoint for this VPC, if any
    pub async fn find_available_endpoint(&self, vpc_id: &VpcId) -> Result<Option<String>> {
        let response = self
            .client
            .describe_vpc_endpoints()
            .filters(Ec2Filter::VpcId(vpc_id.as_str()).build())
            .filters(Ec2Filter::EndpointState("available").build())
            .send()
            .await
            .context("Failed to describe VPC endpoints")?;

        Ok(response
            .vpc_endpoints()
            .iter()
            .filter_map(|e| e.vpc_endpoint_id().map(str::to_string))
            .next())
    }

    /// Delete a VPC endpoint
    pub async fn delete_endpoint(&self, endpoint_id: &str) -> Result<()> {
        info!(endpoint_id = %endpoint_id, "Deleting VPC endpoint");

        self.client
            .delete_vpc_endpoints()
            .vpc_endpoint_ids(endpoint_id)
            .send()
            .await
            .context("Failed to delete VPC endpoint")?;

        Ok(())
    }

    /// List route tables in the VPC with their routes and associations
    pub async fn list_route_tables(&self, vpc_id: &VpcId) -> Result<Vec<RouteTableSummary>> {
        let response = self
            .client
            .describe_route_tables()
            .filters(Ec2Filter::VpcId(vpc_id.as_str()).build())
            .send()
            .await
            .context("Failed to describe route tables")?;

        Ok(response
            .route_tables()
            .iter()
            .filter_map(|rt| {
                Some(RouteTableSummary {
                    id: rt.route_table_id()?.to_string(),
                    routes: rt
                        .routes()
                        .iter()
                        .filter_map(|r| {
                            Some(RouteSummary {
                                destination: r.destination_cidr_block()?.to_string(),
                                gateway_id: r.gateway_id().map(str::to_string),
                            })
                        })
                        .collect(),
                    associations: rt
                        .associations()
                        .iter()
                        .filter_map(|a| {
                            Some(RouteTableAssociation {
                                id: a.route_table_association_id()?.to_string(),
                                subnet_id: a.subnet_id().map(str::to_string),
                                main: a.main().unwrap_or(false),
                            })
                        })
                        .collect(),
                })
            })
            .collect())
    }

    /// Delete one route from a route table by destination CIDR.
    ///
    /// An already-deleted route is treated as success.
    pub async fn delete_route(&self, route_table_id: &str, destination: &str) -> Result<()> {
        info!(route_table_id = %route_table_id, destination = %destination, "Deleting route");

        let result = self
            .client
            .delete_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(destination)
            .send()
            .await;

        match ignore_not_found(result).context("Failed to delete route")? {
            Some(_) => {}
            None => debug!(destination = %destination, "Route already deleted"),
        }
        Ok(())
    }

    /// Disassociate a route table from a subnet
    pub async fn disassociate_route_table(&self, association_id: &str) -> Result<()> {
        info!(association_id = %association_id, "Disassociating route table");

        self.client
            .disassociate_route_table()
            .association_id(association_id)
            .send()
            .await
            .context("Failed to disassociate route table")?;

        Ok(())
    }

    /// Delete a route table
    pub async fn delete_route_table(&self, route_table_id: &str) -> Result<()> {
        info!(route_table_id = %route_table_id, "Deleting route table");

        self.client
            .delete_route_table()
            .route_table_id(route_table_id)
            .send()
            .await
            .context("Failed to delete route table")?;

        Ok(())
    }

    /// List subnet ids in the VPC
    pub async fn list_subnets(&self, vpc_id: &VpcId) -> Result<Vec<String>> {
        let response = self
            .client
            .describe_subnets()
            .filters(Ec2Filter::VpcId(vpc_id.as_str()).build())
            .send()
            .await
            .context("Failed to describe subnets")?;

        Ok(response
            .subnets()
            .iter()
            .filter_map(|s| s.subnet_id().map(str::to_string))
            .collect())
    }

    /// Delete a subnet
    pub async fn delete_subnet(&self, subnet_id: &str) -> Result<()> {
        info!(subnet_id = %subnet_id, "Deleting subnet");

        self.client
            .delete_subnet()
            .subnet_id(subnet_id)
            .send()
            .await
            .context("Failed to delete subnet")?;

        Ok(())
    }

    /// Re-resolve the VPC by id; false once it no longer exists
    pub async fn vpc_exists(&self, vpc_id: &VpcId) -> Result<bool> {
        let result = self
            .client
            .describe_vpcs()
            .vpc_ids(vpc_id.as_str())
            .send()
            .await;

        match ignore_not_found(result).context("Failed to describe VPC")? {
            Some(response) => Ok(!response.vpcs().is_empty()),
            None => Ok(false),
        }
    }

    /// Delete the VPC itself
    pub async fn delete_vpc(&self, vpc_id: &VpcId) -> Result<()> {
        info!(vpc_id = %vpc_id, "Deleting VPC");

        self.client
            .delete_vpc()
            .vpc_id(vpc_id.as_str())
            .send()
            .await
            .context("Failed to delete VPC")?;

        Ok(())
    }
}
