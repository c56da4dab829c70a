//! Security group management

use super::Ec2Client;
use crate::aws::error::{classify_anyhow_error, ignore_not_found};
use crate::aws::filter::Ec2Filter;
use crate::model::{RuleGrant, SecurityGroupRule, SecurityGroupSummary, VpcId};
use anyhow::{Context, Result};
use aws_sdk_ec2::types::{IpPermission, IpRange, UserIdGroupPair};
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::{debug, info, warn};

fn convert_rule(permission: &IpPermission) -> SecurityGroupRule {
    let mut grants: Vec<RuleGrant> = permission
        .user_id_group_pairs()
        .iter()
        .map(|pair| RuleGrant {
            group_id: pair.group_id().map(str::to_string),
            cidr_ip: None,
        })
        .collect();

    grants.extend(permission.ip_ranges().iter().map(|range| RuleGrant {
        group_id: None,
        cidr_ip: range.cidr_ip().map(str::to_string),
    }));

    SecurityGroupRule {
        protocol: permission.ip_protocol().map(str::to_string),
        from_port: permission.from_port(),
        to_port: permission.to_port(),
        grants,
    }
}

/// Rebuild the single-grant SDK permission for a revoke call
fn revoke_permission(rule: &SecurityGroupRule, grant: &RuleGrant) -> IpPermission {
    let mut builder = IpPermission::builder()
        .set_ip_protocol(rule.protocol.clone())
        .set_from_port(rule.from_port)
        .set_to_port(rule.to_port);

    if let Some(group_id) = &grant.group_id {
        builder = builder.user_id_group_pairs(UserIdGroupPair::builder().group_id(group_id).build());
    }
    if let Some(cidr_ip) = &grant.cidr_ip {
        builder = builder.ip_ranges(IpRange::builder().cidr_ip(cidr_ip).build());
    }

    builder.build()
}

impl Ec2Client {
    /// List security groups in the VPC with their rule lists
    pub async fn list_security_groups(&self, vpc_id: &VpcId) -> Result<Vec<SecurityGroupSummary>> {
        let response = self
            .client
            .describe_security_groups()
            .filters(Ec2Filter::VpcId(vpc_id.as_str()).build())
            .send()
            .await
            .context("Failed to describe security groups")?;

        Ok(response
            .security_groups()
            .iter()
            .filter_map(|group| {
                Some(SecurityGroupSummary {
                    id: group.group_id()?.to_string(),
                    name: group.group_name().unwrap_or_default().to_string(),
                    ingress: group.ip_permissions().iter().map(convert_rule).collect(),
                    egress: group
                        .ip_permissions_egress()
                        .iter()
                        .map(convert_rule)
                        .collect(),
                })
            })
            .collect())
    }

    /// Revoke one ingress grant from a security group.
    ///
    /// An already-revoked rule is treated as success.
    pub async fn revoke_ingress(
        &self,
        group_id: &str,
        rule: &SecurityGroupRule,
        grant: &RuleGrant,
    ) -> Result<()> {
        debug!(group_id = %group_id, "Revoking ingress grant");

        let result = self
            .client
            .revoke_security_group_ingress()
            .group_id(group_id)
            .ip_permissions(revoke_permission(rule, grant))
            .send()
            .await;

        match ignore_not_found(result).context("Failed to revoke ingress rule")? {
            Some(_) => {}
            None => debug!(group_id = %group_id, "Ingress rule already revoked"),
        }
        Ok(())
    }

    /// Revoke one egress grant from a security group.
    ///
    /// An already-revoked rule is treated as success.
    pub async fn revoke_egress(
        &self,
        group_id: &str,
        rule: &SecurityGroupRule,
        grant: &RuleGrant,
    ) -> Result<()> {
        debug!(group_id = %group_id, "Revoking egress grant");

        let result = self
            .client
            .revoke_security_group_egress()
            .group_id(group_id)
            .ip_permissions(revoke_permission(rule, grant))
            .send()
            .await;

        match ignore_not_found(result).context("Failed to revoke egress rule")? {
            Some(_) => {}
            None => debug!(group_id = %group_id, "Egress rule already revoked"),
        }
        Ok(())
    }

    /// Delete a security group.
    ///
    /// An already-deleted group is treated as success. Retries on
    /// DependencyViolation: ENIs keep the group referenced for a while
    /// after instance termination.
    pub async fn delete_security_group(&self, group_id: &str) -> Result<()> {
        info!(group_id = %group_id, "Deleting security group");

        let group_id_for_log = group_id.to_string();

        (|| async {
            let result = self
                .client
                .delete_security_group()
                .group_id(group_id)
                .send()
                .await;
            match ignore_not_found(result).context("Failed to delete security group")? {
                Some(_) => info!(group_id = %group_id, "Security group deleted"),
                None => debug!(group_id = %group_id, "Security group already deleted"),
            }
            Ok(())
        })
        .retry(
            ExponentialBuilder::default()
                .with_min_delay(Duration::from_secs(10))
                .with_max_delay(Duration::from_secs(60))
                .with_max_times(5),
        )
        .when(|e| classify_anyhow_error(e).is_retryable())
        .notify(|e, dur| {
            warn!(
                group_id = %group_id_for_log,
                delay = ?dur,
                error = %e,
                "Security group deletion failed, retrying..."
            );
        })
        .await
    }
}
