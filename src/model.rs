//! Resource summaries decoupled from the AWS SDK types
//!
//! The sequencer only ever sees these structs; the client layer converts
//! SDK responses into them. This keeps orchestration logic testable
//! against an in-memory fake.

use std::fmt;

/// Identifier of the VPC being torn down, the sole input selecting scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VpcId(pub String);

impl VpcId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VpcId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// EC2 instance lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
    Unknown,
}

impl InstanceState {
    /// Whether the instance no longer needs a stop or terminate request.
    pub fn is_settled(self) -> bool {
        matches!(self, InstanceState::Stopped | InstanceState::Terminated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstanceState::Pending => "pending",
            InstanceState::Running => "running",
            InstanceState::Stopping => "stopping",
            InstanceState::Stopped => "stopped",
            InstanceState::ShuttingDown => "shutting-down",
            InstanceState::Terminated => "terminated",
            InstanceState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An EC2 instance as seen by the sequencer
#[derive(Debug, Clone)]
pub struct InstanceSummary {
    pub id: String,
    pub state: InstanceState,
}

/// An Elastic IP association on an instance
#[derive(Debug, Clone)]
pub struct AddressSummary {
    /// Allocation id (`eipalloc-*`), needed to release the address
    pub allocation_id: Option<String>,
    /// Association id (`eipassoc-*`), present while attached
    pub association_id: Option<String>,
}

/// An internet gateway and the VPCs it is attached to
#[derive(Debug, Clone)]
pub struct InternetGatewaySummary {
    pub id: String,
    pub attached_vpcs: Vec<String>,
}

/// A single route on a route table
#[derive(Debug, Clone)]
pub struct RouteSummary {
    pub destination: String,
    pub gateway_id: Option<String>,
}

impl RouteSummary {
    /// The implicit intra-VPC route; it cannot be deleted.
    pub fn is_local(&self) -> bool {
        self.gateway_id.as_deref() == Some("local")
    }
}

/// A route table association with a subnet (or the implicit main slot)
#[derive(Debug, Clone)]
pub struct RouteTableAssociation {
    pub id: String,
    pub subnet_id: Option<String>,
    pub main: bool,
}

/// A route table with its routes and subnet associations
#[derive(Debug, Clone)]
pub struct RouteTableSummary {
    pub id: String,
    pub routes: Vec<RouteSummary>,
    pub associations: Vec<RouteTableAssociation>,
}

impl RouteTableSummary {
    /// A table carrying the main association backs the whole VPC and must
    /// never be deleted.
    pub fn has_main_association(&self) -> bool {
        self.associations.iter().any(|a| a.main)
    }
}

/// A grant (source) on a security group rule: either another group or a CIDR
#[derive(Debug, Clone)]
pub struct RuleGrant {
    pub group_id: Option<String>,
    pub cidr_ip: Option<String>,
}

/// One ingress or egress rule on a security group
#[derive(Debug, Clone)]
pub struct SecurityGroupRule {
    pub protocol: Option<String>,
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    pub grants: Vec<RuleGrant>,
}

/// A security group with its rule lists
#[derive(Debug, Clone)]
pub struct SecurityGroupSummary {
    pub id: String,
    pub name: String,
    pub ingress: Vec<SecurityGroupRule>,
    pub egress: Vec<SecurityGroupRule>,
}

impl SecurityGroupSummary {
    /// The provider-managed default group cannot be deleted.
    pub fn is_default(&self) -> bool {
        self.name == "default"
    }
}

/// A load balancer, correlated to a VPC only through its subnet set
#[derive(Debug, Clone)]
pub struct LoadBalancerSummary {
    pub name: String,
    pub subnet_ids: Vec<String>,
}
