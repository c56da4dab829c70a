//! vpc-teardown - destroy a VPC and every resource attached to it
//!
//! The teardown sequencer walks the VPC's resource dependency graph in a
//! fixed stage order (instances, peering, endpoints, addresses, network
//! interfaces, gateways, routes, load balancers, route tables, subnets,
//! security groups, the VPC itself), polling asynchronous deletions to
//! convergence and tolerating failures on steps whose target may already
//! be gone.

pub mod api;
pub mod aws;
pub mod config;
pub mod guard;
pub mod model;
pub mod policy;
pub mod teardown;
pub mod wait;
