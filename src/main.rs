//! vpc-teardown: destroy a VPC and every resource attached to it

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;
use vpc_teardown::aws::{AwsContext, Ec2Client, ElbClient};
use vpc_teardown::config::{
    DEFAULT_MAX_POLL_ROUNDS, PollConfig, TeardownOptions, TeardownRequest,
};
use vpc_teardown::model::VpcId;
use vpc_teardown::teardown;

#[derive(Parser, Debug)]
#[command(name = "vpc-teardown")]
#[command(about = "Tear down a VPC and every resource attached to it")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// Flags shared between run and plan
#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// The VPC to tear down
    vpc_id: String,

    /// AWS region
    #[arg(long, default_value = "eu-west-2")]
    region: String,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long)]
    aws_profile: Option<String>,

    /// Skip the load-balancer stage entirely (no ELB capability)
    #[arg(long)]
    skip_load_balancers: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tear down the VPC and everything attached to it
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Proceed even if live instances exist, terminating them
        #[arg(long)]
        terminate_instances: bool,

        /// Seconds between polling rounds
        #[arg(long, default_value = "5")]
        poll_interval_secs: u64,

        /// Maximum polling rounds before proceeding anyway
        #[arg(long, default_value_t = DEFAULT_MAX_POLL_ROUNDS)]
        poll_rounds: u32,

        /// Seconds to pause between paced mutations
        #[arg(long, default_value = "5")]
        pause_secs: u64,
    },

    /// List what a teardown would delete, without mutating anything
    Plan {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Run {
            common,
            terminate_instances,
            poll_interval_secs,
            poll_rounds,
            pause_secs,
        } => {
            let (ec2, elb) = build_clients(&common).await;

            let request = TeardownRequest::new(common.vpc_id.as_str(), terminate_instances);
            let options = TeardownOptions {
                poll: PollConfig {
                    interval: Duration::from_secs(poll_interval_secs),
                    max_rounds: poll_rounds,
                },
                pause: Duration::from_secs(pause_secs),
            };

            info!(
                vpc_id = %request.vpc_id,
                terminate_instances,
                region = %common.region,
                "Starting teardown"
            );

            teardown::run(&ec2, elb.as_ref(), &request, &options).await?;
        }

        Command::Plan { common } => {
            let (ec2, elb) = build_clients(&common).await;
            let vpc_id = VpcId::new(common.vpc_id);

            let plan = teardown::plan(&ec2, elb.as_ref(), &vpc_id).await?;

            if plan.is_empty() {
                println!("Nothing attached to {vpc_id}; only the VPC itself would be deleted.");
                return Ok(());
            }

            println!("Teardown of {vpc_id} would delete:");
            print_section("Instances", &plan.instances);
            print_section("Peering connections", &plan.peering_connections);
            print_section("Network interfaces", &plan.network_interfaces);
            print_section("Internet gateways", &plan.internet_gateways);
            print_section("NAT gateways", &plan.nat_gateways);
            print_section("Load balancers", &plan.load_balancers);
            print_section("Route tables", &plan.route_tables);
            print_section("Subnets", &plan.subnets);
            print_section("Security groups", &plan.security_groups);
            println!("and finally the VPC itself.");
        }
    }

    Ok(())
}

async fn build_clients(common: &CommonArgs) -> (Ec2Client, Option<ElbClient>) {
    if let Some(profile) = &common.aws_profile {
        info!(profile = %profile, "Using AWS profile");
    }

    let ctx = AwsContext::with_profile(&common.region, common.aws_profile.as_deref()).await;
    let ec2 = Ec2Client::from_context(&ctx);
    let elb = if common.skip_load_balancers {
        None
    } else {
        Some(ElbClient::from_context(&ctx))
    };

    (ec2, elb)
}

fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {title}:");
    for item in items {
        println!("    {item}");
    }
}
