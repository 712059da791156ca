/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use cloudfront_access::os_shim_internal::{Env, Fs};
use cloudfront_access::{
    check_status, AccessConfig, AccessDispatcher, AccessRequest, Clients, DeliveryMode, Grant,
    Scheme, StaticDistribution,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cloudfront-access", author, version, about)]
struct Args {
    /// Domain name CloudFront assigned to the distribution, e.g. `d111111abcdef8.cloudfront.net`.
    /// Required to issue grants; without it `status` skips the distribution probe.
    #[arg(long, global = true)]
    distribution_domain: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print a signed URL for an object
    Url(GrantArgs),
    /// Print signed cookies and the URL to redirect to
    Cookie(GrantArgs),
    /// Report which settings are present
    Status,
}

#[derive(ClapArgs, Debug, PartialEq, Eq)]
struct GrantArgs {
    /// Object key, e.g. `video.mp4`
    key: String,
    /// `http` or `https`
    #[arg(long, default_value = "http")]
    scheme: Scheme,
    /// Lifetime in minutes
    #[arg(long)]
    ttl: Option<u64>,
    /// Resource or pattern the grant covers, e.g. `dir/*`
    #[arg(long)]
    resource: Option<String>,
    /// Cookie domain override
    #[arg(long)]
    cookie_domain: Option<String>,
}

impl GrantArgs {
    fn into_request(self, delivery: DeliveryMode) -> AccessRequest {
        let mut request = AccessRequest::new(self.key, self.scheme, delivery);
        if let Some(ttl) = self.ttl {
            request = request.ttl_minutes(ttl);
        }
        if let Some(resource) = self.resource {
            request = request.resource(resource);
        }
        if let Some(domain) = self.cookie_domain {
            request = request.cookie_domain(domain);
        }
        request
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = AccessConfig::from_env(&Env::real()).context("invalid configuration")?;
    let mut clients = Clients::default();
    if let Some(domain) = &args.distribution_domain {
        clients = clients.with_distribution(StaticDistribution::new(domain.as_str()));
    }
    if !matches!(args.command, Command::Status) && args.distribution_domain.is_none() {
        anyhow::bail!("--distribution-domain is required to issue grants");
    }

    match args.command {
        Command::Status => {
            let report = check_status(&config, &clients, &Fs::real()).await;
            for check in &report.checks {
                let mark = match (check.checked, check.passed) {
                    (false, _) => "skip",
                    (true, true) => "ok",
                    (true, false) => "FAIL",
                };
                match &check.detail {
                    Some(detail) => println!("{mark:>4}  {}  ({detail})", check.description),
                    None => println!("{mark:>4}  {}", check.description),
                }
            }
            if !report.all_passed {
                anyhow::bail!("configuration is incomplete");
            }
        }
        Command::Url(grant) => {
            let dispatcher = AccessDispatcher::new(config, clients);
            let grant = dispatcher
                .dispatch(&grant.into_request(DeliveryMode::Url))
                .await?;
            println!("{}", grant.location());
        }
        Command::Cookie(grant) => {
            let dispatcher = AccessDispatcher::new(config, clients);
            let grant = dispatcher
                .dispatch(&grant.into_request(DeliveryMode::Cookie))
                .await?;
            print_cookies(&grant);
        }
    }
    Ok(())
}

fn print_cookies(grant: &Grant) {
    for cookie in grant.cookies() {
        match &cookie.domain {
            Some(domain) => println!(
                "Set-Cookie: {}={}; Domain={domain}",
                cookie.name, cookie.value
            ),
            None => println!("Set-Cookie: {}={}", cookie.name, cookie.value),
        }
    }
    println!("Location: {}", grant.location());
}
