// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kube::Client;
use managed_api_verify::{
    constants::{
        DEFAULT_GCP_TIER, DEFAULT_OBSERVABILITY_NAMESPACE, DEFAULT_OPERATOR_NAMESPACE,
        DEFAULT_PROMETHEUS_URL,
    },
    crd::RHMI,
    custom_domain::{verify_custom_domain, CustomDomainReport},
    gcp::{verify_network, verify_postgres_instances, GcpRestClient, NetworkReport},
    prometheus::{verify_scrape_targets, verify_version_metric, PrometheusClient},
    store::{ClusterStore, KubeStore},
};
use tracing::{debug, info};

/// Verification checks for a managed API add-on installation
#[derive(Parser, Debug)]
#[command(name = "managed-api-verify", version, about, long_about = None)]
struct Cli {
    /// Namespace of the add-on operator and its installation
    #[arg(
        long,
        global = true,
        env = "OPERATOR_NAMESPACE",
        default_value = DEFAULT_OPERATOR_NAMESPACE
    )]
    namespace: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the custom domain override has a Ready CustomDomain
    CustomDomain,

    /// Check Prometheus scrapes every target the installation type expects
    PrometheusTargets(PrometheusArgs),

    /// Check the version metric carries a semantic version
    VersionMetric(PrometheusArgs),

    /// Check the reserved address range of the standalone GCP network
    GcpNetwork(GcpNetworkArgs),

    /// Check every Postgres resource has a Cloud SQL instance
    GcpPostgres(GcpArgs),
}

#[derive(Args, Debug)]
struct PrometheusArgs {
    /// Base URL of the Prometheus HTTP API
    #[arg(long, env = "PROMETHEUS_URL", default_value = DEFAULT_PROMETHEUS_URL)]
    url: String,

    /// Namespace prefix of the expected scrape jobs
    #[arg(long, default_value = DEFAULT_OBSERVABILITY_NAMESPACE)]
    observability_namespace: String,
}

#[derive(Args, Debug)]
struct GcpArgs {
    /// OAuth access token for the GCP REST APIs
    #[arg(long, env = "GCP_ACCESS_TOKEN", hide_env_values = true)]
    token: String,
}

#[derive(Args, Debug)]
struct GcpNetworkArgs {
    #[command(flatten)]
    gcp: GcpArgs,

    /// Strategy tier to verify
    #[arg(long, default_value = DEFAULT_GCP_TIER)]
    tier: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("managed-api-verify")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn init_tracing() {
    // Respects RUST_LOG (default info) and RUST_LOG_FORMAT (json or text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_tracing();
    debug!(namespace = %cli.namespace, "Starting verification");

    let client = Client::try_default()
        .await
        .context("failed to create Kubernetes client")?;
    let store = KubeStore::new(client);

    match cli.command {
        Commands::CustomDomain => run_custom_domain(&store, &cli.namespace).await,
        Commands::PrometheusTargets(args) => {
            run_prometheus_targets(&store, &cli.namespace, &args).await
        }
        Commands::VersionMetric(args) => run_version_metric(&args).await,
        Commands::GcpNetwork(args) => run_gcp_network(&store, &cli.namespace, &args).await,
        Commands::GcpPostgres(args) => run_gcp_postgres(&store, &cli.namespace, &args).await,
    }
}

/// First installation in `namespace`, if any.
async fn find_installation(store: &KubeStore, namespace: &str) -> Result<Option<RHMI>> {
    let installations = store
        .list_installations(namespace)
        .await
        .with_context(|| format!("failed to list installations in {namespace}"))?;

    if installations.len() > 1 {
        debug!(
            namespace = %namespace,
            count = installations.len(),
            "Multiple installations found, using the first"
        );
    }
    Ok(installations.into_iter().next())
}

async fn run_custom_domain(store: &KubeStore, namespace: &str) -> Result<()> {
    let installation = find_installation(store, namespace).await?;

    match verify_custom_domain(store, installation.as_ref()).await? {
        CustomDomainReport::NotConfigured => {
            info!(namespace = %namespace, "No custom domain configured");
        }
        CustomDomainReport::Ready { domain, claim } => {
            info!(
                domain = %domain,
                endpoint = claim.status.as_ref().and_then(|s| s.endpoint.as_deref()).unwrap_or_default(),
                "Custom domain is ready"
            );
        }
    }
    Ok(())
}

async fn run_prometheus_targets(
    store: &KubeStore,
    namespace: &str,
    args: &PrometheusArgs,
) -> Result<()> {
    let installation = find_installation(store, namespace)
        .await?
        .with_context(|| format!("no installation found in {namespace}"))?;
    let installation_type = installation.installation_type();

    let client = PrometheusClient::new(&args.url)?;
    verify_scrape_targets(&client, &installation_type, &args.observability_namespace).await?;

    info!(installation_type = %installation_type, "Prometheus targets check passed");
    Ok(())
}

async fn run_version_metric(args: &PrometheusArgs) -> Result<()> {
    let client = PrometheusClient::new(&args.url)?;
    let version = verify_version_metric(&client).await?;

    info!(version = %version, "Version metric check passed");
    Ok(())
}

async fn run_gcp_network(store: &KubeStore, namespace: &str, args: &GcpNetworkArgs) -> Result<()> {
    let api = GcpRestClient::new(args.gcp.token.as_str());

    match verify_network(store, &api, namespace, &args.tier).await? {
        NetworkReport::Skipped { reason } => {
            info!(tier = %args.tier, reason = %reason, "GCP network check skipped");
        }
        NetworkReport::Verified {
            project,
            cidr,
            address,
        } => {
            info!(
                project = %project,
                address = %address.name,
                cidr = %cidr.map(|c| c.to_string()).unwrap_or_default(),
                "GCP network verified"
            );
        }
    }
    Ok(())
}

async fn run_gcp_postgres(store: &KubeStore, namespace: &str, args: &GcpArgs) -> Result<()> {
    let api = GcpRestClient::new(args.token.as_str());
    let instances = verify_postgres_instances(store, &api, namespace).await?;

    info!(count = instances.len(), "Cloud SQL instances verified");
    Ok(())
}
