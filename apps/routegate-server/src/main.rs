mod endpoints;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use routegate::{AppConfig, Catalog, Registrar, Registration};
use routegate_auth::{AuthRequirement, TokenValidator};

use std::path::PathBuf;
use std::sync::Arc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// RouteGate Server - declarative endpoints with synthesized authorization
#[derive(Parser)]
#[command(name = "routegate-server")]
#[command(about = "RouteGate Server - declarative endpoints with synthesized authorization")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and endpoint registration, then exit
    Check,
    /// Print the route table and exit
    Routes,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Layered config: defaults -> YAML (if provided) -> env (ROUTEGATE__*)
    let config = AppConfig::load(cli.config.as_deref())?;

    routegate::telemetry::init_logging(&config.logging, cli.verbose)?;

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check(&config),
        Commands::Routes => print_routes(&config),
    }
}

/// Run the registration pass over every endpoint linked into this binary
fn register(config: &AppConfig) -> Result<Registration> {
    let catalog = Catalog::from_inventory()
        .exclude_prefixes(config.catalog.excluded_prefixes.iter().cloned());

    let registration = Registrar::new(config.auth.enabled)
        .with_policies(endpoints::host_policies()?)
        .register(&catalog)?;
    Ok(registration)
}

fn token_validator(config: &AppConfig) -> Result<Option<Arc<dyn TokenValidator>>> {
    Ok(config
        .auth
        .build_validator()?
        .map(|validator| Arc::new(validator) as Arc<dyn TokenValidator>))
}

fn check(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let validator = token_validator(config)?;
    let registration = register(config)?;
    let endpoints = registration.descriptors().len();
    let bindings = registration.bindings().len();
    let policies = registration.policies().len();
    let _router = registration.into_router(validator)?;

    println!("Configuration is valid");
    println!("Endpoints: {endpoints}");
    println!("Route bindings: {bindings}");
    println!("Authorization policies: {policies}");
    Ok(())
}

fn print_routes(config: &AppConfig) -> Result<()> {
    let registration = register(config)?;
    for binding in registration.bindings() {
        let access = match &binding.requirement {
            AuthRequirement::Unconstrained => "unconstrained".to_owned(),
            AuthRequirement::Anonymous => "anonymous".to_owned(),
            AuthRequirement::Authorized(access) => format!(
                "authorized policies=[{}] roles=[{}]",
                access.policies.join(", "),
                access.roles.join(", ")
            ),
        };
        println!(
            "{:<7} {:<20} {:<45} {access}",
            binding.verb.as_str(),
            binding.route,
            binding.endpoint
        );
    }
    Ok(())
}

async fn run_server(config: &AppConfig) -> Result<()> {
    tracing::info!("RouteGate Server starting");

    let validator = token_validator(config)?;
    let router = register(config)?.into_router(validator)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("RouteGate Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
