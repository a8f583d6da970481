use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use perigee::access::PrincipalsFile;
use perigee::grants::connect::{close_connections, connect_to_hosts};
use perigee::grants::resolve::{AccessResolver, SpecResolver};
use perigee::iam::PolicyDocument;
use perigee::postgres::SeaOrmConnector;
use perigee::settings::Settings;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "perigee",
    version,
    about = "PostgreSQL fleet access-grant controller"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the IAM trust-policy document for every principal in the spec file
    Policy {
        /// Path to the principals JSON file
        #[arg(short, long, default_value = "principals.json")]
        principals: String,
    },
    /// Resolve accesses and verify host credentials and connectivity
    Check {
        /// Path to the principals JSON file
        #[arg(short, long, default_value = "principals.json")]
        principals: String,
        /// Namespace label used in resolution error scopes
        #[arg(short, long, default_value = "default")]
        namespace: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    tracing::debug!(?settings, "Loaded configuration");

    match cli.command {
        Command::Policy { principals } => policy(&settings, &principals),
        Command::Check {
            principals,
            namespace,
        } => check(&settings, &principals, &namespace).await,
    }
}

fn load_principals(path: &str) -> Result<PrincipalsFile> {
    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .map_err(|e| miette::miette!("Failed to read principals file at '{}': {}", path, e))?;

    let file: PrincipalsFile = serde_json::from_str(&content)
        .into_diagnostic()
        .map_err(|e| {
            miette::miette!(
                "Failed to parse principals JSON file: {}\n\nExpected format:\n{{\n  \"users\": [\n    {{\n      \"name\": \"alice\",\n      \"read\": [{{\"host\": \"db1.example.com\", \"database\": \"orders\"}}],\n      \"write\": []\n    }}\n  ]\n}}",
                e
            )
        })?;

    tracing::info!("Found {} principal(s) in file", file.users.len());
    Ok(file)
}

fn policy(settings: &Settings, principals_path: &str) -> Result<()> {
    let file = load_principals(principals_path)?;

    let mut document = PolicyDocument::with_trust_domain(
        settings.iam.policy_version.clone(),
        settings.iam.trust_domain.clone(),
    );
    for user in &file.users {
        document.add(
            &settings.iam.region,
            &settings.iam.account_id,
            &settings.grants.role_prefix,
            &user.name,
        );
    }

    let rendered = serde_json::to_string_pretty(&document).into_diagnostic()?;
    println!("{rendered}");
    Ok(())
}

async fn check(settings: &Settings, principals_path: &str, namespace: &str) -> Result<()> {
    let file = load_principals(principals_path)?;
    let resolver = SpecResolver;
    let connector = SeaOrmConnector;
    let credentials = settings.host_credentials();

    let mut failures = 0usize;
    for user in &file.users {
        let (accesses, resolve_errs) = resolver.resolve(namespace, &user.read, &user.write).await;
        if !resolve_errs.is_empty() {
            tracing::warn!(
                user = %user.name,
                error = %resolve_errs,
                "some access requests could not be resolved"
            );
            failures += resolve_errs.len();
        }

        let (connections, connect_errs) =
            connect_to_hosts(&connector, &accesses, &credentials).await;
        for host in connections.keys() {
            tracing::info!(user = %user.name, host = %host, "host reachable");
        }
        if !connect_errs.is_empty() {
            tracing::error!(
                user = %user.name,
                error = %connect_errs,
                "host connection failures"
            );
            failures += connect_errs.len();
        }

        let close_errs = close_connections(&connector, connections).await;
        if !close_errs.is_empty() {
            tracing::error!(
                user = %user.name,
                error = %close_errs,
                "failed to close connections to hosts"
            );
        }
    }

    if failures > 0 {
        return Err(miette::miette!("{} access check(s) failed", failures));
    }
    tracing::info!("all access checks passed");
    Ok(())
}
