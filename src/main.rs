//! Vapor Master: parameter server bootstrap and inspection

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vapor_params::{MasterConfig, ParamService, TracingDelivery};
use vapor_store::MemoryBackend;

#[derive(Parser)]
#[command(
    name = "vapor-master",
    about = "Vapor Master: hierarchical parameter server"
)]
struct Cli {
    /// TOML config file (defaults apply if missing)
    #[arg(short, long, default_value = "vapor.toml")]
    config: PathBuf,
    /// Remove all parameters and subscriptions before loading (persistent backends only)
    #[arg(long, conflicts_with = "no_clean_db")]
    clean_db: bool,
    /// Keep existing parameters and subscriptions
    #[arg(long)]
    no_clean_db: bool,
    /// JSON file of parameters to load
    #[arg(short, long)]
    params: Option<PathBuf>,
    /// Namespace the parameter file is loaded into
    #[arg(short, long, default_value = "/")]
    namespace: String,
    /// Caller path used for loading and reading
    #[arg(long, default_value = "/vapor_master")]
    caller: String,
    /// Key path to print after loading
    #[arg(short, long, default_value = "/")]
    get: String,
    /// Print every stored key instead of a folded value
    #[arg(long)]
    list: bool,
    /// Print the effective config as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = MasterConfig::load(&cli.config);
    if cli.clean_db {
        config.store.clean_on_start = true;
    }
    if cli.no_clean_db {
        config.store.clean_on_start = false;
    }

    if cli.print_config {
        println!("{}", config.to_toml());
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Vapor Master launching (config {})", cli.config.display());

    let backend = Arc::new(MemoryBackend::new());
    let service = ParamService::new(backend, Arc::new(TracingDelivery), &config.notify);

    // a fresh in-memory backend is always empty; the reset only removes
    // documents when the backend persists across runs
    if config.store.clean_on_start {
        let removed = service.reset().await?;
        info!("clean start (memory backend): removed {} documents", removed);
    }

    if let Some(path) = &cli.params {
        service
            .load_file(&cli.namespace, path, &cli.caller, "127.0.0.1")
            .await?;
        info!("loaded {} into {}", path.display(), cli.namespace);
    }

    if cli.list {
        for key in service.list_keys().await? {
            println!("{}", key);
        }
        return Ok(());
    }

    match service.get(&cli.caller, &cli.get).await? {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => anyhow::bail!("no parameter at {}", ParamService::resolve(&cli.get, &cli.caller)),
    }

    Ok(())
}
