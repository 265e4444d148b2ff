use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};

use cloudbox::{
    ensure_admin, load_or_generate_secret, AppContext, BootstrapOutcome, Config, Database,
    HashCost, WebServer,
};

const CONFIG_FILE: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load_with_env(CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_FILE}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = cloudbox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        cloudbox::logging::init_console_only(&config.logging);
    }

    info!("CloudBox - self-hosted file storage");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> cloudbox::Result<()> {
    config.validate()?;

    let db = Database::open(&config.database.path, config.database.max_connections).await?;

    let cost = HashCost::from_config(&config.auth);
    match ensure_admin(&db, cost, Path::new(&config.auth.credentials_file)).await? {
        BootstrapOutcome::AlreadyInitialized => {}
        BootstrapOutcome::Created { user_id, .. } => {
            info!(user_id = %user_id, "Bootstrap admin account created");
        }
    }

    let secret = load_or_generate_secret(&config.auth)?;
    let ctx = AppContext::new(config, db.clone(), &secret)?;

    info!(
        "Server configured on {}:{}",
        ctx.config.server.host, ctx.config.server.port
    );

    let result = WebServer::new(ctx)?.run().await;
    db.close().await;
    result
}
