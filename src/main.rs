//! aegis-server binary: CLI dispatch and server lifecycle.

use std::path::Path;

use aegis::api::routes::create_router;
use aegis::cli::{init, output::Output, Cli, Commands};
use aegis::utils::config::{secret_fingerprint, AegisConfig};
use aegis::AppState;
use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let out = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    // .env is loaded before any config resolution; secrets live there.
    dotenvy::dotenv().ok();

    match cli.command {
        Some(Commands::Init {
            ref path,
            force,
            ref host,
            port,
        }) => {
            let options = init::InitOptions {
                force,
                host: host.clone(),
                port,
            };
            init::run(path, &options, &out)?;
            Ok(())
        }
        Some(Commands::Config { full, validate }) => run_config(&cli, full, validate, &out),
        None => {
            let config = AegisConfig::load_or_default(&cli.config)
                .with_context(|| format!("failed to load {}", cli.config.display()))?;

            init_tracing(&config, cli.verbose);

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(serve(config))
        }
    }
}

fn run_config(cli: &Cli, full: bool, validate: bool, out: &Output) -> anyhow::Result<()> {
    let config = if Path::new(&cli.config).exists() {
        let content = std::fs::read_to_string(&cli.config)?;
        toml::from_str::<AegisConfig>(&content)
            .with_context(|| format!("failed to parse {}", cli.config.display()))?
    } else {
        out.warning(&format!(
            "{} not found, showing defaults",
            cli.config.display()
        ));
        AegisConfig::default()
    };

    if validate {
        match config.validate() {
            Ok(()) => out.success("configuration is valid"),
            Err(e) => {
                out.error(&format!("configuration is invalid: {}", e));
                anyhow::bail!("validation failed");
            }
        }
    }

    out.header("Configuration");
    out.kv("listen", &format!("{}:{}", config.server.host, config.server.port));
    out.kv("log level", &config.server.log_level);
    out.kv("database", &config.database.url);
    out.kv(
        "access token TTL",
        &format!("{}s", config.auth.access_token_ttl),
    );
    out.kv(
        "refresh token TTL",
        &format!("{}s", config.auth.refresh_token_ttl),
    );
    out.kv(
        "federated bridge",
        if config.federated.is_some() {
            "configured"
        } else {
            "disabled"
        },
    );

    if full {
        out.header("Full TOML");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    Ok(())
}

fn init_tracing(config: &AegisConfig, verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_level = if verbose {
        "debug".to_string()
    } else {
        config.server.log_level.clone()
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: AegisConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Logged fingerprint lets deploys confirm which secret is live without
    // ever logging the secret.
    let secret = config.jwt_secret()?;
    info!(
        fingerprint = %secret_fingerprint(&secret),
        "signing secret loaded"
    );

    let state = AppState::initialize(config).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "aegis-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl-c received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
