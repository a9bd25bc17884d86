/// LightBeat Gateway - beat-synchronized events from Spotify playback
use anyhow::Context;
use clap::{Parser, Subcommand};
use lightbeat_core::{EventSink, FanoutSink};
use lightbeat_gateway::{api, authorize, AppState, EventBus, GatewayConfig, LightStrip};
use lightbeat_spotify::{SpotifyClient, TokenStore};
use lightbeat_sync::PollDriver;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lightbeat-gateway")]
#[command(about = "Beat-synchronized event gateway for Spotify playback", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start polling playback and serving events
    Run {
        /// Configuration file path
        #[arg(short, long, env = "LIGHTBEAT_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Authorize with Spotify and store the refresh token
    Authorize {
        /// Configuration file path
        #[arg(short, long, env = "LIGHTBEAT_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Configuration file path
        #[arg(short, long, env = "LIGHTBEAT_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lightbeat_gateway=info,lightbeat_sync=info,lightbeat_spotify=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let config = GatewayConfig::load(config.as_deref())?;
            config.validate()?;
            run(config).await?;
        }
        Commands::Authorize { config } => {
            let config = GatewayConfig::load(config.as_deref())?;
            config.validate()?;
            authorize::authorize(&config).await?;
        }
        Commands::Config { config } => {
            let config = GatewayConfig::load(config.as_deref())?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    tracing::info!("Starting LightBeat Gateway");
    tracing::info!("Events: {}:{}", config.events.host, config.events.port);
    tracing::info!("Granularity: {}", config.sync.granularity);

    // Spotify client with the stored refresh token
    let store = TokenStore::new(&config.spotify.token_file);
    let refresh_token = store.load().await?.with_context(|| {
        format!(
            "No refresh token in {}, run `lightbeat-gateway authorize` first",
            store.path().display()
        )
    })?;
    let client = SpotifyClient::new(
        config
            .spotify
            .client_config()
            .with_refresh_token(refresh_token),
    )?;
    client.refresh_access_token().await?;
    let client = Arc::new(client);
    tracing::info!("Authorized with Spotify");

    // Event sinks
    let bus = EventBus::new(config.events.channel_capacity);
    let mut sinks = FanoutSink::new().with(Arc::new(bus.clone()));
    if config.lights.enabled {
        sinks = sinks.with(Arc::new(LightStrip::new(&config.lights)));
    }
    let sink: Arc<dyn EventSink> = Arc::new(sinks);

    // Granularity control, read by the driver at each session start
    let (granularity_tx, granularity_rx) = watch::channel(config.sync.granularity);
    let app_state = AppState::new(bus, granularity_tx);

    // Poll driver
    let shutdown = CancellationToken::new();
    let driver = PollDriver::new(
        Arc::clone(&client),
        client,
        sink,
        granularity_rx,
        config.sync.sync_config(),
    );
    let driver_task = tokio::spawn(driver.run(shutdown.clone()));

    // Build router
    let app = api::router(app_state);

    // Create server address
    let addr = SocketAddr::from((
        config.events.host.parse::<std::net::IpAddr>()?,
        config.events.port,
    ));

    tracing::info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
            server_shutdown.cancel();
        })
        .await?;

    // Server stopped for another reason; stop the driver too
    shutdown.cancel();
    driver_task.await?;

    tracing::info!("Gateway stopped");
    Ok(())
}
