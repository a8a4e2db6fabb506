use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use psicodoc::cli::{self, Cli, Commands};
use psicodoc::extraction::TextExtractor;
use psicodoc::pipeline::DocumentPipeline;
use psicodoc::{config::Config, create_router, utils::init_tracing, AppState};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Extract { files } => {
            let extractor = TextExtractor::from_config(&config.extraction);
            cli::run_extract(&extractor, &files).await
        }
        Commands::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!(
        server = ?config.server,
        assistant = ?config.assistant,
        extraction = ?config.extraction,
        "Configuration loaded"
    );

    let pipeline = DocumentPipeline::from_config(&config);
    let state = AppState::new(config.clone(), pipeline);
    let shutdown = state.shutdown.clone();
    state
        .sessions
        .spawn_sweeper(SESSION_SWEEP_INTERVAL, shutdown.child_token());

    let app = create_router(state);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid HOST '{}': {}", config.server.host, e))?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown requested");
            shutdown.cancel();
        })
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
