use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dirserve::{routes, AppState, Config, ServeRoot};

#[derive(Parser, Debug)]
#[command(name = "dirserve")]
#[command(about = "Serve a local directory for browsing and download over HTTP")]
#[command(version)]
struct Cli {
    /// Port to serve on
    #[arg(short, long, env = "DIRSERVE_PORT", default_value = "8000")]
    port: u16,

    /// Folder to serve files from
    #[arg(short, long, env = "DIRSERVE_FOLDER")]
    folder: PathBuf,

    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "dirserve=debug,tower_http=debug"
    } else {
        "dirserve=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config from file if provided, otherwise use defaults
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    let root = ServeRoot::open(&cli.folder).map_err(|e| {
        format!("Folder '{}' cannot be served: {}", cli.folder.display(), e)
    })?;

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Cannot listen on {}: {}", addr, e))?;

    info!("Serving files from: {}", root.path().display());
    info!("Server running on: http://localhost:{}", cli.port);
    info!("Press Ctrl+C to stop the server");

    let app = routes::create_router(AppState::with_config(root, config));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
