use anyhow::{Context, Result};
use clap::Parser;
use huddle_rooms::{
    create_router, AppState, CaptionsCoordinator, Config, HttpVideoPlatform, NatsBroadcast,
    RoomStoreFactory, SessionResolver,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "huddle-rooms")]
#[command(about = "Room session and captions backend")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(short, long, default_value = "config/huddle-rooms")]
    config: String,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;

    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("Huddle Rooms v0.1.0");
    info!("Loaded config: {}", cfg.service.name);

    let store = RoomStoreFactory::create(&cfg.store).await?;
    let platform: Arc<dyn huddle_rooms::VideoPlatform> =
        Arc::new(HttpVideoPlatform::new(&cfg.platform)?);
    let broadcast = Arc::new(
        NatsBroadcast::connect(&cfg.broadcast.nats_url, &cfg.broadcast.subject_prefix).await?,
    );

    let resolver = Arc::new(SessionResolver::new(
        Arc::clone(&store),
        Arc::clone(&platform),
    ));
    let captions = Arc::new(CaptionsCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&platform),
        broadcast,
    ));

    let state = AppState::new(resolver, captions, platform, store);
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
