mod classify;
mod cli;
mod config;
mod error;
mod k8s;
mod model;
mod normalize;
mod pipeline;
mod render;
mod server;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use config::Settings;
use k8s::KubeGateway;
use render::Renderer;
use server::{AppState, build_router, serve, watch_signals};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter)?;

    let settings = Settings::load(&args)?;
    if let Some(source) = &settings.source {
        info!(source = %source, "loaded config file");
    }
    if !settings.static_dir.is_dir() {
        warn!(
            "static directory {} does not exist, images will be missing",
            settings.static_dir.display()
        );
    }

    let template = settings.load_template()?;
    let renderer = Renderer::new(&template).context("failed to compile page template")?;

    let gateway = KubeGateway::new(settings.context.clone()).await?;
    info!(
        context = gateway.context(),
        cluster = gateway.cluster(),
        namespace = %settings.namespace,
        "Kubernetes client ready"
    );

    let shutdown = CancellationToken::new();
    let state = AppState {
        api: Arc::new(gateway),
        renderer: Arc::new(renderer),
        namespace: Arc::from(settings.namespace.as_str()),
        fetch_timeout: settings.fetch_timeout,
        shutdown: shutdown.clone(),
    };
    let router = build_router(state, &settings.static_dir);

    let addr = settings.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tokio::spawn(watch_signals(shutdown.clone()));
    serve(listener, router, shutdown).await
}

fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}
