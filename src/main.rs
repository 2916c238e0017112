use anyhow::Context;
use clap::Parser;
use img_variant::{
    AppConfig, FsStore, JpegCodec, MemoryStore, ObjectStore, ResizeService,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "img-variant",
    about = "HTTP service that derives resized JPEG variants of stored images",
    long_about = "img-variant accepts a resize request referencing a source object in the \
                  configured store, derives one resized/re-encoded variant per requested \
                  operation concurrently, uploads each variant back under a YYYY/MM prefix, \
                  and returns per-operation metrics (dimensions, size reduction, timing, URLs).",
    version
)]
struct Args {
    #[arg(long, help = "Address to bind (default from HOST env, else 127.0.0.1)")]
    host: Option<String>,

    #[arg(short, long, help = "Port to listen on (default from PORT env, else 3000)")]
    port: Option<u16>,

    #[arg(
        long,
        help = "Directory backing the object store",
        long_help = "Directory backing the filesystem object store. Source objects are read \
                     relative to it and variants are written under YYYY/MM subdirectories. \
                     Without it (and without STORAGE_ROOT) an ephemeral in-memory store is used."
    )]
    storage_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Base URL reported in variant locations",
        long_help = "Public base URL prepended to variant keys in result locations, \
                     e.g. https://cdn.example.com/images"
    )]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(root) = args.storage_root {
        config.storage.root = Some(root);
    }
    if let Some(base_url) = args.base_url {
        config.storage.base_url = base_url;
    }

    let store: Arc<dyn ObjectStore> = match &config.storage.root {
        Some(root) => {
            info!(root = %root.display(), "using filesystem object store");
            Arc::new(FsStore::new(root.clone(), config.storage.base_url.clone()))
        }
        None => {
            info!("no storage root configured, using ephemeral in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let service = Arc::new(ResizeService::new(
        store,
        Arc::new(JpegCodec::new()),
        config.limits.clone(),
    ));
    let app = img_variant::router(service);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .context("server exited with an error")?;

    Ok(())
}
