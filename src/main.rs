use hls_relay::{config::ProxyConfig, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hls_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ProxyConfig::from_env()?;
    let addr = config.listen_addr();

    tracing::info!("Allowed upstream hosts: {:?}", config.allow_list);
    match &config.public_base_url {
        Some(base) => tracing::info!("Rewriting manifests against {}", base),
        None => tracing::info!("Rewriting manifests against the request Host"),
    }
    if config.rewrite_tag_uris {
        tracing::info!("Tag URI attribute rewriting is enabled");
    }

    let state = server::AppState::new(config)?;
    let app = server::create_router(state);

    tracing::info!("Starting hls-relay server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
