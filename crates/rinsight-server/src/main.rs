mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use rinsight_sentiment::{
    build_classifier, build_source, FileBackend, PostCache, PostPipeline, Recommender,
    ScoringConfig, SystemClock,
};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = rinsight_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let classifier = build_classifier(&config)?;
    let source = build_source(&config)?;
    let cache = PostCache::new(
        Arc::new(FileBackend::new(config.cache_path())),
        Arc::new(SystemClock),
        Duration::from_secs(config.cache_ttl_secs),
    );
    let pipeline = PostPipeline::new(source, Arc::clone(&classifier), cache, config.fetch_limit)
        .with_raw_csv(config.raw_posts_path());

    let state = AppState {
        pipeline: Arc::new(pipeline),
        recommender: Recommender::new(config.recommender, classifier),
        scoring: Arc::new(ScoringConfig::default()),
    };
    let app = build_app(state, &config.static_dir);

    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        subreddit = %config.subreddit,
        "starting rinsight server"
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
