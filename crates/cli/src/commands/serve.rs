//! The `serve` command: ordered startup, steady state, graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use courier_channel::{spawn_status_watcher, ChannelAdapter, HttpGateway};
use courier_core::Config;
use courier_http::{create_router, AppState};
use courier_service::{DeliveryService, NotificationService, RetryConfig, RetryWorker};
use courier_storage::{PendingStore, SqliteStore};
use tokio_util::sync::CancellationToken;

pub(crate) async fn run(config: Config) -> Result<()> {
    // Startup order is strict; any failure here aborts before serving.
    let store = Arc::new(
        SqliteStore::connect(&config.database_url)
            .await
            .context("failed to connect pending store")?,
    );

    let gateway_url = config
        .gateway_url
        .as_deref()
        .context("COURIER_GATEWAY_URL must be set for serve")?;
    let gateway = HttpGateway::new(
        gateway_url,
        config.gateway_token.clone(),
        Duration::from_secs(config.send_timeout_secs),
    )
    .context("failed to build gateway client")?;
    let adapter = Arc::new(ChannelAdapter::new(Arc::new(gateway)));
    adapter.initialize();

    let watcher_cancel = CancellationToken::new();
    let watcher_handle = spawn_status_watcher(
        Arc::clone(&adapter),
        Duration::from_secs(config.status_poll_interval_secs),
        watcher_cancel.clone(),
    );

    let fatal = CancellationToken::new();
    let delivery = DeliveryService::new(Arc::clone(&adapter));
    let notifications =
        NotificationService::new(delivery.clone(), Arc::clone(&store) as Arc<dyn PendingStore>);

    let state = Arc::new(AppState {
        notifications,
        store: Arc::clone(&store) as Arc<dyn PendingStore>,
        adapter: Arc::clone(&adapter),
        fatal: fatal.clone(),
    });

    let addr = format!("{}:{}", config.http_host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "ingestion listener bound");

    let listener_cancel = CancellationToken::new();
    let server_handle = tokio::spawn({
        let router = create_router(state);
        let listener_cancel = listener_cancel.clone();
        async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { listener_cancel.cancelled().await })
                .await
        }
    });

    // The scheduler starts only after the listener is bound.
    let scheduler_cancel = CancellationToken::new();
    let worker = RetryWorker::new(
        delivery,
        Arc::clone(&store) as Arc<dyn PendingStore>,
        adapter.subscribe(),
        RetryConfig {
            interval: Duration::from_secs(config.retry_interval_secs),
            batch_limit: config.retry_batch_limit,
            max_attempts: config.max_attempts,
        },
        scheduler_cancel.clone(),
    );
    let worker_handle = tokio::spawn({
        let fatal = fatal.clone();
        async move {
            if worker.run().await.is_err() {
                fatal.cancel();
            }
        }
    });
    tracing::info!(
        interval_secs = config.retry_interval_secs,
        batch_limit = config.retry_batch_limit,
        "retry scheduler started"
    );

    let fatal_tripped = wait_for_shutdown(&fatal).await;

    // Teardown, in order: no new retry cycles, release the channel,
    // release the store, stop listening. A retry attempt in flight when
    // the signal arrived may still deliver; that duplicate-delivery
    // window is the accepted cost of at-least-once semantics.
    scheduler_cancel.cancel();
    if let Err(e) = worker_handle.await {
        tracing::warn!(error = %e, "retry worker join failed");
    }

    watcher_cancel.cancel();
    if let Err(e) = watcher_handle.await {
        tracing::warn!(error = %e, "status watcher join failed");
    }
    adapter.release();

    store.close().await;
    tracing::info!("pending store closed");

    listener_cancel.cancel();
    match server_handle.await {
        Ok(Ok(())) => tracing::info!("ingestion listener stopped"),
        Ok(Err(e)) => tracing::warn!(error = %e, "server terminated with error"),
        Err(e) => tracing::warn!(error = %e, "server join failed"),
    }

    if fatal_tripped {
        anyhow::bail!("shut down after a fatal storage fault");
    }
    tracing::info!("clean shutdown complete");
    Ok(())
}

/// Wait for SIGINT, SIGTERM, or the fatal handle. Returns whether the
/// fatal handle tripped.
async fn wait_for_shutdown(fatal: &CancellationToken) -> bool {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                fatal.cancelled().await;
                return true;
            },
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT, shutting down");
                false
            },
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, shutting down");
                false
            },
            () = fatal.cancelled() => {
                tracing::error!("fatal storage fault, shutting down");
                true
            },
        }
    }
    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received interrupt, shutting down");
                false
            },
            () = fatal.cancelled() => {
                tracing::error!("fatal storage fault, shutting down");
                true
            },
        }
    }
}
