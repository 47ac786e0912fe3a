use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use eyre::WrapErr;

use lcb_relayer::config::Config;
use lcb_relayer::cursor::SyncCursor;
use lcb_relayer::evm::{EvmBridgeClient, LocalRelaySigner};
use lcb_relayer::relay::{DelayPolicy, RelayLoop};
use lcb_relayer::source::SourceRpcClient;
use lcb_relayer::submitter::TransactionSubmitter;
use lcb_relayer::{api, ConcatHeaderCodec};

fn main() -> eyre::Result<()> {
    // Install color-eyre for better error reporting
    color_eyre::install()?;

    // Run the async main
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    tracing::info!("Starting light-client bridge header relayer");

    let config = Config::load()?;
    tracing::info!(
        dest_chain_id = config.dest.chain_id,
        bridge_address = %config.dest.bridge_address,
        batch_size = config.relay.batch_size,
        confirmation_depth = config.relay.confirmation_depth,
        "Configuration loaded"
    );

    let bridge_address = Address::from_str(&config.dest.bridge_address)
        .wrap_err("Invalid bridge contract address")?;

    let source = Arc::new(SourceRpcClient::new(&config.source.rpc_url)?);
    let dest = Arc::new(EvmBridgeClient::new(&config.dest.rpc_url, bridge_address)?);
    let signer = Arc::new(LocalRelaySigner::from_config(&config.account)?);

    let submitter = TransactionSubmitter::new(
        dest.clone(),
        signer,
        bridge_address,
        config.dest.chain_id,
        config.relay.verify_signature,
    );

    let relay_loop = RelayLoop::new(
        source,
        dest,
        Arc::new(ConcatHeaderCodec),
        submitter,
        SyncCursor::new(config.relay.confirmation_depth),
        DelayPolicy::from_config(&config.relay),
        config.relay.batch_size,
    );

    // Shutdown channel, fed by SIGINT/SIGTERM
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(()).await;
    });

    // Metrics/status server, if configured
    if let Some(api_addr) = config.api_addr {
        tokio::spawn(async move {
            if let Err(e) = api::start_api_server(api_addr).await {
                tracing::error!(error = %e, "API server error");
            }
        });
    }

    let result = relay_loop.run(shutdown_rx).await;

    match &result {
        Ok(()) => tracing::info!("Relayer stopped"),
        Err(e) => tracing::error!(error = %e, "Relayer terminated"),
    }
    result.map_err(Into::into)
}

/// Initialize tracing/logging with structured output
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lcb_relayer=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(filter)
        .init();
}

/// Wait for shutdown signals (SIGINT/SIGTERM)
async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
