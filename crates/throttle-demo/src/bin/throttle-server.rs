use clap::Parser;
use std::sync::Arc;
use throttle_demo::args::ServerArgs;
use throttle_demo::{server, DemoError, RateTracker};

#[tokio::main]
async fn main() -> Result<(), DemoError> {
    throttle_demo::init_tracing();
    let args = ServerArgs::parse();

    let tracker = Arc::new(RateTracker::with_max_rate(args.max_rate));
    let listener = server::bind(args.addr).await?;

    tracing::info!("Listening on http://{}", args.addr);
    tracing::info!("Max request rate: {:.2} requests per sec", args.max_rate);
    tracing::info!("Try it:");
    tracing::info!("  curl http://{}/default", args.addr);
    tracing::info!("  curl 'http://{}/config?max=25'", args.addr);

    server::serve(listener, tracker, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
