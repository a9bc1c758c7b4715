use clap::Parser;
use throttle_demo::args::ClientArgs;
use throttle_demo::DemoError;

#[tokio::main]
async fn main() -> Result<(), DemoError> {
    throttle_demo::init_tracing();
    let config = ClientArgs::parse().client_config();

    tracing::info!(
        url = %config.url,
        workers = config.workers,
        jobs = config.jobs,
        "starting run"
    );

    let summary = throttle_demo::run(config).await?;
    println!(
        "{} jobs: {} succeeded, {} throttled, {} failed",
        summary.total(),
        summary.succeeded,
        summary.throttled,
        summary.failed
    );
    Ok(())
}
