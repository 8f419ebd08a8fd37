use anyhow::Context;
use pacer_app::settings::{Settings, log_filter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `PACER_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = log_filter();
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("pacer_app: log filter: {}", log_env);

    let settings = Settings::from_env().context("loading settings from environment")?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("pacer_app: cannot listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let snapshot = pacer_app::run_session(&settings, shutdown).await?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
