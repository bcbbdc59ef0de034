use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use roomres::config::Config;
use roomres::session::{self, Session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the rendered pages.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    roomres::observability::init(config.metrics_port)?;

    let session = Session::open(&config)?;
    info!("roomres session started");
    info!(
        "  store: {}",
        config
            .data_file
            .as_ref()
            .map_or("memory".to_string(), |p| p.display().to_string())
    );
    info!("  email domain: {}", config.email_domain);
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = session::run(session, stdin, stdout) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, ending session");
        }
    }

    info!("roomres stopped");
    Ok(())
}
