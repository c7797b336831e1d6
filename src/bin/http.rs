#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::path::PathBuf;
    use std::sync::Arc;

    use plan_it::{AppConfig, Planner, http_api, logging};

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;
    logging::init_logging(&config.log_level, config.log_dir_str().as_deref())?;

    let store: http_api::SharedStore = Arc::from(config.store.open()?);
    let planner = Planner::open(store.as_ref())?;

    println!(
        "plan-it HTTP API listening on http://{} (store {})",
        config.http_addr, config.store
    );
    let state = http_api::AppState::with_store(planner, store);
    http_api::serve(config.http_addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
