use ratelimiter::{config::AppConfig, init_service, init_tracing};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize tracing
    init_tracing();

    // Config file is optional; built-in defaults otherwise
    let config = match env::args().nth(1) {
        Some(path) => match AppConfig::from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load configuration from {}: {}", path, e);
                eprintln!("Usage: ratelimiter [config_file]");
                process::exit(1);
            }
        },
        None => AppConfig::default(),
    }
    .with_env_overrides();

    if let Err(e) = init_service(config).await {
        eprintln!("Service error: {}", e);
        process::exit(1);
    }
}
