use productreel_backend_rs::{
    app::App,
    types::{Config, ToContext},
};
use std::{process, sync::Arc};
use tracing_subscriber::prelude::*;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Invalid configuration: {}", err);
            process::exit(1);
        }
    };

    let ctx = match config.to_context().await {
        Ok(ctx) => Arc::new(ctx),
        Err(err) => {
            tracing::error!("{}", err);
            process::exit(1);
        }
    };

    if let Err(err) = App::new(ctx).serve().await {
        tracing::error!("Server stopped: {}", err);
        process::exit(1);
    }
}
