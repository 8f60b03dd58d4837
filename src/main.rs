use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;
mod service;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // First argument names the config file (without extension)
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;

    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    // One executor for the whole process; it opens a connection per call
    let service: Arc<dyn service::FoodService> =
        Arc::new(service::PgFoodService::new(&cfg.database));
    let state = Arc::new(config::AppState::new(cfg, service));

    logger::log_server_start(&addr, &state.config);
    logger::log_routes(state.routes.routes());

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::run(listener, state, Arc::clone(&signals.shutdown)).await;

    logger::log_shutdown(&addr);
    Ok(())
}
