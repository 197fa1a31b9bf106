use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use cors_file_server::cli::Args;
use cors_file_server::config::{AppState, Config, ServeRoot};
use cors_file_server::logger;
use cors_file_server::server::{self, Server, Shutdown};
use cors_file_server::ServerError;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ServerError> {
    let cfg = Config::load(args)?;

    // Validate the directory before any runtime or socket exists
    let root = ServeRoot::resolve(&cfg.server.dir)?;

    logger::init(&cfg.logging)?;

    // Create Tokio runtime, sized by the workers setting
    let workers = cfg.server.workers.filter(|&n| n > 0);
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = workers {
        runtime_builder.worker_threads(workers);
    }
    logger::log_workers(workers);

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg, root))
}

async fn async_main(cfg: Config, root: ServeRoot) -> Result<(), ServerError> {
    // Registered before binding: any interrupt from here on stops gracefully
    let shutdown = Shutdown::new();
    server::start_signal_handler(shutdown.clone())?;

    let state = Arc::new(AppState::new(cfg, root));
    let server = Server::bind(Arc::clone(&state))?;

    logger::log_server_start(state.root.path(), &server.local_addr());
    server.run(shutdown).await;
    Ok(())
}
