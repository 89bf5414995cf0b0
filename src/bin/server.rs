//! Server role entry point (HHE only).

use hebench::config::{default_parameters, StorageRoot};
use hebench::roles::Server;
use hebench::PerfLogger;

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "server run failed");
        std::process::exit(1);
    }
}

fn run() -> hebench::Result<()> {
    let storage = StorageRoot::default();
    let params = default_parameters();

    let server = Server::load(storage.clone(), params.clone())?;
    let mut logger = PerfLogger::open(
        &storage.perf_time_dir(),
        &storage.perf_memory_dir(),
        &params,
        "server",
    )?;
    logger.log("server started")?;
    server.run(&mut logger)?;
    logger.log("server finished")?;
    Ok(())
}
