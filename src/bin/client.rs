//! Client role entry point: a standalone binary with no CLI arguments, all
//! configuration compiled in through `Parameters`.

use hebench::config::{default_parameters, StorageRoot};
use hebench::roles::Client;
use hebench::PerfLogger;

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "client run failed");
        std::process::exit(1);
    }
}

fn run() -> hebench::Result<()> {
    let storage = StorageRoot::default();
    let params = default_parameters();

    let client = Client::load(storage.clone(), params.clone())?;
    let mut logger = PerfLogger::open(
        &storage.perf_time_dir(),
        &storage.perf_memory_dir(),
        &params,
        "client",
    )?;
    logger.log("client started")?;
    client.run(&mut logger)?;
    logger.log("client finished")?;
    Ok(())
}
