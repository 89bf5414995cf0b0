//! TTP role entry point.

use hebench::config::{default_parameters, StorageRoot};
use hebench::roles::Ttp;
use hebench::PerfLogger;

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "ttp run failed");
        std::process::exit(1);
    }
}

fn run() -> hebench::Result<()> {
    let storage = StorageRoot::default();
    let params = default_parameters();

    let ttp = Ttp::load(storage.clone(), params.clone())?;
    let mut logger = PerfLogger::open(
        &storage.perf_time_dir(),
        &storage.perf_memory_dir(),
        &params,
        "ttp",
    )?;
    logger.log("ttp started")?;
    ttp.run(&mut logger)?;
    logger.log("ttp finished")?;
    Ok(())
}
