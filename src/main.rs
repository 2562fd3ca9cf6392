use anyhow::Result;
use std::process;
use log::error;

use toastq::{app, cli, logging};

fn main() {
    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();

    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    // Configuration export does not need a runtime
    if let Some(export_path) = &args.export_config {
        return app::handle_export_config(&config_manager, export_path);
    }

    // Scenario waits run on simulated time; an idle runtime jumps to the next timer
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()?;

    runtime.block_on(app::run_scenario(&args, &config_manager))?;

    Ok(())
}
