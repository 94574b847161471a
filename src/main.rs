use card_vault::cli::Cli;
use card_vault::{logger, server, StartupError};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("[ERROR] {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), StartupError> {
    let cfg = cli.load_config()?;
    logger::init(&cfg)?;

    // Size the Tokio runtime from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    // Unset or 0 falls back to one thread per CPU core
    if let Some(workers) = cfg.server.workers.filter(|&n| n > 0) {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(server::run(cfg))
}
