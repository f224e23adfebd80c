use clap::Parser;
use tracing_subscriber::EnvFilter;

use htconfig::{AgentConfig, Cli};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut loader = AgentConfig::loader();
    if let Some(file) = &cli.file {
        loader = loader.file(file);
    }

    if let Err(e) = loader.handle_and_print(&cli.into_action()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
