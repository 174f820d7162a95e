use clap::Parser;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};

mod cli;
mod noise_texture;
mod slot_churn;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // progress bars and log lines share stderr without tearing each other up
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli_args = Cli::parse();
    init_tracing(cli_args.verbose);

    match cli_args.command {
        Command::Noise(args) => noise_texture::run(&args),
        Command::Slots(args) => slot_churn::run(&args),
    }
}
