use clap::Parser;
use log::error;
use sm_store::cli::{self, Cli};

fn main() {
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let args = Cli::parse();

    if let Err(e) = cli::run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
