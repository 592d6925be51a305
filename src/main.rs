use clap::Parser;
use slr_parser::cli::{self, Cli};
use std::process;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = cli::run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
