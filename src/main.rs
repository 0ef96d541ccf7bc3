use clap::Parser;
use trendwatch::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
