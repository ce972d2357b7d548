use clap::Parser;
use esgscore::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
