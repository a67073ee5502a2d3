use clap::Parser;
use qmoney::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
