use clap::Parser;
use qtviz::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
