use clap::Parser;
use trendscore::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
