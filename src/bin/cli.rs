// src/bin/cli.rs
use std::process::ExitCode;

use xcheck::cli;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let params = cli::parse_args(std::env::args().skip(1))?;
    if params.help {
        print!("{}", cli::HELP);
        return Ok(ExitCode::SUCCESS);
    }

    Ok(if cli::run(&params)? { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
