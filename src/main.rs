use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> anyhow::Result<ExitCode> {
    let cli = coursecheck::cli::Cli::parse();
    coursecheck::logging::init(coursecheck::logging::default_filter(cli.quiet))
        .context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    let code = match cli.command {
        coursecheck::cli::Command::Validate(args) => {
            coursecheck::commands::validate(args).context("validate")?
        }
        coursecheck::cli::Command::Paths(args) => {
            coursecheck::commands::paths(args).context("paths")?
        }
        coursecheck::cli::Command::Payload(args) => {
            coursecheck::commands::payload(args).context("payload")?
        }
    };

    Ok(code)
}
