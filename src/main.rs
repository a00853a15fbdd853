use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    talepress::logging::init().context("init logging")?;

    let cli = talepress::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        talepress::cli::Command::Tales(args) => {
            let config = args.into_config().context("tales config")?;
            talepress::scrape::run_tales(config).context("tales")?;
        }
        talepress::cli::Command::Couples(args) => {
            let config = args.into_config().context("couples config")?;
            talepress::scrape::run_couples(config).context("couples")?;
        }
        talepress::cli::Command::Render(args) => {
            talepress::render::run(args).context("render")?;
        }
    }

    Ok(())
}
