use clap::Parser;
use flatbook_cli::Cli;
use flatbook_cli::command::Commands;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.default_log_filter()))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let result = match &cli.commands {
        Commands::Convert(convert) => convert.convert(),
        Commands::Inspect(inspect) => inspect.inspect(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
