use clap::Parser;

pub mod command;
pub mod render;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub commands: command::Commands,

    /// Only log warnings and errors (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// The log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.quiet { "warn" } else { "info" }
    }
}
