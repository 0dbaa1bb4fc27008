use clap::Subcommand;

mod convert;
mod inspect;

pub use self::convert::ConvertCommand;
pub use self::inspect::InspectCommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Flatten an EPUB into a single document and print it with a headless browser.
    Convert(ConvertCommand),
    /// Show where the package file and reading order of an EPUB were found.
    Inspect(InspectCommand),
}
