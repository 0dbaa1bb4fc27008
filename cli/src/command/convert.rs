use crate::render::ChromeRenderer;
use clap::Args;
use flatbook::errors::ConvertResult;
use flatbook::{ConvertOutcome, ConvertSettings, Converter, NoopRenderer, Renderer};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// The EPUB file to convert
    pub epub_path: PathBuf,

    /// Document title and base name of the output files [default: the EPUB file name]
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory to write the output files to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Chromium-based browser used to print the document
    #[arg(long, env = "FLATBOOK_BROWSER", default_value = "chromium")]
    pub browser: String,

    /// Seconds to wait for the browser to load and print the document
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// Seconds to wait after printing before assuming the output is written
    #[arg(long, value_name = "SECS", default_value_t = 4)]
    settle: u64,

    /// Only write the combined HTML; no browser is launched
    #[arg(long)]
    pub markup_only: bool,

    /// Keep the combined HTML after printing
    #[arg(long)]
    pub keep_markup: bool,
}

impl ConvertCommand {
    pub fn convert(&self) -> ConvertResult<()> {
        let mut settings = ConvertSettings::builder()
            .output_dir(self.output_dir.clone())
            .keep_markup(self.keep_markup || self.markup_only);
        if let Some(name) = &self.name {
            settings = settings.output_name(name);
        }

        let converter = Converter::new(settings);
        let chrome;
        let renderer: &dyn Renderer = if self.markup_only {
            &NoopRenderer
        } else {
            chrome = ChromeRenderer::new(&self.browser, self.timeout(), self.settle());
            &chrome
        };

        match converter.convert(&self.epub_path, renderer)? {
            ConvertOutcome::Rendered { .. } if self.markup_only => {
                println!("Done. Check {} for the combined HTML.", self.output_dir.display());
            }
            ConvertOutcome::Rendered { output } => {
                println!("PDF conversion attempted: {}", output.display());
                println!("If you don't see the PDF, ensure the browser can write to this folder.");
            }
            ConvertOutcome::Attempted { output, error } => {
                eprintln!("Error during PDF conversion: {error}");
                eprintln!("PDF conversion attempted: {}", output.display());
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle)
    }
}
