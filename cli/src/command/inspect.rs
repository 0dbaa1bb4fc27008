use clap::Args;
use flatbook::Converter;
use flatbook::errors::ConvertResult;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectCommand {
    /// The EPUB file to inspect
    pub epub_path: PathBuf,
}

impl InspectCommand {
    pub fn inspect(&self) -> ConvertResult<()> {
        let inspection = Converter::default().inspect(&self.epub_path)?;

        println!(
            "Package: {}",
            inspection.package_path.as_deref().unwrap_or("<none>")
        );
        println!("Manifest entries: {}", inspection.manifest_len);
        println!(
            "Reading order ({}, {} document(s)):",
            inspection.order.tier(),
            inspection.order.len()
        );
        for (index, href) in inspection.order.hrefs().iter().enumerate() {
            println!("{:>4}. {href}", index + 1);
        }
        Ok(())
    }
}
