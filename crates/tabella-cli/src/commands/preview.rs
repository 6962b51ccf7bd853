use std::path::Path;

use tabella_core::error::TabellaError;
use tabella_core::extract_invoice;
use tabella_core::extraction::pdftotext::PdftotextExtractor;

use super::InputArgs;
use crate::output;

pub fn run(
    input: &InputArgs,
    registry_file: Option<&Path>,
    output_format: &str,
) -> Result<(), TabellaError> {
    let registry = super::registry(registry_file)?;
    let pdf = input.pdf()?;
    let extractor = PdftotextExtractor::new();
    let invoice = extract_invoice(&pdf, &extractor, &registry)?;

    match output_format {
        "json" => output::json::print(&invoice)?,
        _ => output::table::print(&invoice),
    }
    Ok(())
}
