use std::path::Path;

use tabella_core::error::TabellaError;
use tabella_core::extraction::pdftotext::PdftotextExtractor;
use tabella_core::resolve::SupplierResolver;

use super::InputArgs;
use crate::output::console;

pub fn run(input: &InputArgs, registry_file: Option<&Path>) -> Result<(), TabellaError> {
    let registry = super::registry(registry_file)?;
    let pdf = input.pdf()?;

    let extractor = PdftotextExtractor::new();
    let report = SupplierResolver::new(&extractor, &registry).run(&pdf)?;
    println!("Probing {}\n", pdf.display());
    console::print_attempts(&report);

    let resolution = report.into_result()?;
    let name = registry
        .template(&resolution.supplier_id)
        .and_then(|t| t.name.as_deref())
        .unwrap_or("unnamed supplier");
    println!(
        "\nSupplier: {} ({name})",
        console::bold(&resolution.supplier_id)
    );
    Ok(())
}
