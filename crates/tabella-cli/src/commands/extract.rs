use std::path::Path;

use tabella_core::convert_resolved_to_xlsx;
use tabella_core::error::TabellaError;
use tabella_core::extraction::geometry::first_page_size;
use tabella_core::extraction::pdftotext::PdftotextExtractor;
use tabella_core::resolve::SupplierResolver;

use super::InputArgs;
use crate::launch;
use crate::output::console;

pub fn run(
    input: &InputArgs,
    output: &Path,
    registry_file: Option<&Path>,
    no_open: bool,
) -> Result<(), TabellaError> {
    let registry = super::registry(registry_file)?;
    let pdf = input.pdf()?;
    first_page_size(&pdf)?;

    let extractor = PdftotextExtractor::new();
    let report = SupplierResolver::new(&extractor, &registry).run(&pdf)?;
    console::print_attempts(&report);
    let resolution = report.into_result()?;

    let invoice = convert_resolved_to_xlsx(&pdf, output, resolution, &extractor, &registry)?;
    println!(
        "Wrote {} row(s) for supplier {} to {}",
        invoice.table.row_count(),
        invoice.resolution.supplier_id,
        output.display()
    );

    if !no_open {
        launch::open(output);
    }
    Ok(())
}
