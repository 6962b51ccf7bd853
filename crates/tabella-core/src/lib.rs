pub mod builder;
pub mod error;
pub mod export;
pub mod extraction;
pub mod input;
pub mod model;
pub mod registry;
pub mod resolve;

use std::path::Path;

use builder::TableBuilder;
use error::TabellaError;
use extraction::RegionExtractor;
use model::FinalTable;
use registry::Registry;
use resolve::{Resolution, SupplierResolver};

/// A document whose supplier was identified and whose line items were read.
#[derive(Debug, Clone)]
pub struct ExtractedInvoice {
    pub resolution: Resolution,
    pub table: FinalTable,
}

/// Main API entry point: identify the supplier of `pdf` and build its
/// line-item table.
pub fn extract_invoice(
    pdf: &Path,
    extractor: &dyn RegionExtractor,
    registry: &Registry,
) -> Result<ExtractedInvoice, TabellaError> {
    let resolution = SupplierResolver::new(extractor, registry).resolve(pdf)?;
    let table = TableBuilder::new(extractor, registry).build(pdf, &resolution.supplier_id)?;
    Ok(ExtractedInvoice { resolution, table })
}

/// Extract `pdf` and write the table to a spreadsheet at `output`.
///
/// Nothing is written unless the whole table was assembled. The export runs
/// once and is followed by column-width normalization.
pub fn convert_to_xlsx(
    pdf: &Path,
    output: &Path,
    extractor: &dyn RegionExtractor,
    registry: &Registry,
) -> Result<ExtractedInvoice, TabellaError> {
    let resolution = SupplierResolver::new(extractor, registry).resolve(pdf)?;
    convert_resolved_to_xlsx(pdf, output, resolution, extractor, registry)
}

/// Like [`convert_to_xlsx`], for a document whose supplier is already known.
pub fn convert_resolved_to_xlsx(
    pdf: &Path,
    output: &Path,
    resolution: Resolution,
    extractor: &dyn RegionExtractor,
    registry: &Registry,
) -> Result<ExtractedInvoice, TabellaError> {
    let table = TableBuilder::new(extractor, registry).build(pdf, &resolution.supplier_id)?;
    export::export(&table, output)?;
    export::normalize_column_widths(output)?;
    Ok(ExtractedInvoice { resolution, table })
}
