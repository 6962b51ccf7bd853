use serde::Serialize;
use tabella_core::error::TabellaError;
use tabella_core::model::FinalTable;
use tabella_core::resolve::Resolution;
use tabella_core::ExtractedInvoice;

#[derive(Serialize)]
struct Preview<'a> {
    resolution: &'a Resolution,
    table: &'a FinalTable,
}

pub fn print(invoice: &ExtractedInvoice) -> Result<(), TabellaError> {
    let json = serde_json::to_string_pretty(&Preview {
        resolution: &invoice.resolution,
        table: &invoice.table,
    })?;
    println!("{json}");
    Ok(())
}
