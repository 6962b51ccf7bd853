use tabella_core::ExtractedInvoice;

use super::console::{bold, dim};

pub fn print(invoice: &ExtractedInvoice) {
    let table = &invoice.table;
    println!(
        "{} {}",
        bold(&format!("Supplier {}", invoice.resolution.supplier_id)),
        dim(&format!("(probe {})", invoice.resolution.probe_label))
    );
    println!(
        "{} row(s), {} column(s)\n",
        table.row_count(),
        table.column_count()
    );
    println!("{table}");
}
