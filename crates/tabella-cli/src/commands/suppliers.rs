use std::path::Path;

use tabella_core::error::TabellaError;
use tabella_core::registry::{load_registry, Registry};

pub fn list(registry_file: Option<&Path>) -> Result<(), TabellaError> {
    let registry = super::registry(registry_file)?;
    println!("{} (v{})\n", registry.name(), registry.version());

    println!("Probe positions, in the order they are tried:\n");
    for probe in registry.probes() {
        println!("  {:<12} {}", probe.label, probe.region);
    }

    println!("\nSuppliers:\n");
    for template in registry.suppliers() {
        println!(
            "  {:<12} {}",
            template.supplier_id,
            template.name.as_deref().unwrap_or("-")
        );
        println!("               region  {}", template.region);
        println!("               columns {}", template.headers().join(", "));
        println!();
    }
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), TabellaError> {
    let registry = load_registry(file)?;

    println!(
        "Registry '{}' (v{}) is valid.",
        registry.name(),
        registry.version()
    );
    println!("  Probes: {}", registry.probes().len());
    println!("  Suppliers: {}", registry.suppliers().count());

    let warnings = warnings(&registry);
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {w}");
        }
    }
    Ok(())
}

/// Things that load fine but are probably mistakes.
fn warnings(registry: &Registry) -> Vec<String> {
    let mut warnings = Vec::new();
    for template in registry.suppliers() {
        if !template.columns.contains(&template.quantity_column) {
            warnings.push(format!(
                "supplier '{}' does not keep its quantity column {}",
                template.supplier_id, template.quantity_column
            ));
        }
        if template.name.is_none() {
            warnings.push(format!("supplier '{}' has no name", template.supplier_id));
        }
    }
    warnings
}
