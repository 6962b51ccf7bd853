pub mod builtin;
pub mod schema;

use crate::error::TabellaError;
use schema::{CandidateProbe, RegistryDef, SupplierTemplate};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Validated, immutable registry handed to the resolver and the table builder.
#[derive(Debug, Clone)]
pub struct Registry {
    name: String,
    version: String,
    probes: Vec<CandidateProbe>,
    suppliers: BTreeMap<String, SupplierTemplate>,
}

impl Registry {
    /// Validate a deserialized definition and build the lookup table.
    pub fn from_def(def: RegistryDef) -> Result<Self, TabellaError> {
        validate_registry(&def)?;
        let suppliers = def
            .suppliers
            .into_iter()
            .map(|t| (t.supplier_id.clone(), t))
            .collect();
        Ok(Registry {
            name: def.name,
            version: def.version,
            probes: def.probes,
            suppliers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Probes in the order they must be tried.
    pub fn probes(&self) -> &[CandidateProbe] {
        &self.probes
    }

    pub fn template(&self, supplier_id: &str) -> Option<&SupplierTemplate> {
        self.suppliers.get(supplier_id)
    }

    pub fn contains(&self, supplier_id: &str) -> bool {
        self.suppliers.contains_key(supplier_id)
    }

    /// Templates ordered by supplier id.
    pub fn suppliers(&self) -> impl Iterator<Item = &SupplierTemplate> {
        self.suppliers.values()
    }
}

/// Load a registry from a JSON file.
pub fn load_registry(path: &Path) -> Result<Registry, TabellaError> {
    let content = std::fs::read_to_string(path).map_err(|e| TabellaError::RegistryLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_registry(&content, path)
}

/// Parse a registry from a JSON string, reporting errors against `source`.
pub fn parse_registry(json: &str, source: &Path) -> Result<Registry, TabellaError> {
    let def: RegistryDef = serde_json::from_str(json).map_err(|e| TabellaError::RegistryLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    Registry::from_def(def)
}

/// Parse a registry from a JSON string (no file path context).
pub fn parse_registry_str(json: &str) -> Result<Registry, TabellaError> {
    let def: RegistryDef = serde_json::from_str(json).map_err(TabellaError::Json)?;
    Registry::from_def(def)
}

/// Validate that a registry definition is well-formed.
pub fn validate_registry(def: &RegistryDef) -> Result<(), TabellaError> {
    if def.probes.is_empty() {
        return Err(TabellaError::RegistryInvalid(
            "probes must not be empty".into(),
        ));
    }

    for probe in &def.probes {
        if probe.label.trim().is_empty() {
            return Err(TabellaError::RegistryInvalid(
                "probe label must not be empty".into(),
            ));
        }
        if !probe.region.is_well_formed() {
            return Err(TabellaError::RegistryInvalid(format!(
                "probe '{}' has an invalid region {}",
                probe.label, probe.region
            )));
        }
    }

    if def.suppliers.is_empty() {
        return Err(TabellaError::RegistryInvalid(
            "suppliers must not be empty".into(),
        ));
    }

    let mut seen_ids = BTreeSet::new();
    for template in &def.suppliers {
        validate_template(template)?;
        if !seen_ids.insert(template.supplier_id.as_str()) {
            return Err(TabellaError::RegistryInvalid(format!(
                "duplicate supplier id '{}'",
                template.supplier_id
            )));
        }
    }

    Ok(())
}

fn validate_template(template: &SupplierTemplate) -> Result<(), TabellaError> {
    let id = &template.supplier_id;
    if id.trim().is_empty() {
        return Err(TabellaError::RegistryInvalid(
            "supplier id must not be empty".into(),
        ));
    }

    if !template.region.is_well_formed() {
        return Err(TabellaError::RegistryInvalid(format!(
            "supplier '{}' has an invalid region {}",
            id, template.region
        )));
    }

    if template.columns.is_empty() {
        return Err(TabellaError::RegistryInvalid(format!(
            "supplier '{}' keeps no columns",
            id
        )));
    }

    let mut kept = BTreeSet::new();
    for column in &template.columns {
        if !kept.insert(*column) {
            return Err(TabellaError::RegistryInvalid(format!(
                "supplier '{}' keeps column {} twice",
                id, column
            )));
        }
        match template.names.get(column) {
            Some(name) if !name.trim().is_empty() => {}
            _ => {
                return Err(TabellaError::RegistryInvalid(format!(
                    "supplier '{}' has no display name for column {}",
                    id, column
                )));
            }
        }
    }

    for column in template.names.keys() {
        if !kept.contains(column) {
            return Err(TabellaError::RegistryInvalid(format!(
                "supplier '{}' names column {} which is not kept",
                id, column
            )));
        }
    }

    let mut labels = BTreeSet::new();
    for name in template.names.values() {
        if !labels.insert(name.as_str()) {
            return Err(TabellaError::RegistryInvalid(format!(
                "supplier '{}' uses display name '{}' twice",
                id, name
            )));
        }
    }

    if !kept.contains(&template.code_column) {
        return Err(TabellaError::RegistryInvalid(format!(
            "supplier '{}' code column {} is not kept",
            id, template.code_column
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_json(suppliers: &str) -> String {
        format!(
            r#"{{
                "name": "Test",
                "version": "1.0",
                "probes": [ {{ "label": "TOP", "region": [0, 0, 10, 10] }} ],
                "suppliers": [ {} ]
            }}"#,
            suppliers
        )
    }

    const VALID: &str = r#"{
        "supplier_id": "111",
        "region": [100, 0, 500, 595],
        "columns": [1, 0, 3],
        "names": { "0": "CODE", "1": "DESC", "3": "QTY" }
    }"#;

    #[test]
    fn test_parse_valid_registry() {
        let reg = parse_registry_str(&registry_json(VALID)).unwrap();
        assert_eq!(reg.name(), "Test");
        assert_eq!(reg.probes().len(), 1);
        assert!(reg.contains("111"));
        assert!(!reg.contains("222"));
        assert_eq!(reg.template("111").unwrap().columns, vec![1, 0, 3]);
    }

    #[test]
    fn test_duplicate_supplier_rejected() {
        let json = registry_json(&format!("{VALID}, {VALID}"));
        let err = parse_registry_str(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate supplier id"));
    }

    #[test]
    fn test_unnamed_column_rejected() {
        let json = registry_json(
            r#"{
                "supplier_id": "111",
                "region": [100, 0, 500, 595],
                "columns": [1, 0, 3],
                "names": { "0": "CODE", "1": "DESC" }
            }"#,
        );
        assert!(parse_registry_str(&json).is_err());
    }

    #[test]
    fn test_named_but_not_kept_rejected() {
        let json = registry_json(
            r#"{
                "supplier_id": "111",
                "region": [100, 0, 500, 595],
                "columns": [0],
                "names": { "0": "CODE", "4": "EXTRA" }
            }"#,
        );
        assert!(parse_registry_str(&json).is_err());
    }

    #[test]
    fn test_code_column_must_be_kept() {
        let json = registry_json(
            r#"{
                "supplier_id": "111",
                "region": [100, 0, 500, 595],
                "columns": [1],
                "names": { "1": "DESC" }
            }"#,
        );
        let err = parse_registry_str(&json).unwrap_err();
        assert!(err.to_string().contains("code column"));
    }

    #[test]
    fn test_inverted_region_rejected() {
        let json = registry_json(
            r#"{
                "supplier_id": "111",
                "region": [500, 0, 100, 595],
                "columns": [0],
                "names": { "0": "CODE" }
            }"#,
        );
        assert!(parse_registry_str(&json).is_err());
    }

    #[test]
    fn test_empty_probes_rejected() {
        let json = format!(
            r#"{{ "name": "T", "version": "1", "probes": [], "suppliers": [ {VALID} ] }}"#
        );
        assert!(parse_registry_str(&json).is_err());
    }

    #[test]
    fn test_load_registry_reports_path() {
        let err = load_registry(Path::new("/nonexistent/registry.json")).unwrap_err();
        match err {
            TabellaError::RegistryLoad { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/registry.json"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
