use crate::error::TabellaError;
use crate::registry::{parse_registry_str, Registry};

const DEFAULT_REGISTRY_JSON: &str = include_str!("../../../../registry/default.json");

/// Load the registry compiled into the binary.
pub fn load_default() -> Result<Registry, TabellaError> {
    parse_registry_str(DEFAULT_REGISTRY_JSON)
}
