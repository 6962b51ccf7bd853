pub mod extract;
pub mod identify;
pub mod preview;
pub mod suppliers;

use clap::Args;
use std::path::{Path, PathBuf};
use tabella_core::error::TabellaError;
use tabella_core::input::discover_input;
use tabella_core::registry::{builtin, load_registry, Registry};

/// Where the invoice comes from.
#[derive(Args)]
pub struct InputArgs {
    /// Directory holding the invoice; the first file by name is used
    #[arg(long, value_name = "DIR", default_value = "INVOICE")]
    pub input_dir: PathBuf,

    /// Invoice PDF to process, instead of searching --input-dir
    #[arg(short, long, value_name = "FILE", conflicts_with = "input_dir")]
    pub input: Option<PathBuf>,
}

impl InputArgs {
    pub fn pdf(&self) -> Result<PathBuf, TabellaError> {
        match &self.input {
            Some(file) if file.is_file() => Ok(file.clone()),
            Some(file) => Err(TabellaError::InputNotFound { dir: file.clone() }),
            None => discover_input(&self.input_dir),
        }
    }
}

/// The registry at `path`, or the built-in one.
pub fn registry(path: Option<&Path>) -> Result<Registry, TabellaError> {
    match path {
        Some(p) => {
            let registry = load_registry(p)?;
            tracing::info!(path = %p.display(), name = registry.name(), "loaded supplier registry");
            Ok(registry)
        }
        None => builtin::load_default(),
    }
}
