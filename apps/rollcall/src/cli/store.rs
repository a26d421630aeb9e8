//! Loading and saving the registry for the selected backend.

use super::CliError;
use rollcall_core::Registry;
use rollcall_core::formats::{decode_snapshot, encode_snapshot};
use rollcall_core::storage::RedbStore;
use std::path::Path;
use std::str::FromStr;

/// Where the registry is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    File,
    Redb,
}

impl FromStr for Backend {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "redb" => Ok(Self::Redb),
            _ => Err(CliError::UnknownBackend(s.to_string())),
        }
    }
}

/// Load the registry, or start an empty one if the file backend has no file yet.
pub fn load_registry(db_path: &Path, backend: &str) -> Result<Registry, CliError> {
    match backend.parse::<Backend>()? {
        Backend::File => {
            if !db_path.exists() {
                tracing::debug!(path = %db_path.display(), "no snapshot yet, starting empty");
                return Ok(Registry::new());
            }
            let bytes = std::fs::read(db_path).map_err(|e| CliError::io(db_path, e))?;
            Ok(decode_snapshot(&bytes)?)
        }
        Backend::Redb => Ok(RedbStore::open(db_path)?.load()?),
    }
}

/// Persist the registry to the selected backend.
pub fn save_registry(registry: &Registry, db_path: &Path, backend: &str) -> Result<(), CliError> {
    match backend.parse::<Backend>()? {
        Backend::File => {
            let bytes = encode_snapshot(registry)?;
            std::fs::write(db_path, bytes).map_err(|e| CliError::io(db_path, e))?;
        }
        Backend::Redb => RedbStore::open(db_path)?.save(registry)?,
    }
    tracing::debug!(path = %db_path.display(), backend, "registry saved");
    Ok(())
}
